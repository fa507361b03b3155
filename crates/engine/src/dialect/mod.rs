//! SQL dialects (Strategy pattern)
//!
//! Each supported database gets one capability object implementing
//! [`SqlDialect`]: its static type table, identifier quoting, catalog queries
//! and the DDL shapes it accepts. The rest of the engine only talks to
//! `&dyn SqlDialect`.

mod mysql;
mod postgres;
mod sqlite;
pub mod types;

pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use types::{DEFAULT_STRING_LENGTH, TypeTable};

use crate::constraints::IndexSpec;
use tablewright_core::{Dialect, SemanticType};

// ============================================================================
// CatalogQuery
// ============================================================================

/// A parameterized catalog query returning a single text column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub sql: String,
    pub params: Vec<String>,
}

impl CatalogQuery {
    pub fn new(sql: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

// ============================================================================
// SqlDialect
// ============================================================================

/// Database-specific SQL generation and catalog access.
pub trait SqlDialect: Send + Sync {
    /// Which dialect this is
    fn dialect(&self) -> Dialect;

    /// Static type table for this dialect
    fn type_table(&self) -> &'static TypeTable;

    /// Quote an identifier (table name, column name, etc.)
    fn quote_ident(&self, name: &str) -> String;

    /// Column definition of the synthetic auto-incrementing `id` column
    fn primary_key_definition(&self) -> &'static str;

    /// Query returning one row if `table` exists
    fn table_exists_query(&self, table: &str) -> CatalogQuery;

    /// Query returning one row if index `index` exists on `table`
    fn index_exists_query(&self, table: &str, index: &str) -> CatalogQuery;

    /// Query returning the column names of `table`
    fn columns_query(&self, table: &str) -> CatalogQuery;

    /// Whether `CREATE INDEX IF NOT EXISTS` is accepted
    fn supports_index_if_not_exists(&self) -> bool;

    // ========================================================================
    // Provided methods
    // ========================================================================

    /// Longest identifier the database keeps intact, if it has a limit
    fn max_identifier_length(&self) -> Option<usize> {
        None
    }

    /// Whether `ADD COLUMN` accepts defaults such as `CURRENT_TIMESTAMP`
    fn supports_non_constant_add_column_default(&self) -> bool {
        true
    }

    /// Whether quoted identifiers differing only in case name different objects
    fn identifiers_case_sensitive(&self) -> bool {
        false
    }

    /// Whether two identifiers name the same column or table
    fn same_identifier(&self, a: &str, b: &str) -> bool {
        if self.identifiers_case_sensitive() {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    /// Dialect identifier (e.g. "postgres")
    fn name(&self) -> &'static str {
        self.dialect().as_str()
    }

    /// Storage type for a semantic type
    fn storage_type(&self, semantic: &SemanticType, size_hint: Option<u32>) -> String {
        self.type_table().storage_type(semantic, size_hint)
    }

    /// Storage type of a foreign key column
    fn foreign_key_type(&self) -> &'static str {
        self.type_table().foreign_key
    }

    /// Storage type of a polymorphic type discriminator column
    fn polymorphic_type(&self) -> &'static str {
        self.type_table().polymorphic_type
    }

    /// `CREATE TABLE` with the synthetic primary key followed by `columns`
    ///
    /// Each entry of `columns` is a complete column definition.
    fn create_table_sql(&self, table: &str, columns: &[String]) -> String {
        let mut defs = Vec::with_capacity(columns.len() + 1);
        defs.push(format!(
            "{} {}",
            self.quote_ident("id"),
            self.primary_key_definition()
        ));
        defs.extend(columns.iter().cloned());

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.quote_ident(table),
            defs.join(",\n    ")
        )
    }

    /// Two-column pivot table with a composite primary key
    fn create_pivot_table_sql(&self, table: &str, owner_column: &str, related_column: &str) -> String {
        let fk = self.foreign_key_type();
        let owner = self.quote_ident(owner_column);
        let related = self.quote_ident(related_column);

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {} {} NOT NULL,\n    {} {} NOT NULL,\n    PRIMARY KEY ({}, {})\n)",
            self.quote_ident(table),
            owner,
            fk,
            related,
            fk,
            owner,
            related
        )
    }

    /// `ALTER TABLE ... ADD COLUMN` for one column definition
    fn add_column_sql(&self, table: &str, column_definition: &str) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_ident(table),
            column_definition
        )
    }

    /// `CREATE [UNIQUE] INDEX` for a single-column index
    fn create_index_sql(&self, spec: &IndexSpec) -> String {
        let if_not_exists = if self.supports_index_if_not_exists() {
            "IF NOT EXISTS "
        } else {
            ""
        };

        format!(
            "CREATE {}INDEX {}{} ON {} ({})",
            if spec.unique { "UNIQUE " } else { "" },
            if_not_exists,
            self.quote_ident(&spec.name()),
            self.quote_ident(&spec.table),
            self.quote_ident(&spec.column)
        )
    }
}

impl std::fmt::Debug for dyn SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqlDialect({})", self.name())
    }
}

/// Get the capability object for a dialect
pub fn dialect_for(dialect: Dialect) -> &'static dyn SqlDialect {
    match dialect {
        Dialect::Postgres => &PostgresDialect,
        Dialect::MySql => &MysqlDialect,
        Dialect::Sqlite => &SqliteDialect,
    }
}

// ============================================================================
// Tests
// ============================================================================
