//! Table synthesizer
//!
//! Schemaless resources (no backing model) get their table straight from the
//! field descriptors. A missing table is created in one statement; an existing
//! table only ever gains columns. Nothing is altered or dropped.
//!
//! ## Column order
//!
//! 1. synthetic `id` primary key
//! 2. one column per field, in field order (scalar fields, belongs-to
//!    foreign keys, polymorphic id/type pairs)
//! 3. `created_at`, `updated_at` and `deleted_at` unless already defined
//!
//! ## NOT NULL on existing tables
//!
//! Existing rows have no value for a new column, so a required column added
//! to an existing table keeps `NOT NULL` only when it has a default. Otherwise
//! it is added nullable and a warning is logged.
//!
//! SQLite cannot add a column whose default is evaluated per row
//! (`CURRENT_TIMESTAMP`, arbitrary expressions). There the default is left
//! off the `ADD COLUMN` and the NOT NULL rule above applies as if it had none.

use crate::catalog::Catalog;
use crate::config::MigratorConfig;
use crate::dialect::SqlDialect;
use crate::report::SchemaChanges;
use crate::resolver::{SchemaEffect, resolve};
use tablewright_core::{EngineResult, SemanticType, ValueKind};
use tablewright_ir::{Field, FieldDescriptor, ResourceDescriptor};
use tracing::{debug, warn};

// ============================================================================
// ColumnDef
// ============================================================================

/// A column the synthesizer wants on a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    pub value_kind: ValueKind,
    pub not_null: bool,
    /// Default, already rendered for the dialect
    pub default: Option<String>,
    /// The default is evaluated per row rather than a literal
    pub volatile_default: bool,
}

impl ColumnDef {
    /// Full column definition (`"name" type [NOT NULL] [DEFAULT x]`)
    pub fn definition(&self, dialect: &dyn SqlDialect) -> String {
        let mut def = format!("{} {}", dialect.quote_ident(&self.name), self.sql_type);
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }

    /// Copy of this column that can be added to a table with existing rows
    pub fn relaxed_for_existing_rows(&self, dialect: &dyn SqlDialect) -> ColumnDef {
        let default = if self.volatile_default && !dialect.supports_non_constant_add_column_default() {
            None
        } else {
            self.default.clone()
        };

        ColumnDef {
            not_null: self.not_null && default.is_some(),
            volatile_default: self.volatile_default && default.is_some(),
            default,
            ..self.clone()
        }
    }
}

// ============================================================================
// TableDiff
// ============================================================================

/// Columns missing from an existing table, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiff {
    pub table: String,
    pub missing_columns: Vec<ColumnDef>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_columns.is_empty()
    }
}

// ============================================================================
// TableSynthesizer
// ============================================================================

/// Builds and evolves tables for schemaless resources
pub struct TableSynthesizer<'a> {
    dialect: &'a dyn SqlDialect,
    config: &'a MigratorConfig,
}

impl<'a> TableSynthesizer<'a> {
    pub fn new(dialect: &'a dyn SqlDialect, config: &'a MigratorConfig) -> Self {
        Self { dialect, config }
    }

    /// Every column the resource's table should have, except `id`
    pub fn desired_columns(&self, resource: &ResourceDescriptor) -> EngineResult<Vec<ColumnDef>> {
        let mut columns: Vec<ColumnDef> = Vec::new();
        let mut push = |column: ColumnDef| {
            if self.dialect.same_identifier(&column.name, "id")
                || columns
                    .iter()
                    .any(|c| self.dialect.same_identifier(&c.name, &column.name))
            {
                debug!(resource = %resource.slug, column = %column.name, "skipping duplicate column");
                return;
            }
            columns.push(column);
        };

        for field in &resource.fields {
            match field {
                Field::Scalar(scalar) => push(self.scalar_column(scalar)),
                Field::Relationship(relationship) => match resolve(resource, relationship)? {
                    SchemaEffect::AddForeignKeyColumn {
                        column, not_null, ..
                    } => push(ColumnDef {
                        name: column,
                        sql_type: self.dialect.foreign_key_type().to_string(),
                        value_kind: ValueKind::Integer,
                        not_null,
                        default: None,
                        volatile_default: false,
                    }),
                    SchemaEffect::AddPolymorphicColumns {
                        id_column,
                        type_column,
                        ..
                    } => {
                        push(ColumnDef {
                            name: id_column,
                            sql_type: self.dialect.foreign_key_type().to_string(),
                            value_kind: ValueKind::Integer,
                            not_null: false,
                            default: None,
                            volatile_default: false,
                        });
                        push(ColumnDef {
                            name: type_column,
                            sql_type: self.dialect.polymorphic_type().to_string(),
                            value_kind: ValueKind::String,
                            not_null: false,
                            default: None,
                            volatile_default: false,
                        });
                    }
                    SchemaEffect::CreatePivotTable { .. } | SchemaEffect::NoDirectEffect => {}
                },
            }
        }

        for name in self.config.timestamp_columns() {
            push(ColumnDef {
                name: (*name).to_string(),
                sql_type: self.dialect.storage_type(&SemanticType::DateTime, None),
                value_kind: ValueKind::DateTime,
                not_null: false,
                default: None,
                volatile_default: false,
            });
        }

        Ok(columns)
    }

    fn scalar_column(&self, field: &FieldDescriptor) -> ColumnDef {
        let size = field
            .size_hint
            .or(Some(self.config.default_string_length));
        let default = field.default_value.as_ref().filter(|d| !d.is_null());

        ColumnDef {
            name: field.key.clone(),
            sql_type: self.dialect.storage_type(&field.semantic_type, size),
            value_kind: field.semantic_type.value_kind(),
            not_null: field.is_not_null(),
            default: default.map(|d| d.to_sql(self.dialect.dialect())),
            volatile_default: default.is_some_and(|d| !d.is_constant()),
        }
    }

    /// `CREATE TABLE` for a resource whose table is absent
    pub fn create_table_sql(&self, resource: &ResourceDescriptor) -> EngineResult<String> {
        let defs: Vec<String> = self
            .desired_columns(resource)?
            .iter()
            .map(|c| c.definition(self.dialect))
            .collect();
        Ok(self.dialect.create_table_sql(resource.table_name(), &defs))
    }

    /// Columns missing from an existing table
    ///
    /// Names are compared with the dialect's identifier rules (exact on
    /// Postgres, case-insensitive elsewhere).
    pub fn diff(&self, resource: &ResourceDescriptor, existing: &[String]) -> EngineResult<TableDiff> {
        let missing_columns = self
            .desired_columns(resource)?
            .into_iter()
            .filter(|c| !existing.iter().any(|e| self.dialect.same_identifier(e, &c.name)))
            .collect();

        Ok(TableDiff {
            table: resource.table_name().to_string(),
            missing_columns,
        })
    }

    /// One `ALTER TABLE ... ADD COLUMN` per missing column, NOT NULL relaxed
    pub fn alter_statements(&self, diff: &TableDiff) -> Vec<(String, String)> {
        diff.missing_columns
            .iter()
            .map(|column| {
                let added = column.relaxed_for_existing_rows(self.dialect);
                if column.default.is_some() && added.default.is_none() {
                    warn!(
                        table = %diff.table,
                        column = %column.name,
                        dialect = self.dialect.name(),
                        "default is not constant; adding column without it"
                    );
                }
                if column.not_null && !added.not_null {
                    warn!(
                        table = %diff.table,
                        column = %column.name,
                        "required column has no default; adding it as nullable"
                    );
                }
                let sql = self
                    .dialect
                    .add_column_sql(&diff.table, &added.definition(self.dialect));
                (column.name.clone(), sql)
            })
            .collect()
    }

    /// Create or extend the resource's table
    pub fn synthesize(
        &self,
        catalog: &mut Catalog<'_>,
        resource: &ResourceDescriptor,
    ) -> EngineResult<SchemaChanges> {
        let table = resource.table_name();
        let mut changes = SchemaChanges::default();

        if !catalog.table_exists(table)? {
            let columns = self.desired_columns(resource)?;
            let names = columns.iter().map(|c| c.name.clone()).collect();
            let sql = self.create_table_sql(resource)?;
            catalog.create_table(table, names, &sql)?;
            changes.tables_created += 1;
            return Ok(changes);
        }

        let existing = catalog.columns(table)?;
        let diff = self.diff(resource, &existing)?;
        if diff.is_empty() {
            debug!(table, "table is up to date");
            return Ok(changes);
        }

        for (column, sql) in self.alter_statements(&diff) {
            catalog.add_column(table, &column, &sql)?;
            changes.columns_added += 1;
        }
        Ok(changes)
    }
}

// ============================================================================
// Tests
// ============================================================================
