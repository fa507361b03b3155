//! Live schema access
//!
//! [`Catalog`] is the single path between the engine and the database during
//! a run. Existence checks go to the dialect's catalog tables and every DDL
//! statement is executed (and counted) here.
//!
//! In a dry run nothing is executed, so the catalog also remembers what it
//! would have created; later checks in the same run then see those objects.

use crate::connection::Connection;
use crate::constraints::IndexSpec;
use crate::dialect::{CatalogQuery, SqlDialect};
use crate::report::SchemaChanges;
use std::collections::{HashMap, HashSet};
use tablewright_core::EngineResult;
use tracing::debug;

#[derive(Debug, Default)]
struct PendingSchema {
    tables: HashMap<String, Vec<String>>,
    indexes: HashSet<String>,
}

/// State carried between catalogs of the same run
///
/// Only dry runs have any: the objects planned so far.
#[derive(Debug, Default)]
pub struct CatalogState {
    pending: Option<PendingSchema>,
}

impl CatalogState {
    /// State for a run that applies DDL
    pub fn live() -> Self {
        Self::default()
    }

    /// State for a run whose connection does not apply DDL
    pub fn dry_run() -> Self {
        Self {
            pending: Some(PendingSchema::default()),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.pending.is_some()
    }
}

/// Catalog view and DDL sink for one migration run
pub struct Catalog<'c> {
    conn: &'c mut dyn Connection,
    dialect: &'c dyn SqlDialect,
    pending: Option<PendingSchema>,
    changes: SchemaChanges,
}

impl<'c> Catalog<'c> {
    /// Catalog that applies DDL
    pub fn new(conn: &'c mut dyn Connection, dialect: &'c dyn SqlDialect) -> Self {
        Self::with_state(conn, dialect, CatalogState::live())
    }

    /// Catalog for a connection that does not apply DDL
    pub fn dry_run(conn: &'c mut dyn Connection, dialect: &'c dyn SqlDialect) -> Self {
        Self::with_state(conn, dialect, CatalogState::dry_run())
    }

    /// Resume a run with state from an earlier catalog
    pub fn with_state(
        conn: &'c mut dyn Connection,
        dialect: &'c dyn SqlDialect,
        state: CatalogState,
    ) -> Self {
        Self {
            conn,
            dialect,
            pending: state.pending,
            changes: SchemaChanges::default(),
        }
    }

    /// Release the connection, keeping what later catalogs need
    pub fn into_state(self) -> CatalogState {
        CatalogState {
            pending: self.pending,
        }
    }

    pub fn dialect(&self) -> &'c dyn SqlDialect {
        self.dialect
    }

    /// The underlying connection, for collaborators that issue their own DDL
    pub fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }

    /// Changes recorded since the last call
    pub fn take_changes(&mut self) -> SchemaChanges {
        std::mem::take(&mut self.changes)
    }

    // ========================================================================
    // Existence checks
    // ========================================================================

    pub fn table_exists(&mut self, table: &str) -> EngineResult<bool> {
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.tables.contains_key(table))
        {
            return Ok(true);
        }
        let query = self.dialect.table_exists_query(table);
        let exists = !self.query(&query)?.is_empty();
        debug!(table, exists, "checked table");
        Ok(exists)
    }

    pub fn index_exists(&mut self, table: &str, index: &str) -> EngineResult<bool> {
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.indexes.contains(index))
        {
            return Ok(true);
        }
        let query = self.dialect.index_exists_query(table, index);
        let exists = !self.query(&query)?.is_empty();
        debug!(table, index, exists, "checked index");
        Ok(exists)
    }

    /// Column names of an existing table, in catalog order
    pub fn columns(&mut self, table: &str) -> EngineResult<Vec<String>> {
        let query = self.dialect.columns_query(table);
        let mut columns = self.query(&query)?;
        if let Some(pending) = self.pending.as_ref().and_then(|p| p.tables.get(table)) {
            for column in pending {
                if !columns.iter().any(|c| self.dialect.same_identifier(c, column)) {
                    columns.push(column.clone());
                }
            }
        }
        Ok(columns)
    }

    // ========================================================================
    // DDL
    // ========================================================================

    /// Create a resource table
    pub fn create_table(&mut self, table: &str, columns: Vec<String>, sql: &str) -> EngineResult<()> {
        self.execute(sql)?;
        self.remember_table(table, columns);
        self.changes.tables_created += 1;
        Ok(())
    }

    /// Create a pivot table
    pub fn create_pivot_table(
        &mut self,
        table: &str,
        columns: Vec<String>,
        sql: &str,
    ) -> EngineResult<()> {
        self.execute(sql)?;
        self.remember_table(table, columns);
        self.changes.pivot_tables_created += 1;
        Ok(())
    }

    /// Add one column to an existing table
    pub fn add_column(&mut self, table: &str, column: &str, sql: &str) -> EngineResult<()> {
        self.execute(sql)?;
        if let Some(pending) = self.pending.as_mut() {
            pending
                .tables
                .entry(table.to_string())
                .or_default()
                .push(column.to_string());
        }
        self.changes.columns_added += 1;
        Ok(())
    }

    /// Create an index
    pub fn create_index(&mut self, spec: &IndexSpec) -> EngineResult<()> {
        let sql = self.dialect.create_index_sql(spec);
        self.execute(&sql)?;
        if let Some(pending) = self.pending.as_mut() {
            pending.indexes.insert(spec.name());
        }
        self.changes.indexes_created += 1;
        Ok(())
    }

    fn remember_table(&mut self, table: &str, columns: Vec<String>) {
        if let Some(pending) = self.pending.as_mut() {
            pending.tables.insert(table.to_string(), columns);
        }
    }

    fn execute(&mut self, sql: &str) -> EngineResult<()> {
        debug!(sql, "executing statement");
        self.conn.execute(sql)
    }

    fn query(&mut self, query: &CatalogQuery) -> EngineResult<Vec<String>> {
        self.conn.query_column(&query.sql, &query.params)
    }
}

impl std::fmt::Debug for Catalog<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("dialect", &self.dialect.name())
            .field("dry_run", &self.pending.is_some())
            .field("changes", &self.changes)
            .finish()
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::connection::{SqliteConnection, StatementLog};
    use crate::dialect::SqliteDialect;

    #[test]
    fn test_existence_checks() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE tags (id integer primary key, name text)")
            .unwrap();
        conn.execute("CREATE UNIQUE INDEX uniq_tags_name ON tags (name)")
            .unwrap();

        let mut catalog = Catalog::new(&mut conn, &SqliteDialect);
        assert!(catalog.table_exists("tags").unwrap());
        assert!(!catalog.table_exists("posts").unwrap());
        assert!(catalog.index_exists("tags", "uniq_tags_name").unwrap());
        assert!(!catalog.index_exists("tags", "idx_tags_name").unwrap());
        assert_eq!(catalog.columns("tags").unwrap(), vec!["id", "name"]);
        assert!(catalog.columns("posts").unwrap().is_empty());
    }

    #[test]
    fn test_changes_are_counted() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        let mut catalog = Catalog::new(&mut conn, &SqliteDialect);

        catalog
            .create_table("tags", vec!["name".into()], "CREATE TABLE tags (id integer, name text)")
            .unwrap();
        catalog
            .add_column("tags", "slug", "ALTER TABLE tags ADD COLUMN slug text")
            .unwrap();
        catalog
            .create_index(&IndexSpec::new("tags", "slug", true))
            .unwrap();

        let changes = catalog.take_changes();
        assert_eq!(changes.tables_created, 1);
        assert_eq!(changes.columns_added, 1);
        assert_eq!(changes.indexes_created, 1);
        assert!(catalog.take_changes().is_empty());
        assert!(catalog.index_exists("tags", "uniq_tags_slug").unwrap());
    }

    #[test]
    fn test_dry_run_remembers_planned_objects() {
        let mut log = StatementLog::dry_run(SqliteConnection::open_in_memory().unwrap());
        {
            let mut catalog = Catalog::dry_run(&mut log, &SqliteDialect);
            catalog
                .create_table("tags", vec!["name".into()], "CREATE TABLE tags (id integer, name text)")
                .unwrap();
            catalog
                .create_index(&IndexSpec::new("tags", "name", true))
                .unwrap();

            assert!(catalog.table_exists("tags").unwrap());
            assert!(catalog.index_exists("tags", "uniq_tags_name").unwrap());
            assert_eq!(catalog.columns("tags").unwrap(), vec!["name"]);
        }
        assert_eq!(log.statements().len(), 2);

        let mut real = Catalog::new(log.inner_mut(), &SqliteDialect);
        assert!(!real.table_exists("tags").unwrap());
    }
}
