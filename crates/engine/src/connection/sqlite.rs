//! SQLite driver over `rusqlite`.

use super::Connection;
use rusqlite::params_from_iter;
use std::path::Path;
use tablewright_core::{EngineError, EngineResult};

/// SQLite connection
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let conn = rusqlite::Connection::open(path).map_err(|e| {
            EngineError::driver(format!("failed to open SQLite database '{}': {}", path.display(), e))
        })?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(EngineError::driver)?;
        Ok(Self { conn })
    }

    /// Wrap an already open `rusqlite` connection
    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// The underlying `rusqlite` connection
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Connection for SqliteConnection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    fn execute(&mut self, sql: &str) -> EngineResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| EngineError::ddl(sql, e))
    }

    fn query_column(&mut self, sql: &str, params: &[String]) -> EngineResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| EngineError::catalog(sql, e))?;

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))
            .map_err(|e| EngineError::catalog(sql, e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::catalog(sql, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_and_query() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE users (id integer primary key, email text)")
            .unwrap();

        let tables = conn
            .query_column(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                &["users".to_string()],
            )
            .unwrap();
        assert_eq!(tables, vec!["users"]);

        let columns = conn
            .query_column("SELECT name FROM pragma_table_info(?1)", &["users".to_string()])
            .unwrap();
        assert_eq!(columns, vec!["id", "email"]);
    }

    #[test]
    fn test_ddl_error_carries_statement() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        let err = conn.execute("CREATE TABLE (").unwrap_err();
        assert!(err.is_ddl());
        assert!(err.to_string().contains("CREATE TABLE ("));
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("app.db");

        let mut conn = SqliteConnection::open(&path).unwrap();
        conn.execute("CREATE TABLE t (id integer)").unwrap();
        assert!(path.exists());
    }
}
