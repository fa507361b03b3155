//! Database connections
//!
//! The engine needs very little from a live database: run a DDL statement and
//! run a catalog query that returns one text column. [`Connection`] captures
//! exactly that, so a driver is a thin adapter.
//!
//! ## Drivers
//!
//! - [`SqliteConnection`] over `rusqlite` (feature `sqlite`, on by default)
//! - [`PostgresConnection`] over the synchronous `postgres` client (feature
//!   `postgres`)
//!
//! MySQL is reachable by implementing [`Connection`] for a MySQL client.

mod statement_log;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use statement_log::StatementLog;
#[cfg(feature = "postgres")]
pub use postgres::PostgresConnection;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

use std::path::PathBuf;
use tablewright_core::{Dialect, EngineError, EngineResult};
use tracing::warn;

// ============================================================================
// Connection
// ============================================================================

/// A blocking, caller-owned database connection
pub trait Connection {
    /// Driver or server product name, used for dialect detection
    fn driver_name(&self) -> &str;

    /// Execute one DDL statement
    fn execute(&mut self, sql: &str) -> EngineResult<()>;

    /// Run a query and return the first column of every row as text
    fn query_column(&mut self, sql: &str, params: &[String]) -> EngineResult<Vec<String>>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn driver_name(&self) -> &str {
        (**self).driver_name()
    }

    fn execute(&mut self, sql: &str) -> EngineResult<()> {
        (**self).execute(sql)
    }

    fn query_column(&mut self, sql: &str, params: &[String]) -> EngineResult<Vec<String>> {
        (**self).query_column(sql, params)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn driver_name(&self) -> &str {
        (**self).driver_name()
    }

    fn execute(&mut self, sql: &str) -> EngineResult<()> {
        (**self).execute(sql)
    }

    fn query_column(&mut self, sql: &str, params: &[String]) -> EngineResult<Vec<String>> {
        (**self).query_column(sql, params)
    }
}

// ============================================================================
// Dialect detection
// ============================================================================

/// Derive the dialect from a live connection
///
/// Unrecognized drivers fall back to PostgreSQL with a warning.
pub fn detect_dialect<C: Connection + ?Sized>(conn: &C) -> Dialect {
    match Dialect::from_driver_name(conn.driver_name()) {
        Some(dialect) => dialect,
        None => {
            warn!(
                driver = conn.driver_name(),
                "could not detect SQL dialect, falling back to PostgreSQL"
            );
            Dialect::Postgres
        }
    }
}

// ============================================================================
// DatabaseUrl
// ============================================================================

/// A parsed database target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `sqlite://path/to/file.db` or `sqlite:path`
    Sqlite(PathBuf),
    /// `sqlite::memory:`
    SqliteMemory,
    /// `postgres://...` or `postgresql://...`
    Postgres(String),
}

impl DatabaseUrl {
    /// Parse a URL; the scheme selects the driver
    pub fn parse(url: &str) -> EngineResult<Self> {
        let url = url.trim();

        if url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(DatabaseUrl::SqliteMemory);
        }
        if let Some(path) = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
        {
            if path.is_empty() {
                return Err(EngineError::UnsupportedDatabaseUrl(url.to_string()));
            }
            return Ok(DatabaseUrl::Sqlite(PathBuf::from(path)));
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(DatabaseUrl::Postgres(url.to_string()));
        }

        Err(EngineError::UnsupportedDatabaseUrl(url.to_string()))
    }

    /// Dialect implied by the scheme
    pub fn dialect(&self) -> Dialect {
        match self {
            DatabaseUrl::Sqlite(_) | DatabaseUrl::SqliteMemory => Dialect::Sqlite,
            DatabaseUrl::Postgres(_) => Dialect::Postgres,
        }
    }

    /// Open a connection with the matching driver
    pub fn connect(&self) -> EngineResult<Box<dyn Connection>> {
        match self {
            #[cfg(feature = "sqlite")]
            DatabaseUrl::Sqlite(path) => Ok(Box::new(SqliteConnection::open(path)?)),
            #[cfg(feature = "sqlite")]
            DatabaseUrl::SqliteMemory => Ok(Box::new(SqliteConnection::open_in_memory()?)),
            #[cfg(feature = "postgres")]
            DatabaseUrl::Postgres(url) => Ok(Box::new(PostgresConnection::connect(url)?)),
            #[allow(unreachable_patterns)]
            other => Err(EngineError::config(format!(
                "{} support is not compiled in",
                other.dialect().display_name()
            ))),
        }
    }
}

/// Parse a database URL and connect
pub fn connect(url: &str) -> EngineResult<Box<dyn Connection>> {
    DatabaseUrl::parse(url)?.connect()
}

// ============================================================================
// Tests
// ============================================================================
