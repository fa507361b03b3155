//! PostgreSQL driver over the synchronous `postgres` client.

use super::Connection;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tablewright_core::{EngineError, EngineResult};

/// PostgreSQL connection
pub struct PostgresConnection {
    client: Client,
}

impl PostgresConnection {
    /// Connect with a `postgres://` URL (no TLS)
    pub fn connect(url: &str) -> EngineResult<Self> {
        let client = Client::connect(url, NoTls)
            .map_err(|e| EngineError::driver(format!("Failed to connect to PostgreSQL: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn into_inner(self) -> Client {
        self.client
    }
}

impl std::fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgres"
    }

    fn execute(&mut self, sql: &str) -> EngineResult<()> {
        self.client
            .batch_execute(sql)
            .map_err(|e| EngineError::ddl(sql, e))
    }

    fn query_column(&mut self, sql: &str, params: &[String]) -> EngineResult<Vec<String>> {
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = self
            .client
            .query(sql, &params)
            .map_err(|e| EngineError::catalog(sql, e))?;

        rows.iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::catalog(sql, e))
    }
}
