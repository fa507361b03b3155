//! Backing-model migrators
//!
//! A resource with a backing model is migrated by whoever owns that model
//! (typically an ORM). The engine only needs one call per resource; the
//! constraint planner still runs afterwards.

use crate::connection::Connection;
use tablewright_core::EngineResult;
use tablewright_ir::{ModelHandle, ResourceDescriptor};

/// Migrates the table of a backing model
pub trait ModelMigrator {
    /// Bring the model's table up to date on `conn`
    fn migrate_model(
        &mut self,
        model: &ModelHandle,
        resource: &ResourceDescriptor,
        conn: &mut dyn Connection,
    ) -> EngineResult<()>;
}

impl<F> ModelMigrator for F
where
    F: FnMut(&ModelHandle, &ResourceDescriptor, &mut dyn Connection) -> EngineResult<()>,
{
    fn migrate_model(
        &mut self,
        model: &ModelHandle,
        resource: &ResourceDescriptor,
        conn: &mut dyn Connection,
    ) -> EngineResult<()> {
        self(model, resource, conn)
    }
}

/// Model migrator that runs a fixed list of statements
///
/// Useful for models whose table is defined by hand-written DDL. Statements
/// should be idempotent (`CREATE TABLE IF NOT EXISTS ...`).
#[derive(Debug, Clone, Default)]
pub struct StatementMigrator {
    statements: Vec<String>,
}

impl StatementMigrator {
    pub fn new(statements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModelMigrator for StatementMigrator {
    fn migrate_model(
        &mut self,
        _model: &ModelHandle,
        _resource: &ResourceDescriptor,
        conn: &mut dyn Connection,
    ) -> EngineResult<()> {
        for statement in &self.statements {
            conn.execute(statement)?;
        }
        Ok(())
    }
}
