//! Migration reports

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::AddAssign;
use tablewright_core::Dialect;

// ============================================================================
// SchemaChanges
// ============================================================================

/// Counts of schema objects created during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchemaChanges {
    pub tables_created: usize,
    pub columns_added: usize,
    pub indexes_created: usize,
    pub pivot_tables_created: usize,
}

impl SchemaChanges {
    /// Whether nothing was created
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for SchemaChanges {
    fn add_assign(&mut self, other: Self) {
        self.tables_created += other.tables_created;
        self.columns_added += other.columns_added;
        self.indexes_created += other.indexes_created;
        self.pivot_tables_created += other.pivot_tables_created;
    }
}

// ============================================================================
// ResourceReport
// ============================================================================

/// How a resource's table was migrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPath {
    /// Delegated to a registered model migrator
    Model,
    /// Synthesized from field descriptors
    Schemaless,
}

impl std::fmt::Display for MigrationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationPath::Model => write!(f, "model"),
            MigrationPath::Schemaless => write!(f, "schemaless"),
        }
    }
}

/// Outcome for one resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
    pub slug: String,
    pub table: String,
    pub path: MigrationPath,
    pub changes: SchemaChanges,
    /// Statements executed (or recorded, in a dry run) for this resource
    pub statements: Vec<String>,
}

// ============================================================================
// MigrationReport
// ============================================================================

/// Outcome of a successful migration run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub dialect: Dialect,
    pub dry_run: bool,
    pub resources: Vec<ResourceReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MigrationReport {
    /// Summed changes over every resource
    pub fn totals(&self) -> SchemaChanges {
        let mut totals = SchemaChanges::default();
        for resource in &self.resources {
            totals += resource.changes;
        }
        totals
    }

    /// Every statement of the run, in execution order
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.resources
            .iter()
            .flat_map(|r| r.statements.iter().map(String::as_str))
    }

    pub fn statement_count(&self) -> usize {
        self.resources.iter().map(|r| r.statements.len()).sum()
    }

    /// Whether the schema was already converged (no DDL issued)
    pub fn is_converged(&self) -> bool {
        self.statement_count() == 0
    }

    /// Look up one resource's outcome
    pub fn resource(&self, slug: &str) -> Option<&ResourceReport> {
        self.resources.iter().find(|r| r.slug == slug)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let totals = self.totals();
        format!(
            "{} resource(s) on {}: {} table(s), {} column(s), {} index(es), {} pivot table(s), {} statement(s){}",
            self.resources.len(),
            self.dialect.display_name(),
            totals.tables_created,
            totals.columns_added,
            totals.indexes_created,
            totals.pivot_tables_created,
            self.statement_count(),
            if self.dry_run { " (dry run)" } else { "" }
        )
    }
}
