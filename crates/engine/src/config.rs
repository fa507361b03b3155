//! Migrator configuration

use crate::dialect::DEFAULT_STRING_LENGTH;
use tablewright_core::Dialect;

/// Configuration for a [`Migrator`](crate::Migrator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Dialect to target; detected from the connection when `None`
    pub dialect: Option<Dialect>,

    /// Whether synthesized tables get a trailing `deleted_at` column
    pub soft_delete_columns: bool,

    /// Length of sized text columns without a size hint
    pub default_string_length: u32,

    /// Record statements without executing them
    pub dry_run: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            dialect: None,
            soft_delete_columns: true,
            default_string_length: DEFAULT_STRING_LENGTH,
            dry_run: false,
        }
    }
}

impl MigratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a dialect instead of detecting it
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Do not add `deleted_at` to synthesized tables
    pub fn without_soft_delete(mut self) -> Self {
        self.soft_delete_columns = false;
        self
    }

    /// Set the default length of sized text columns
    pub fn with_default_string_length(mut self, length: u32) -> Self {
        self.default_string_length = length;
        self
    }

    /// Record statements without executing them
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Trailing timestamp columns added to synthesized tables
    pub fn timestamp_columns(&self) -> &'static [&'static str] {
        if self.soft_delete_columns {
            &["created_at", "updated_at", "deleted_at"]
        } else {
            &["created_at", "updated_at"]
        }
    }
}
