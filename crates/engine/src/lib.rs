//! # Tablewright Engine
//!
//! Keeps a relational schema in step with a set of resource descriptors.
//! Every run is convergent and additive: tables, columns, indexes and pivot
//! tables are created when missing, nothing is ever altered or dropped, and
//! a second run against an unchanged registry issues no DDL.
//!
//! ## Pipeline
//!
//! ```text
//! ResourceSet ──► Migrator ──┬─► ModelMigrator      (resources with a model)
//!                            ├─► TableSynthesizer   (schemaless resources)
//!                            └─► ConstraintPlanner  (indexes, pivot tables)
//!                                      │
//!                                      ▼
//!                            Catalog ──► Connection ──► database
//! ```
//!
//! SQL differences live behind [`SqlDialect`]; PostgreSQL, MySQL and SQLite
//! are provided.

pub mod catalog;
pub mod config;
pub mod connection;
pub mod constraints;
pub mod dialect;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod resolver;
pub mod scaffold;
pub mod synthesizer;

pub use catalog::{Catalog, CatalogState};
pub use config::MigratorConfig;
#[cfg(feature = "postgres")]
pub use connection::PostgresConnection;
#[cfg(feature = "sqlite")]
pub use connection::SqliteConnection;
pub use connection::{Connection, DatabaseUrl, StatementLog, connect, detect_dialect};
pub use constraints::{ConstraintPlanner, IndexSpec};
pub use dialect::{MysqlDialect, PostgresDialect, SqlDialect, SqliteDialect, dialect_for};
pub use model::{ModelMigrator, StatementMigrator};
pub use orchestrator::{Migrator, migrate};
pub use report::{MigrationPath, MigrationReport, ResourceReport, SchemaChanges};
pub use resolver::{SchemaEffect, resolve};
pub use scaffold::{scaffold_resource, scaffold_resources, struct_name};
pub use synthesizer::{ColumnDef, TableDiff, TableSynthesizer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
