//! # Tablewright CLI
//!
//! Command-line interface for Tablewright.
//!
//! ## Commands
//!
//! - `migrate` - bring a database up to date with a resource file
//! - `validate` - check a resource file without touching a database
//! - `types` - print a dialect's storage type table
//! - `scaffold` - print Rust row structs for the resources in a file
//!

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablewright_core::Dialect;

pub use commands::run;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convergent, additive-only schema synchronizer
#[derive(Parser, Debug)]
#[command(name = "tablewright", version)]
pub struct Cli {
    /// Log every catalog check and statement
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create missing tables, columns, indexes and pivot tables
    Migrate {
        /// Resource definition file (.json or .toml)
        file: PathBuf,

        /// Database URL (sqlite://path, sqlite::memory:, postgres://...)
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Record the statements without executing them
        #[arg(long)]
        dry_run: bool,

        /// Override the dialect detected from the connection
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Skip the deleted_at column on synthesized tables
        #[arg(long)]
        no_soft_delete: bool,

        /// VARCHAR length for sized fields without a size hint
        #[arg(long)]
        string_length: Option<u32>,

        /// Print the migration report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a resource definition file
    Validate {
        /// Resource definition file (.json or .toml)
        file: PathBuf,
    },

    /// Print the storage type of every semantic type for a dialect
    Types {
        /// postgres, mysql or sqlite
        dialect: Dialect,
    },

    /// Print Rust row structs for schemaless resources
    Scaffold {
        /// Resource definition file (.json or .toml)
        file: PathBuf,

        /// Only this resource
        slug: Option<String>,

        /// Dialect used to size string columns
        #[arg(long, default_value = "postgres")]
        dialect: Dialect,

        /// Leave out the deleted_at field
        #[arg(long)]
        no_soft_delete: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from([
            "tablewright",
            "migrate",
            "resources.toml",
            "--database",
            "sqlite://app.db",
            "--dry-run",
            "--dialect",
            "sqlite",
        ])
        .unwrap();

        match cli.command {
            Command::Migrate {
                file,
                database,
                dry_run,
                dialect,
                ..
            } => {
                assert_eq!(file, PathBuf::from("resources.toml"));
                assert_eq!(database, "sqlite://app.db");
                assert!(dry_run);
                assert_eq!(dialect, Some(Dialect::Sqlite));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_dialect_is_rejected() {
        assert!(Cli::try_parse_from(["tablewright", "types", "oracle"]).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["tablewright", "types", "mysql", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
