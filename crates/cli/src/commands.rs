//! Command handlers

use crate::{Cli, Command};
use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::path::Path;
use tablewright_core::Dialect;
use tablewright_engine::{
    DatabaseUrl, MigrationReport, Migrator, MigratorConfig, dialect_for, scaffold_resource,
    scaffold_resources,
};
use tablewright_ir::{ResourceSet, load_resources};
use tracing::info;

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Migrate {
            file,
            database,
            dry_run,
            dialect,
            no_soft_delete,
            string_length,
            json,
        } => {
            let mut config = MigratorConfig::new();
            if let Some(dialect) = dialect {
                config = config.with_dialect(dialect);
            }
            if no_soft_delete {
                config = config.without_soft_delete();
            }
            if let Some(length) = string_length {
                config = config.with_default_string_length(length);
            }
            if dry_run {
                config = config.dry_run();
            }
            migrate(&file, &database, config, json)
        }
        Command::Validate { file } => validate(&file),
        Command::Types { dialect } => {
            print_types(dialect);
            Ok(())
        }
        Command::Scaffold {
            file,
            slug,
            dialect,
            no_soft_delete,
        } => {
            let mut config = MigratorConfig::new().with_dialect(dialect);
            if no_soft_delete {
                config = config.without_soft_delete();
            }
            scaffold(&file, slug.as_deref(), &config)
        }
    }
}

fn load(file: &Path) -> Result<ResourceSet> {
    let set = load_resources(file)
        .and_then(|f| f.into_resource_set())
        .with_context(|| format!("failed to load {}", file.display()))?;
    info!(file = %file.display(), resources = set.len(), "loaded resources");
    Ok(set)
}

// ============================================================================
// migrate
// ============================================================================

fn migrate(file: &Path, database: &str, config: MigratorConfig, json: bool) -> Result<()> {
    let resources = load(file)?;
    let url = DatabaseUrl::parse(database)?;
    let conn = url.connect().context("failed to connect")?;

    let mut migrator = Migrator::with_config(conn, config);
    let report = migrator.migrate(&resources)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &MigrationReport) {
    for resource in &report.resources {
        let marker = if resource.changes.is_empty() {
            "=".dimmed()
        } else {
            "+".green().bold()
        };
        println!(
            "{} {} {} ({})",
            marker,
            resource.slug.bold(),
            format!("-> {}", resource.table).dimmed(),
            resource.path
        );
        if report.dry_run {
            for statement in &resource.statements {
                println!("    {};", statement.replace('\n', "\n    "));
            }
        }
    }

    let headline = if report.is_converged() {
        "Schema is up to date".green().bold()
    } else if report.dry_run {
        "Dry run complete".yellow().bold()
    } else {
        "Migration complete".green().bold()
    };
    println!("\n{} {}", headline, report.summary().dimmed());
}

// ============================================================================
// validate
// ============================================================================

fn validate(file: &Path) -> Result<()> {
    let resources = load(file)?;
    for resource in &resources {
        let relationships = resource.relationships().count();
        println!(
            "{} {} ({} field(s), {} relationship(s))",
            "ok".green().bold(),
            resource.slug,
            resource.field_count(),
            relationships
        );
    }
    println!(
        "\n{} {} resource(s) valid",
        "Valid:".green().bold(),
        resources.len()
    );
    Ok(())
}

// ============================================================================
// types
// ============================================================================

fn print_types(dialect: Dialect) {
    let table = dialect_for(dialect).type_table();
    println!("{}", format!("{} storage types", dialect.display_name()).bold());

    let rows = table.rows();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (semantic, storage) in rows {
        println!("  {}  {}", format!("{semantic:<width$}").cyan(), storage);
    }
}

// ============================================================================
// scaffold
// ============================================================================

fn scaffold(file: &Path, slug: Option<&str>, config: &MigratorConfig) -> Result<()> {
    let resources = load(file)?;
    let dialect = dialect_for(config.dialect.unwrap_or_default());

    let output = match slug {
        Some(slug) => {
            let Some(resource) = resources.get(slug) else {
                bail!("no resource named '{slug}' in {}", file.display());
            };
            scaffold_resource(resource, dialect, config)
        }
        None => scaffold_resources(&resources, dialect, config),
    }?;

    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RESOURCES: &str = r#"
schema_version = 1

[[resources]]
slug = "tags"

[[resources.fields]]
key = "name"
type = "text"
unique = true
"#;

    #[test]
    fn test_load_reports_file_in_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }

    #[test]
    fn test_scaffold_unknown_slug_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.toml");
        fs::write(&path, RESOURCES).unwrap();

        let config = MigratorConfig::new().with_dialect(Dialect::Sqlite);
        assert!(scaffold(&path, Some("tags"), &config).is_ok());
        assert!(scaffold(&path, Some("posts"), &config).is_err());
    }
}
