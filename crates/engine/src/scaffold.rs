//! # Row Struct Scaffold
//!
//! Renders a plain Rust struct for a resource's table, one field per column
//! the synthesizer would create. Handy as a starting point for code that
//! reads rows back out of a schemaless table.
//!
//! ```text
//! /// Row of the `posts` table
//! #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
//! pub struct Post {
//!     pub id: i64,
//!     pub title: String,
//!     pub user_id: Option<i64>,
//!     ...
//! }
//! ```

use crate::config::MigratorConfig;
use crate::dialect::SqlDialect;
use crate::synthesizer::TableSynthesizer;
use heck::ToUpperCamelCase;
use tablewright_core::{EngineResult, ValueType};
use tablewright_ir::{ResourceDescriptor, ResourceSet, singularize};

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "type", "unsafe", "use", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers
const PATH_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Struct name for a resource (`blog_posts` -> `BlogPost`)
pub fn struct_name(resource: &ResourceDescriptor) -> String {
    singularize(&resource.slug).to_upper_camel_case()
}

fn field_ident(column: &str) -> String {
    if PATH_KEYWORDS.contains(&column) {
        format!("{column}_")
    } else if RUST_KEYWORDS.contains(&column) {
        format!("r#{column}")
    } else {
        column.to_string()
    }
}

/// Render the row struct of one resource
pub fn scaffold_resource(
    resource: &ResourceDescriptor,
    dialect: &dyn SqlDialect,
    config: &MigratorConfig,
) -> EngineResult<String> {
    let columns = TableSynthesizer::new(dialect, config).desired_columns(resource)?;

    let mut out = String::with_capacity(256 + columns.len() * 40);
    out.push_str(&format!("/// Row of the `{}` table\n", resource.table_name()));
    out.push_str("#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]\n");
    out.push_str(&format!("pub struct {} {{\n", struct_name(resource)));
    out.push_str("    pub id: i64,\n");

    for column in &columns {
        let rust_type = ValueType {
            kind: column.value_kind,
            optional: !column.not_null,
        }
        .to_rust_type();
        out.push_str(&format!(
            "    pub {}: {},\n",
            field_ident(&column.name),
            rust_type
        ));
    }

    out.push_str("}\n");
    Ok(out)
}

/// Render the row structs of every resource, separated by blank lines
pub fn scaffold_resources(
    resources: &ResourceSet,
    dialect: &dyn SqlDialect,
    config: &MigratorConfig,
) -> EngineResult<String> {
    let structs = resources
        .iter()
        .map(|r| scaffold_resource(r, dialect, config))
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(structs.join("\n"))
}
