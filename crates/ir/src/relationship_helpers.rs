//! Relationship Helper Functions
//!
//! Naming rules shared by the resolver, the constraint planner and the table
//! synthesizer.
//!
//! ## Column naming
//!
//! - **Belongs-to**: `{singular(related_slug)}_id`
//! - **Polymorphic-to**: `{key}_id` and `{key}_type`
//! - **Indexes**: `idx_{table}_{column}` or `uniq_{table}_{column}`

use heck::ToSnakeCase;

// ============================================================================
// Naming
// ============================================================================

/// Singularize a resource slug
///
/// Converts to snake_case and strips exactly one trailing "s". Irregular
/// plurals are not handled.
///
/// # Examples
///
/// - "organizations" -> "organization"
/// - "BlogPosts" -> "blog_post"
/// - "status" -> "statu"
pub fn singularize(slug: &str) -> String {
    let snake = slug.to_snake_case();
    match snake.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => snake,
    }
}

/// Generate a foreign key column name from a related resource slug
///
/// # Examples
///
/// - "organizations" -> "organization_id"
/// - "users" -> "user_id"
pub fn generate_fk_column_name(related_slug: &str) -> String {
    format!("{}_id", singularize(related_slug))
}

/// Generate the id and type columns of a polymorphic-to relationship
pub fn generate_polymorphic_columns(key: &str) -> (String, String) {
    (format!("{}_id", key), format!("{}_type", key))
}

/// Deterministic index name for a single-column index
pub fn index_name(table: &str, column: &str, unique: bool) -> String {
    let prefix = if unique { "uniq" } else { "idx" };
    format!("{}_{}_{}", prefix, table, column)
}

// ============================================================================
// Identifiers
// ============================================================================

/// Check that a name can be used unquoted as a table or column name
///
/// Letters, digits and underscores, not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// Tests
// ============================================================================
