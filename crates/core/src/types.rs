//! Core types used throughout Tablewright
//!
//! This module contains the fundamental types that form the foundation of the
//! type system: the dialect-independent semantic field types, the SQL dialects
//! the engine targets, relationship kinds, and the in-memory value types a
//! semantic type maps to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Semantic Types
// ============================================================================

/// Abstract field kind, independent of any dialect's concrete column type.
///
/// Names that do not match a known kind deserialize to `Unknown` instead of
/// failing, so that the storage type table stays total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum SemanticType {
    /// Single-line text (VARCHAR)
    #[default]
    ShortText,
    /// Multi-line text
    LongText,
    /// Formatted text (markdown/html)
    RichText,
    /// Integer number
    Number,
    /// Boolean true/false
    Boolean,
    /// Date without time
    Date,
    /// Date and time
    DateTime,
    /// Path or URL of an uploaded file
    FileReference,
    /// One value out of a fixed option list
    Select,
    /// Free-form key/value data stored as JSON
    KeyValue,
    /// Any name the engine does not recognize
    Unknown(String),
}

impl SemanticType {
    /// Canonical snake_case name
    pub fn as_str(&self) -> &str {
        match self {
            SemanticType::ShortText => "short_text",
            SemanticType::LongText => "long_text",
            SemanticType::RichText => "rich_text",
            SemanticType::Number => "number",
            SemanticType::Boolean => "boolean",
            SemanticType::Date => "date",
            SemanticType::DateTime => "date_time",
            SemanticType::FileReference => "file_reference",
            SemanticType::Select => "select",
            SemanticType::KeyValue => "key_value",
            SemanticType::Unknown(name) => name,
        }
    }

    /// Get a user-friendly display name
    pub fn display_name(&self) -> &str {
        match self {
            SemanticType::ShortText => "Short Text",
            SemanticType::LongText => "Long Text",
            SemanticType::RichText => "Rich Text",
            SemanticType::Number => "Number",
            SemanticType::Boolean => "Boolean",
            SemanticType::Date => "Date",
            SemanticType::DateTime => "Date Time",
            SemanticType::FileReference => "File",
            SemanticType::Select => "Select",
            SemanticType::KeyValue => "Key/Value",
            SemanticType::Unknown(name) => name,
        }
    }

    /// In-memory value kind used when synthesizing a backing structure
    pub fn value_kind(&self) -> ValueKind {
        match self {
            SemanticType::ShortText
            | SemanticType::LongText
            | SemanticType::RichText
            | SemanticType::FileReference
            | SemanticType::Select
            | SemanticType::Unknown(_) => ValueKind::String,
            SemanticType::Number => ValueKind::Integer,
            SemanticType::Boolean => ValueKind::Boolean,
            SemanticType::Date => ValueKind::Date,
            SemanticType::DateTime => ValueKind::DateTime,
            SemanticType::KeyValue => ValueKind::Json,
        }
    }

    /// In-memory value type, wrapped in `Option` when the field is nullable
    pub fn value_type(&self, nullable: bool) -> ValueType {
        ValueType {
            kind: self.value_kind(),
            optional: nullable,
        }
    }

    /// Check if this type was not recognized
    pub fn is_unknown(&self) -> bool {
        matches!(self, SemanticType::Unknown(_))
    }

    /// All recognized semantic types
    pub fn all() -> Vec<SemanticType> {
        vec![
            SemanticType::ShortText,
            SemanticType::LongText,
            SemanticType::RichText,
            SemanticType::Number,
            SemanticType::Boolean,
            SemanticType::Date,
            SemanticType::DateTime,
            SemanticType::FileReference,
            SemanticType::Select,
            SemanticType::KeyValue,
        ]
    }
}

impl FromStr for SemanticType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Ok(match normalized.as_str() {
            "short_text" | "text" | "string" => SemanticType::ShortText,
            "long_text" | "textarea" => SemanticType::LongText,
            "rich_text" | "markdown" | "html" => SemanticType::RichText,
            "number" | "integer" | "int" => SemanticType::Number,
            "boolean" | "bool" | "switch" => SemanticType::Boolean,
            "date" => SemanticType::Date,
            "date_time" | "datetime" | "timestamp" => SemanticType::DateTime,
            "file_reference" | "file" | "image" => SemanticType::FileReference,
            "select" | "enum" => SemanticType::Select,
            "key_value" | "json" => SemanticType::KeyValue,
            _ => SemanticType::Unknown(s.to_string()),
        })
    }
}

impl From<String> for SemanticType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<SemanticType> for String {
    fn from(t: SemanticType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Value Types
// ============================================================================

/// Base kind of an in-memory field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Integer,
    Boolean,
    Date,
    DateTime,
    Json,
}

impl ValueKind {
    /// Convert to Rust type string
    pub fn to_rust_type(&self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Integer => "i64",
            ValueKind::Boolean => "bool",
            ValueKind::Date => "chrono::NaiveDate",
            ValueKind::DateTime => "chrono::NaiveDateTime",
            ValueKind::Json => "serde_json::Value",
        }
    }
}

/// In-memory representation of a field: base kind plus optionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueType {
    pub kind: ValueKind,
    pub optional: bool,
}

impl ValueType {
    /// Convert to Rust type string (`Option<..>` when optional)
    pub fn to_rust_type(&self) -> String {
        if self.optional {
            format!("Option<{}>", self.kind.to_rust_type())
        } else {
            self.kind.to_rust_type().to_string()
        }
    }
}

// ============================================================================
// Dialects
// ============================================================================

/// SQL dialects the engine can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Short lowercase identifier ("postgres", "mysql", "sqlite")
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "PostgreSQL",
            Dialect::MySql => "MySQL",
            Dialect::Sqlite => "SQLite",
        }
    }

    /// Map a driver or server product name to a dialect
    ///
    /// Returns `None` for anything unrecognized; callers decide the fallback.
    pub fn from_driver_name(name: &str) -> Option<Dialect> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.starts_with("postgres") || lower == "pg" || lower == "pgx" {
            Some(Dialect::Postgres)
        } else if lower.starts_with("mysql") || lower.starts_with("mariadb") {
            Some(Dialect::MySql)
        } else if lower.starts_with("sqlite") {
            Some(Dialect::Sqlite)
        } else {
            None
        }
    }

    /// Get all dialects
    pub fn all() -> &'static [Dialect] {
        &[Dialect::Postgres, Dialect::MySql, Dialect::Sqlite]
    }
}

impl FromStr for Dialect {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_driver_name(s)
            .ok_or_else(|| crate::error::EngineError::config(format!("unknown dialect '{}'", s)))
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Relationship Kinds
// ============================================================================

/// Kinds of relationship a resource field can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// This table holds a foreign key to the related table
    BelongsTo,
    /// The related table holds a foreign key to this one (single row)
    HasOne,
    /// The related table holds a foreign key to this one (many rows)
    HasMany,
    /// Many-to-many through a pivot table
    BelongsToMany,
    /// This table holds an `{name}_id`/`{name}_type` pair
    #[serde(alias = "morph_to")]
    PolymorphicTo,
    /// Inverse of `PolymorphicTo` (single row)
    #[serde(alias = "morph_one")]
    PolymorphicOne,
    /// Inverse of `PolymorphicTo` (many rows)
    #[serde(alias = "morph_many")]
    PolymorphicMany,
    /// Many-to-many polymorphic relationship
    #[serde(alias = "morph_to_many")]
    PolymorphicToMany,
}

impl RelationKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "Belongs To",
            RelationKind::HasOne => "Has One",
            RelationKind::HasMany => "Has Many",
            RelationKind::BelongsToMany => "Belongs To Many",
            RelationKind::PolymorphicTo => "Polymorphic To",
            RelationKind::PolymorphicOne => "Polymorphic One",
            RelationKind::PolymorphicMany => "Polymorphic Many",
            RelationKind::PolymorphicToMany => "Polymorphic To Many",
        }
    }

    /// Check if this relationship requires a pivot table
    pub fn requires_pivot(&self) -> bool {
        matches!(self, RelationKind::BelongsToMany)
    }

    /// Check if this is a polymorphic relationship
    pub fn is_polymorphic(&self) -> bool {
        matches!(
            self,
            RelationKind::PolymorphicTo
                | RelationKind::PolymorphicOne
                | RelationKind::PolymorphicMany
                | RelationKind::PolymorphicToMany
        )
    }

    /// Check if the owning table stores no column for this relationship
    pub fn is_inverse(&self) -> bool {
        matches!(
            self,
            RelationKind::HasOne
                | RelationKind::HasMany
                | RelationKind::PolymorphicOne
                | RelationKind::PolymorphicMany
                | RelationKind::PolymorphicToMany
        )
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
