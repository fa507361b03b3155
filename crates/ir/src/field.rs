//! Field definitions for resource properties
//!
//! A resource's field list is a sequence of [`Field`] values. Each one is
//! either a scalar column described by a [`FieldDescriptor`] or a
//! relationship described by a [`RelationshipDescriptor`]; consumers dispatch
//! on the two variants with exhaustive matching.

use crate::relationship::RelationshipDescriptor;
use crate::relationship_helpers::is_valid_identifier;
use serde::{Deserialize, Serialize};
use tablewright_core::{
    Dialect, EngineError, EngineResult, SemanticType, Validatable, ValueType,
};

// ============================================================================
// Field
// ============================================================================

/// One entry of a resource's ordered field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    /// A relationship to another resource
    Relationship(RelationshipDescriptor),
    /// A plain column
    Scalar(FieldDescriptor),
}

impl Field {
    /// The field key (unique within its resource)
    pub fn key(&self) -> &str {
        match self {
            Field::Scalar(f) => &f.key,
            Field::Relationship(r) => &r.key,
        }
    }

    /// Check if this field is a relationship
    pub fn is_relationship(&self) -> bool {
        matches!(self, Field::Relationship(_))
    }

    /// Get the scalar descriptor, if this is a scalar field
    pub fn as_scalar(&self) -> Option<&FieldDescriptor> {
        match self {
            Field::Scalar(f) => Some(f),
            Field::Relationship(_) => None,
        }
    }

    /// Get the relationship descriptor, if this is a relationship field
    pub fn as_relationship(&self) -> Option<&RelationshipDescriptor> {
        match self {
            Field::Scalar(_) => None,
            Field::Relationship(r) => Some(r),
        }
    }

    /// In-memory value type of this field
    ///
    /// Relationships have no direct value type; they imply structural columns
    /// instead, which the relationship resolver derives.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Field::Scalar(f) => Some(f.value_type()),
            Field::Relationship(_) => None,
        }
    }
}

impl From<FieldDescriptor> for Field {
    fn from(f: FieldDescriptor) -> Self {
        Field::Scalar(f)
    }
}

impl From<RelationshipDescriptor> for Field {
    fn from(r: RelationshipDescriptor) -> Self {
        Field::Relationship(r)
    }
}

impl Validatable for Field {
    fn validate(&self) -> EngineResult<()> {
        match self {
            Field::Scalar(f) => f.validate(),
            Field::Relationship(r) => r.validate(),
        }
    }
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// Represents a scalar field of a resource (maps to a database column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    /// Field key, also the column name
    pub key: String,

    /// Semantic type of the field
    #[serde(rename = "type", default)]
    pub semantic_type: SemanticType,

    /// Whether a value must be supplied
    #[serde(default)]
    pub required: bool,

    /// Whether the column accepts NULL even when required
    #[serde(default)]
    pub nullable: bool,

    /// Whether the field takes part in full-text style search
    #[serde(default)]
    pub searchable: bool,

    /// Whether lists can be ordered by this field
    #[serde(default)]
    pub sortable: bool,

    /// Whether lists can be filtered by this field
    #[serde(default)]
    pub filterable: bool,

    /// Maximum length for sized types (VARCHAR(n))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<u32>,

    /// Default value for the column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,

    /// Whether values must be unique across rows
    #[serde(default)]
    pub unique: bool,
}

impl FieldDescriptor {
    /// Create a new field with the given key and semantic type
    pub fn new(key: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            key: key.into(),
            semantic_type,
            required: false,
            nullable: false,
            searchable: false,
            sortable: false,
            filterable: false,
            size_hint: None,
            default_value: None,
            unique: false,
        }
    }

    /// Create a short-text field
    pub fn text(key: impl Into<String>) -> Self {
        Self::new(key, SemanticType::ShortText)
    }

    /// Create a long-text field
    pub fn textarea(key: impl Into<String>) -> Self {
        Self::new(key, SemanticType::LongText)
    }

    /// Create a number field
    pub fn number(key: impl Into<String>) -> Self {
        Self::new(key, SemanticType::Number)
    }

    /// Create a boolean field
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, SemanticType::Boolean)
    }

    /// Create a date-time field
    pub fn date_time(key: impl Into<String>) -> Self {
        Self::new(key, SemanticType::DateTime)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required (NOT NULL)
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow NULL even if the field is required
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the field as searchable (indexed)
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Mark the field as sortable (indexed)
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the field as filterable (indexed)
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the size hint for sized types
    pub fn with_size(mut self, size: u32) -> Self {
        self.size_hint = Some(size);
        self
    }

    /// Set a default value
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default_value = Some(default);
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Whether the column is declared NOT NULL
    pub fn is_not_null(&self) -> bool {
        self.required && !self.nullable
    }

    /// Whether the field needs a plain lookup index
    pub fn needs_index(&self) -> bool {
        self.searchable || self.sortable || self.filterable
    }

    /// In-memory value type (optional unless NOT NULL)
    pub fn value_type(&self) -> ValueType {
        self.semantic_type.value_type(!self.is_not_null())
    }
}

impl Validatable for FieldDescriptor {
    fn validate(&self) -> EngineResult<()> {
        if self.key.is_empty() {
            return Err(EngineError::config("Field key cannot be empty"));
        }

        if !is_valid_identifier(&self.key) {
            return Err(EngineError::config(format!(
                "Field key '{}' is not a valid column identifier",
                self.key
            )));
        }

        if self.size_hint == Some(0) {
            return Err(EngineError::config(format!(
                "Field '{}' has a zero size hint",
                self.key
            )));
        }

        Ok(())
    }
}

// ============================================================================
// DefaultValue
// ============================================================================

/// Default values for columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// String value
    String(String),
    /// Current timestamp
    Now,
    /// Custom SQL expression, emitted verbatim
    Expression(String),
    /// Empty JSON object
    EmptyObject,
}

impl DefaultValue {
    /// Convert to SQL representation
    pub fn to_sql(&self, dialect: Dialect) -> String {
        match self {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Bool(v) => match dialect {
                Dialect::Postgres => v.to_string().to_uppercase(),
                Dialect::MySql | Dialect::Sqlite => if *v { "1" } else { "0" }.to_string(),
            },
            DefaultValue::Int(v) => v.to_string(),
            DefaultValue::Float(v) => v.to_string(),
            DefaultValue::String(v) => format!("'{}'", v.replace('\'', "''")),
            DefaultValue::Now => match dialect {
                Dialect::Sqlite => "CURRENT_TIMESTAMP".to_string(),
                Dialect::Postgres | Dialect::MySql => "NOW()".to_string(),
            },
            DefaultValue::Expression(expr) => expr.clone(),
            DefaultValue::EmptyObject => match dialect {
                Dialect::MySql => "('{}')".to_string(),
                Dialect::Postgres | Dialect::Sqlite => "'{}'".to_string(),
            },
        }
    }

    /// Whether this default actually supplies a value for existing rows
    pub fn is_null(&self) -> bool {
        matches!(self, DefaultValue::Null)
    }

    /// Whether the rendered default is a literal rather than evaluated per row
    pub fn is_constant(&self) -> bool {
        !matches!(self, DefaultValue::Now | DefaultValue::Expression(_))
    }
}

impl std::fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Null => write!(f, "NULL"),
            DefaultValue::Bool(v) => write!(f, "{}", v),
            DefaultValue::Int(v) => write!(f, "{}", v),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::String(v) => write!(f, "\"{}\"", v),
            DefaultValue::Now => write!(f, "NOW()"),
            DefaultValue::Expression(v) => write!(f, "{}", v),
            DefaultValue::EmptyObject => write!(f, "{{}}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tablewright_core::ValueKind;

    #[test]
    fn test_field_builder() {
        let field = FieldDescriptor::text("email")
            .required()
            .unique()
            .searchable()
            .with_size(120);

        assert_eq!(field.key, "email");
        assert_eq!(field.semantic_type, SemanticType::ShortText);
        assert!(field.is_not_null());
        assert!(field.unique);
        assert!(field.needs_index());
        assert_eq!(field.size_hint, Some(120));
    }

    #[test]
    fn test_required_but_nullable_is_not_not_null() {
        let field = FieldDescriptor::number("score").required().nullable();
        assert!(!field.is_not_null());
        assert!(field.value_type().optional);
    }

    #[test]
    fn test_needs_index_flags() {
        assert!(!FieldDescriptor::text("a").needs_index());
        assert!(FieldDescriptor::text("a").sortable().needs_index());
        assert!(FieldDescriptor::text("a").filterable().needs_index());
        assert!(!FieldDescriptor::text("a").unique().needs_index());
    }

    #[test]
    fn test_value_type_of_field_variants() {
        let scalar: Field = FieldDescriptor::boolean("published").required().into();
        let vt = scalar.value_type().unwrap();
        assert_eq!(vt.kind, ValueKind::Boolean);
        assert!(!vt.optional);

        let rel: Field = RelationshipDescriptor::belongs_to("author", "users").into();
        assert!(rel.value_type().is_none());
        assert!(rel.is_relationship());
    }

    #[test]
    fn test_field_validation() {
        assert!(FieldDescriptor::text("title").is_valid());
        assert!(!FieldDescriptor::text("").is_valid());
        assert!(!FieldDescriptor::text("bad key").is_valid());
        assert!(!FieldDescriptor::text("title").with_size(0).is_valid());
    }

    #[test]
    fn test_default_value_sql() {
        assert_eq!(DefaultValue::Bool(true).to_sql(Dialect::Postgres), "TRUE");
        assert_eq!(DefaultValue::Bool(true).to_sql(Dialect::MySql), "1");
        assert_eq!(DefaultValue::Bool(false).to_sql(Dialect::Sqlite), "0");
        assert_eq!(
            DefaultValue::String("it's".into()).to_sql(Dialect::Postgres),
            "'it''s'"
        );
        assert_eq!(DefaultValue::Now.to_sql(Dialect::Sqlite), "CURRENT_TIMESTAMP");
        assert!(!DefaultValue::Now.is_constant());
        assert!(!DefaultValue::Expression("random()".into()).is_constant());
        assert!(DefaultValue::EmptyObject.is_constant());
        assert_eq!(DefaultValue::EmptyObject.to_sql(Dialect::MySql), "('{}')");
    }

    #[test]
    fn test_field_deserialize_untagged() {
        let scalar: Field =
            serde_json::from_str(r#"{"key": "title", "type": "short_text", "required": true}"#)
                .unwrap();
        assert!(matches!(scalar, Field::Scalar(ref f) if f.required));

        let rel: Field = serde_json::from_str(
            r#"{"key": "author", "relation": "belongs_to", "related": "users"}"#,
        )
        .unwrap();
        assert!(rel.is_relationship());
        assert_eq!(rel.key(), "author");
    }

    #[test]
    fn test_default_value_serde() {
        let json = serde_json::to_string(&DefaultValue::String("draft".into())).unwrap();
        assert_eq!(json, r#"{"type":"string","value":"draft"}"#);
        let parsed: DefaultValue = serde_json::from_str(r#"{"type":"now"}"#).unwrap();
        assert_eq!(parsed, DefaultValue::Now);
    }
}
