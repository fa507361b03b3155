//! Resource definitions
//!
//! This module contains the `ResourceDescriptor` struct: a slug, an optional
//! backing model and the ordered field list whose schema the engine keeps in
//! sync.

use crate::field::{Field, FieldDescriptor};
use crate::relationship::RelationshipDescriptor;
use crate::relationship_helpers::is_valid_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tablewright_core::{EngineError, EngineResult, Validatable};

// ============================================================================
// ModelHandle
// ============================================================================

/// Handle to a backing data-model type owned by an external ORM
///
/// When present the resource's schema is migrated by the registered model
/// migrator instead of the table synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelHandle {
    /// Model name, used to look up its migrator
    pub name: String,

    /// Table the model is stored in (defaults to the resource slug)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ModelHandle {
    /// Create a handle for a named model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
        }
    }

    /// Set the model's table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

// ============================================================================
// ResourceDescriptor
// ============================================================================

/// Represents a resource (maps to a database table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDescriptor {
    /// Globally unique slug; the table name when there is no model
    pub slug: String,

    /// Optional backing model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelHandle>,

    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl ResourceDescriptor {
    /// Create a new resource with no fields
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            model: None,
            fields: Vec::new(),
        }
    }

    /// Attach a backing model
    pub fn with_model(mut self, model: ModelHandle) -> Self {
        self.model = Some(model);
        self
    }

    /// Add a scalar field
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(Field::Scalar(field));
        self
    }

    /// Add a relationship field
    pub fn relationship(mut self, relationship: RelationshipDescriptor) -> Self {
        self.fields.push(Field::Relationship(relationship));
        self
    }

    /// Add any field
    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        self.fields.push(field.into());
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Table this resource's rows live in
    pub fn table_name(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.table.as_deref())
            .unwrap_or(&self.slug)
    }

    /// Whether the resource is migrated through a backing model
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Scalar fields in declaration order
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter_map(Field::as_scalar)
    }

    /// Relationship fields in declaration order
    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipDescriptor> {
        self.fields.iter().filter_map(Field::as_relationship)
    }

    /// Get a field by key
    pub fn get_field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Check if a field with the given key exists
    pub fn has_field(&self, key: &str) -> bool {
        self.get_field(key).is_some()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl Validatable for ResourceDescriptor {
    fn validate(&self) -> EngineResult<()> {
        if self.slug.is_empty() {
            return Err(EngineError::config("Resource slug cannot be empty"));
        }

        if !is_valid_identifier(self.table_name()) {
            return Err(EngineError::resource_validation(
                &self.slug,
                format!("'{}' is not a valid table name", self.table_name()),
            ));
        }

        if self.model.as_ref().is_some_and(|m| m.name.is_empty()) {
            return Err(EngineError::resource_validation(
                &self.slug,
                "model name cannot be empty",
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key()) {
                return Err(EngineError::DuplicateField {
                    resource: self.slug.clone(),
                    field: field.key().to_string(),
                });
            }

            match field {
                Field::Scalar(f) => f.validate().map_err(|e| {
                    EngineError::field_validation(&self.slug, &f.key, e.to_string())
                })?,
                Field::Relationship(r) => r.check(&self.slug)?,
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tablewright_core::SemanticType;

    fn posts() -> ResourceDescriptor {
        ResourceDescriptor::new("posts")
            .field(FieldDescriptor::text("title").required().searchable())
            .field(FieldDescriptor::new("body", SemanticType::RichText))
            .relationship(RelationshipDescriptor::belongs_to("author", "users"))
            .relationship(RelationshipDescriptor::belongs_to_many(
                "tags",
                "tags",
                "post_tags",
                "post_id",
                "tag_id",
            ))
    }

    #[test]
    fn test_field_partition_keeps_order() {
        let resource = posts();
        let scalars: Vec<_> = resource.scalar_fields().map(|f| f.key.as_str()).collect();
        let rels: Vec<_> = resource.relationships().map(|r| r.key.as_str()).collect();

        assert_eq!(scalars, vec!["title", "body"]);
        assert_eq!(rels, vec!["author", "tags"]);
        assert_eq!(resource.field_count(), 4);
    }

    #[test]
    fn test_table_name() {
        assert_eq!(posts().table_name(), "posts");

        let modeled = ResourceDescriptor::new("articles")
            .with_model(ModelHandle::new("Article").with_table("blog_articles"));
        assert_eq!(modeled.table_name(), "blog_articles");
        assert!(modeled.has_model());

        let default_table = ResourceDescriptor::new("articles").with_model(ModelHandle::new("Article"));
        assert_eq!(default_table.table_name(), "articles");
    }

    #[test]
    fn test_get_field() {
        let resource = posts();
        assert!(resource.has_field("title"));
        assert!(!resource.has_field("missing"));
        assert!(resource.get_field("author").unwrap().is_relationship());
    }

    #[test]
    fn test_valid_resource() {
        assert!(posts().is_valid());
    }

    #[test]
    fn test_duplicate_field_key() {
        let resource = posts().field(FieldDescriptor::text("title"));
        let err = resource.validate().unwrap_err();
        assert!(matches!(err, EngineError::DuplicateField { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_invalid_field_names_resource() {
        let resource = ResourceDescriptor::new("posts").field(FieldDescriptor::text("bad key"));
        let err = resource.validate().unwrap_err();
        assert!(
            matches!(err, EngineError::FieldValidation { ref resource, ref field, .. } if resource == "posts" && field == "bad key")
        );
    }

    #[test]
    fn test_invalid_relationship_names_resource() {
        let resource = ResourceDescriptor::new("posts").relationship(
            RelationshipDescriptor::new("tags", tablewright_core::RelationKind::BelongsToMany, "tags"),
        );
        let err = resource.validate().unwrap_err();
        assert!(err.to_string().contains("posts.tags"));
    }

    #[test]
    fn test_invalid_slug() {
        assert!(!ResourceDescriptor::new("").is_valid());
        assert!(!ResourceDescriptor::new("blog posts").is_valid());
    }

    #[test]
    fn test_deserialize_resource() {
        let json = r#"{
            "slug": "tags",
            "fields": [
                {"key": "name", "type": "short_text", "required": true, "unique": true},
                {"key": "posts", "relation": "belongs_to_many", "related": "posts",
                 "pivot_table": "post_tags", "foreign_key": "tag_id", "related_key": "post_id"}
            ]
        }"#;
        let resource: ResourceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(resource.slug, "tags");
        assert_eq!(resource.scalar_fields().count(), 1);
        assert_eq!(resource.relationships().count(), 1);
        assert!(resource.is_valid());
    }
}
