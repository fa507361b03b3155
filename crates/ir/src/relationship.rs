//! Relationship definitions between resources
//!
//! This module contains the `RelationshipDescriptor` struct, the declarative
//! side of a relationship field. Which schema objects a descriptor implies is
//! decided by the engine's relationship resolver.

use crate::relationship_helpers::is_valid_identifier;
use serde::{Deserialize, Serialize};
use tablewright_core::{EngineError, EngineResult, RelationKind, Validatable};

// ============================================================================
// RelationshipDescriptor
// ============================================================================

/// Represents a relationship field of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipDescriptor {
    /// Field key (unique within the owning resource)
    pub key: String,

    /// Kind of relationship
    #[serde(rename = "relation")]
    pub kind: RelationKind,

    /// Slug of the related resource (empty for polymorphic-to)
    #[serde(rename = "related", default)]
    pub related_resource: String,

    /// Foreign key column; derived from the related slug when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Pivot table name (belongs-to-many only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_table: Option<String>,

    /// Pivot column pointing at the related resource (belongs-to-many only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_key: Option<String>,

    /// Column on the related table the foreign key refers to (usually "id")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,

    /// Whether the relationship is required (NOT NULL foreign key)
    #[serde(default)]
    pub required: bool,
}

impl RelationshipDescriptor {
    /// Create a new relationship descriptor
    pub fn new(
        key: impl Into<String>,
        kind: RelationKind,
        related_resource: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            related_resource: related_resource.into(),
            foreign_key: None,
            pivot_table: None,
            related_key: None,
            owner_key: None,
            required: false,
        }
    }

    /// Create a belongs-to relationship
    pub fn belongs_to(key: impl Into<String>, related: impl Into<String>) -> Self {
        Self::new(key, RelationKind::BelongsTo, related)
    }

    /// Create a has-one relationship
    pub fn has_one(key: impl Into<String>, related: impl Into<String>) -> Self {
        Self::new(key, RelationKind::HasOne, related)
    }

    /// Create a has-many relationship
    pub fn has_many(key: impl Into<String>, related: impl Into<String>) -> Self {
        Self::new(key, RelationKind::HasMany, related)
    }

    /// Create a belongs-to-many relationship through a pivot table
    pub fn belongs_to_many(
        key: impl Into<String>,
        related: impl Into<String>,
        pivot_table: impl Into<String>,
        foreign_key: impl Into<String>,
        related_key: impl Into<String>,
    ) -> Self {
        Self::new(key, RelationKind::BelongsToMany, related).with_pivot(
            pivot_table,
            foreign_key,
            related_key,
        )
    }

    /// Create a polymorphic-to relationship (`{key}_id` + `{key}_type`)
    pub fn polymorphic_to(key: impl Into<String>) -> Self {
        Self::new(key, RelationKind::PolymorphicTo, String::new())
    }

    /// Create a polymorphic-one relationship (inverse side)
    pub fn polymorphic_one(key: impl Into<String>, related: impl Into<String>) -> Self {
        Self::new(key, RelationKind::PolymorphicOne, related)
    }

    /// Create a polymorphic-many relationship (inverse side)
    pub fn polymorphic_many(key: impl Into<String>, related: impl Into<String>) -> Self {
        Self::new(key, RelationKind::PolymorphicMany, related)
    }

    /// Create a polymorphic-to-many relationship
    pub fn polymorphic_to_many(key: impl Into<String>, related: impl Into<String>) -> Self {
        Self::new(key, RelationKind::PolymorphicToMany, related)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set an explicit foreign key column
    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Set the referenced column on the related table
    pub fn with_owner_key(mut self, column: impl Into<String>) -> Self {
        self.owner_key = Some(column.into());
        self
    }

    /// Set pivot table metadata
    pub fn with_pivot(
        mut self,
        pivot_table: impl Into<String>,
        foreign_key: impl Into<String>,
        related_key: impl Into<String>,
    ) -> Self {
        self.pivot_table = Some(pivot_table.into());
        self.foreign_key = Some(foreign_key.into());
        self.related_key = Some(related_key.into());
        self
    }

    /// Mark as required (NOT NULL foreign key)
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Pivot table, owner column and related column, when all are present
    pub fn pivot_metadata(&self) -> Option<(&str, &str, &str)> {
        match (&self.pivot_table, &self.foreign_key, &self.related_key) {
            (Some(pivot), Some(fk), Some(rk)) => Some((pivot, fk, rk)),
            _ => None,
        }
    }

    /// Referenced column on the related table
    pub fn owner_key_or_default(&self) -> &str {
        self.owner_key.as_deref().unwrap_or("id")
    }

    /// Whether the descriptor names a related resource
    pub fn has_related_resource(&self) -> bool {
        !self.related_resource.is_empty()
    }

    /// Check the descriptor, naming `resource` in any error
    pub fn check(&self, resource: &str) -> EngineResult<()> {
        let fail = |msg: String| Err(EngineError::relationship(resource, &self.key, msg));

        if self.key.is_empty() {
            return fail("relationship key cannot be empty".to_string());
        }
        if !is_valid_identifier(&self.key) {
            return fail(format!("'{}' is not a valid identifier", self.key));
        }
        if self.kind != RelationKind::PolymorphicTo && !self.has_related_resource() {
            return fail(format!("{} requires a related resource", self.kind));
        }

        if self.kind == RelationKind::BelongsToMany {
            let missing: Vec<&str> = [
                ("pivot_table", &self.pivot_table),
                ("foreign_key", &self.foreign_key),
                ("related_key", &self.related_key),
            ]
            .iter()
            .filter(|(_, v)| v.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| *name)
            .collect();

            if !missing.is_empty() {
                return fail(format!(
                    "belongs-to-many requires {}",
                    missing.join(", ")
                ));
            }
        }

        for column in [&self.foreign_key, &self.related_key, &self.pivot_table]
            .into_iter()
            .flatten()
        {
            if !is_valid_identifier(column) {
                return fail(format!("'{}' is not a valid identifier", column));
            }
        }

        Ok(())
    }
}

impl Validatable for RelationshipDescriptor {
    fn validate(&self) -> EngineResult<()> {
        self.check("(unregistered)")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belongs_to_many_metadata() {
        let rel = RelationshipDescriptor::belongs_to_many(
            "roles",
            "roles",
            "user_roles",
            "user_id",
            "role_id",
        );
        assert_eq!(rel.pivot_metadata(), Some(("user_roles", "user_id", "role_id")));
        assert!(rel.is_valid());
    }

    #[test]
    fn test_belongs_to_many_missing_pivot_is_config_error() {
        let rel = RelationshipDescriptor::new("tags", RelationKind::BelongsToMany, "tags")
            .with_foreign_key("post_id");
        let err = rel.check("posts").unwrap_err();

        assert!(err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("posts.tags"));
        assert!(msg.contains("pivot_table"));
        assert!(msg.contains("related_key"));
        assert!(!msg.contains("foreign_key"));
    }

    #[test]
    fn test_polymorphic_to_needs_no_related() {
        let rel = RelationshipDescriptor::polymorphic_to("commentable");
        assert!(rel.is_valid());
        assert!(!rel.has_related_resource());
    }

    #[test]
    fn test_belongs_to_requires_related() {
        let rel = RelationshipDescriptor::belongs_to("owner", "");
        assert!(!rel.is_valid());
    }

    #[test]
    fn test_owner_key_default() {
        let rel = RelationshipDescriptor::belongs_to("author", "users");
        assert_eq!(rel.owner_key_or_default(), "id");
        let rel = rel.with_owner_key("uuid");
        assert_eq!(rel.owner_key_or_default(), "uuid");
    }

    #[test]
    fn test_invalid_foreign_key_identifier() {
        let rel = RelationshipDescriptor::belongs_to("author", "users").with_foreign_key("drop table");
        assert!(!rel.is_valid());
    }

    #[test]
    fn test_deserialize_relationship() {
        let rel: RelationshipDescriptor = serde_json::from_str(
            r#"{
                "key": "tags",
                "relation": "belongs_to_many",
                "related": "tags",
                "pivot_table": "post_tags",
                "foreign_key": "post_id",
                "related_key": "tag_id"
            }"#,
        )
        .unwrap();
        assert_eq!(rel.kind, RelationKind::BelongsToMany);
        assert_eq!(rel.pivot_metadata(), Some(("post_tags", "post_id", "tag_id")));
    }
}
