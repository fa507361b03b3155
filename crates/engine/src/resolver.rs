//! Relationship resolver
//!
//! Translates a relationship descriptor into the schema artifact it implies
//! on the owning side.
//!
//! | kind | effect |
//! |---|---|
//! | belongs-to | foreign key column (`{singular(related)}_id` unless given) |
//! | belongs-to-many | pivot table with a composite primary key |
//! | polymorphic-to | `{key}_id` and `{key}_type` columns |
//! | has-one, has-many, polymorphic-one/-many/-to-many | nothing |

use tablewright_core::{EngineError, EngineResult, RelationKind};
use tablewright_ir::{
    RelationshipDescriptor, ResourceDescriptor, generate_fk_column_name,
    generate_polymorphic_columns,
};
use tracing::debug;

/// Schema artifact implied by one relationship field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEffect {
    /// A foreign key column on the owning table
    AddForeignKeyColumn {
        column: String,
        indexed: bool,
        not_null: bool,
    },
    /// A two-column pivot table shared by both sides
    CreatePivotTable {
        name: String,
        owner_column: String,
        related_column: String,
    },
    /// Id and type discriminator columns on the owning table
    AddPolymorphicColumns {
        id_column: String,
        type_column: String,
        indexed: bool,
    },
    /// Inverse side; the related table carries the schema
    NoDirectEffect,
}

impl SchemaEffect {
    /// Columns this effect adds to the owning table
    pub fn owned_columns(&self) -> Vec<&str> {
        match self {
            SchemaEffect::AddForeignKeyColumn { column, .. } => vec![column.as_str()],
            SchemaEffect::AddPolymorphicColumns {
                id_column,
                type_column,
                ..
            } => vec![id_column.as_str(), type_column.as_str()],
            SchemaEffect::CreatePivotTable { .. } | SchemaEffect::NoDirectEffect => Vec::new(),
        }
    }
}

/// Resolve the schema effect of a relationship declared on `resource`
pub fn resolve(
    resource: &ResourceDescriptor,
    relationship: &RelationshipDescriptor,
) -> EngineResult<SchemaEffect> {
    let effect = match relationship.kind {
        RelationKind::BelongsTo => SchemaEffect::AddForeignKeyColumn {
            column: relationship
                .foreign_key
                .clone()
                .unwrap_or_else(|| generate_fk_column_name(&relationship.related_resource)),
            indexed: true,
            not_null: relationship.required,
        },

        RelationKind::BelongsToMany => {
            let (name, owner, related) = relationship.pivot_metadata().ok_or_else(|| {
                EngineError::relationship(
                    &resource.slug,
                    &relationship.key,
                    "belongs-to-many requires pivot_table, foreign_key and related_key",
                )
            })?;
            SchemaEffect::CreatePivotTable {
                name: name.to_string(),
                owner_column: owner.to_string(),
                related_column: related.to_string(),
            }
        }

        RelationKind::PolymorphicTo => {
            let (id_column, type_column) = generate_polymorphic_columns(&relationship.key);
            SchemaEffect::AddPolymorphicColumns {
                id_column,
                type_column,
                indexed: true,
            }
        }

        RelationKind::PolymorphicToMany => {
            debug!(
                resource = %resource.slug,
                field = %relationship.key,
                "polymorphic-to-many has no direct schema effect"
            );
            SchemaEffect::NoDirectEffect
        }

        RelationKind::HasOne
        | RelationKind::HasMany
        | RelationKind::PolymorphicOne
        | RelationKind::PolymorphicMany => SchemaEffect::NoDirectEffect,
    };

    Ok(effect)
}
