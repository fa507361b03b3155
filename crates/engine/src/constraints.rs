//! Constraint planner
//!
//! Decides which indexes a field needs and creates the ones the catalog does
//! not already have. Relationship fields go through the resolver first:
//!
//! - searchable / sortable / filterable scalar: plain index
//! - unique scalar: unique index
//! - foreign key column: plain index
//! - polymorphic columns: one plain index each
//! - pivot table: created once, then a plain index on each column
//!
//! Index names are deterministic (`idx_{table}_{column}`,
//! `uniq_{table}_{column}`), so an index created by hand under the same name
//! is taken as already present. Index names share one namespace per schema,
//! so [`check_index_names`] rejects a resource set in which two different
//! columns map to the same name, or a name the dialect would truncate.

use crate::catalog::Catalog;
use crate::dialect::SqlDialect;
use crate::resolver::{SchemaEffect, resolve};
use std::collections::HashMap;
use tablewright_core::{EngineError, EngineResult};
use tablewright_ir::{Field, FieldDescriptor, ResourceDescriptor, ResourceSet, index_name};
use tracing::debug;

// ============================================================================
// IndexSpec
// ============================================================================

/// A single-column index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexSpec {
    pub table: String,
    pub column: String,
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(table: impl Into<String>, column: impl Into<String>, unique: bool) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            unique,
        }
    }

    /// `idx_{table}_{column}` or `uniq_{table}_{column}`
    pub fn name(&self) -> String {
        index_name(&self.table, &self.column, self.unique)
    }
}

/// Indexes a scalar field asks for
pub fn field_indexes(table: &str, field: &FieldDescriptor) -> Vec<IndexSpec> {
    let mut specs = Vec::new();
    if field.needs_index() {
        specs.push(IndexSpec::new(table, &field.key, false));
    }
    if field.unique {
        specs.push(IndexSpec::new(table, &field.key, true));
    }
    specs
}

/// Indexes a relationship effect asks for on the owning table
pub fn effect_indexes(table: &str, effect: &SchemaEffect) -> Vec<IndexSpec> {
    match effect {
        SchemaEffect::AddForeignKeyColumn {
            column,
            indexed: true,
            ..
        } => vec![IndexSpec::new(table, column, false)],
        SchemaEffect::AddPolymorphicColumns {
            id_column,
            type_column,
            indexed: true,
        } => vec![
            IndexSpec::new(table, id_column, false),
            IndexSpec::new(table, type_column, false),
        ],
        SchemaEffect::CreatePivotTable {
            name,
            owner_column,
            related_column,
        } => vec![
            IndexSpec::new(name, owner_column, false),
            IndexSpec::new(name, related_column, false),
        ],
        _ => Vec::new(),
    }
}

/// Every index the fields of a resource ask for, pivot table indexes included
pub fn resource_indexes(resource: &ResourceDescriptor) -> EngineResult<Vec<IndexSpec>> {
    let table = resource.table_name();
    let mut specs = Vec::new();
    for field in &resource.fields {
        match field {
            Field::Scalar(scalar) => specs.extend(field_indexes(table, scalar)),
            Field::Relationship(relationship) => {
                specs.extend(effect_indexes(table, &resolve(resource, relationship)?));
            }
        }
    }
    Ok(specs)
}

/// Check that index names are unique per schema and fit the dialect
///
/// The same index requested twice (a pivot table declared from both sides)
/// is fine; two different columns sharing a name are not.
pub fn check_index_names(resources: &ResourceSet, dialect: &dyn SqlDialect) -> EngineResult<()> {
    let mut seen: HashMap<String, (IndexSpec, &str)> = HashMap::new();

    for resource in resources {
        for spec in resource_indexes(resource)? {
            let name = spec.name();

            if let Some(limit) = dialect.max_identifier_length().filter(|&l| name.len() > l) {
                return Err(EngineError::resource_validation(
                    &resource.slug,
                    format!(
                        "index name '{}' is longer than the {} characters {} allows",
                        name,
                        limit,
                        dialect.name()
                    ),
                ));
            }

            match seen.get(&name) {
                Some((other, owner)) if *other != spec => {
                    return Err(EngineError::resource_validation(
                        &resource.slug,
                        format!(
                            "index '{}' on {}.{} has the same name as the index on {}.{} from '{}'",
                            name, spec.table, spec.column, other.table, other.column, owner
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    seen.insert(name, (spec, resource.slug.as_str()));
                }
            }
        }
    }

    debug!(indexes = seen.len(), "index names checked");
    Ok(())
}

// ============================================================================
// ConstraintPlanner
// ============================================================================

/// Applies the index and pivot-table requirements of a resource's fields
pub struct ConstraintPlanner<'a, 'c> {
    catalog: &'a mut Catalog<'c>,
}

impl<'a, 'c> ConstraintPlanner<'a, 'c> {
    pub fn new(catalog: &'a mut Catalog<'c>) -> Self {
        Self { catalog }
    }

    /// Apply every field of a resource, in field order
    pub fn apply_resource(&mut self, resource: &ResourceDescriptor) -> EngineResult<()> {
        for field in &resource.fields {
            self.apply_field(resource, field)?;
        }
        Ok(())
    }

    /// Apply the requirements of one field
    pub fn apply_field(&mut self, resource: &ResourceDescriptor, field: &Field) -> EngineResult<()> {
        let table = resource.table_name();

        let specs = match field {
            Field::Scalar(scalar) => field_indexes(table, scalar),
            Field::Relationship(relationship) => {
                let effect = resolve(resource, relationship)?;
                if let SchemaEffect::CreatePivotTable {
                    name,
                    owner_column,
                    related_column,
                } = &effect
                {
                    self.ensure_pivot_table(name, owner_column, related_column)?;
                }
                effect_indexes(table, &effect)
            }
        };

        for spec in &specs {
            self.ensure_index(spec)?;
        }
        Ok(())
    }

    /// Create an index unless the catalog already has it
    ///
    /// Returns whether it was created.
    pub fn ensure_index(&mut self, spec: &IndexSpec) -> EngineResult<bool> {
        let name = spec.name();
        if self.catalog.index_exists(&spec.table, &name)? {
            debug!(index = %name, "index exists");
            return Ok(false);
        }
        self.catalog.create_index(spec)?;
        Ok(true)
    }

    /// Create a pivot table unless the catalog already has it
    ///
    /// Returns whether it was created.
    pub fn ensure_pivot_table(
        &mut self,
        name: &str,
        owner_column: &str,
        related_column: &str,
    ) -> EngineResult<bool> {
        if self.catalog.table_exists(name)? {
            debug!(pivot = name, "pivot table exists");
            return Ok(false);
        }
        let sql = self
            .catalog
            .dialect()
            .create_pivot_table_sql(name, owner_column, related_column);
        self.catalog.create_pivot_table(
            name,
            vec![owner_column.to_string(), related_column.to_string()],
            &sql,
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PostgresDialect, SqliteDialect};
    use pretty_assertions::assert_eq;
    use tablewright_ir::RelationshipDescriptor;

    #[test]
    fn test_index_names() {
        assert_eq!(IndexSpec::new("tags", "name", true).name(), "uniq_tags_name");
        assert_eq!(IndexSpec::new("posts", "title", false).name(), "idx_posts_title");
    }

    #[test]
    fn test_field_indexes() {
        let field = FieldDescriptor::text("email").unique().searchable();
        assert_eq!(
            field_indexes("users", &field),
            vec![
                IndexSpec::new("users", "email", false),
                IndexSpec::new("users", "email", true),
            ]
        );
        assert!(field_indexes("users", &FieldDescriptor::text("bio")).is_empty());
    }

    #[test]
    fn test_colliding_index_names_rejected() {
        let set = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("user").field(FieldDescriptor::text("roles_name").sortable()),
            ResourceDescriptor::new("user_roles").field(FieldDescriptor::text("name").sortable()),
        ])
        .unwrap();

        let err = check_index_names(&set, &SqliteDialect).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("idx_user_roles_name"));
        assert!(err.to_string().contains("'user_roles'"));
    }

    #[test]
    fn test_shared_pivot_indexes_are_not_collisions() {
        let set = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("users").relationship(RelationshipDescriptor::belongs_to_many(
                "roles", "roles", "user_roles", "user_id", "role_id",
            )),
            ResourceDescriptor::new("roles").relationship(RelationshipDescriptor::belongs_to_many(
                "users", "users", "user_roles", "role_id", "user_id",
            )),
        ])
        .unwrap();

        assert!(check_index_names(&set, &PostgresDialect).is_ok());
        assert_eq!(resource_indexes(set.get("users").unwrap()).unwrap().len(), 2);
    }

    #[test]
    fn test_index_name_length_limit() {
        let column = "a_rather_long_column_name_for_an_index";
        let set = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("subscription_plans").field(FieldDescriptor::text(column).filterable()),
        ])
        .unwrap();

        // idx_subscription_plans_a_rather_long_column_name_for_an_index
        assert!(check_index_names(&set, &PostgresDialect).is_ok());

        let longer = ResourceSet::from_resources(vec![
            ResourceDescriptor::new("subscription_plan_items")
                .field(FieldDescriptor::text(column).filterable()),
        ])
        .unwrap();
        let err = check_index_names(&longer, &PostgresDialect).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("63"));
        assert!(check_index_names(&longer, &SqliteDialect).is_ok());
    }

    #[test]
    fn test_effect_indexes() {
        let resource = ResourceDescriptor::new("comments");
        let poly = resolve(&resource, &RelationshipDescriptor::polymorphic_to("commentable")).unwrap();
        assert_eq!(
            effect_indexes("comments", &poly)
                .iter()
                .map(IndexSpec::name)
                .collect::<Vec<_>>(),
            vec!["idx_comments_commentable_id", "idx_comments_commentable_type"]
        );

        let pivot = resolve(
            &resource,
            &RelationshipDescriptor::belongs_to_many("tags", "tags", "comment_tags", "comment_id", "tag_id"),
        )
        .unwrap();
        assert!(effect_indexes("comments", &pivot).iter().all(|s| s.table == "comment_tags"));

        assert!(effect_indexes("comments", &SchemaEffect::NoDirectEffect).is_empty());
    }
}
