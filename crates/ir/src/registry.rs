//! Resource registry
//!
//! Registration happens in two phases. A [`ResourceRegistry`] collects
//! resources in registration order and validates each one on entry. Calling
//! [`ResourceRegistry::build`] then freezes the collection into an immutable
//! [`ResourceSet`] after every relationship's related slug has been resolved.
//! The engine only ever sees a `ResourceSet`.

use crate::field::Field;
use crate::relationship::RelationshipDescriptor;
use crate::resource::ResourceDescriptor;
use std::collections::HashMap;
use tablewright_core::{EngineError, EngineResult, RelationKind, Validatable};
use tracing::debug;

// ============================================================================
// ResourceRegistry
// ============================================================================

/// Collects resources before they are frozen into a [`ResourceSet`]
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDescriptor>,
    index: HashMap<String, usize>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource
    ///
    /// Fails on a duplicate slug or an invalid descriptor. Registration order
    /// is migration order.
    pub fn register(&mut self, resource: ResourceDescriptor) -> EngineResult<&mut Self> {
        if self.index.contains_key(&resource.slug) {
            return Err(EngineError::DuplicateResource(resource.slug));
        }
        resource.validate()?;

        debug!(slug = %resource.slug, fields = resource.fields.len(), "registered resource");
        self.index.insert(resource.slug.clone(), self.resources.len());
        self.resources.push(resource);
        Ok(self)
    }

    /// Register a resource, builder style
    pub fn with(mut self, resource: ResourceDescriptor) -> EngineResult<Self> {
        self.register(resource)?;
        Ok(self)
    }

    /// Register every resource in order
    pub fn extend(
        &mut self,
        resources: impl IntoIterator<Item = ResourceDescriptor>,
    ) -> EngineResult<&mut Self> {
        for resource in resources {
            self.register(resource)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resolve cross references and freeze the registry
    pub fn build(self) -> EngineResult<ResourceSet> {
        self.check_references()?;

        Ok(ResourceSet {
            resources: self.resources,
            index: self.index,
        })
    }

    /// Every related slug is registered and shared pivot tables agree
    fn check_references(&self) -> EngineResult<()> {
        let mut pivots: HashMap<&str, (&str, [&str; 2])> = HashMap::new();

        for resource in &self.resources {
            for rel in resource.relationships() {
                if rel.has_related_resource() && !self.index.contains_key(&rel.related_resource) {
                    return Err(EngineError::UnknownResource {
                        resource: resource.slug.clone(),
                        related: rel.related_resource.clone(),
                    });
                }

                if let Some((pivot, fk, rk)) = pivot_columns(rel) {
                    let mut columns = [fk, rk];
                    columns.sort_unstable();

                    match pivots.get(pivot) {
                        Some((first, existing)) if *existing != columns => {
                            return Err(EngineError::relationship(
                                &resource.slug,
                                &rel.key,
                                format!(
                                    "pivot table '{}' is declared by '{}' with columns ({}, {})",
                                    pivot, first, existing[0], existing[1]
                                ),
                            ));
                        }
                        Some(_) => {}
                        None => {
                            pivots.insert(pivot, (&resource.slug, columns));
                        }
                    }
                }
            }
        }

        debug!(resources = self.resources.len(), pivots = pivots.len(), "registry frozen");
        Ok(())
    }
}

fn pivot_columns(rel: &RelationshipDescriptor) -> Option<(&str, &str, &str)> {
    match rel.kind {
        RelationKind::BelongsToMany => rel.pivot_metadata(),
        _ => None,
    }
}

// ============================================================================
// ResourceSet
// ============================================================================

/// Immutable, ordered set of resources with resolved cross references
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    resources: Vec<ResourceDescriptor>,
    index: HashMap<String, usize>,
}

impl ResourceSet {
    /// Build a set from resources in order
    pub fn from_resources(
        resources: impl IntoIterator<Item = ResourceDescriptor>,
    ) -> EngineResult<Self> {
        let mut registry = ResourceRegistry::new();
        registry.extend(resources)?;
        registry.build()
    }

    /// Get a resource by slug
    pub fn get(&self, slug: &str) -> Option<&ResourceDescriptor> {
        self.index.get(slug).map(|&i| &self.resources[i])
    }

    /// Check if a slug is registered
    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    /// Resources in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceDescriptor> {
        self.resources.iter()
    }

    /// Slugs in registration order
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.slug.as_str())
    }

    /// The resource a relationship points at
    pub fn related(&self, relationship: &RelationshipDescriptor) -> Option<&ResourceDescriptor> {
        self.get(&relationship.related_resource)
    }

    /// Every relationship field across the set, with its owning resource
    pub fn all_relationships(
        &self,
    ) -> impl Iterator<Item = (&ResourceDescriptor, &RelationshipDescriptor)> {
        self.resources.iter().flat_map(|r| {
            r.fields.iter().filter_map(move |f| match f {
                Field::Relationship(rel) => Some((r, rel)),
                Field::Scalar(_) => None,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a ResourceDescriptor;
    type IntoIter = std::slice::Iter<'a, ResourceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
