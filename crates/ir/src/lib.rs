//! # Tablewright IR (resource descriptors)
//!
//! This crate provides the declarative description of the resources whose
//! schema the engine keeps in sync.
//!
//! ## Core Concepts
//!
//! - **Resource**: a slug, an optional backing model and an ordered field list
//! - **Field**: either a scalar column (`FieldDescriptor`) or a relationship
//!   (`RelationshipDescriptor`)
//! - **Registry**: collects resources, then freezes them into an immutable
//!   `ResourceSet` with every cross reference resolved by slug
//!

// Module declarations
pub mod field;
pub mod registry;
pub mod relationship;
pub mod relationship_helpers;
pub mod resource;
pub mod serialization;

// Re-export commonly used types at crate root
pub use field::{DefaultValue, Field, FieldDescriptor};
pub use registry::{ResourceRegistry, ResourceSet};
pub use relationship::RelationshipDescriptor;
pub use relationship_helpers::{
    generate_fk_column_name, generate_polymorphic_columns, index_name, singularize,
};
pub use resource::{ModelHandle, ResourceDescriptor};
pub use serialization::{
    ResourceFile, ResourceFormat, load_resources, parse_resources, save_resources, to_json,
};

// Re-export core types that are commonly used with IR
pub use tablewright_core::{
    Dialect, EngineError, EngineResult, RelationKind, SemanticType, Validatable, ValueKind,
    ValueType,
};

/// Current schema version for resource definition files
pub const SCHEMA_VERSION: u32 = 1;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        DefaultValue, Dialect, EngineError, EngineResult, Field, FieldDescriptor, ModelHandle,
        RelationKind, RelationshipDescriptor, ResourceDescriptor, ResourceRegistry, ResourceSet,
        SemanticType,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
