//! # Tablewright Core
//!
//! Core types, traits, and error handling for Tablewright.
//!
//! This crate provides the foundational building blocks shared by the
//! descriptor model, the migration engine and the CLI:
//!
//! - **Types**: semantic field types, SQL dialects, relationship kinds and the
//!   in-memory value types derived from semantic types
//! - **Traits**: `Validatable`
//! - **Errors**: unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::Validatable;
pub use types::{Dialect, RelationKind, SemanticType, ValueKind, ValueType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
