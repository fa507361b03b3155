//! Error types for Tablewright
//!
//! This module provides unified error handling across the engine: configuration
//! errors found while registering resources, DDL and catalog failures reported
//! by the live connection, and IO/serialization errors from loading resource
//! definitions.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Tablewright
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Relationship metadata is incomplete or inconsistent
    #[error("Invalid relationship '{resource}.{field}': {message}")]
    RelationshipConfig {
        resource: String,
        field: String,
        message: String,
    },

    /// Field validation failed
    #[error("Field validation failed for '{resource}.{field}': {message}")]
    FieldValidation {
        resource: String,
        field: String,
        message: String,
    },

    /// Resource validation failed
    #[error("Resource validation failed for '{resource}': {message}")]
    ResourceValidation { resource: String, message: String },

    /// Duplicate resource slug
    #[error("Duplicate resource slug: '{0}' is already registered")]
    DuplicateResource(String),

    /// Duplicate field key within a resource
    #[error("Duplicate field key: '{field}' already exists in resource '{resource}'")]
    DuplicateField { resource: String, field: String },

    /// A relationship points at a slug that was never registered
    #[error("Resource '{resource}' references unknown resource '{related}'")]
    UnknownResource { resource: String, related: String },

    /// A resource declares a backing model but no model migrator was supplied
    #[error("No model migrator registered for model '{0}'")]
    MissingModelMigrator(String),

    /// Database URL could not be understood
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabaseUrl(String),

    /// Schema version mismatch in a resource definition file
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// A DDL statement was rejected by the database
    #[error("DDL failed: {message}\n  Statement: {statement}")]
    Ddl { statement: String, message: String },

    /// A catalog introspection query failed
    #[error("Catalog query failed: {message}\n  Query: {query}")]
    Catalog { query: String, message: String },

    /// Raw driver error (connection loss, protocol error, ...)
    #[error("Database driver error: {0}")]
    Driver(String),

    /// The host ORM failed to converge a backing model
    #[error("Model migration failed for '{model}': {message}")]
    ModelMigration { model: String, message: String },

    /// Wraps the first failure of a resource with its slug
    #[error("Migration failed for resource '{slug}': {error}")]
    Resource {
        slug: String,
        error: Box<EngineError>,
    },

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Unrecognized resource file format
    #[error("Invalid resource file format: {0}")]
    InvalidFormat(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// Create a relationship configuration error
    pub fn relationship(
        resource: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::RelationshipConfig {
            resource: resource.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a field validation error
    pub fn field_validation(
        resource: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::FieldValidation {
            resource: resource.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a resource validation error
    pub fn resource_validation(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::ResourceValidation {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a DDL error for a rejected statement
    pub fn ddl(statement: impl Into<String>, err: impl std::fmt::Display) -> Self {
        EngineError::Ddl {
            statement: statement.into(),
            message: err.to_string(),
        }
    }

    /// Create a catalog query error
    pub fn catalog(query: impl Into<String>, err: impl std::fmt::Display) -> Self {
        EngineError::Catalog {
            query: query.into(),
            message: err.to_string(),
        }
    }

    /// Create a raw driver error
    pub fn driver(err: impl std::fmt::Display) -> Self {
        EngineError::Driver(err.to_string())
    }

    /// Create a model migration error
    pub fn model(model: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::ModelMigration {
            model: model.into(),
            message: msg.into(),
        }
    }

    /// Wrap an error with the slug of the resource being migrated
    pub fn in_resource(slug: impl Into<String>, err: EngineError) -> Self {
        EngineError::Resource {
            slug: slug.into(),
            error: Box::new(err),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Slug of the failing resource, if this error carries one
    pub fn resource_slug(&self) -> Option<&str> {
        match self {
            EngineError::Resource { slug, .. } => Some(slug),
            _ => None,
        }
    }

    /// The innermost error, skipping resource wrappers
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::Resource { error, .. } => error.root(),
            other => other,
        }
    }

    /// Check if this error is a configuration error (fatal, never retried)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root(),
            EngineError::InvalidConfig(_)
                | EngineError::RelationshipConfig { .. }
                | EngineError::FieldValidation { .. }
                | EngineError::ResourceValidation { .. }
                | EngineError::DuplicateResource(_)
                | EngineError::DuplicateField { .. }
                | EngineError::UnknownResource { .. }
                | EngineError::MissingModelMigrator(_)
                | EngineError::UnsupportedDatabaseUrl(_)
                | EngineError::SchemaVersionMismatch { .. }
        )
    }

    /// Check if this error came from the database while applying schema
    pub fn is_ddl(&self) -> bool {
        matches!(
            self.root(),
            EngineError::Ddl { .. }
                | EngineError::Catalog { .. }
                | EngineError::Driver(_)
                | EngineError::ModelMigration { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), EngineError::UnknownResource { .. })
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
