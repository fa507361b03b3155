//! Core traits for Tablewright
//!
//! Descriptors implement [`Validatable`] so registration can reject broken
//! configuration before any DDL is sent to the database.

use crate::error::EngineResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use tablewright_core::{EngineError, EngineResult, Validatable};
///
/// struct Slug(String);
///
/// impl Validatable for Slug {
///     fn validate(&self) -> EngineResult<()> {
///         if self.0.is_empty() {
///             return Err(EngineError::config("slug cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    struct NonEmpty(&'static str);

    impl Validatable for NonEmpty {
        fn validate(&self) -> EngineResult<()> {
            if self.0.is_empty() {
                return Err(EngineError::config("value cannot be empty"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(NonEmpty("posts").is_valid());
        assert!(!NonEmpty("").is_valid());
    }

    #[test]
    fn test_validation_errors() {
        assert!(NonEmpty("posts").validation_errors().is_empty());
        assert_eq!(
            NonEmpty("").validation_errors(),
            vec!["Invalid configuration: value cannot be empty".to_string()]
        );
    }
}
