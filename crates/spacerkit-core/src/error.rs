//! Error handling for SpacerKit
//!
//! Provides the error types raised while building programs:
//! - Generation errors (invalid part dimensions, table lookup misses)
//! - A unified error type for callers that mix generation with I/O
//!
//! Verification never produces these errors; it reports [`crate::Diagnostic`]
//! values instead. All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Generation error type
///
/// Raised by calculators and generators when the input cannot produce a safe
/// program. Generation stops at the first error and emits no partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// A part dimension violates an invariant or a required field is missing
    #[error("Invalid dimension '{field}': {reason}")]
    InvalidDimension {
        /// The offending field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A static table has no entry for the key and defines no fallback
    #[error("No {table} entry for '{key}'")]
    LookupMiss {
        /// The table that was consulted.
        table: String,
        /// The key that was absent.
        key: String,
    },
}

impl GenerationError {
    /// Shorthand for an [`GenerationError::InvalidDimension`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDimension {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`GenerationError::LookupMiss`].
    pub fn lookup_miss(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::LookupMiss {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Check if this is an invalid dimension error
    pub fn is_invalid_dimension(&self) -> bool {
        matches!(self, Self::InvalidDimension { .. })
    }

    /// Check if this is a lookup miss
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::LookupMiss { .. })
    }
}

/// Main error type for SpacerKit
///
/// A unified error type for APIs that combine generation with file access.
#[derive(Error, Debug)]
pub enum Error {
    /// Generation error
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a generation error
    pub fn is_generation_error(&self) -> bool {
        matches!(self, Error::Generation(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for calculators and generators
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::invalid("thickness", "must be > 0");
        assert_eq!(err.to_string(), "Invalid dimension 'thickness': must be > 0");

        let err = GenerationError::lookup_miss("P-code (L1)", "3.75");
        assert_eq!(err.to_string(), "No P-code (L1) entry for '3.75'");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GenerationError::invalid("cb", "too large").into();
        assert!(err.is_generation_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
