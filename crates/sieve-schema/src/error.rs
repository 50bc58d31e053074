//! # Schema Errors
//!
//! Two error types with different lifetimes:
//!
//! - [`SchemaError`] is raised once, by [`Schema::compile`](crate::Schema::compile),
//!   when a definition is malformed. It is a programmer error.
//! - [`Error`] is the outcome of [`Schema::validate`](crate::Schema::validate):
//!   either the input was invalid, or a user callable failed in a way that
//!   is not a validation outcome at all.

use sieve_core::{Invalid, ValidationError};
use thiserror::Error;

/// Boxed error raised by user callables.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error while compiling a schema definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A container value was used where a scalar literal is required.
    #[error("unsupported literal '{0}': literal schemas must be scalar values")]
    UnsupportedLiteral(String),

    /// Two mapping entries claim the same key.
    #[error("duplicate mapping key: {0}")]
    DuplicateKey(String),

    /// A value-position marker was used as a mapping key schema.
    #[error("marker {0} cannot be used as a key schema")]
    MarkerAsKey(String),

    /// A key-only marker was used in value position.
    #[error("marker {0} cannot be used as a value schema")]
    ValueMarker(String),

    /// An option value outside the recognized set.
    #[error("unknown {option} policy '{value}'")]
    UnknownPolicy {
        /// Option name.
        option: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Options document could not be parsed.
    #[error("options load error: {0}")]
    OptionsLoad(String),
}

/// Error returned by validation.
#[derive(Error, Debug)]
pub enum Error {
    /// The input does not conform to the schema.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A callable raised a fault outside the converted allow-list.
    #[error("fatal fault in {callable}: {source}")]
    Fatal {
        /// Diagnostic name of the callable.
        callable: String,
        /// The fault it raised.
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Returns the validation failure, if this is one.
    pub fn as_invalid(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid(e) => Some(e),
            Self::Fatal { .. } => None,
        }
    }

    /// Consumes self and returns the validation failure, if this is one.
    pub fn into_invalid(self) -> Option<ValidationError> {
        match self {
            Self::Invalid(e) => Some(e),
            Self::Fatal { .. } => None,
        }
    }

    /// Returns true for faults that escaped validation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

impl From<Invalid> for Error {
    fn from(e: Invalid) -> Self {
        Self::Invalid(ValidationError::Single(e))
    }
}
