//! Error types for the encryption function.

use thiserror::Error;

use crate::types::Stage;

/// Result type alias for function operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Function error types.
///
/// `Decode`, `Validation` and `Encode` are fatal: they are reported to the
/// host as a fatal result. `DeadlineExceeded` aborts the invocation without a
/// response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The observed composite cannot be reshaped into a typed view.
    #[error("cannot decode composite resource: {reason}")]
    Decode { reason: String },

    /// A required composite field is missing or empty.
    #[error("invalid composite resource: missing required field {field}")]
    Validation { field: String },

    /// Desired state cannot be written back into the transport format.
    #[error("cannot encode desired state: {reason}")]
    Encode { reason: String },

    /// The caller's deadline passed before the stage could start.
    #[error("deadline exceeded before stage '{stage}'")]
    DeadlineExceeded { stage: Stage },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl Error {
    /// Create a decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create a validation error naming the missing field.
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Create a deadline exceeded error.
    pub const fn deadline_exceeded(stage: Stage) -> Self {
        Self::DeadlineExceeded { stage }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
