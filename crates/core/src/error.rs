//! Error types for field-path access.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use thiserror::Error;

/// Core error type for unstructured resource access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Path errors
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // Shape errors
    #[error("field '{path}' is {found}, expected {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a wrong type error.
    pub fn wrong_type(path: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::WrongType {
            path: path.into(),
            expected,
            found,
        }
    }

    /// The field path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPath { path, .. } | Self::WrongType { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_type_display() {
        let err = Error::wrong_type("metadata", "object", "string");
        assert_eq!(err.to_string(), "field 'metadata' is string, expected object");
        assert_eq!(err.path(), "metadata");
    }

    #[test]
    fn test_invalid_path_display() {
        let err = Error::invalid_path("a..b", "empty segment");
        assert!(err.to_string().contains("a..b"));
        assert!(err.to_string().contains("empty segment"));
    }
}
