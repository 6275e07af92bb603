//! Error types for the schema coder

use std::fmt;

use thiserror::Error;

use crate::wire::SchemaId;

/// Result type for coder operations
pub type Result<T> = std::result::Result<T, CoderError>;

/// Which registry call the write path attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOperation {
    /// Register the schema, creating an entry if needed
    Register,
    /// Look up an existing id without creating one
    Lookup,
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryOperation::Register => write!(f, "register schema in registry"),
            RegistryOperation::Lookup => write!(f, "retrieve schema id from registry"),
        }
    }
}

/// Failures reported by a registry gateway implementation
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Schema not found under subject {subject}")]
    SchemaNotFound { subject: String },

    #[error("No schema registered with id {0}")]
    IdNotFound(SchemaId),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Registry conflict: {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Coder errors
#[derive(Error, Debug)]
pub enum CoderError {
    #[error("Unknown data format: magic byte {found:#04x} does not match")]
    MalformedPrefix { found: u8 },

    #[error("Could not {operation}: {source}")]
    RegistryOperationFailed {
        operation: RegistryOperation,
        #[source]
        source: RegistryError,
    },

    #[error("Could not find schema with id {id} in registry: {source}")]
    SchemaResolutionFailed {
        id: SchemaId,
        #[source]
        source: RegistryError,
    },

    #[error("Cannot {operation}: coder has no subject configured")]
    SubjectRequired { operation: RegistryOperation },

    #[error("Invalid subject name: {0:?}")]
    InvalidSubject(String),

    #[error("Truncated prefix: expected 5 bytes, got {len}")]
    Truncated { len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoderError {
    /// Whether retrying the whole operation could succeed
    ///
    /// Only transport failures qualify; the coder itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoderError::RegistryOperationFailed { source: RegistryError::Transport(_), .. }
                | CoderError::SchemaResolutionFailed { source: RegistryError::Transport(_), .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_registry_failure_keeps_cause() {
        let err = CoderError::RegistryOperationFailed {
            operation: RegistryOperation::Register,
            source: RegistryError::Transport("connection refused".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Could not register schema in registry: Transport error: connection refused"
        );
        assert!(err.source().is_some());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        let err = CoderError::SchemaResolutionFailed {
            id: SchemaId(7),
            source: RegistryError::IdNotFound(SchemaId(7)),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("id 7"));
    }

    #[test]
    fn test_malformed_prefix_message() {
        let err = CoderError::MalformedPrefix { found: 1 };
        assert_eq!(err.to_string(), "Unknown data format: magic byte 0x01 does not match");
    }
}
