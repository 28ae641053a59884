// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Conclave orchestrator.

use thiserror::Error;

/// The primary error type used across all Conclave adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ConclaveError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected at a boundary (empty problem statement, oversized memory,
    /// unknown persona name).
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation was attempted against a session in the wrong state
    /// (e.g. clarifying a completed session).
    #[error("invalid session state: {message}")]
    InvalidState { message: String },

    /// A referenced entity does not exist.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (API failure, malformed response, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Workspace sink errors (path escapes the root, I/O failure).
    #[error("workspace error: {message}")]
    Workspace { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = ConclaveError::NotFound {
            what: "session",
            id: "sess-1".into(),
        };
        assert_eq!(err.to_string(), "session not found: sess-1");

        let err = ConclaveError::InvalidState {
            message: "session is completed".into(),
        };
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn storage_error_preserves_source() {
        let err = ConclaveError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(err.to_string().contains("disk full"));
    }
}
