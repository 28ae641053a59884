// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Conclave multi-agent orchestrator.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Conclave workspace. The orchestration
//! loop, persistence layer, and provider integrations all build on the
//! contracts defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConclaveError;
pub use types::{
    ChatMessage, ChatRole, LlmRequest, LlmResponse, MemoryRecord, Message, MessageType, Persona,
    PersonaConfig, PersonaResponse, ResponseType, Session, SessionEvent, SessionStatus,
};

// Re-export all adapter traits at crate root.
pub use traits::{EventSink, LlmProvider, StorageAdapter, WorkspaceSink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_trait_modules_are_exported() {
        // If any adapter trait module is missing or fails to compile, this
        // test will not build.
        fn _assert_provider<T: LlmProvider>() {}
        fn _assert_storage<T: StorageAdapter>() {}
        fn _assert_events<T: EventSink>() {}
        fn _assert_workspace<T: WorkspaceSink>() {}
    }

    #[test]
    fn error_variants_construct() {
        let _config = ConclaveError::Config("test".into());
        let _validation = ConclaveError::Validation("test".into());
        let _state = ConclaveError::InvalidState {
            message: "test".into(),
        };
        let _not_found = ConclaveError::NotFound {
            what: "session",
            id: "test".into(),
        };
        let _storage = ConclaveError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = ConclaveError::Provider {
            message: "test".into(),
            source: None,
        };
        let _workspace = ConclaveError::Workspace {
            message: "test".into(),
        };
        let _timeout = ConclaveError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _cancelled = ConclaveError::Cancelled;
        let _internal = ConclaveError::Internal("test".into());
    }
}
