// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ConclaveError;
use crate::types::{MemoryRecord, Message, Persona, PersonaConfig, Session, SessionStatus};

/// Adapter for persistence backends.
///
/// All session, message, memory, and persona-configuration state flows
/// through this trait. Mutation happens only under the owning session's
/// exclusive lock in the orchestrator; implementations need not add their
/// own cross-session coordination beyond write serialization.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Initializes the backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), ConclaveError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), ConclaveError>;

    // --- Sessions ---

    async fn create_session(&self, session: &Session) -> Result<(), ConclaveError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, ConclaveError>;

    async fn list_sessions(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Session>, ConclaveError>;

    /// Persists every mutable session field (status, current persona, final
    /// solution, updated-at). Identity fields are never rewritten.
    async fn update_session(&self, session: &Session) -> Result<(), ConclaveError>;

    // --- Messages ---

    async fn insert_message(&self, message: &Message) -> Result<(), ConclaveError>;

    async fn get_message(&self, id: &str) -> Result<Option<Message>, ConclaveError>;

    /// All messages of a session in chronological order.
    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, ConclaveError>;

    /// The most recent `limit` messages, returned in chronological order.
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<Message>, ConclaveError>;

    async fn last_message(&self, session_id: &str) -> Result<Option<Message>, ConclaveError>;

    // --- Memories ---

    async fn insert_memory(&self, memory: &MemoryRecord) -> Result<(), ConclaveError>;

    /// Overwrites a memory's content, bumping its access count and
    /// last-accessed timestamp.
    async fn update_memory_content(
        &self,
        id: &str,
        content: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ConclaveError>;

    async fn get_memory_by_identifier(
        &self,
        session_id: &str,
        persona: Persona,
        identifier: &str,
    ) -> Result<Option<MemoryRecord>, ConclaveError>;

    /// Most recent memories by creation time, newest first, capped at `limit`.
    async fn recent_memories(
        &self,
        session_id: &str,
        persona: Persona,
        limit: i64,
    ) -> Result<Vec<MemoryRecord>, ConclaveError>;

    /// Case-insensitive substring match over identifier and content, ranked
    /// by access count then recency, capped at `limit`.
    async fn search_memories(
        &self,
        session_id: &str,
        persona: Persona,
        query: &str,
        limit: i64,
    ) -> Result<Vec<MemoryRecord>, ConclaveError>;

    async fn count_memories(
        &self,
        session_id: &str,
        persona: Persona,
    ) -> Result<i64, ConclaveError>;

    /// The oldest memory by creation time, if any (the eviction candidate).
    async fn oldest_memory(
        &self,
        session_id: &str,
        persona: Persona,
    ) -> Result<Option<MemoryRecord>, ConclaveError>;

    async fn delete_memory(&self, id: &str) -> Result<(), ConclaveError>;

    /// Bumps access count and last-accessed timestamp for the given rows.
    async fn touch_memories(
        &self,
        ids: &[String],
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ConclaveError>;

    // --- Persona configurations ---

    async fn get_persona_config(
        &self,
        persona: Persona,
    ) -> Result<Option<PersonaConfig>, ConclaveError>;

    /// All configurations ordered by sort order.
    async fn list_persona_configs(&self) -> Result<Vec<PersonaConfig>, ConclaveError>;

    /// Inserts each default unless a row for that persona already exists.
    async fn seed_persona_configs(
        &self,
        defaults: &[PersonaConfig],
    ) -> Result<(), ConclaveError>;
}
