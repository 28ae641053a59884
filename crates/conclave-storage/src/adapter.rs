// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use conclave_config::model::StorageConfig;
use conclave_core::{
    ConclaveError, MemoryRecord, Message, Persona, PersonaConfig, Session, SessionStatus,
    StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ConclaveError> {
        self.db.get().ok_or_else(|| ConclaveError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ConclaveError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ConclaveError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ConclaveError> {
        self.db()?.close().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Sessions ---

    async fn create_session(&self, session: &Session) -> Result<(), ConclaveError> {
        queries::sessions::create_session(self.db()?, session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, ConclaveError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn list_sessions(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Session>, ConclaveError> {
        queries::sessions::list_sessions(self.db()?, status).await
    }

    async fn update_session(&self, session: &Session) -> Result<(), ConclaveError> {
        queries::sessions::update_session(self.db()?, session).await
    }

    // --- Messages ---

    async fn insert_message(&self, message: &Message) -> Result<(), ConclaveError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, ConclaveError> {
        queries::messages::get_message(self.db()?, id).await
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, ConclaveError> {
        queries::messages::get_messages_for_session(self.db()?, session_id).await
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<Message>, ConclaveError> {
        queries::messages::recent_messages(self.db()?, session_id, limit).await
    }

    async fn last_message(&self, session_id: &str) -> Result<Option<Message>, ConclaveError> {
        queries::messages::last_message(self.db()?, session_id).await
    }

    // --- Memories ---

    async fn insert_memory(&self, memory: &MemoryRecord) -> Result<(), ConclaveError> {
        queries::memories::insert_memory(self.db()?, memory).await
    }

    async fn update_memory_content(
        &self,
        id: &str,
        content: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ConclaveError> {
        queries::memories::update_memory_content(self.db()?, id, content, accessed_at).await
    }

    async fn get_memory_by_identifier(
        &self,
        session_id: &str,
        persona: Persona,
        identifier: &str,
    ) -> Result<Option<MemoryRecord>, ConclaveError> {
        queries::memories::get_by_identifier(self.db()?, session_id, persona, identifier).await
    }

    async fn recent_memories(
        &self,
        session_id: &str,
        persona: Persona,
        limit: i64,
    ) -> Result<Vec<MemoryRecord>, ConclaveError> {
        queries::memories::recent_memories(self.db()?, session_id, persona, limit).await
    }

    async fn search_memories(
        &self,
        session_id: &str,
        persona: Persona,
        query: &str,
        limit: i64,
    ) -> Result<Vec<MemoryRecord>, ConclaveError> {
        queries::memories::search_memories(self.db()?, session_id, persona, query, limit).await
    }

    async fn count_memories(
        &self,
        session_id: &str,
        persona: Persona,
    ) -> Result<i64, ConclaveError> {
        queries::memories::count_memories(self.db()?, session_id, persona).await
    }

    async fn oldest_memory(
        &self,
        session_id: &str,
        persona: Persona,
    ) -> Result<Option<MemoryRecord>, ConclaveError> {
        queries::memories::oldest_memory(self.db()?, session_id, persona).await
    }

    async fn delete_memory(&self, id: &str) -> Result<(), ConclaveError> {
        queries::memories::delete_memory(self.db()?, id).await
    }

    async fn touch_memories(
        &self,
        ids: &[String],
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ConclaveError> {
        queries::memories::touch_memories(self.db()?, ids, accessed_at).await
    }

    // --- Persona configurations ---

    async fn get_persona_config(
        &self,
        persona: Persona,
    ) -> Result<Option<PersonaConfig>, ConclaveError> {
        queries::personas::get_by_persona(self.db()?, persona).await
    }

    async fn list_persona_configs(&self) -> Result<Vec<PersonaConfig>, ConclaveError> {
        queries::personas::list_all(self.db()?).await
    }

    async fn seed_persona_configs(
        &self,
        defaults: &[PersonaConfig],
    ) -> Result<(), ConclaveError> {
        queries::personas::seed_defaults(self.db()?, defaults).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use conclave_core::MessageType;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        let result = storage.get_session("any").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn full_session_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let now = Utc::now();
        let mut session = Session {
            id: "sess-adapter-1".to_string(),
            title: "Build a calculator".to_string(),
            problem_statement: "Build a calculator".to_string(),
            status: SessionStatus::Active,
            current_persona: Some(Persona::Coordinator),
            final_solution: None,
            created_at: now,
            updated_at: now,
        };
        storage.create_session(&session).await.unwrap();

        let m1 = Message {
            id: "m1".to_string(),
            session_id: "sess-adapter-1".to_string(),
            from_persona: Persona::User,
            to_persona: Some(Persona::Coordinator),
            content: "Build a calculator".to_string(),
            message_type: MessageType::ProblemStatement,
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            is_stuck: false,
            parent_message_id: None,
            raw_response: None,
            timestamp: now,
        };
        let m2 = Message {
            id: "m2".to_string(),
            from_persona: Persona::Coordinator,
            to_persona: None,
            content: "use +,-,*,/".to_string(),
            message_type: MessageType::Solution,
            parent_message_id: Some("m1".to_string()),
            timestamp: now + Duration::milliseconds(5),
            ..m1.clone()
        };
        storage.insert_message(&m1).await.unwrap();
        storage.insert_message(&m2).await.unwrap();

        let messages = storage.get_messages("sess-adapter-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_type, MessageType::ProblemStatement);
        assert_eq!(messages[1].message_type, MessageType::Solution);
        assert_eq!(messages[1].parent_message_id.as_deref(), Some("m1"));

        session.status = SessionStatus::Completed;
        session.current_persona = None;
        session.final_solution = Some("use +,-,*,/".to_string());
        storage.update_session(&session).await.unwrap();

        let updated = storage.get_session("sess-adapter-1").await.unwrap().unwrap();
        assert_eq!(updated.status, SessionStatus::Completed);
        assert_eq!(updated.final_solution.as_deref(), Some("use +,-,*,/"));

        storage.close().await.unwrap();
    }
}
