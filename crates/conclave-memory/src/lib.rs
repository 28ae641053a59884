// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-(session, persona) associative memory.
//!
//! Personas persist small named facts via `[STORE:id]` directives and recall
//! them on later turns. Each persona holds at most a configured number of
//! entries per session; writing at the cap evicts the oldest entry by
//! creation time (deliberately not by last access, so insertion order decides
//! survival). Identifiers are capped at ten words, bodies at two thousand.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use conclave_config::model::MemoryConfig;
use conclave_core::{ConclaveError, MemoryRecord, Persona, StorageAdapter};

/// Service layer enforcing memory limits over the storage adapter.
pub struct MemoryStore {
    storage: Arc<dyn StorageAdapter>,
    config: MemoryConfig,
}

/// Splits on whitespace; the empty string counts as zero words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

impl MemoryStore {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: MemoryConfig) -> Self {
        Self { storage, config }
    }

    /// The per-(session, persona) entry cap.
    pub fn max_entries(&self) -> usize {
        self.config.max_entries
    }

    /// Stores (or overwrites) a memory.
    ///
    /// Overwriting an existing identifier replaces its content and bumps the
    /// access count. A fresh insert at the cap first evicts the oldest entry
    /// by creation time, so the row count never exceeds the cap.
    pub async fn store(
        &self,
        session_id: &str,
        persona: Persona,
        identifier: &str,
        content: &str,
    ) -> Result<MemoryRecord, ConclaveError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ConclaveError::Validation(
                "memory identifier must not be empty".to_string(),
            ));
        }
        let identifier_words = word_count(identifier);
        if identifier_words > self.config.max_identifier_words {
            return Err(ConclaveError::Validation(format!(
                "memory identifier has {identifier_words} words, limit is {}",
                self.config.max_identifier_words
            )));
        }
        let content_words = word_count(content);
        if content_words > self.config.max_content_words {
            return Err(ConclaveError::Validation(format!(
                "memory content has {content_words} words, limit is {}",
                self.config.max_content_words
            )));
        }

        let now = Utc::now();

        if let Some(existing) = self
            .storage
            .get_memory_by_identifier(session_id, persona, identifier)
            .await?
        {
            self.storage
                .update_memory_content(&existing.id, content, now)
                .await?;
            debug!(session_id, %persona, identifier, "memory overwritten");
            return Ok(MemoryRecord {
                content: content.to_string(),
                access_count: existing.access_count + 1,
                last_accessed_at: Some(now),
                ..existing
            });
        }

        // Fresh insert: enforce the cap first.
        let cap = self.config.max_entries as i64;
        while self.storage.count_memories(session_id, persona).await? >= cap {
            let Some(oldest) = self.storage.oldest_memory(session_id, persona).await? else {
                break;
            };
            debug!(
                session_id,
                %persona,
                evicted = oldest.identifier.as_str(),
                "memory cap reached, evicting oldest entry"
            );
            self.storage.delete_memory(&oldest.id).await?;
        }

        let record = MemoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            persona,
            identifier: identifier.to_string(),
            content: content.to_string(),
            created_at: now,
            access_count: 0,
            last_accessed_at: None,
        };
        self.storage.insert_memory(&record).await?;
        debug!(session_id, %persona, identifier, "memory stored");
        Ok(record)
    }

    /// Case-insensitive substring search over identifier and content, ranked
    /// by access count then recency, at most ten rows. Returned rows count as
    /// accessed.
    pub async fn search(
        &self,
        session_id: &str,
        persona: Persona,
        query: &str,
    ) -> Result<Vec<MemoryRecord>, ConclaveError> {
        let results = self
            .storage
            .search_memories(session_id, persona, query, 10)
            .await?;
        self.mark_accessed(results).await
    }

    /// Most recent `n` memories by creation time, bounded by the configured
    /// cap. Returned rows count as accessed.
    pub async fn recent(
        &self,
        session_id: &str,
        persona: Persona,
        n: usize,
    ) -> Result<Vec<MemoryRecord>, ConclaveError> {
        let limit = n.min(self.config.max_entries) as i64;
        let results = self
            .storage
            .recent_memories(session_id, persona, limit)
            .await?;
        self.mark_accessed(results).await
    }

    /// Exact identifier lookup. A hit counts as accessed.
    pub async fn by_identifier(
        &self,
        session_id: &str,
        persona: Persona,
        identifier: &str,
    ) -> Result<Option<MemoryRecord>, ConclaveError> {
        let result = self
            .storage
            .get_memory_by_identifier(session_id, persona, identifier)
            .await?;
        match result {
            Some(record) => Ok(self.mark_accessed(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Removes a memory by row id.
    pub async fn delete(&self, id: &str) -> Result<(), ConclaveError> {
        self.storage.delete_memory(id).await
    }

    async fn mark_accessed(
        &self,
        mut records: Vec<MemoryRecord>,
    ) -> Result<Vec<MemoryRecord>, ConclaveError> {
        if records.is_empty() {
            return Ok(records);
        }
        let now = Utc::now();
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        self.storage.touch_memories(&ids, now).await?;
        for record in &mut records {
            record.access_count += 1;
            record.last_accessed_at = Some(now);
        }
        Ok(records)
    }
}
