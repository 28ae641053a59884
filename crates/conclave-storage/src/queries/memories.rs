// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory CRUD operations.
//!
//! Every read path is capped at [`READ_CAP`] rows regardless of the caller's
//! limit; eviction policy (oldest by creation time) lives in the memory
//! service, this module only supplies the primitives.

use rusqlite::{params, OptionalExtension, Row};

use conclave_core::{ConclaveError, Persona};

use crate::database::Database;
use crate::models::{self, MemoryRecord};

/// Internal row cap applied to every multi-row read.
const READ_CAP: i64 = 10;

const MEMORY_COLUMNS: &str =
    "id, session_id, persona, identifier, content, created_at, access_count, last_accessed_at";

fn memory_from_row(row: &Row<'_>) -> rusqlite::Result<MemoryRecord> {
    Ok(MemoryRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        persona: models::parse_persona(2, row.get(2)?)?,
        identifier: row.get(3)?,
        content: row.get(4)?,
        created_at: models::parse_ts(5, row.get(5)?)?,
        access_count: row.get(6)?,
        last_accessed_at: models::parse_ts_opt(7, row.get(7)?)?,
    })
}

fn clamp(limit: i64) -> i64 {
    limit.clamp(0, READ_CAP)
}

/// Insert a new memory row.
pub async fn insert_memory(db: &Database, memory: &MemoryRecord) -> Result<(), ConclaveError> {
    let memory = memory.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO memories (id, session_id, persona, identifier, content,
                                       created_at, access_count, last_accessed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    memory.id,
                    memory.session_id,
                    memory.persona.to_string(),
                    memory.identifier,
                    memory.content,
                    models::format_ts(&memory.created_at),
                    memory.access_count,
                    models::format_ts_opt(&memory.last_accessed_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite a memory's content, bumping its access count and last-accessed
/// timestamp.
pub async fn update_memory_content(
    db: &Database,
    id: &str,
    content: &str,
    accessed_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), ConclaveError> {
    let id = id.to_string();
    let content = content.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE memories
                 SET content = ?1, access_count = access_count + 1, last_accessed_at = ?2
                 WHERE id = ?3",
                params![content, models::format_ts(&accessed_at), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Exact identifier lookup.
pub async fn get_by_identifier(
    db: &Database,
    session_id: &str,
    persona: Persona,
    identifier: &str,
) -> Result<Option<MemoryRecord>, ConclaveError> {
    let session_id = session_id.to_string();
    let identifier = identifier.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMORY_COLUMNS} FROM memories
                 WHERE session_id = ?1 AND persona = ?2 AND identifier = ?3"
            ))?;
            let memory = stmt
                .query_row(
                    params![session_id, persona.to_string(), identifier],
                    memory_from_row,
                )
                .optional()?;
            Ok(memory)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent memories by creation time, newest first.
pub async fn recent_memories(
    db: &Database,
    session_id: &str,
    persona: Persona,
    limit: i64,
) -> Result<Vec<MemoryRecord>, ConclaveError> {
    let session_id = session_id.to_string();
    let limit = clamp(limit);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMORY_COLUMNS} FROM memories
                 WHERE session_id = ?1 AND persona = ?2
                 ORDER BY created_at DESC LIMIT ?3"
            ))?;
            let rows = stmt.query_map(
                params![session_id, persona.to_string(), limit],
                memory_from_row,
            )?;
            let mut memories = Vec::new();
            for row in rows {
                memories.push(row?);
            }
            Ok(memories)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Case-insensitive substring match over identifier and content, ranked by
/// access count then recency.
pub async fn search_memories(
    db: &Database,
    session_id: &str,
    persona: Persona,
    query: &str,
    limit: i64,
) -> Result<Vec<MemoryRecord>, ConclaveError> {
    let session_id = session_id.to_string();
    let query = query.to_lowercase();
    let limit = clamp(limit);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMORY_COLUMNS} FROM memories
                 WHERE session_id = ?1 AND persona = ?2
                   AND (instr(lower(identifier), ?3) > 0 OR instr(lower(content), ?3) > 0)
                 ORDER BY access_count DESC, created_at DESC LIMIT ?4"
            ))?;
            let rows = stmt.query_map(
                params![session_id, persona.to_string(), query, limit],
                memory_from_row,
            )?;
            let mut memories = Vec::new();
            for row in rows {
                memories.push(row?);
            }
            Ok(memories)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Row count for one (session, persona).
pub async fn count_memories(
    db: &Database,
    session_id: &str,
    persona: Persona,
) -> Result<i64, ConclaveError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM memories WHERE session_id = ?1 AND persona = ?2",
                params![session_id, persona.to_string()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The oldest memory by creation time (the eviction candidate).
pub async fn oldest_memory(
    db: &Database,
    session_id: &str,
    persona: Persona,
) -> Result<Option<MemoryRecord>, ConclaveError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMORY_COLUMNS} FROM memories
                 WHERE session_id = ?1 AND persona = ?2
                 ORDER BY created_at ASC LIMIT 1"
            ))?;
            let memory = stmt
                .query_row(params![session_id, persona.to_string()], memory_from_row)
                .optional()?;
            Ok(memory)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a memory row by ID.
pub async fn delete_memory(db: &Database, id: &str) -> Result<(), ConclaveError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump access count and last-accessed timestamp for the given rows.
pub async fn touch_memories(
    db: &Database,
    ids: &[String],
    accessed_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), ConclaveError> {
    if ids.is_empty() {
        return Ok(());
    }
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| {
            let accessed = models::format_ts(&accessed_at);
            let mut stmt = conn.prepare(
                "UPDATE memories
                 SET access_count = access_count + 1, last_accessed_at = ?1
                 WHERE id = ?2",
            )?;
            for id in &ids {
                stmt.execute(params![accessed, id])?;
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
