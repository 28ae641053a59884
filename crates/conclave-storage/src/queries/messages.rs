// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use rusqlite::{params, OptionalExtension, Row};

use conclave_core::ConclaveError;

use crate::database::Database;
use crate::models::{self, Message};

const MESSAGE_COLUMNS: &str = "id, session_id, from_persona, to_persona, content, message_type, \
                               internal_reasoning, delegate_to_persona, delegation_context, \
                               is_stuck, parent_message_id, raw_response, timestamp";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        from_persona: models::parse_persona(2, row.get(2)?)?,
        to_persona: models::parse_persona_opt(3, row.get(3)?)?,
        content: row.get(4)?,
        message_type: models::parse_message_type(5, row.get(5)?)?,
        internal_reasoning: row.get(6)?,
        delegate_to_persona: models::parse_persona_opt(7, row.get(7)?)?,
        delegation_context: row.get(8)?,
        is_stuck: row.get(9)?,
        parent_message_id: row.get(10)?,
        raw_response: row.get(11)?,
        timestamp: models::parse_ts(12, row.get(12)?)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), ConclaveError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, session_id, from_persona, to_persona, content,
                                       message_type, internal_reasoning, delegate_to_persona,
                                       delegation_context, is_stuck, parent_message_id,
                                       raw_response, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    msg.id,
                    msg.session_id,
                    msg.from_persona.to_string(),
                    msg.to_persona.map(|p| p.to_string()),
                    msg.content,
                    msg.message_type.to_string(),
                    msg.internal_reasoning,
                    msg.delegate_to_persona.map(|p| p.to_string()),
                    msg.delegation_context,
                    msg.is_stuck,
                    msg.parent_message_id,
                    msg.raw_response,
                    models::format_ts(&msg.timestamp),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a single message by ID.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, ConclaveError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let message = stmt.query_row(params![id], message_from_row).optional()?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get all messages of a session in chronological order.
pub async fn get_messages_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Vec<Message>, ConclaveError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1 ORDER BY timestamp ASC"
            ))?;
            let rows = stmt.query_map(params![session_id], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the most recent `limit` messages, returned in chronological order.
pub async fn recent_messages(
    db: &Database,
    session_id: &str,
    limit: i64,
) -> Result<Vec<Message>, ConclaveError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1 ORDER BY timestamp DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![session_id, limit], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the newest message of a session, if any.
pub async fn last_message(
    db: &Database,
    session_id: &str,
) -> Result<Option<Message>, ConclaveError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1 ORDER BY timestamp DESC LIMIT 1"
            ))?;
            let message = stmt
                .query_row(params![session_id], message_from_row)
                .optional()?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::sessions::create_session;
    use chrono::{Duration, Utc};
    use conclave_core::{MessageType, Persona, Session, SessionStatus};
    use tempfile::tempdir;

    async fn setup_db_with_session() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let now = Utc::now();
        let session = Session {
            id: "sess-1".to_string(),
            title: "t".to_string(),
            problem_statement: "p".to_string(),
            status: SessionStatus::Active,
            current_persona: None,
            final_solution: None,
            created_at: now,
            updated_at: now,
        };
        create_session(&db, &session).await.unwrap();
        (db, dir)
    }

    fn make_msg(id: &str, from: Persona, content: &str, offset_ms: i64) -> Message {
        Message {
            id: id.to_string(),
            session_id: "sess-1".to_string(),
            from_persona: from,
            to_persona: None,
            content: content.to_string(),
            message_type: MessageType::Answer,
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            is_stuck: false,
            parent_message_id: None,
            raw_response: None,
            timestamp: Utc::now() + Duration::milliseconds(offset_ms),
        }
    }

    #[tokio::test]
    async fn insert_and_get_messages_in_order() {
        let (db, _dir) = setup_db_with_session().await;

        let m1 = make_msg("m1", Persona::User, "hello", 0);
        let m2 = make_msg("m2", Persona::Coordinator, "hi there", 10);
        let m3 = make_msg("m3", Persona::BusinessAnalyst, "requirements", 20);

        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m3).await.unwrap();
        insert_message(&db, &m2).await.unwrap();

        let messages = get_messages_for_session(&db, "sess-1").await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[1].id, "m2");
        assert_eq!(messages[2].id, "m3");
        assert_eq!(messages[1].from_persona, Persona::Coordinator);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn round_trips_all_optional_fields() {
        let (db, _dir) = setup_db_with_session().await;

        let mut msg = make_msg("m-full", Persona::Coordinator, "delegating", 0);
        msg.message_type = MessageType::Delegation;
        msg.to_persona = Some(Persona::SeniorDeveloper);
        msg.delegate_to_persona = Some(Persona::SeniorDeveloper);
        msg.delegation_context = Some("implement the parser".to_string());
        msg.internal_reasoning = Some("the task is concrete".to_string());
        msg.raw_response = Some("[DELEGATE:SrDev] implement the parser".to_string());
        insert_message(&db, &msg).await.unwrap();

        let got = get_message(&db, "m-full").await.unwrap().unwrap();
        assert_eq!(got.message_type, MessageType::Delegation);
        assert_eq!(got.delegate_to_persona, Some(Persona::SeniorDeveloper));
        assert_eq!(got.delegation_context.as_deref(), Some("implement the parser"));
        assert_eq!(got.internal_reasoning.as_deref(), Some("the task is concrete"));
        assert_eq!(
            got.raw_response.as_deref(),
            Some("[DELEGATE:SrDev] implement the parser")
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_messages_returns_tail_in_chronological_order() {
        let (db, _dir) = setup_db_with_session().await;

        for i in 0..5 {
            let msg = make_msg(&format!("m{i}"), Persona::User, &format!("msg {i}"), i * 10);
            insert_message(&db, &msg).await.unwrap();
        }

        let recent = recent_messages(&db, "sess-1", 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, "m2");
        assert_eq!(recent[2].id, "m4");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn last_message_returns_newest() {
        let (db, _dir) = setup_db_with_session().await;
        assert!(last_message(&db, "sess-1").await.unwrap().is_none());

        insert_message(&db, &make_msg("m1", Persona::User, "a", 0))
            .await
            .unwrap();
        insert_message(&db, &make_msg("m2", Persona::Coordinator, "b", 10))
            .await
            .unwrap();

        let last = last_message(&db, "sess-1").await.unwrap().unwrap();
        assert_eq!(last.id, "m2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn insert_without_session_violates_foreign_key() {
        let (db, _dir) = setup_db_with_session().await;
        let mut msg = make_msg("m-orphan", Persona::User, "x", 0);
        msg.session_id = "missing-session".to_string();
        let result = insert_message(&db, &msg).await;
        assert!(result.is_err());
        db.close().await.unwrap();
    }
}
