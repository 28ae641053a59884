// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session CRUD operations.

use rusqlite::{params, OptionalExtension, Row};

use conclave_core::{ConclaveError, SessionStatus};

use crate::database::Database;
use crate::models::{self, Session};

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        title: row.get(1)?,
        problem_statement: row.get(2)?,
        status: models::parse_status(3, row.get(3)?)?,
        current_persona: models::parse_persona_opt(4, row.get(4)?)?,
        final_solution: row.get(5)?,
        created_at: models::parse_ts(6, row.get(6)?)?,
        updated_at: models::parse_ts(7, row.get(7)?)?,
    })
}

const SESSION_COLUMNS: &str = "id, title, problem_statement, status, current_persona, \
                               final_solution, created_at, updated_at";

/// Create a new session.
pub async fn create_session(db: &Database, session: &Session) -> Result<(), ConclaveError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, title, problem_statement, status, current_persona,
                                       final_solution, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    session.id,
                    session.title,
                    session.problem_statement,
                    session.status.to_string(),
                    session.current_persona.map(|p| p.to_string()),
                    session.final_solution,
                    models::format_ts(&session.created_at),
                    models::format_ts(&session.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, ConclaveError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
            ))?;
            let session = stmt.query_row(params![id], session_from_row).optional()?;
            Ok(session)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List sessions newest-first, optionally filtered by status.
pub async fn list_sessions(
    db: &Database,
    status: Option<SessionStatus>,
) -> Result<Vec<Session>, ConclaveError> {
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let mut sessions = Vec::new();
            match &status {
                Some(filter) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions
                         WHERE status = ?1 ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![filter], session_from_row)?;
                    for row in rows {
                        sessions.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map([], session_from_row)?;
                    for row in rows {
                        sessions.push(row?);
                    }
                }
            }
            Ok(sessions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist a session's mutable fields (status, current persona, final
/// solution, updated-at). Identity fields are left untouched.
pub async fn update_session(db: &Database, session: &Session) -> Result<(), ConclaveError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET status = ?1, current_persona = ?2, final_solution = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    session.status.to_string(),
                    session.current_persona.map(|p| p.to_string()),
                    session.final_solution,
                    models::format_ts(&session.updated_at),
                    session.id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
