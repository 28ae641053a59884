// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup crash recovery.
//!
//! A session in `Active` status at process start was being driven when the
//! previous process died. Marking it `Interrupted` lets the user resume it
//! explicitly instead of leaving it looking live.

use chrono::Utc;
use tracing::{error, info};

use conclave_core::{SessionStatus, StorageAdapter};

/// Marks every `Active` session as `Interrupted`.
///
/// Runs once at startup before new work is accepted. Never fails: storage
/// errors are logged and the remaining sessions are still attempted. Returns
/// the number of sessions transitioned.
pub async fn mark_interrupted_sessions(storage: &dyn StorageAdapter) -> usize {
    let active = match storage.list_sessions(Some(SessionStatus::Active)).await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!(error = %e, "crash recovery could not list active sessions");
            return 0;
        }
    };

    if active.is_empty() {
        return 0;
    }

    info!(count = active.len(), "marking stale sessions as interrupted");
    let mut recovered = 0;
    for mut session in active {
        session.status = SessionStatus::Interrupted;
        session.updated_at = Utc::now();
        match storage.update_session(&session).await {
            Ok(()) => recovered += 1,
            Err(e) => {
                error!(session_id = session.id.as_str(), error = %e, "failed to mark session interrupted");
            }
        }
    }
    recovered
}
