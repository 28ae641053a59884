// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `conclave solve` / `resume` / `clarify` / `cancel` command implementations.
//!
//! `solve` drives a session to a terminal state, prompting on stdin whenever
//! the panel asks the user for clarification. Ctrl-C cancels the in-flight
//! loop between iterations and leaves the session resumable.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use conclave_core::{ConclaveError, Session, SessionStatus};

use crate::app::App;

/// Runs `conclave solve <problem>`.
pub async fn run_solve(app: &App, problem_statement: &str) -> Result<(), ConclaveError> {
    let cancel = install_ctrl_c();

    let session = app
        .orchestrator
        .start_session(problem_statement, cancel.clone())
        .await?;
    println!("{} {}", "session:".dimmed(), session.id);

    drive_to_rest(app, session, cancel).await
}

/// Runs `conclave resume <session-id>`.
pub async fn run_resume(app: &App, session_id: &str) -> Result<(), ConclaveError> {
    let cancel = install_ctrl_c();
    let session = app
        .orchestrator
        .resume_session(session_id, cancel.clone())
        .await?;
    drive_to_rest(app, session, cancel).await
}

/// Runs `conclave clarify <session-id> <answer>` (non-interactive).
pub async fn run_clarify(app: &App, session_id: &str, answer: &str) -> Result<(), ConclaveError> {
    let cancel = install_ctrl_c();
    let session = app
        .orchestrator
        .handle_user_clarification(session_id, answer, cancel.clone())
        .await?;
    drive_to_rest(app, session, cancel).await
}

/// Runs `conclave cancel <session-id>`.
pub async fn run_cancel(app: &App, session_id: &str) -> Result<(), ConclaveError> {
    let session = app.orchestrator.cancel_session(session_id).await?;
    println!("session {} is now {}", session.id, session.status);
    Ok(())
}

/// Keeps answering clarification pauses until the session stops moving.
async fn drive_to_rest(
    app: &App,
    mut session: Session,
    cancel: CancellationToken,
) -> Result<(), ConclaveError> {
    loop {
        match session.status {
            SessionStatus::WaitingForClarification => {
                if cancel.is_cancelled() {
                    println!("{}", "cancelled while waiting for input".dimmed());
                    return Ok(());
                }
                let Some(answer) = prompt_for_answer()? else {
                    println!(
                        "{}",
                        "no answer given; resume later with `conclave clarify`".dimmed()
                    );
                    return Ok(());
                };
                session = app
                    .orchestrator
                    .handle_user_clarification(&session.id, &answer, cancel.clone())
                    .await?;
            }
            SessionStatus::Completed | SessionStatus::Stuck => {
                debug!(session_id = session.id.as_str(), status = %session.status, "session at rest");
                return Ok(());
            }
            _ => {
                // Active (loop yielded on a plain answer), Cancelled, or
                // Interrupted: nothing further to drive here.
                println!("{} {}", "session state:".dimmed(), session.status);
                return Ok(());
            }
        }
    }
}

/// Reads one clarification answer from the terminal.
///
/// Returns `None` on EOF/interrupt so the caller can leave the session
/// waiting.
fn prompt_for_answer() -> Result<Option<String>, ConclaveError> {
    let mut editor = DefaultEditor::new().map_err(|e| {
        ConclaveError::Internal(format!("failed to initialize readline: {e}"))
    })?;
    let prompt = format!("{} ", "answer>".yellow());
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                return Ok(Some(trimmed.to_string()));
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(None),
            Err(e) => {
                return Err(ConclaveError::Internal(format!("readline failed: {e}")));
            }
        }
    }
}

/// Installs a Ctrl-C handler that trips the returned cancellation token.
fn install_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupt received, stopping after the current turn");
            trigger.cancel();
        }
    });
    cancel
}
