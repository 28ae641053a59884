// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `conclave sessions` and `conclave show` command implementations.

use std::str::FromStr;

use colored::Colorize;

use conclave_core::{ConclaveError, SessionStatus};

use crate::app::App;

/// Runs `conclave sessions [--status <status>]`.
pub async fn run_sessions(app: &App, status: Option<&str>) -> Result<(), ConclaveError> {
    let filter = status
        .map(|s| {
            SessionStatus::from_str(s).map_err(|_| {
                ConclaveError::Validation(format!("unknown session status `{s}`"))
            })
        })
        .transpose()?;

    let sessions = app.storage.list_sessions(filter).await?;
    if sessions.is_empty() {
        println!("no sessions");
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}  {:<24}  {}  {}",
            session.id.dimmed(),
            session.status.to_string(),
            session.updated_at.format("%Y-%m-%d %H:%M:%S"),
            session.title
        );
    }
    Ok(())
}

/// Runs `conclave show <session-id>`.
pub async fn run_show(app: &App, session_id: &str) -> Result<(), ConclaveError> {
    let session = app
        .storage
        .get_session(session_id)
        .await?
        .ok_or_else(|| ConclaveError::NotFound {
            what: "session",
            id: session_id.to_string(),
        })?;

    println!("{} {}", "title:".bold(), session.title);
    println!("{} {}", "status:".bold(), session.status);
    println!("{} {}", "problem:".bold(), session.problem_statement);
    if let Some(persona) = session.current_persona {
        println!("{} {persona}", "current persona:".bold());
    }

    println!("\n{}", "timeline:".bold());
    for message in app.storage.get_messages(session_id).await? {
        let label = format!("{}:", message.from_persona);
        let label = if message.is_stuck {
            label.red()
        } else {
            label.cyan()
        };
        println!(
            "  [{}] {label} {}",
            message.timestamp.format("%H:%M:%S%.3f"),
            message.content
        );
    }

    if let Some(solution) = &session.final_solution {
        println!("\n{}\n{solution}", "final solution:".green().bold());
    }
    Ok(())
}
