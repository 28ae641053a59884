// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partial-solution compilation for sessions that cannot complete.

use conclave_core::{Message, MessageType, Persona};

/// Preamble ahead of the collected contributions.
pub const PARTIAL_PREAMBLE: &str = "This session could not reach a complete solution. Here is \
what the panel produced before it stopped:";

/// Footer describing how the user can move the problem forward.
pub const PARTIAL_FOOTER: &str = "What's missing: the panel ran out of viable next steps. You \
can (1) clarify or tighten the problem statement, (2) split the problem into smaller \
sessions, or (3) ask for a different approach to the same problem.";

/// Fallback when no persona produced a usable contribution.
pub const PARTIAL_EMPTY: &str =
    "The session stopped before any persona produced a usable contribution.";

/// Concatenates, in chronological order, every non-user contribution that is
/// neither a Stuck nor a Decline and has non-empty content.
pub fn compile_partial(messages: &[Message]) -> String {
    let contributions: Vec<String> = messages
        .iter()
        .filter(|msg| {
            msg.from_persona != Persona::User
                && !matches!(msg.message_type, MessageType::Stuck | MessageType::Decline)
                && !msg.content.trim().is_empty()
        })
        .map(|msg| format!("**{}:**\n{}", msg.from_persona, msg.content))
        .collect();

    if contributions.is_empty() {
        return PARTIAL_EMPTY.to_string();
    }

    format!(
        "{PARTIAL_PREAMBLE}\n\n{}\n\n{PARTIAL_FOOTER}",
        contributions.join("\n\n")
    )
}
