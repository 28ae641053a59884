// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: system prompt zones and the bounded message history.
//!
//! The per-invocation system prompt is assembled from fixed zones: the
//! persona's base prompt, the response-format reference (the tag grammar the
//! model must emit), the session context, and recalled memories.

use conclave_core::{ChatMessage, ChatRole, MemoryRecord, Message, Persona, PersonaConfig, Session};

/// How many prior messages a persona sees.
pub const HISTORY_WINDOW: usize = 10;

/// The tag grammar reminder included in every persona's system prompt.
///
/// The bracket tags here are the wire format the parser recognizes; keep the
/// two in sync.
pub const RESPONSE_FORMAT_REFERENCE: &str = "\
## Response format

Reply in plain text. You may use exactly these directives:

- [REASONING] your private reasoning [/REASONING] -- never shown to others; put it first.
- [DELEGATE:<persona>] <task and context> -- hand the problem to another specialist. \
Personas: Coordinator, BusinessAnalyst, TechnicalArchitect, SeniorDeveloper, \
JuniorDeveloper, SeniorQA, JuniorQA, UXEngineer, UIEngineer, DocumentWriter.
- [CLARIFY] <question> -- pause the session and ask the user one question.
- [SOLUTION] <final solution> -- the problem is solved; give the complete answer.
- [STUCK] <reason> -- you cannot make progress on this.
- [DECLINE] <reason> -- this task is outside your role.
- [STORE:<short identifier>] <content> -- save a note to your memory (identifier up to \
10 words, content up to 2000 words).
- [REMEMBER:<short identifier>] -- request a note from your memory.
- [FILE:<relative/path>] <file body> [/FILE] -- write a file into the shared workspace.

Use at most one of DELEGATE, CLARIFY, SOLUTION, STUCK, or DECLINE per reply. A reply \
with none of them is treated as a plain answer to the sender.";

/// Assembles the full system prompt for one invocation.
pub fn build_system_prompt(
    config: &PersonaConfig,
    session: &Session,
    memories: &[MemoryRecord],
) -> String {
    let mut prompt = String::with_capacity(config.system_prompt.len() + 1024);
    prompt.push_str(&config.system_prompt);
    prompt.push_str("\n\n");
    prompt.push_str(RESPONSE_FORMAT_REFERENCE);

    prompt.push_str("\n\n## Session\n\n");
    prompt.push_str(&format!(
        "Session {} (status: {}).\nProblem statement: {}",
        session.id, session.status, session.problem_statement
    ));

    if !memories.is_empty() {
        prompt.push_str("\n\n## Your memories\n");
        for memory in memories {
            prompt.push_str(&format!("\n[{}]\n{}\n", memory.identifier, memory.content));
        }
    }

    prompt
}

/// Renders the bounded history plus the incoming message.
///
/// History messages keep their original role (`user` for the human,
/// `assistant` for every persona). The incoming message is appended last as
/// a `user` turn with a prefix announcing who sent it, so the model knows
/// whom it is answering.
pub fn build_messages(history: &[Message], incoming: &Message) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = history
        .iter()
        .filter(|msg| msg.id != incoming.id)
        .map(|msg| ChatMessage {
            role: role_for(msg.from_persona),
            content: msg.content.clone(),
        })
        .collect();

    messages.push(ChatMessage {
        role: ChatRole::User,
        content: render_incoming(incoming),
    });
    messages
}

fn role_for(persona: Persona) -> ChatRole {
    if persona == Persona::User {
        ChatRole::User
    } else {
        ChatRole::Assistant
    }
}

fn render_incoming(incoming: &Message) -> String {
    let mut text = format!("Message from {}:\n{}", incoming.from_persona, incoming.content);
    if let Some(context) = &incoming.delegation_context {
        text.push_str(&format!("\n\nDelegation context: {context}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use conclave_core::{MessageType, SessionStatus};

    fn session() -> Session {
        let now = Utc::now();
        Session {
            id: "sess-1".into(),
            title: "t".into(),
            problem_statement: "Build a calculator".into(),
            status: SessionStatus::Active,
            current_persona: Some(Persona::Coordinator),
            final_solution: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn config() -> PersonaConfig {
        PersonaConfig {
            id: "cfg-Coordinator".into(),
            persona: Persona::Coordinator,
            display_name: "Coordinator".into(),
            model_name: "llama3.1".into(),
            system_prompt: "You are the Coordinator.".into(),
            temperature: 0.3,
            max_tokens: 2048,
            enabled: true,
            sort_order: 0,
            description: None,
        }
    }

    fn message(id: &str, from: Persona, content: &str) -> Message {
        Message {
            id: id.into(),
            session_id: "sess-1".into(),
            from_persona: from,
            to_persona: None,
            content: content.into(),
            message_type: MessageType::Answer,
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            is_stuck: false,
            parent_message_id: None,
            raw_response: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn system_prompt_contains_all_zones() {
        let memories = vec![MemoryRecord {
            id: "mem-1".into(),
            session_id: "sess-1".into(),
            persona: Persona::Coordinator,
            identifier: "db choice".into(),
            content: "PostgreSQL".into(),
            created_at: Utc::now(),
            access_count: 0,
            last_accessed_at: None,
        }];
        let prompt = build_system_prompt(&config(), &session(), &memories);

        assert!(prompt.starts_with("You are the Coordinator."));
        assert!(prompt.contains("[DELEGATE:<persona>]"));
        assert!(prompt.contains("Problem statement: Build a calculator"));
        assert!(prompt.contains("[db choice]\nPostgreSQL"));
    }

    #[test]
    fn system_prompt_omits_memory_zone_when_empty() {
        let prompt = build_system_prompt(&config(), &session(), &[]);
        assert!(!prompt.contains("## Your memories"));
    }

    #[test]
    fn messages_map_roles_and_append_incoming() {
        let history = vec![
            message("m1", Persona::User, "Build a calculator"),
            message("m2", Persona::Coordinator, "On it"),
        ];
        let incoming = message("m3", Persona::Coordinator, "design it please");

        let messages = build_messages(&history, &incoming);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[2].role, ChatRole::User);
        assert!(messages[2].content.starts_with("Message from Coordinator:"));
    }

    #[test]
    fn incoming_is_not_duplicated_when_already_in_history() {
        let incoming = message("m2", Persona::User, "hello");
        let history = vec![message("m1", Persona::User, "earlier"), incoming.clone()];

        let messages = build_messages(&history, &incoming);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("hello"));
    }

    #[test]
    fn delegation_context_is_rendered() {
        let mut incoming = message("m1", Persona::Coordinator, "see context");
        incoming.delegation_context = Some("focus on the storage layer".into());

        let messages = build_messages(&[], &incoming);
        assert!(messages[0].content.contains("Delegation context: focus on the storage layer"));
    }
}
