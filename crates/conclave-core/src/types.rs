// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Conclave orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A named model-backed role participating in a session.
///
/// `User` attributes messages originating outside the panel; the other ten
/// variants are the deliberating agents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Persona {
    User,
    Coordinator,
    BusinessAnalyst,
    TechnicalArchitect,
    SeniorDeveloper,
    JuniorDeveloper,
    SeniorQA,
    JuniorQA,
    UXEngineer,
    UIEngineer,
    DocumentWriter,
}

impl Persona {
    /// The ten deliberating agents, in roster order. Excludes `User`.
    pub const AGENTS: [Persona; 10] = [
        Persona::Coordinator,
        Persona::BusinessAnalyst,
        Persona::TechnicalArchitect,
        Persona::SeniorDeveloper,
        Persona::JuniorDeveloper,
        Persona::SeniorQA,
        Persona::JuniorQA,
        Persona::UXEngineer,
        Persona::UIEngineer,
        Persona::DocumentWriter,
    ];

    /// Returns true for every persona except `User`.
    pub fn is_agent(self) -> bool {
        self != Persona::User
    }
}

/// Lifecycle state of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum SessionStatus {
    Active,
    WaitingForClarification,
    Completed,
    Stuck,
    Cancelled,
    Interrupted,
    Error,
}

impl SessionStatus {
    /// Terminal sessions reject all control operations except reads.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

/// Kind of a persisted message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum MessageType {
    ProblemStatement,
    Question,
    Answer,
    Delegation,
    Clarification,
    UserResponse,
    Solution,
    Stuck,
    Decline,
}

/// Primary type of a parsed persona response.
///
/// Exactly one primary type is chosen per response; side-effect directives
/// (memory stores, file writes) are carried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    Answer,
    Delegation,
    Clarification,
    Solution,
    Stuck,
    Decline,
}

impl ResponseType {
    /// The message type a response of this kind is persisted as.
    pub fn message_type(self) -> MessageType {
        match self {
            ResponseType::Answer => MessageType::Answer,
            ResponseType::Delegation => MessageType::Delegation,
            ResponseType::Clarification => MessageType::Clarification,
            ResponseType::Solution => MessageType::Solution,
            ResponseType::Stuck => MessageType::Stuck,
            ResponseType::Decline => MessageType::Decline,
        }
    }
}

/// A problem-solving session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Short title derived from the problem statement.
    pub title: String,
    /// Immutable after creation.
    pub problem_statement: String,
    pub status: SessionStatus,
    /// The persona currently scheduled, if any. `None` means the session is
    /// not actively driven (terminal, stuck, or between invocations).
    pub current_persona: Option<Persona>,
    /// Set exactly when the session reaches `Completed` or `Stuck`.
    pub final_solution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One turn in a session's timeline. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub from_persona: Persona,
    pub to_persona: Option<Persona>,
    pub content: String,
    pub message_type: MessageType,
    pub internal_reasoning: Option<String>,
    pub delegate_to_persona: Option<Persona>,
    pub delegation_context: Option<String>,
    pub is_stuck: bool,
    /// Reply-tree parent.
    pub parent_message_id: Option<String>,
    /// Unparsed model output, preserved verbatim.
    pub raw_response: Option<String>,
    /// Strictly increasing within a session.
    pub timestamp: DateTime<Utc>,
}

/// A bounded associative memory entry owned by one persona within one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub session_id: String,
    pub persona: Persona,
    /// At most ten words.
    pub identifier: String,
    /// At most two thousand words.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub access_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// Per-persona model settings. Seeded with ten defaults; read-only to the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub id: String,
    pub persona: Persona,
    pub display_name: String,
    pub model_name: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub enabled: bool,
    pub sort_order: i64,
    pub description: Option<String>,
}

/// Structured result of parsing one model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaResponse {
    pub response_type: ResponseType,
    /// Cleaned content with all tags stripped.
    pub content: String,
    pub internal_reasoning: Option<String>,
    pub delegate_to_persona: Option<Persona>,
    pub delegation_context: Option<String>,
    pub clarification_question: Option<String>,
    pub is_stuck: bool,
    /// The model output exactly as received.
    pub raw_response: String,
}

impl PersonaResponse {
    /// An `Answer` carrying the trimmed raw text unchanged.
    pub fn answer(text: impl Into<String>) -> Self {
        let raw = text.into();
        Self {
            response_type: ResponseType::Answer,
            content: raw.trim().to_string(),
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            clarification_question: None,
            is_stuck: false,
            raw_response: raw,
        }
    }

    /// A synthesized `Stuck` response (used when the provider fails or the
    /// model returns nothing).
    pub fn stuck(content: impl Into<String>, reasoning: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Stuck,
            content: content.into(),
            internal_reasoning: reasoning,
            delegate_to_persona: None,
            delegation_context: None,
            clarification_question: None,
            is_stuck: true,
            raw_response: String::new(),
        }
    }

    /// A synthesized `Decline` response (used for disabled personas).
    pub fn decline(content: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Decline,
            content: content.into(),
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            clarification_question: None,
            is_stuck: false,
            raw_response: String::new(),
        }
    }
}

/// Events delivered to per-session subscribers, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageReceived { message: Message },
    SessionStatusChanged { session: Session },
    ClarificationRequested { message: Message },
    SolutionReady { session: Session },
    SessionStuck { session: Session, partial_solution: String },
}

impl SessionEvent {
    /// Short label for logging and display.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::MessageReceived { .. } => "message_received",
            SessionEvent::SessionStatusChanged { .. } => "session_status_changed",
            SessionEvent::ClarificationRequested { .. } => "clarification_requested",
            SessionEvent::SolutionReady { .. } => "solution_ready",
            SessionEvent::SessionStuck { .. } => "session_stuck",
        }
    }
}

/// Role of one chat message sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of the provider conversation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: Option<String>,
    pub total_tokens: Option<u32>,
    pub duration_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn persona_roster_has_ten_agents() {
        assert_eq!(Persona::AGENTS.len(), 10);
        assert!(Persona::AGENTS.iter().all(|p| p.is_agent()));
        assert!(!Persona::User.is_agent());
    }

    #[test]
    fn persona_display_and_from_str_round_trip() {
        for persona in Persona::AGENTS {
            let s = persona.to_string();
            assert_eq!(Persona::from_str(&s).unwrap(), persona);
        }
        assert_eq!(Persona::SeniorQA.to_string(), "SeniorQA");
    }

    #[test]
    fn terminal_statuses() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
        assert!(!SessionStatus::Stuck.is_terminal());
        assert!(!SessionStatus::Interrupted.is_terminal());
    }

    #[test]
    fn response_type_maps_to_message_type() {
        assert_eq!(
            ResponseType::Delegation.message_type(),
            MessageType::Delegation
        );
        assert_eq!(ResponseType::Answer.message_type(), MessageType::Answer);
        assert_eq!(ResponseType::Stuck.message_type(), MessageType::Stuck);
    }

    #[test]
    fn session_event_serializes_tagged() {
        let session = Session {
            id: "s1".into(),
            title: "t".into(),
            problem_statement: "p".into(),
            status: SessionStatus::Active,
            current_persona: Some(Persona::Coordinator),
            final_solution: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let event = SessionEvent::SolutionReady { session };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"solution_ready""#));
    }

    #[test]
    fn synthesized_stuck_response() {
        let resp = PersonaResponse::stuck("no progress", Some("timeout".into()));
        assert_eq!(resp.response_type, ResponseType::Stuck);
        assert!(resp.is_stuck);
        assert_eq!(resp.internal_reasoning.as_deref(), Some("timeout"));
    }
}
