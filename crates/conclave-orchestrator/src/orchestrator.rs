// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session state machine and delegation loop.
//!
//! One invocation drives one persona chain: each iteration schedules the
//! current persona, persists and broadcasts its message, then routes by
//! response type until a terminal outcome (solution, stuck, clarification
//! pause, plain answer) or the depth bound. At most one iteration runs per
//! session at any instant; sessions are independent of each other.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use conclave_core::{
    ConclaveError, EventSink, Message, MessageType, Persona, PersonaResponse, ResponseType,
    Session, SessionEvent, SessionStatus, StorageAdapter,
};
use conclave_memory::MemoryStore;
use conclave_persona::PersonaEngine;

use crate::partial::compile_partial;
use crate::title::derive_title;

/// Iterations one loop invocation may run before the session is declared stuck.
pub const MAX_DELEGATION_DEPTH: u32 = 50;

/// Consecutive stuck responses before the session is declared stuck.
pub const MAX_CONSECUTIVE_STUCK: u32 = 5;

/// Non-coordinator answers longer than this bounce back to the Coordinator.
const ANSWER_REROUTE_THRESHOLD: usize = 100;

/// Memories recalled per persona turn.
const MEMORY_RECALL_WINDOW: usize = 10;

/// Drives sessions from problem statement to terminal state.
pub struct Orchestrator {
    storage: Arc<dyn StorageAdapter>,
    engine: Arc<PersonaEngine>,
    memory: Arc<MemoryStore>,
    events: Arc<dyn EventSink>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Orchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        engine: Arc<PersonaEngine>,
        memory: Arc<MemoryStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            storage,
            engine,
            memory,
            events,
            locks: DashMap::new(),
        }
    }

    /// Creates a session for the problem statement and drives the loop from
    /// the Coordinator. Returns the session once the loop yields control.
    pub async fn start_session(
        &self,
        problem_statement: &str,
        cancel: CancellationToken,
    ) -> Result<Session, ConclaveError> {
        let problem_statement = problem_statement.trim();
        if problem_statement.is_empty() {
            return Err(ConclaveError::Validation(
                "problem statement must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            title: derive_title(problem_statement),
            problem_statement: problem_statement.to_string(),
            status: SessionStatus::Active,
            current_persona: Some(Persona::Coordinator),
            final_solution: None,
            created_at: now,
            updated_at: now,
        };

        let lock = self.session_lock(&session.id);
        let _guard = lock.lock().await;

        self.storage.create_session(&session).await?;
        info!(session_id = session.id.as_str(), title = session.title.as_str(), "session started");

        let mut last_ts = session.created_at;
        let user_message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            from_persona: Persona::User,
            to_persona: Some(Persona::Coordinator),
            content: problem_statement.to_string(),
            message_type: MessageType::ProblemStatement,
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            is_stuck: false,
            parent_message_id: None,
            raw_response: None,
            timestamp: next_timestamp(&mut last_ts),
        };
        self.storage.insert_message(&user_message).await?;
        self.emit(
            &session.id,
            SessionEvent::MessageReceived {
                message: user_message.clone(),
            },
        )
        .await;

        self.run_loop(session, Persona::Coordinator, user_message, last_ts, cancel)
            .await
    }

    /// Resumes the loop from a persisted delegation message.
    pub async fn process_delegation(
        &self,
        session_id: &str,
        message_id: &str,
        cancel: CancellationToken,
    ) -> Result<Session, ConclaveError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.require_session(session_id).await?;
        self.require_not_terminal(&session)?;

        let message = self
            .storage
            .get_message(message_id)
            .await?
            .ok_or_else(|| ConclaveError::NotFound {
                what: "message",
                id: message_id.to_string(),
            })?;
        if message.session_id != session.id {
            return Err(ConclaveError::InvalidState {
                message: format!("message {message_id} does not belong to session {session_id}"),
            });
        }
        if message.message_type != MessageType::Delegation {
            return Err(ConclaveError::InvalidState {
                message: format!("message {message_id} is not a delegation"),
            });
        }
        let Some(target) = message.delegate_to_persona else {
            return Err(ConclaveError::InvalidState {
                message: format!("delegation {message_id} has no target persona"),
            });
        };

        session.status = SessionStatus::Active;
        let last_ts = self.latest_timestamp(&session).await?;
        self.run_loop(session, target, message, last_ts, cancel).await
    }

    /// Appends the user's clarification answer and resumes the loop with the
    /// persona that asked.
    pub async fn handle_user_clarification(
        &self,
        session_id: &str,
        response: &str,
        cancel: CancellationToken,
    ) -> Result<Session, ConclaveError> {
        let response = response.trim();
        if response.is_empty() {
            return Err(ConclaveError::Validation(
                "clarification response must not be empty".to_string(),
            ));
        }

        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.require_session(session_id).await?;
        if session.status != SessionStatus::WaitingForClarification {
            return Err(ConclaveError::InvalidState {
                message: format!(
                    "session {session_id} is {} and not waiting for clarification",
                    session.status
                ),
            });
        }

        let messages = self.storage.get_messages(session_id).await?;
        let clarification = messages
            .iter()
            .rev()
            .find(|msg| msg.message_type == MessageType::Clarification)
            .cloned()
            .ok_or_else(|| ConclaveError::InvalidState {
                message: format!("session {session_id} has no clarification to answer"),
            })?;
        let asking_persona = clarification.from_persona;

        let mut last_ts = messages
            .last()
            .map_or(session.created_at, |msg| msg.timestamp);
        let user_message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            from_persona: Persona::User,
            to_persona: Some(asking_persona),
            content: response.to_string(),
            message_type: MessageType::UserResponse,
            internal_reasoning: None,
            delegate_to_persona: None,
            delegation_context: None,
            is_stuck: false,
            parent_message_id: Some(clarification.id.clone()),
            raw_response: None,
            timestamp: next_timestamp(&mut last_ts),
        };
        self.storage.insert_message(&user_message).await?;

        session.status = SessionStatus::Active;
        session.current_persona = Some(asking_persona);
        session.updated_at = Utc::now();
        self.storage.update_session(&session).await?;

        self.emit(
            session_id,
            SessionEvent::MessageReceived {
                message: user_message.clone(),
            },
        )
        .await;
        self.emit(
            session_id,
            SessionEvent::SessionStatusChanged {
                session: session.clone(),
            },
        )
        .await;

        self.run_loop(session, asking_persona, user_message, last_ts, cancel)
            .await
    }

    /// Resumes an interrupted or stuck session from its last message.
    pub async fn resume_session(
        &self,
        session_id: &str,
        cancel: CancellationToken,
    ) -> Result<Session, ConclaveError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.require_session(session_id).await?;
        self.require_not_terminal(&session)?;

        let last = self
            .storage
            .last_message(session_id)
            .await?
            .ok_or_else(|| ConclaveError::InvalidState {
                message: format!("session {session_id} has no messages to resume from"),
            })?;

        let (persona, message) = match (last.message_type, last.delegate_to_persona) {
            (MessageType::Delegation, Some(target)) => (target, last),
            (MessageType::Stuck, _) => (Persona::Coordinator, last),
            _ => {
                return Err(ConclaveError::InvalidState {
                    message: format!(
                        "session {session_id} cannot be resumed from a {} message",
                        last.message_type
                    ),
                });
            }
        };

        session.status = SessionStatus::Active;
        let last_ts = self.latest_timestamp(&session).await?;
        self.run_loop(session, persona, message, last_ts, cancel).await
    }

    /// Marks a non-terminal session as cancelled. No broadcast is made.
    pub async fn cancel_session(&self, session_id: &str) -> Result<Session, ConclaveError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.require_session(session_id).await?;
        self.require_not_terminal(&session)?;

        session.status = SessionStatus::Cancelled;
        session.current_persona = None;
        session.updated_at = Utc::now();
        self.storage.update_session(&session).await?;
        info!(session_id, "session cancelled");
        Ok(session)
    }

    // --- Loop internals ---

    #[allow(clippy::too_many_lines)]
    async fn run_loop(
        &self,
        mut session: Session,
        start_persona: Persona,
        start_message: Message,
        mut last_ts: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> Result<Session, ConclaveError> {
        let mut current_persona = start_persona;
        let mut current_message = start_message;
        let mut depth: u32 = 0;
        let mut consecutive_stuck: u32 = 0;
        let mut stuck_personas: HashSet<Persona> = HashSet::new();

        loop {
            // Poll for cancellation between iterations; write nothing more.
            if cancel.is_cancelled() {
                info!(session_id = session.id.as_str(), "loop cancelled");
                return Ok(session);
            }

            depth += 1;
            if depth > MAX_DELEGATION_DEPTH {
                warn!(session_id = session.id.as_str(), "maximum delegation depth reached");
                let stuck_message = self.persist_response_message(
                    &session,
                    Persona::Coordinator,
                    &PersonaResponse::stuck(
                        "Maximum delegation depth reached; stopping this session.",
                        None,
                    ),
                    Some(current_message.id.clone()),
                    &mut last_ts,
                )
                .await?;
                self.emit(
                    &session.id,
                    SessionEvent::MessageReceived {
                        message: stuck_message,
                    },
                )
                .await;
                return self.finish_stuck(session).await;
            }

            session.current_persona = Some(current_persona);
            session.updated_at = Utc::now();
            self.storage.update_session(&session).await?;

            let memories = self
                .memory
                .recent(&session.id, current_persona, MEMORY_RECALL_WINDOW)
                .await?;

            let response = match self
                .engine
                .process(
                    current_persona,
                    &current_message,
                    &session,
                    &memories,
                    cancel.clone(),
                )
                .await
            {
                Ok(response) => response,
                Err(ConclaveError::Cancelled) => {
                    info!(session_id = session.id.as_str(), "loop cancelled mid-turn");
                    return Ok(session);
                }
                Err(e) => return Err(e),
            };

            let message = self
                .persist_response_message(
                    &session,
                    current_persona,
                    &response,
                    Some(current_message.id.clone()),
                    &mut last_ts,
                )
                .await?;
            self.emit(
                &session.id,
                SessionEvent::MessageReceived {
                    message: message.clone(),
                },
            )
            .await;

            debug!(
                session_id = session.id.as_str(),
                persona = %current_persona,
                response_type = ?response.response_type,
                depth,
                "routing persona response"
            );

            // A delegation made while answering a Stuck message is the
            // Coordinator recovering; it must not clear the stuck streak.
            let recovering_from_stuck = current_message.message_type == MessageType::Stuck;

            match response.response_type {
                ResponseType::Solution => {
                    if current_persona != Persona::Coordinator {
                        // Have the Coordinator compile the final solution.
                        let coordinator_memories = self
                            .memory
                            .recent(&session.id, Persona::Coordinator, MEMORY_RECALL_WINDOW)
                            .await?;
                        let compiled = match self
                            .engine
                            .process(
                                Persona::Coordinator,
                                &message,
                                &session,
                                &coordinator_memories,
                                cancel.clone(),
                            )
                            .await
                        {
                            Ok(response) => response,
                            Err(ConclaveError::Cancelled) => return Ok(session),
                            Err(e) => return Err(e),
                        };
                        let compiled_message = self
                            .persist_response_message(
                                &session,
                                Persona::Coordinator,
                                &compiled,
                                Some(message.id.clone()),
                                &mut last_ts,
                            )
                            .await?;
                        self.emit(
                            &session.id,
                            SessionEvent::MessageReceived {
                                message: compiled_message.clone(),
                            },
                        )
                        .await;
                        session.final_solution = Some(compiled_message.content);
                    } else {
                        session.final_solution = Some(message.content);
                    }

                    session.status = SessionStatus::Completed;
                    session.current_persona = None;
                    session.updated_at = Utc::now();
                    self.storage.update_session(&session).await?;
                    self.emit(
                        &session.id,
                        SessionEvent::SolutionReady {
                            session: session.clone(),
                        },
                    )
                    .await;
                    info!(session_id = session.id.as_str(), "session completed");
                    return Ok(session);
                }

                ResponseType::Clarification => {
                    session.status = SessionStatus::WaitingForClarification;
                    session.updated_at = Utc::now();
                    self.storage.update_session(&session).await?;
                    self.emit(
                        &session.id,
                        SessionEvent::SessionStatusChanged {
                            session: session.clone(),
                        },
                    )
                    .await;
                    self.emit(
                        &session.id,
                        SessionEvent::ClarificationRequested { message },
                    )
                    .await;
                    info!(
                        session_id = session.id.as_str(),
                        persona = %current_persona,
                        "session paused for clarification"
                    );
                    return Ok(session);
                }

                ResponseType::Delegation => match response.delegate_to_persona {
                    Some(target) => {
                        if !recovering_from_stuck {
                            consecutive_stuck = 0;
                        }
                        current_message = message;
                        current_persona = target;
                    }
                    None => {
                        // Malformed target: re-run the same persona on the
                        // same message so it can recover.
                        warn!(
                            session_id = session.id.as_str(),
                            persona = %current_persona,
                            "delegation with unresolvable target, re-running persona"
                        );
                    }
                },

                ResponseType::Decline => {
                    if current_persona == Persona::Coordinator {
                        // Nobody is left to re-route a coordinator decline.
                        session.current_persona = None;
                        session.updated_at = Utc::now();
                        self.storage.update_session(&session).await?;
                        return Ok(session);
                    }
                    current_message = message;
                    current_persona = Persona::Coordinator;
                }

                ResponseType::Stuck => {
                    stuck_personas.insert(current_persona);
                    consecutive_stuck += 1;
                    let all_stuck = consecutive_stuck >= MAX_CONSECUTIVE_STUCK
                        || stuck_personas.len() >= Persona::AGENTS.len()
                        || current_persona == Persona::Coordinator;
                    if all_stuck {
                        return self.finish_stuck(session).await;
                    }
                    current_message = message;
                    current_persona = Persona::Coordinator;
                }

                ResponseType::Answer => {
                    if current_persona != Persona::Coordinator
                        && message.content.len() > ANSWER_REROUTE_THRESHOLD
                    {
                        // Substantial specialist answers go back to the
                        // Coordinator to decide what happens next.
                        current_message = message;
                        current_persona = Persona::Coordinator;
                    } else {
                        session.current_persona = None;
                        session.updated_at = Utc::now();
                        self.storage.update_session(&session).await?;
                        return Ok(session);
                    }
                }
            }
        }
    }

    /// Compiles the partial solution and terminates the session as Stuck.
    async fn finish_stuck(&self, mut session: Session) -> Result<Session, ConclaveError> {
        let messages = self.storage.get_messages(&session.id).await?;
        let partial = compile_partial(&messages);

        session.status = SessionStatus::Stuck;
        session.final_solution = Some(partial.clone());
        session.current_persona = None;
        session.updated_at = Utc::now();
        self.storage.update_session(&session).await?;

        self.emit(
            &session.id,
            SessionEvent::SessionStuck {
                session: session.clone(),
                partial_solution: partial,
            },
        )
        .await;
        info!(session_id = session.id.as_str(), "session stuck");
        Ok(session)
    }

    /// Builds, persists, and returns the message for a persona response.
    async fn persist_response_message(
        &self,
        session: &Session,
        from_persona: Persona,
        response: &PersonaResponse,
        parent_message_id: Option<String>,
        last_ts: &mut DateTime<Utc>,
    ) -> Result<Message, ConclaveError> {
        let to_persona = match response.response_type {
            ResponseType::Delegation => response.delegate_to_persona,
            ResponseType::Clarification => Some(Persona::User),
            _ => None,
        };
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            from_persona,
            to_persona,
            content: response.content.clone(),
            message_type: response.response_type.message_type(),
            internal_reasoning: response.internal_reasoning.clone(),
            delegate_to_persona: response.delegate_to_persona,
            delegation_context: response.delegation_context.clone(),
            is_stuck: response.is_stuck,
            parent_message_id,
            raw_response: if response.raw_response.is_empty() {
                None
            } else {
                Some(response.raw_response.clone())
            },
            timestamp: next_timestamp(last_ts),
        };
        self.storage.insert_message(&message).await?;
        Ok(message)
    }

    /// Best-effort publish; delivery failures never stall the loop.
    async fn emit(&self, session_id: &str, event: SessionEvent) {
        if let Err(e) = self.events.publish(session_id, event).await {
            warn!(session_id, error = %e, "event publish failed");
        }
    }

    async fn require_session(&self, session_id: &str) -> Result<Session, ConclaveError> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| ConclaveError::NotFound {
                what: "session",
                id: session_id.to_string(),
            })
    }

    fn require_not_terminal(&self, session: &Session) -> Result<(), ConclaveError> {
        if session.status.is_terminal() {
            return Err(ConclaveError::InvalidState {
                message: format!("session {} is {} and terminal", session.id, session.status),
            });
        }
        Ok(())
    }

    async fn latest_timestamp(&self, session: &Session) -> Result<DateTime<Utc>, ConclaveError> {
        Ok(self
            .storage
            .last_message(&session.id)
            .await?
            .map_or(session.created_at, |msg| msg.timestamp))
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Advances the per-session clock, forcing strict millisecond monotonicity
/// even when the wall clock does not move between messages.
fn next_timestamp(last: &mut DateTime<Utc>) -> DateTime<Utc> {
    let mut now = Utc::now();
    if now.timestamp_millis() <= last.timestamp_millis() {
        now = *last + Duration::milliseconds(1);
    }
    *last = now;
    now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_timestamp_is_strictly_increasing() {
        let mut last = Utc::now();
        let first = next_timestamp(&mut last);
        let second = next_timestamp(&mut last);
        let third = next_timestamp(&mut last);
        assert!(first.timestamp_millis() < second.timestamp_millis());
        assert!(second.timestamp_millis() < third.timestamp_millis());
    }

    #[test]
    fn next_timestamp_steps_past_a_future_last() {
        let mut last = Utc::now() + Duration::seconds(10);
        let expected = last + Duration::milliseconds(1);
        let ts = next_timestamp(&mut last);
        assert_eq!(ts, expected);
    }
}
