// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording event sink for deterministic broadcast assertions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use conclave_core::{ConclaveError, EventSink, SessionEvent};

/// An `EventSink` that records every published event per session, in order.
pub struct RecordingSink {
    events: Arc<Mutex<HashMap<String, Vec<SessionEvent>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Events published for one session, in publication order.
    pub async fn events_for(&self, session_id: &str) -> Vec<SessionEvent> {
        self.events
            .lock()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// The `kind()` labels of one session's events, in order.
    pub async fn kinds_for(&self, session_id: &str) -> Vec<&'static str> {
        self.events_for(session_id)
            .await
            .iter()
            .map(SessionEvent::kind)
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn publish(&self, session_id: &str, event: SessionEvent) -> Result<(), ConclaveError> {
        self.events
            .lock()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use conclave_core::{Session, SessionStatus};

    fn session(id: &str) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            title: "t".into(),
            problem_statement: "p".into(),
            status: SessionStatus::Active,
            current_persona: None,
            final_solution: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn records_events_per_session_in_order() {
        let sink = RecordingSink::new();
        sink.publish(
            "s1",
            SessionEvent::SessionStatusChanged {
                session: session("s1"),
            },
        )
        .await
        .unwrap();
        sink.publish(
            "s1",
            SessionEvent::SolutionReady {
                session: session("s1"),
            },
        )
        .await
        .unwrap();
        sink.publish(
            "s2",
            SessionEvent::SolutionReady {
                session: session("s2"),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            sink.kinds_for("s1").await,
            vec!["session_status_changed", "solution_ready"]
        );
        assert_eq!(sink.kinds_for("s2").await, vec!["solution_ready"]);
        assert!(sink.events_for("s3").await.is_empty());
    }
}
