// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session event fan-out.
//!
//! [`SessionBus`] implements [`EventSink`] over one tokio broadcast channel
//! per session, created lazily. Within a session, subscribers observe events
//! in publication order; nothing is guaranteed across sessions. Publication
//! is best-effort: a session with no subscribers drops its events, and a
//! lagging subscriber loses the oldest buffered events (the broadcast
//! channel's back-pressure policy).

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use conclave_core::{ConclaveError, EventSink, SessionEvent};

/// Buffered events per session channel before a slow subscriber lags.
const CHANNEL_CAPACITY: usize = 256;

/// Broadcast-based event sink keyed by session.
pub struct SessionBus {
    channels: DashMap<String, broadcast::Sender<SessionEvent>>,
}

impl SessionBus {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribes to a session's event feed.
    ///
    /// Events published before the first subscription are not replayed.
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<SessionEvent> {
        self.sender(session_id).subscribe()
    }

    /// Number of live subscribers for a session.
    pub fn subscriber_count(&self, session_id: &str) -> usize {
        self.channels
            .get(session_id)
            .map_or(0, |entry| entry.receiver_count())
    }

    /// Drops a session's channel, disconnecting its subscribers.
    pub fn remove_session(&self, session_id: &str) {
        self.channels.remove(session_id);
    }

    fn sender(&self, session_id: &str) -> broadcast::Sender<SessionEvent> {
        self.channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for SessionBus {
    async fn publish(&self, session_id: &str, event: SessionEvent) -> Result<(), ConclaveError> {
        let sender = self.sender(session_id);
        // send() only fails when there are no receivers; that is fine, the
        // event is simply unobserved.
        let delivered = sender.send(event.clone()).unwrap_or(0);
        debug!(session_id, kind = event.kind(), delivered, "event published");
        Ok(())
    }
}
