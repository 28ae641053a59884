// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event sink trait for per-session fan-out.

use async_trait::async_trait;

use crate::error::ConclaveError;
use crate::types::SessionEvent;

/// Delivers ordered per-session events to subscribers.
///
/// The core hands each event to the sink immediately after the corresponding
/// state is persisted; fan-out and back-pressure are the sink's concern. The
/// core guarantees insertion order within a session and nothing between
/// sessions. A publish is best-effort: the loop does not block on delivery.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, session_id: &str, event: SessionEvent) -> Result<(), ConclaveError>;
}
