// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration core for Conclave.
//!
//! The [`Orchestrator`] owns the session state machine and the bounded
//! delegation loop; [`recovery`] owns the one-shot startup transition of
//! stale sessions. Everything else (provider, storage, events, workspace)
//! is injected behind the `conclave-core` traits.

pub mod orchestrator;
pub mod partial;
pub mod recovery;
pub mod title;

pub use orchestrator::{Orchestrator, MAX_CONSECUTIVE_STUCK, MAX_DELEGATION_DEPTH};
pub use recovery::mark_interrupted_sessions;
