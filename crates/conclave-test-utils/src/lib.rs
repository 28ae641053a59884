// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Conclave integration tests.
//!
//! Deterministic fakes for every adapter boundary: a scripted LLM provider,
//! a recording event sink, an in-memory workspace, and temp-database setup.

pub mod harness;
pub mod memory_workspace;
pub mod mock_provider;
pub mod recording_sink;

pub use harness::temp_storage;
pub use memory_workspace::MemoryWorkspace;
pub use mock_provider::MockProvider;
pub use recording_sink::RecordingSink;
