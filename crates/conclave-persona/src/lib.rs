// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona engine for the Conclave orchestrator.
//!
//! Owns prompt assembly (base prompt, response-format reference, session
//! context, recalled memories, bounded history), the single provider call per
//! persona turn, directive side effects, and the default roster
//! configurations.

pub mod defaults;
pub mod engine;
pub mod prompt;

pub use defaults::default_persona_configs;
pub use engine::PersonaEngine;
