// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Conclave orchestrator.
//!
//! Layered loading (compiled defaults, system and XDG TOML files, local
//! `conclave.toml`, `CONCLAVE_*` env vars), strict unknown-key rejection,
//! and collected semantic validation rendered as miette diagnostics.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use model::ConclaveConfig;

/// Load configuration from the standard hierarchy, then validate it.
///
/// Returns every collected problem (deserialization and semantic) rather
/// than failing on the first.
pub fn load_and_validate() -> Result<ConclaveConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
