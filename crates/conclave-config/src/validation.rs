// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: non-empty paths, a plausible endpoint URL, positive timeouts
//! and caps.

use crate::diagnostic::ConfigError;
use crate::model::ConclaveConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ConclaveConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.llm.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "llm.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("llm.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.llm.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "llm.default_model must not be empty".to_string(),
        });
    }

    if config.llm.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "llm.timeout_secs must be greater than zero".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.workspace.root.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "workspace.root must not be empty".to_string(),
        });
    }

    if config.memory.max_identifier_words == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_identifier_words must be at least 1".to_string(),
        });
    }

    if config.memory.max_content_words == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_content_words must be at least 1".to_string(),
        });
    }

    if config.memory.max_entries == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_entries must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
