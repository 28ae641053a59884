// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./conclave.toml` > `~/.config/conclave/conclave.toml`
//! > `/etc/conclave/conclave.toml` with environment variable overrides via the
//! `CONCLAVE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConclaveConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/conclave/conclave.toml` (system-wide)
/// 3. `~/.config/conclave/conclave.toml` (user XDG config)
/// 4. `./conclave.toml` (local directory)
/// 5. `CONCLAVE_*` environment variables
pub fn load_config() -> Result<ConclaveConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ConclaveConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConclaveConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConclaveConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConclaveConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConclaveConfig::default()))
        .merge(Toml::file("/etc/conclave/conclave.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("conclave/conclave.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("conclave.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CONCLAVE_LLM_BASE_URL` must map to
/// `llm.base_url`, not `llm.base.url`.
fn env_provider() -> Env {
    Env::prefixed("CONCLAVE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CONCLAVE_LLM_BASE_URL -> "llm_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("orchestrator_", "orchestrator.", 1)
            .replacen("llm_", "llm.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("workspace_", "workspace.", 1);
        mapped.into()
    })
}
