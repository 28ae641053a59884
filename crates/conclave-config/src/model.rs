// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Conclave orchestrator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Conclave configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConclaveConfig {
    /// Orchestrator runtime settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// LLM endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-persona memory limits.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Workspace directory for persona file writes.
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Orchestrator runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// LLM endpoint configuration.
///
/// Conclave speaks the OpenAI-compatible chat-completions wire format, so
/// `base_url` may point at any conforming endpoint (a local model server, a
/// hosted gateway).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the chat-completions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as a bearer token. `None` sends no authorization header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used when a persona configuration does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("conclave").join("conclave.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("conclave.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Per-(session, persona) memory limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Maximum words in a memory identifier.
    #[serde(default = "default_max_identifier_words")]
    pub max_identifier_words: usize,

    /// Maximum words in a memory body.
    #[serde(default = "default_max_content_words")]
    pub max_content_words: usize,

    /// Maximum entries a persona may hold per session before eviction.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_identifier_words: default_max_identifier_words(),
            max_content_words: default_max_content_words(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_identifier_words() -> usize {
    10
}

fn default_max_content_words() -> usize {
    2000
}

fn default_max_entries() -> usize {
    10
}

/// Workspace directory configuration for `FILE` directives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Root directory persona file writes are confined to.
    #[serde(default = "default_workspace_root")]
    pub root: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

fn default_workspace_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("conclave").join("workspace"))
        .unwrap_or_else(|| std::path::PathBuf::from("workspace"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ConclaveConfig::default();
        assert_eq!(config.orchestrator.log_level, "info");
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.memory.max_identifier_words, 10);
        assert_eq!(config.memory.max_content_words, 2000);
        assert_eq!(config.memory.max_entries, 10);
        assert!(config.storage.wal_mode);
        assert!(config.storage.database_path.ends_with("conclave.db"));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ConclaveConfig::default();
        let rendered = toml::to_string(&config).unwrap();
        let parsed: ConclaveConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.llm.base_url, config.llm.base_url);
        assert_eq!(parsed.memory.max_entries, config.memory.max_entries);
    }
}
