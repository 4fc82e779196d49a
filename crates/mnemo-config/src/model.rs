// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
///
/// Loaded once at startup and handed to components by reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI-compatible completion and embedding endpoint settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Short-term and long-term memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Session registry settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// One-line description used in the system prompt.
    #[serde(default = "default_agent_description")]
    pub description: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replaces the built-in system prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            description: default_agent_description(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "MemoryAgent".to_string()
}

fn default_agent_description() -> String {
    "An AI agent with short-term and long-term memory capabilities".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI-compatible API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API, without the `/v1/...` path.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Expected embedding vector dimension.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Sampling temperature for responses.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on response tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding sessions and memories.
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
        .map(|p| p.join("mnemo").join("mnemo.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("mnemo.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Memory tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Capacity of the short-term conversation buffer.
    #[serde(default = "default_short_term_size")]
    pub short_term_size: usize,

    /// Minimum cosine similarity for the first retrieval pass.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Maximum long-term memories returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Character length of document chunks.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Texts per embedding request.
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,

    /// Collection used when no identity is bound.
    #[serde(default = "default_collection")]
    pub default_collection: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_size: default_short_term_size(),
            similarity_threshold: default_similarity_threshold(),
            max_results: default_max_results(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding_batch_size: default_embedding_batch_size(),
            default_collection: default_collection(),
        }
    }
}

fn default_short_term_size() -> usize {
    10
}

fn default_similarity_threshold() -> f32 {
    0.2
}

fn default_max_results() -> usize {
    5
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_embedding_batch_size() -> usize {
    100
}

fn default_collection() -> String {
    "memory_collection".to_string()
}

/// Session registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Sessions idle longer than this are removed by cleanup.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,

    /// A session counts as active if it saw activity within this window.
    #[serde(default = "default_active_window_secs")]
    pub active_window_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            active_window_secs: default_active_window_secs(),
        }
    }
}

fn default_max_age_hours() -> u64 {
    24
}

fn default_active_window_secs() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MnemoConfig::default();
        assert_eq!(config.agent.name, "MemoryAgent");
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
        assert_eq!(config.openai.embedding_dimension, 1536);
        assert_eq!(config.memory.short_term_size, 10);
        assert!((config.memory.similarity_threshold - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.memory.max_results, 5);
        assert_eq!(config.memory.chunk_size, 1000);
        assert_eq!(config.memory.chunk_overlap, 200);
        assert_eq!(config.memory.embedding_batch_size, 100);
        assert_eq!(config.memory.default_collection, "memory_collection");
        assert_eq!(config.session.max_age_hours, 24);
        assert_eq!(config.session.active_window_secs, 3600);
        assert!(config.storage.database_path.ends_with("mnemo.db"));
    }
}
