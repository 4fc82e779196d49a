// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.name.trim().is_empty() {
        fail("agent.name must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let memory = &config.memory;
    if memory.short_term_size == 0 {
        fail("memory.short_term_size must be at least 1".to_string());
    }
    if !(0.0..=1.0).contains(&memory.similarity_threshold) {
        fail(format!(
            "memory.similarity_threshold must be within [0, 1], got {}",
            memory.similarity_threshold
        ));
    }
    if memory.max_results == 0 {
        fail("memory.max_results must be at least 1".to_string());
    }
    if memory.chunk_size == 0 {
        fail("memory.chunk_size must be at least 1".to_string());
    }
    if memory.chunk_overlap >= memory.chunk_size {
        fail(format!(
            "memory.chunk_overlap ({}) must be smaller than memory.chunk_size ({})",
            memory.chunk_overlap, memory.chunk_size
        ));
    }
    if memory.embedding_batch_size == 0 {
        fail("memory.embedding_batch_size must be at least 1".to_string());
    }
    if memory.default_collection.trim().is_empty() {
        fail("memory.default_collection must not be empty".to_string());
    }

    let openai = &config.openai;
    if !(0.0..=2.0).contains(&openai.temperature) {
        fail(format!(
            "openai.temperature must be within [0, 2], got {}",
            openai.temperature
        ));
    }
    if openai.embedding_dimension == 0 {
        fail("openai.embedding_dimension must be at least 1".to_string());
    }
    if !openai.base_url.starts_with("http://") && !openai.base_url.starts_with("https://") {
        fail(format!(
            "openai.base_url `{}` must start with http:// or https://",
            openai.base_url
        ));
    }

    if config.session.active_window_secs == 0 {
        fail("session.active_window_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
