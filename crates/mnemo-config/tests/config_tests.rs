// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use mnemo_config::diagnostic::ConfigError;
use mnemo_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "Recall"
description = "test agent"
log_level = "debug"

[openai]
api_key = "sk-test"
base_url = "http://localhost:9999"
chat_model = "gpt-4o"
embedding_model = "text-embedding-3-large"
embedding_dimension = 3072
temperature = 0.2
max_tokens = 256
timeout_secs = 5

[storage]
database_path = "/tmp/mnemo-test.db"
wal_mode = false

[memory]
short_term_size = 4
similarity_threshold = 0.5
max_results = 3
chunk_size = 500
chunk_overlap = 50
embedding_batch_size = 16
default_collection = "scratch"

[session]
max_age_hours = 12
active_window_secs = 60
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "Recall");
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.openai.embedding_dimension, 3072);
    assert_eq!(config.openai.max_tokens, 256);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.memory.short_term_size, 4);
    assert_eq!(config.memory.max_results, 3);
    assert_eq!(config.memory.default_collection, "scratch");
    assert_eq!(config.session.max_age_hours, 12);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.memory.short_term_size, 10);
    assert_eq!(config.openai.chat_model, "gpt-4o-mini");
    assert!(config.openai.api_key.is_none());
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[memory]
max_reslts = 3
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "max_reslts" && s == "max_results"
        )
    });
    assert!(found, "expected a suggestion for max_reslts, got: {errors:?}");
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[memory]
short_term_size = "ten"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }))
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[memory]
chunk_size = 100
chunk_overlap = 100
"#;
    let errors = load_and_validate_str(toml).expect_err("overlap must be smaller");
    assert!(errors[0].to_string().contains("chunk_overlap"));
}

#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[agent]\nname = \"FromFile\"\n").expect("write config");

    let config = load_config_from_path(&path).expect("should load");
    assert_eq!(config.agent.name, "FromFile");
}
