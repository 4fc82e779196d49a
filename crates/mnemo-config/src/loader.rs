// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./mnemo.toml` > `~/.config/mnemo/mnemo.toml` > `/etc/mnemo/mnemo.toml`,
//! with `MNEMO_` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MnemoConfig;

/// Config file name searched in every layer.
pub const CONFIG_FILE: &str = "mnemo.toml";

const SYSTEM_CONFIG: &str = "/etc/mnemo/mnemo.toml";

/// Sections recognized by the environment mapping.
const SECTIONS: &[&str] = &["agent", "openai", "storage", "memory", "session"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnemo/mnemo.toml`
/// 3. `~/.config/mnemo/mnemo.toml`
/// 4. `./mnemo.toml`
/// 5. `MNEMO_*` environment variables
pub fn load_config() -> Result<MnemoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, then env overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/mnemo/mnemo.toml`, when a config dir exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mnemo").join(CONFIG_FILE))
}

/// Candidate file paths, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}

/// Maps `MNEMO_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after the section name becomes a dot, so
/// `MNEMO_MEMORY_SHORT_TERM_SIZE` maps to `memory.short_term_size`.
fn env_provider() -> Env {
    Env::prefixed("MNEMO_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
