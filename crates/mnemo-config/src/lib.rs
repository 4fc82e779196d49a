// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Mnemo memory agent.
//!
//! TOML parsing with strict key checking, an XDG file hierarchy, `MNEMO_`
//! environment overrides, and miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use mnemo_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("short-term capacity: {}", config.memory.short_term_size);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AgentConfig, MemoryConfig, MnemoConfig, OpenAiConfig, SessionConfig, StorageConfig,
};

/// Load configuration from the file hierarchy and validate it.
pub fn load_and_validate() -> Result<MnemoConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from an inline TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<MnemoConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Reads every config file that exists so diagnostics can point into it.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let path = std::fs::canonicalize(&path).unwrap_or(path);
            Some((path.display().to_string(), content))
        })
        .collect()
}
