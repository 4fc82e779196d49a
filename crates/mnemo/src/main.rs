// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo - a conversational agent with short-term and long-term memory.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod backends;
mod chat;
mod scenarios;

use clap::{Parser, Subcommand};
use colored::Colorize;
use mnemo_config::{ConfigError, MnemoConfig};

/// Mnemo - a conversational agent with short-term and long-term memory.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session (default).
    Chat,
    /// Run the built-in memory scenarios against the configured model.
    Test {
        /// Scenario to run, e.g. `basic_memory_storage`. Runs all when omitted.
        scenario: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match mnemo_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            mnemo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(error) = check_api_key(&config) {
        mnemo_config::render_errors(&[error]);
        std::process::exit(1);
    }

    let result = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::run_chat(config).await,
        Commands::Test { scenario } => {
            scenarios::run_scenarios(config, scenario.as_deref()).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Fails with a diagnostic when no OpenAI key is configured.
fn check_api_key(config: &MnemoConfig) -> Result<(), ConfigError> {
    mnemo_openai::resolve_api_key(&config.openai)
        .map(|_| ())
        .map_err(|_| ConfigError::MissingKey {
            key: "openai.api_key".to_string(),
            env_var: Some(mnemo_openai::API_KEY_ENV_VAR.to_string()),
        })
}

/// Logs go to stderr; `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["mnemo"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_subcommand_takes_optional_scenario() {
        let cli = Cli::try_parse_from(["mnemo", "test", "memory_types"]).unwrap();
        match cli.command {
            Some(Commands::Test { scenario }) => {
                assert_eq!(scenario.as_deref(), Some("memory_types"))
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["mnemo", "test"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Test { scenario: None })));
    }

    #[test]
    fn configured_key_passes_check() {
        let mut config = MnemoConfig::default();
        config.openai.api_key = Some("sk-test".into());
        assert!(check_api_key(&config).is_ok());
    }
}
