// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo chat` command implementation.
//!
//! Logs a user in by name, opens a fresh session, and runs a readline REPL
//! where every non-command line is one workflow turn. The session is ended
//! when the REPL exits.

use std::str::FromStr;

use colored::Colorize;
use mnemo_agent::{MemoryWorkflow, TurnResult, create_memory_workflow};
use mnemo_config::MnemoConfig;
use mnemo_core::MnemoError;
use mnemo_storage::{JsonMap, SessionRegistry};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use strum::EnumString;
use tracing::{info, warn};

use crate::backends::Backends;

/// Sessions shown by the `sessions` command.
const SESSIONS_SHOWN: usize = 5;
/// Users shown by the `users` command.
const USERS_SHOWN: usize = 10;

/// Words the REPL treats as commands rather than chat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum ChatCommand {
    #[strum(serialize = "quit", serialize = "exit", serialize = "bye")]
    Quit,
    #[strum(serialize = "stats")]
    Stats,
    #[strum(serialize = "clear")]
    Clear,
    #[strum(serialize = "sessions")]
    Sessions,
    #[strum(serialize = "users")]
    Users,
    #[strum(serialize = "cleanup")]
    Cleanup,
    #[strum(serialize = "help")]
    Help,
}

/// Identity of the logged-in chat.
struct ChatIdentity {
    user_id: String,
    session_id: String,
}

/// Runs the `mnemo chat` REPL.
pub async fn run_chat(config: MnemoConfig) -> Result<(), MnemoError> {
    let backends = Backends::open(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| MnemoError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "Mnemo memory agent".bold().green());
    println!("{}", "=".repeat(50));

    let username = match rl.readline("Enter your username: ") {
        Ok(line) if !line.trim().is_empty() => line.trim().to_string(),
        Ok(_) => "anonymous".to_string(),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => return backends.close().await,
        Err(e) => return Err(MnemoError::Internal(format!("readline failed: {e}"))),
    };

    let user_id = match backends.registry.find_user_by_username(&username).await? {
        Some(user) => {
            println!("Welcome back, {}! ({})", username.bold(), user.user_id.dimmed());
            user.user_id
        }
        None => {
            let user_id = backends.registry.create_user(&username, JsonMap::new()).await?;
            println!("Created new user: {} ({})", username.bold(), user_id.dimmed());
            user_id
        }
    };
    let session_id = backends.registry.create_session(&user_id, JsonMap::new()).await?;
    println!("Session ID: {}", session_id.dimmed());

    let chat = ChatIdentity {
        user_id,
        session_id,
    };
    let mut workflow = create_memory_workflow(
        &config,
        backends.provider.clone(),
        backends.embedder.clone(),
        backends.index.clone(),
        Some(chat.user_id.as_str()),
        Some(chat.session_id.as_str()),
    )?;

    println!("{}", "=".repeat(50));
    println!(
        "Type {} to end the conversation, {} for more commands.",
        "quit".yellow(),
        "help".yellow()
    );

    let prompt = format!("{}: ", "You".cyan());
    let mut turns = 0usize;
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        if let Ok(command) = ChatCommand::from_str(input) {
            if command == ChatCommand::Quit {
                println!("Goodbye! Thanks for chatting!");
                break;
            }
            if let Err(e) =
                handle_command(command, &config, &backends.registry, &mut workflow, &chat).await
            {
                eprintln!("{}: {e}", "error".red());
            }
            continue;
        }

        if let Err(e) = backends
            .registry
            .update_session_activity(&chat.session_id)
            .await
        {
            warn!(error = %e, "failed to record session activity");
        }

        println!("{}", "Thinking...".dimmed());
        let result = workflow.run(input).await;
        print_turn(&result);
        turns += 1;
    }

    backends.registry.end_session(&chat.session_id).await?;
    info!(session_id = %chat.session_id, turns, "chat session ended");
    println!("Session {} ended", chat.session_id.dimmed());

    drop(workflow);
    backends.close().await
}

async fn handle_command(
    command: ChatCommand,
    config: &MnemoConfig,
    registry: &SessionRegistry,
    workflow: &mut MemoryWorkflow,
    chat: &ChatIdentity,
) -> Result<(), MnemoError> {
    match command {
        ChatCommand::Quit => {}
        ChatCommand::Stats => {
            let stats = workflow.memory_stats().await?;
            let registry_stats = registry.stats().await?;
            println!("\n{}", "Memory Statistics".bold());
            println!("Short-term messages: {}", stats.short_term.total_messages);
            println!("Long-term memories: {}", stats.long_term.total_memories);
            println!("User ID: {}", chat.user_id);
            println!("Session ID: {}", chat.session_id);
            println!("Total users: {}", registry_stats.total_users);
            println!("Active sessions: {}", registry_stats.active_sessions);
        }
        ChatCommand::Clear => {
            workflow.agent_mut().clear_short_term();
            println!("Short-term memory cleared!");
        }
        ChatCommand::Sessions => {
            let sessions = registry.get_user_sessions(&chat.user_id, false).await?;
            println!("\n{} ({} total):", "Your Sessions".bold(), sessions.len());
            for (i, session) in sessions.iter().take(SESSIONS_SHOWN).enumerate() {
                let status = if session.session_id == chat.session_id {
                    "Current".green()
                } else {
                    "Past".dimmed()
                };
                println!(
                    "{}. {status} {} - {}",
                    i + 1,
                    session.session_id,
                    session
                        .created_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                );
            }
        }
        ChatCommand::Users => {
            let users = registry.list_users().await?;
            println!("\n{} ({} total):", "System Users".bold(), users.len());
            for (i, user) in users.iter().take(USERS_SHOWN).enumerate() {
                println!(
                    "{}. {} ({}) - {} sessions",
                    i + 1,
                    user.username,
                    user.user_id,
                    user.total_sessions
                );
            }
        }
        ChatCommand::Cleanup => {
            let max_age = i64::try_from(config.session.max_age_hours)
                .ok()
                .and_then(chrono::Duration::try_hours)
                .unwrap_or(chrono::Duration::MAX);
            let removed = registry.cleanup_old_sessions(max_age).await?;
            println!("Cleaned up {removed} old sessions");
        }
        ChatCommand::Help => print_help(),
    }
    Ok(())
}

fn print_turn(result: &TurnResult) {
    println!("\n{}: {}", "Agent".green().bold(), result.response);

    if !result.relevant_memories.is_empty() {
        println!(
            "{}",
            format!("Used {} relevant memories", result.relevant_memories.len()).dimmed()
        );
    }
    if !result.memory_suggestions.is_empty() {
        println!(
            "{}",
            format!(
                "Suggested {} items for long-term storage",
                result.memory_suggestions.len()
            )
            .dimmed()
        );
    }
    if !result.stored_memory_ids.is_empty() {
        println!(
            "{}",
            format!("Stored {} new memories", result.stored_memory_ids.len()).dimmed()
        );
    }
    if let Some(error) = &result.error {
        println!("{}: {error}", "warning".yellow());
    }
}

fn print_help() {
    println!("\n{}", "Available Commands".bold());
    println!("- 'stats': Show memory statistics");
    println!("- 'clear': Clear short-term memory");
    println!("- 'sessions': Show your session history");
    println!("- 'users': Show system users");
    println!("- 'cleanup': Clean up old sessions");
    println!("- 'quit'/'exit'/'bye': End conversation");
    println!("- 'help': Show this help message");
}
