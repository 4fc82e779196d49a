// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn workflow state machine.
//!
//! Every turn walks the same stages:
//! ProcessInput -> RetrieveMemories -> GenerateResponse -> AnalyzeMemory ->
//! (StoreMemory if anything was suggested) -> Finalize -> Done.
//!
//! A failing stage records its error in the turn state and substitutes a
//! default so the turn always reaches `Finalize`.

use std::sync::Arc;

use mnemo_config::MnemoConfig;
use mnemo_core::{
    EmbeddingAdapter, MnemoError, Namespace, ProviderAdapter, ProviderMessage, VectorIndex,
};
use mnemo_memory::{
    EmbeddingGateway, LongTermMemoryManager, MemoryResult, MemorySuggestion, RetrieveOptions,
};
use serde::Serialize;
use strum::Display;
use tracing::{debug, error, info, instrument};

use crate::agent::{MemoryAgent, MemoryStats};

/// Reply used when the language model could not produce one.
pub const RESPONSE_APOLOGY: &str =
    "I apologize, but I encountered an error generating a response.";

/// Stages of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    ProcessInput,
    RetrieveMemories,
    GenerateResponse,
    AnalyzeMemory,
    StoreMemory,
    Finalize,
    Done,
}

/// State threaded through the stages of one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    pub user_input: String,
    pub agent_response: String,
    pub relevant_memories: Vec<MemoryResult>,
    pub memory_suggestions: Vec<MemorySuggestion>,
    pub should_store_memory: bool,
    pub stored_memory_ids: Vec<String>,
    pub error: Option<String>,
}

impl TurnState {
    fn new(user_input: &str) -> Self {
        Self {
            user_input: user_input.to_string(),
            ..Self::default()
        }
    }
}

/// Outcome of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub response: String,
    pub relevant_memories: Vec<MemoryResult>,
    pub memory_suggestions: Vec<MemorySuggestion>,
    pub stored_memory_ids: Vec<String>,
    pub error: Option<String>,
    /// Short-term buffer after the turn, system messages included.
    pub short_term_context: Vec<ProviderMessage>,
}

/// Drives conversation turns for one agent.
///
/// `run` borrows the workflow mutably, so turns on one session never overlap.
pub struct MemoryWorkflow {
    agent: MemoryAgent,
    max_results: usize,
}

impl MemoryWorkflow {
    pub fn new(agent: MemoryAgent, max_results: usize) -> Self {
        info!(agent = agent.name(), "memory workflow initialized");
        Self { agent, max_results }
    }

    pub fn agent(&self) -> &MemoryAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut MemoryAgent {
        &mut self.agent
    }

    pub async fn memory_stats(&self) -> Result<MemoryStats, MnemoError> {
        self.agent.stats().await
    }

    /// Runs one full turn for `user_input`.
    #[instrument(skip_all, fields(namespace = %self.agent.long_term().namespace()))]
    pub async fn run(&mut self, user_input: &str) -> TurnResult {
        let mut state = TurnState::new(user_input);
        let mut stage = Stage::ProcessInput;

        while stage != Stage::Done {
            debug!(stage = %stage, "entering stage");
            stage = match stage {
                Stage::ProcessInput => {
                    self.process_input(&state);
                    Stage::RetrieveMemories
                }
                Stage::RetrieveMemories => {
                    self.retrieve_memories(&mut state).await;
                    Stage::GenerateResponse
                }
                Stage::GenerateResponse => {
                    self.generate_response(&mut state).await;
                    Stage::AnalyzeMemory
                }
                Stage::AnalyzeMemory => {
                    self.analyze_memory(&mut state);
                    if state.should_store_memory {
                        Stage::StoreMemory
                    } else {
                        Stage::Finalize
                    }
                }
                Stage::StoreMemory => {
                    self.store_memory(&mut state).await;
                    Stage::Finalize
                }
                Stage::Finalize => Stage::Done,
                Stage::Done => Stage::Done,
            };
        }

        TurnResult {
            response: state.agent_response,
            relevant_memories: state.relevant_memories,
            memory_suggestions: state.memory_suggestions,
            stored_memory_ids: state.stored_memory_ids,
            error: state.error,
            short_term_context: self.agent.short_term().conversation_context(true),
        }
    }

    fn process_input(&mut self, state: &TurnState) {
        self.agent
            .short_term_mut()
            .add_user_message(state.user_input.clone());
    }

    async fn retrieve_memories(&self, state: &mut TurnState) {
        state.relevant_memories = self
            .agent
            .long_term()
            .retrieve(
                &state.user_input,
                RetrieveOptions {
                    max_results: Some(self.max_results),
                    ..RetrieveOptions::default()
                },
            )
            .await;
        debug!(count = state.relevant_memories.len(), "memories retrieved");
    }

    async fn generate_response(&mut self, state: &mut TurnState) {
        let context = self
            .agent
            .prepare_context(&state.user_input, &state.relevant_memories);
        match self.agent.generate_response(context).await {
            Ok(response) => {
                self.agent
                    .short_term_mut()
                    .add_assistant_message(response.clone());
                state.agent_response = response;
            }
            Err(e) => {
                error!(error = %e, "response generation failed");
                state.error = Some(e.to_string());
                state.agent_response = RESPONSE_APOLOGY.to_string();
            }
        }
    }

    fn analyze_memory(&self, state: &mut TurnState) {
        state.memory_suggestions = self
            .agent
            .analyze(&state.user_input, &state.agent_response);
        state.should_store_memory = !state.memory_suggestions.is_empty();
        debug!(count = state.memory_suggestions.len(), "memory suggestions");
    }

    /// Stores each suggestion independently; one failure does not stop the rest.
    async fn store_memory(&self, state: &mut TurnState) {
        for suggestion in &state.memory_suggestions {
            match self.agent.store_suggestion(suggestion).await {
                Ok(id) => {
                    debug!(
                        memory_id = %id,
                        memory_type = %suggestion.memory_type,
                        "memory stored"
                    );
                    state.stored_memory_ids.push(id);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        memory_type = %suggestion.memory_type,
                        "failed to store memory suggestion"
                    );
                    state.error = Some(e.to_string());
                }
            }
        }
    }
}

/// Wires an agent and workflow for one identity.
///
/// Memories live in the namespace derived from `user_id` and `session_id`
/// (see [`Namespace::derive`], whose identity errors are returned here).
pub fn create_memory_workflow(
    config: &MnemoConfig,
    provider: Arc<dyn ProviderAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    index: Arc<dyn VectorIndex>,
    user_id: Option<&str>,
    session_id: Option<&str>,
) -> Result<MemoryWorkflow, MnemoError> {
    let namespace = Namespace::derive(user_id, session_id, &config.memory.default_collection)?;
    let long_term = LongTermMemoryManager::new(
        namespace,
        EmbeddingGateway::new(embedder, &config.memory),
        index,
        &config.memory,
    );
    let agent = MemoryAgent::new(config, provider, long_term);
    Ok(MemoryWorkflow::new(agent, config.memory.max_results))
}
