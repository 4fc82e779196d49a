// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory-augmented agent: prompt assembly, response generation and
//! suggestion storage over one short-term buffer and one long-term namespace.

use std::sync::Arc;

use mnemo_config::MnemoConfig;
use mnemo_core::{MnemoError, ProviderAdapter, ProviderMessage, ProviderRequest, Role};
use mnemo_memory::{
    KeywordAnalyzer, LongTermMemoryManager, LongTermStats, MemoryAnalyzer, MemoryResult,
    MemorySuggestion, ShortTermMemory, ShortTermStats, StoreRequest,
};
use serde::Serialize;
use tracing::{debug, info};

/// Combined counters for both memory tiers.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub short_term: ShortTermStats,
    pub long_term: LongTermStats,
}

/// Agent bound to one identity's memories.
pub struct MemoryAgent {
    name: String,
    system_prompt: String,
    provider: Arc<dyn ProviderAdapter>,
    analyzer: Arc<dyn MemoryAnalyzer>,
    short_term: ShortTermMemory,
    long_term: LongTermMemoryManager,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl MemoryAgent {
    /// Builds an agent with the keyword analyzer.
    ///
    /// The system prompt is `agent.system_prompt` when configured, otherwise
    /// one generated from the agent's name and description.
    pub fn new(
        config: &MnemoConfig,
        provider: Arc<dyn ProviderAdapter>,
        long_term: LongTermMemoryManager,
    ) -> Self {
        let system_prompt = config
            .agent
            .system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                default_system_prompt(&config.agent.name, &config.agent.description)
            });

        info!(
            agent = %config.agent.name,
            namespace = %long_term.namespace(),
            "memory agent initialized"
        );

        Self {
            name: config.agent.name.clone(),
            system_prompt,
            provider,
            analyzer: Arc::new(KeywordAnalyzer::new()),
            short_term: ShortTermMemory::new(config.memory.short_term_size),
            long_term,
            model: config.openai.chat_model.clone(),
            temperature: config.openai.temperature,
            max_tokens: config.openai.max_tokens,
        }
    }

    /// Replaces the suggestion analyzer.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn MemoryAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn short_term(&self) -> &ShortTermMemory {
        &self.short_term
    }

    pub fn short_term_mut(&mut self) -> &mut ShortTermMemory {
        &mut self.short_term
    }

    pub fn long_term(&self) -> &LongTermMemoryManager {
        &self.long_term
    }

    /// Builds the prompt for one turn.
    ///
    /// System prompt with a `RELEVANT MEMORIES:` block when there are any,
    /// then the buffered conversation without system messages, then the
    /// current user message. A trailing buffered copy of the current message
    /// is dropped so it is not sent twice.
    pub fn prepare_context(
        &self,
        user_message: &str,
        memories: &[MemoryResult],
    ) -> Vec<ProviderMessage> {
        let mut system = self.system_prompt.clone();
        if !memories.is_empty() {
            system.push_str("\n\nRELEVANT MEMORIES:\n");
            for (i, result) in memories.iter().enumerate() {
                let memory = &result.memory;
                system.push_str(&format!(
                    "{}. [{}] {}",
                    i + 1,
                    memory.memory_type.label(),
                    memory.content
                ));
                if let Some(context) = memory.context.as_deref().filter(|c| !c.is_empty()) {
                    system.push_str(&format!(" (Context: {context})"));
                }
                let similarity = result.similarity.unwrap_or(0.0);
                system.push_str(&format!(" [Similarity: {similarity:.2}]\n"));
            }
        }

        let mut history = self.short_term.conversation_context(false);
        if history
            .last()
            .is_some_and(|m| m.role == Role::User && m.content == user_message)
        {
            history.pop();
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ProviderMessage::system(system));
        messages.extend(history);
        messages.push(ProviderMessage::user(user_message));
        messages
    }

    /// Sends a prepared prompt to the provider and returns the reply text.
    pub async fn generate_response(
        &self,
        messages: Vec<ProviderMessage>,
    ) -> Result<String, MnemoError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };
        let response = self.provider.complete(request).await?;
        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "completion usage"
            );
        }
        Ok(response.content)
    }

    /// Memory suggestions for a finished turn.
    pub fn analyze(&self, user_message: &str, response: &str) -> Vec<MemorySuggestion> {
        self.analyzer.analyze(user_message, response)
    }

    /// Persists one suggestion in long-term memory and returns its id.
    pub async fn store_suggestion(
        &self,
        suggestion: &MemorySuggestion,
    ) -> Result<String, MnemoError> {
        self.long_term
            .store(
                StoreRequest::new(suggestion.content.clone())
                    .memory_type(suggestion.memory_type)
                    .importance(suggestion.importance)
                    .context(format!("Stored from conversation - {}", suggestion.reason)),
            )
            .await
    }

    pub async fn stats(&self) -> Result<MemoryStats, MnemoError> {
        Ok(MemoryStats {
            short_term: self.short_term.stats(),
            long_term: self.long_term.stats().await?,
        })
    }

    pub fn clear_short_term(&mut self) {
        self.short_term.clear();
        info!("short-term memory cleared");
    }

    pub async fn clear_long_term(&self) -> Result<(), MnemoError> {
        self.long_term.clear_all().await
    }
}

fn default_system_prompt(name: &str, description: &str) -> String {
    format!(
        "You are {name}, {description}.

You have access to both short-term and long-term memory:

SHORT-TERM MEMORY: Contains the recent conversation context. Use this to maintain conversation flow and refer to recent topics.

LONG-TERM MEMORY: Contains persistent knowledge, facts, preferences, and experiences from past conversations. Use this to:
- Remember user preferences and personal information
- Recall relevant facts and knowledge from previous interactions
- Provide continuity across conversation sessions
- Learn from past experiences

MEMORY GUIDELINES:
1. Always consider both short-term context and relevant long-term memories when responding
2. When you learn something important about the user, suggest storing it in long-term memory
3. If the user mentions something that contradicts stored memories, ask for clarification
4. Use memories to personalize responses and show continuity
5. Be transparent about what you remember and what you don't

RESPONSE STYLE:
- Be helpful, conversational, and engaging
- Show that you remember previous interactions when relevant
- Ask clarifying questions when needed
- Suggest storing important information for future reference

Remember: Your goal is to provide a seamless, personalized experience by effectively using both types of memory."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::{Namespace, VectorIndex};
    use mnemo_memory::{EmbeddingGateway, LongTermMemory, MemoryType};
    use mnemo_test_utils::{FailingIndex, HashEmbedder, MockProvider};

    fn agent_with(config: &MnemoConfig, provider: Arc<MockProvider>) -> MemoryAgent {
        let index: Arc<dyn VectorIndex> = Arc::new(FailingIndex);
        let long_term = LongTermMemoryManager::new(
            Namespace::new("user_u_global"),
            EmbeddingGateway::new(Arc::new(HashEmbedder::new(16)), &config.memory),
            index,
            &config.memory,
        );
        MemoryAgent::new(config, provider, long_term)
    }

    fn memory(
        content: &str,
        memory_type: MemoryType,
        context: Option<&str>,
        similarity: f32,
    ) -> MemoryResult {
        MemoryResult {
            id: format!("id-{content}"),
            memory: LongTermMemory::new(content, memory_type)
                .with_context(context.map(str::to_string)),
            similarity: Some(similarity),
        }
    }

    #[test]
    fn default_prompt_names_the_agent() {
        let agent = agent_with(&MnemoConfig::default(), Arc::new(MockProvider::new()));
        assert!(agent.system_prompt().starts_with("You are MemoryAgent, "));
        assert!(agent.system_prompt().contains("MEMORY GUIDELINES:"));
    }

    #[test]
    fn configured_prompt_overrides_default() {
        let mut config = MnemoConfig::default();
        config.agent.system_prompt = Some("  Be terse.  ".into());
        let agent = agent_with(&config, Arc::new(MockProvider::new()));
        assert_eq!(agent.system_prompt(), "Be terse.");
    }

    #[test]
    fn context_lists_memories_and_skips_duplicate_user_message() {
        let mut agent = agent_with(&MnemoConfig::default(), Arc::new(MockProvider::new()));
        agent.short_term_mut().add_system_message("ignored");
        agent.short_term_mut().add_user_message("hi");
        agent.short_term_mut().add_assistant_message("hello!");
        agent.short_term_mut().add_user_message("What should I avoid eating?");

        let memories = [
            memory("User is allergic to peanuts", MemoryType::Fact, Some("health"), 0.4567),
            memory("User likes tea", MemoryType::Preference, None, 0.31),
        ];
        let messages = agent.prepare_context("What should I avoid eating?", &memories);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains(
            "RELEVANT MEMORIES:\n1. [FACT] User is allergic to peanuts (Context: health) [Similarity: 0.46]\n2. [PREFERENCE] User likes tea [Similarity: 0.31]\n"
        ));
        assert_eq!(messages[1], ProviderMessage::user("hi"));
        assert_eq!(messages[2], ProviderMessage::assistant("hello!"));
        assert_eq!(messages[3], ProviderMessage::user("What should I avoid eating?"));
    }

    #[test]
    fn context_without_memories_has_no_memory_block() {
        let agent = agent_with(&MnemoConfig::default(), Arc::new(MockProvider::new()));
        let messages = agent.prepare_context("hello", &[]);
        assert_eq!(messages.len(), 2);
        assert!(!messages[0].content.contains("RELEVANT MEMORIES"));
    }

    #[tokio::test]
    async fn generate_response_uses_configured_model_and_sampling() {
        let provider = Arc::new(MockProvider::with_responses(vec!["sure".into()]));
        let agent = agent_with(&MnemoConfig::default(), provider.clone());

        let reply = agent
            .generate_response(agent.prepare_context("hi", &[]))
            .await
            .unwrap();
        assert_eq!(reply, "sure");

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[0].max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn generate_response_propagates_provider_failure() {
        let agent = agent_with(&MnemoConfig::default(), Arc::new(MockProvider::failing()));
        let err = agent
            .generate_response(agent.prepare_context("hi", &[]))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }
}
