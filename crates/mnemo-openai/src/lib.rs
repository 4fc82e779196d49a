// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapters for the Mnemo memory agent.
//!
//! [`OpenAiProvider`] implements [`ProviderAdapter`] over chat completions and
//! [`OpenAiEmbedder`] implements [`EmbeddingAdapter`] over the embeddings
//! endpoint. Both share one [`OpenAiClient`] configuration.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use mnemo_config::OpenAiConfig;
use mnemo_core::types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, ProviderRequest,
    ProviderResponse, TokenUsage,
};
use mnemo_core::{EmbeddingAdapter, MnemoError, PluginAdapter, ProviderAdapter};
use tracing::{debug, info};

pub use crate::client::OpenAiClient;
use crate::types::{ChatRequest, EmbeddingRequest};

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Resolves the API key: `openai.api_key` if non-empty, then
/// `OPENAI_API_KEY`, otherwise a configuration error.
pub fn resolve_api_key(config: &OpenAiConfig) -> Result<String, MnemoError> {
    if let Some(key) = &config.api_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    match std::env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(MnemoError::Config(
            "OpenAI API key not found. Set openai.api_key in config or the OPENAI_API_KEY environment variable.".into(),
        )),
    }
}

/// Healthy when the models endpoint answers with the configured key.
async fn reachability(client: &OpenAiClient) -> HealthStatus {
    match client.list_models().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    }
}

fn build_client(config: &OpenAiConfig) -> Result<OpenAiClient, MnemoError> {
    let api_key = resolve_api_key(config)?;
    OpenAiClient::new(
        &api_key,
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
    )
}

/// Chat-completion provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    client: OpenAiClient,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Result<Self, MnemoError> {
        let client = build_client(config)?;
        info!(model = %config.chat_model, "OpenAI provider initialized");
        Ok(Self {
            client,
            default_model: config.chat_model.clone(),
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(reachability(&self.client).await)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemoError> {
        let mut body = ChatRequest::from(&request);
        if body.model.is_empty() {
            body.model = self.default_model.clone();
        }

        let response = self.client.chat(&body).await?;
        let content = response
            .choices
            .into_iter()
            .min_by_key(|c| c.index)
            .and_then(|c| c.message.content)
            .ok_or_else(|| MnemoError::provider("completion contained no message content"))?;

        Ok(ProviderResponse {
            id: response.id,
            content,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

/// Embedding adapter implementing [`EmbeddingAdapter`].
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: &OpenAiConfig) -> Result<Self, MnemoError> {
        let client = build_client(config)?;
        info!(model = %config.embedding_model, "OpenAI embedder initialized");
        Ok(Self {
            client,
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimension,
        })
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(reachability(&self.client).await)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        debug!("OpenAI embedder shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: self.dimensions,
            });
        }

        let expected = input.texts.len();
        let response = self
            .client
            .embeddings(&EmbeddingRequest {
                model: self.model.clone(),
                input: input.texts,
            })
            .await?;

        let mut data = response.data;
        if data.len() != expected {
            return Err(MnemoError::embedding(format!(
                "expected {expected} embeddings, got {}",
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);

        let dimensions = data
            .first()
            .map(|d| d.embedding.len())
            .unwrap_or(self.dimensions);
        debug!(count = expected, dimensions, "embeddings computed");

        Ok(EmbeddingOutput {
            embeddings: data.into_iter().map(|d| d.embedding).collect(),
            dimensions,
        })
    }
}
