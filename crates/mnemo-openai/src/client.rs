// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI REST API.
//!
//! Provides [`OpenAiClient`], which handles bearer authentication, request
//! serialization, and translation of API error envelopes. Requests are not
//! retried; callers decide how to degrade.

use std::time::Duration;

use mnemo_core::MnemoError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse,
};

const CHAT_PATH: &str = "/v1/chat/completions";
const EMBEDDINGS_PATH: &str = "/v1/embeddings";
const MODELS_PATH: &str = "/v1/models";

/// Which endpoint a request targets; decides the error variant.
#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Chat,
    Embeddings,
    Models,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Self::Chat => CHAT_PATH,
            Self::Embeddings => EMBEDDINGS_PATH,
            Self::Models => MODELS_PATH,
        }
    }

    fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> MnemoError {
        match self {
            Self::Chat | Self::Models => MnemoError::Provider { message, source },
            Self::Embeddings => MnemoError::Embedding { message, source },
        }
    }
}

/// HTTP client for OpenAI API communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (scheme and host, no path).
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, MnemoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                MnemoError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MnemoError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a chat-completion request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, MnemoError> {
        self.post(Endpoint::Chat, request).await
    }

    /// Sends an embeddings request.
    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, MnemoError> {
        self.post(Endpoint::Embeddings, request).await
    }

    /// Lists the account's models without consuming tokens.
    ///
    /// Succeeds when the endpoint is reachable and the key is accepted.
    pub async fn list_models(&self) -> Result<(), MnemoError> {
        let url = self.url(Endpoint::Models);
        self.send(Endpoint::Models, self.client.get(&url)).await?;
        Ok(())
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn post<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, MnemoError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let text = self
            .send(endpoint, self.client.post(&url).json(body))
            .await?;
        serde_json::from_str(&text).map_err(|e| {
            endpoint.error(format!("failed to parse API response: {e}"), Some(Box::new(e)))
        })
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<String, MnemoError> {
        let response = request
            .send()
            .await
            .map_err(|e| endpoint.error(format!("HTTP request failed: {e}"), Some(Box::new(e))))?;

        let status = response.status();
        debug!(status = %status, path = endpoint.path(), "response received");

        let text = response.text().await.map_err(|e| {
            endpoint.error(format!("failed to read response body: {e}"), Some(Box::new(e)))
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {text}"),
            };
            return Err(endpoint.error(message, None));
        }

        Ok(text)
    }
}
