// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language-model provider for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemo_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use mnemo_core::{MnemoError, PluginAdapter, ProviderAdapter};

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue; when the queue is empty a default
/// "mock response" is returned. Every request is recorded for inspection.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
    fail: bool,
    shutdowns: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Pre-load the response queue.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider whose every call fails with a provider error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// How many times `shutdown` has been called.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemoError> {
        self.requests.lock().await.push(request.clone());
        if self.fail {
            return Err(MnemoError::provider("mock provider configured to fail"));
        }
        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content: self.next_response().await,
            model: request.model,
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::ProviderMessage;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "test-model".to_string(),
            messages: vec![ProviderMessage::user("hi")],
            temperature: None,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.content, "mock response");
        assert_eq!(resp.model, "test-model");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().content, "second");
        assert_eq!(provider.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn failing_provider_errors_but_records() {
        let provider = MockProvider::failing();
        assert!(provider.complete(request()).await.is_err());
        assert_eq!(provider.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn shutdown_is_counted() {
        let provider = MockProvider::new();
        assert_eq!(provider.shutdown_count(), 0);
        provider.shutdown().await.unwrap();
        assert_eq!(provider.shutdown_count(), 1);
    }
}
