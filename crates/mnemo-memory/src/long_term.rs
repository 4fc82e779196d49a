// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory manager.
//!
//! Stores memories as embedded documents in a [`VectorIndex`] namespace and
//! retrieves them by semantic similarity. A manager is bound to exactly one
//! namespace for its whole lifetime; there is no way to address another.
//!
//! Retrieval runs in two phases: first the `2 × max_results` nearest memories
//! within the similarity threshold, then, if none qualified, the nearest
//! `max_results` regardless of threshold. Retrieval never fails; embedding or
//! index errors are logged and yield an empty result.

use std::sync::Arc;

use chrono::Utc;
use mnemo_config::MemoryConfig;
use mnemo_core::{MnemoError, Namespace, VectorIndex};
use tracing::{debug, info, warn};

use crate::embedder::EmbeddingGateway;
use crate::types::{
    DEFAULT_IMPORTANCE, LongTermMemory, LongTermStats, MemoryResult, MemoryType,
};

/// Parameters for [`LongTermMemoryManager::store`].
#[derive(Debug, Clone)]
pub struct StoreRequest {
    content: String,
    memory_type: MemoryType,
    importance: f64,
    tags: Vec<String>,
    context: Option<String>,
    source: Option<String>,
}

impl StoreRequest {
    /// A `knowledge` memory with importance 0.5 and no tags.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            memory_type: MemoryType::Knowledge,
            importance: DEFAULT_IMPORTANCE,
            tags: Vec::new(),
            context: None,
            source: None,
        }
    }

    pub fn memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = memory_type;
        self
    }

    /// Out-of-range values are clamped into `[0, 1]` on store.
    pub fn importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    /// Tags are stored comma-joined, so a tag containing commas is split
    /// into separate tags, e.g. `["a,b"]` is stored as `["a", "b"]`.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Filters for [`LongTermMemoryManager::retrieve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrieveOptions {
    /// Keep only memories of exactly this type.
    pub memory_type: Option<MemoryType>,
    /// Result cap; defaults to the configured `max_results`.
    pub max_results: Option<usize>,
    /// Keep only memories at least this important.
    pub min_importance: Option<f64>,
}

/// Long-term memory store bound to one namespace.
pub struct LongTermMemoryManager {
    namespace: Namespace,
    gateway: EmbeddingGateway,
    index: Arc<dyn VectorIndex>,
    similarity_threshold: f32,
    max_results: usize,
}

impl LongTermMemoryManager {
    pub fn new(
        namespace: Namespace,
        gateway: EmbeddingGateway,
        index: Arc<dyn VectorIndex>,
        config: &MemoryConfig,
    ) -> Self {
        info!(namespace = %namespace, "long-term memory bound");
        Self {
            namespace,
            gateway,
            index,
            similarity_threshold: config.similarity_threshold,
            max_results: config.max_results,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Persist a memory and return its id.
    ///
    /// Embedding and index failures are returned to the caller.
    pub async fn store(&self, request: StoreRequest) -> Result<String, MnemoError> {
        let memory = LongTermMemory::new(request.content, request.memory_type)
            .with_importance(request.importance)
            .with_tags(&request.tags)
            .with_context(request.context)
            .with_source(request.source);

        let vector = self.gateway.embed(&memory.content).await?;
        let id = self
            .index
            .add(
                &self.namespace,
                None,
                &memory.content,
                vector,
                memory.to_metadata(),
            )
            .await?;

        info!(
            namespace = %self.namespace,
            memory_id = %id,
            memory_type = %memory.memory_type,
            importance = memory.importance(),
            "memory stored"
        );
        Ok(id)
    }

    /// Memories most similar to `query`, most similar first.
    ///
    /// Returned copies carry an incremented `access_count` and a fresh
    /// `last_accessed`; the stored entries are left untouched.
    pub async fn retrieve(&self, query: &str, options: RetrieveOptions) -> Vec<MemoryResult> {
        match self.try_retrieve(query, options).await {
            Ok(results) => results,
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "memory retrieval failed");
                Vec::new()
            }
        }
    }

    async fn try_retrieve(
        &self,
        query: &str,
        options: RetrieveOptions,
    ) -> Result<Vec<MemoryResult>, MnemoError> {
        let max_results = options.max_results.unwrap_or(self.max_results);
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let vector = self.gateway.embed(query).await?;
        let mut hits = self
            .index
            .query(
                &self.namespace,
                &vector,
                max_results.saturating_mul(2),
                Some(1.0 - self.similarity_threshold),
            )
            .await?;

        if hits.is_empty() {
            debug!(
                namespace = %self.namespace,
                threshold = self.similarity_threshold,
                "no memories above threshold, retrying unfiltered"
            );
            hits = self
                .index
                .query(&self.namespace, &vector, max_results, None)
                .await?;
        }

        let now = Utc::now();
        let mut results = Vec::with_capacity(max_results);
        for hit in hits {
            let similarity = hit.similarity();
            let mut memory = match LongTermMemory::from_metadata(hit.text, &hit.metadata) {
                Ok(memory) => memory,
                Err(e) => {
                    warn!(memory_id = %hit.id, error = %e, "skipping undecodable memory");
                    continue;
                }
            };
            if options.memory_type.is_some_and(|t| t != memory.memory_type) {
                continue;
            }
            if options
                .min_importance
                .is_some_and(|min| memory.importance() < min)
            {
                continue;
            }

            memory.mark_accessed(now);
            results.push(MemoryResult {
                id: hit.id,
                memory,
                similarity: Some(similarity),
            });
            if results.len() == max_results {
                break;
            }
        }

        debug!(namespace = %self.namespace, found = results.len(), "memories retrieved");
        Ok(results)
    }

    /// Store a conversation summary as an `experience`.
    pub async fn store_conversation_summary(
        &self,
        summary: &str,
        conversation_context: &str,
        importance: f64,
    ) -> Result<String, MnemoError> {
        self.store(
            StoreRequest::new(summary)
                .memory_type(MemoryType::Experience)
                .importance(importance)
                .tags(["conversation", "summary"])
                .context(conversation_context)
                .source("conversation_summary"),
        )
        .await
    }

    /// Store a user preference with importance 0.8.
    pub async fn store_user_preference(
        &self,
        preference: &str,
        context: Option<&str>,
    ) -> Result<String, MnemoError> {
        let mut request = StoreRequest::new(preference)
            .memory_type(MemoryType::Preference)
            .importance(0.8)
            .tags(["preference", "user"])
            .source("user_preference");
        if let Some(context) = context {
            request = request.context(context);
        }
        self.store(request).await
    }

    /// Store a piece of factual information.
    pub async fn store_fact(
        &self,
        fact: &str,
        context: Option<&str>,
        importance: f64,
    ) -> Result<String, MnemoError> {
        let mut request = StoreRequest::new(fact)
            .memory_type(MemoryType::Fact)
            .importance(importance)
            .tags(["fact", "information"])
            .source("factual_information");
        if let Some(context) = context {
            request = request.context(context);
        }
        self.store(request).await
    }

    /// Fetch one memory by id, with access stats bumped on the returned copy.
    pub async fn get_by_id(&self, memory_id: &str) -> Result<Option<MemoryResult>, MnemoError> {
        let Some(record) = self.index.get(&self.namespace, memory_id).await? else {
            return Ok(None);
        };
        let mut memory = LongTermMemory::from_metadata(record.text, &record.metadata)?;
        memory.mark_accessed(Utc::now());
        Ok(Some(MemoryResult {
            id: record.id,
            memory,
            similarity: None,
        }))
    }

    /// Delete a memory. Returns `false` when it did not exist.
    pub async fn delete(&self, memory_id: &str) -> Result<bool, MnemoError> {
        let removed = self.index.delete(&self.namespace, memory_id).await?;
        if removed {
            info!(namespace = %self.namespace, memory_id, "memory deleted");
        }
        Ok(removed)
    }

    /// Up to `limit` memories of one type, searched by the type's name.
    pub async fn get_by_type(&self, memory_type: MemoryType, limit: usize) -> Vec<MemoryResult> {
        self.retrieve(
            &memory_type.to_string(),
            RetrieveOptions {
                memory_type: Some(memory_type),
                max_results: Some(limit),
                min_importance: None,
            },
        )
        .await
    }

    /// Remove every memory in this namespace.
    pub async fn clear_all(&self) -> Result<(), MnemoError> {
        self.index.reset(&self.namespace).await?;
        info!(namespace = %self.namespace, "long-term memory cleared");
        Ok(())
    }

    pub async fn stats(&self) -> Result<LongTermStats, MnemoError> {
        Ok(LongTermStats {
            total_memories: self.index.count(&self.namespace).await?,
            collection_name: self.namespace.to_string(),
            similarity_threshold: self.similarity_threshold,
            max_memories_per_query: self.max_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::EmbeddingAdapter;
    use mnemo_test_utils::{FailingEmbedder, FailingIndex, HashEmbedder};
    use tracing_test::traced_test;

    fn manager_with(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> LongTermMemoryManager {
        let config = MemoryConfig::default();
        LongTermMemoryManager::new(
            Namespace::new("user_test_global"),
            EmbeddingGateway::new(embedder, &config),
            index,
            &config,
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn retrieval_degrades_to_empty_when_index_fails() {
        let manager = manager_with(Arc::new(FailingIndex), Arc::new(HashEmbedder::new(16)));
        let results = manager.retrieve("anything", RetrieveOptions::default()).await;
        assert!(results.is_empty());
        assert!(logs_contain("memory retrieval failed"));
    }

    #[tokio::test]
    async fn retrieval_degrades_to_empty_when_embedding_fails() {
        let manager = manager_with(Arc::new(FailingIndex), Arc::new(FailingEmbedder));
        assert!(manager.retrieve("q", RetrieveOptions::default()).await.is_empty());
        assert!(manager.get_by_type(MemoryType::Fact, 10).await.is_empty());
    }

    #[tokio::test]
    async fn store_propagates_failures() {
        let failing_index = manager_with(Arc::new(FailingIndex), Arc::new(HashEmbedder::new(16)));
        assert!(failing_index.store(StoreRequest::new("x")).await.is_err());

        let failing_embedder = manager_with(Arc::new(FailingIndex), Arc::new(FailingEmbedder));
        let err = failing_embedder.store(StoreRequest::new("x")).await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[test]
    fn store_request_defaults() {
        let request = StoreRequest::new("content");
        assert_eq!(request.memory_type, MemoryType::Knowledge);
        assert_eq!(request.importance, DEFAULT_IMPORTANCE);
        assert!(request.tags.is_empty());
        assert!(request.context.is_none() && request.source.is_none());
    }
}
