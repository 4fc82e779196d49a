// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapters for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mnemo_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use mnemo_core::{EmbeddingAdapter, MnemoError, PluginAdapter};

/// Bag-of-words hashing embedder.
///
/// Each lower-cased alphanumeric token is hashed (FNV-1a) into one of `dims`
/// buckets and the result is L2-normalized. Texts sharing words land close
/// together; texts with no words in common are (almost always) orthogonal.
pub struct HashEmbedder {
    dims: usize,
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims: dims.max(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector this embedder produces for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(&token.to_lowercase()) % self.dims as u64) as usize;
            v[bucket] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl PluginAdapter for HashEmbedder {
    fn name(&self) -> &str {
        "hash-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for HashEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector_for(t)).collect(),
            dimensions: self.dims,
        })
    }
}

/// An embedder that always fails.
#[derive(Debug, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Unhealthy("always fails".into()))
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        Err(MnemoError::embedding("embedding service unavailable"))
    }
}
