// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding gateway: text-to-vector conversion, batching, and document chunking.

use std::sync::Arc;

use mnemo_config::MemoryConfig;
use mnemo_core::{EmbeddingAdapter, EmbeddingInput, MnemoError};
use serde::Serialize;
use tracing::debug;

/// One chunk of a longer document with its vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedChunk {
    pub chunk_index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Wraps an [`EmbeddingAdapter`] with batching and chunking policy.
#[derive(Clone)]
pub struct EmbeddingGateway {
    adapter: Arc<dyn EmbeddingAdapter>,
    batch_size: usize,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl EmbeddingGateway {
    pub fn new(adapter: Arc<dyn EmbeddingAdapter>, config: &MemoryConfig) -> Self {
        Self {
            adapter,
            batch_size: config.embedding_batch_size.max(1),
            chunk_size: config.chunk_size.max(1),
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, MnemoError> {
        let output = self.adapter.embed(EmbeddingInput::single(text)).await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MnemoError::embedding("embedding service returned no vectors"))
    }

    /// Embed many texts, preserving input order, in requests of at most `batch_size`.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MnemoError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let output = self
                .adapter
                .embed(EmbeddingInput {
                    texts: batch.to_vec(),
                })
                .await?;
            if output.embeddings.len() != batch.len() {
                return Err(MnemoError::embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    output.embeddings.len()
                )));
            }
            vectors.extend(output.embeddings);
        }
        debug!(texts = texts.len(), "embedded batch");
        Ok(vectors)
    }

    /// Split `text` with the configured chunk size and overlap.
    pub fn chunks(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.chunk_size, self.chunk_overlap)
    }

    /// Chunk a document and embed every chunk.
    pub async fn embed_document(&self, text: &str) -> Result<Vec<EmbeddedChunk>, MnemoError> {
        let chunks = self.chunks(text);
        let vectors = self.embed_batch(&chunks).await?;
        Ok(chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(chunk_index, (text, embedding))| EmbeddedChunk {
                chunk_index,
                text,
                embedding,
            })
            .collect())
    }
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// A chunk that would end mid-text is cut back to its last space when that
/// space lies beyond 80% of the chunk. The next chunk starts `overlap`
/// characters before the previous end. Chunks are trimmed; empty ones are dropped.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size.saturating_sub(1));
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());

        if end < chars.len()
            && let Some(space) = chars[start..end].iter().rposition(|c| *c == ' ')
            && space * 10 > chunk_size * 8
        {
            end = start + space;
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end >= chars.len() {
            break;
        }
        // Always make progress, even when the overlap swallows the whole chunk.
        start = (end.saturating_sub(overlap)).max(start + 1);
    }

    chunks
}
