// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory tiers for the Mnemo agent.
//!
//! - [`ShortTermMemory`]: bounded log of the current conversation.
//! - [`LongTermMemoryManager`]: namespaced, similarity-searchable memories
//!   stored through an [`EmbeddingGateway`] and a vector index.
//! - [`MemoryAnalyzer`]: proposes which utterances to persist.

pub mod analyzer;
pub mod embedder;
pub mod index;
pub mod long_term;
pub mod short_term;
pub mod types;

pub use analyzer::{KeywordAnalyzer, MemoryAnalyzer};
pub use embedder::{EmbeddedChunk, EmbeddingGateway, chunk_text};
pub use index::SqliteVectorIndex;
pub use long_term::{LongTermMemoryManager, RetrieveOptions, StoreRequest};
pub use short_term::ShortTermMemory;
pub use types::{
    LongTermMemory, LongTermStats, MemoryResult, MemorySuggestion, MemoryType, ShortTermStats,
};
