// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo memory agent.
//!
//! Holds the adapter traits for every external collaborator (language model,
//! embedding service, vector index), the shared error type, and the types
//! that flow between crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MnemoError;
pub use types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, IndexHit, IndexRecord, Metadata,
    MetadataValue, Namespace, ProviderMessage, ProviderRequest, ProviderResponse, Role,
    TokenUsage,
};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, VectorIndex};
