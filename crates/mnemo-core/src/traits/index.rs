// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector index trait: a per-namespace nearest-neighbor store.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{IndexHit, IndexRecord, Metadata, Namespace};

/// Nearest-neighbor store partitioned by [`Namespace`].
///
/// Distances are cosine distances in `[0, 2]`. Entries in one namespace are
/// never visible from another.
#[async_trait]
pub trait VectorIndex: PluginAdapter {
    /// Inserts a document. Generates a UUID when `id` is `None` and returns the id used.
    async fn add(
        &self,
        namespace: &Namespace,
        id: Option<String>,
        text: &str,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<String, MnemoError>;

    /// Returns up to `k` hits ordered by ascending distance.
    ///
    /// When `max_distance` is set, hits farther than it are dropped.
    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        k: usize,
        max_distance: Option<f32>,
    ) -> Result<Vec<IndexHit>, MnemoError>;

    /// Fetches a single entry by id.
    async fn get(&self, namespace: &Namespace, id: &str)
    -> Result<Option<IndexRecord>, MnemoError>;

    /// Removes an entry. Returns `false` when the id was unknown.
    async fn delete(&self, namespace: &Namespace, id: &str) -> Result<bool, MnemoError>;

    /// Number of entries stored in the namespace.
    async fn count(&self, namespace: &Namespace) -> Result<usize, MnemoError>;

    /// Drops every entry in the namespace and recreates it empty.
    async fn reset(&self, namespace: &Namespace) -> Result<(), MnemoError>;
}
