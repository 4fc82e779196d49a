// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemo.
//!
//! Mock adapters and fixtures for fast, deterministic tests without network access.
//!
//! - [`MockProvider`]: queued language-model responses, optional failure mode
//! - [`HashEmbedder`]: deterministic bag-of-words embeddings
//! - [`FailingEmbedder`], [`FailingIndex`]: error-path stand-ins
//! - [`temp_database`]: a migrated SQLite database in a temp directory

pub mod failing_index;
pub mod mock_embedder;
pub mod mock_provider;

pub use failing_index::FailingIndex;
pub use mock_embedder::{FailingEmbedder, HashEmbedder};
pub use mock_provider::MockProvider;

use mnemo_core::MnemoError;
use mnemo_storage::Database;

/// Open a fresh database inside a new temp directory.
///
/// Keep the returned directory alive for as long as the database is used.
pub async fn temp_database() -> Result<(Database, tempfile::TempDir), MnemoError> {
    let dir = tempfile::TempDir::new().map_err(MnemoError::storage)?;
    let path = dir.path().join("test.db");
    let db = Database::open(&path.to_string_lossy()).await?;
    Ok((db, dir))
}
