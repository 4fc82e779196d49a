// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A vector index whose every operation fails.

use async_trait::async_trait;
use mnemo_core::types::{AdapterType, HealthStatus, IndexHit, IndexRecord, Metadata, Namespace};
use mnemo_core::{MnemoError, PluginAdapter, VectorIndex};

/// Vector index stand-in for exercising error paths.
#[derive(Debug, Default)]
pub struct FailingIndex;

fn unavailable() -> MnemoError {
    MnemoError::storage(std::io::Error::other("vector index unavailable"))
}

#[async_trait]
impl PluginAdapter for FailingIndex {
    fn name(&self) -> &str {
        "failing-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Unhealthy("always fails".into()))
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FailingIndex {
    async fn add(
        &self,
        _namespace: &Namespace,
        _id: Option<String>,
        _text: &str,
        _vector: Vec<f32>,
        _metadata: Metadata,
    ) -> Result<String, MnemoError> {
        Err(unavailable())
    }

    async fn query(
        &self,
        _namespace: &Namespace,
        _vector: &[f32],
        _k: usize,
        _max_distance: Option<f32>,
    ) -> Result<Vec<IndexHit>, MnemoError> {
        Err(unavailable())
    }

    async fn get(
        &self,
        _namespace: &Namespace,
        _id: &str,
    ) -> Result<Option<IndexRecord>, MnemoError> {
        Err(unavailable())
    }

    async fn delete(&self, _namespace: &Namespace, _id: &str) -> Result<bool, MnemoError> {
        Err(unavailable())
    }

    async fn count(&self, _namespace: &Namespace) -> Result<usize, MnemoError> {
        Err(unavailable())
    }

    async fn reset(&self, _namespace: &Namespace) -> Result<(), MnemoError> {
        Err(unavailable())
    }
}
