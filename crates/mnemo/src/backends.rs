// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Production wiring of the agent's collaborators.

use std::sync::Arc;

use colored::Colorize;
use mnemo_config::MnemoConfig;
use mnemo_core::types::{AdapterType, HealthStatus};
use mnemo_core::{EmbeddingAdapter, MnemoError, PluginAdapter, ProviderAdapter, VectorIndex};
use mnemo_memory::SqliteVectorIndex;
use mnemo_openai::{OpenAiEmbedder, OpenAiProvider};
use mnemo_storage::{Database, SessionRegistry};
use tracing::{debug, warn};

/// Everything a command needs to build workflows.
pub struct Backends {
    pub db: Database,
    pub registry: SessionRegistry,
    pub provider: Arc<dyn ProviderAdapter>,
    pub embedder: Arc<dyn EmbeddingAdapter>,
    pub index: Arc<dyn VectorIndex>,
}

/// Health of one adapter, as reported before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterHealth {
    pub adapter_type: AdapterType,
    pub name: String,
    pub version: String,
    pub status: HealthStatus,
}

impl Backends {
    /// Opens the database and builds the OpenAI adapters.
    pub async fn open(config: &MnemoConfig) -> Result<Self, MnemoError> {
        let db =
            Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
        let registry = SessionRegistry::open(
            db.clone(),
            &config.session,
            &config.memory.default_collection,
        )
        .await?;

        Ok(Self {
            registry,
            provider: Arc::new(OpenAiProvider::new(&config.openai)?),
            embedder: Arc::new(OpenAiEmbedder::new(&config.openai)?),
            index: Arc::new(SqliteVectorIndex::new(db.clone())),
            db,
        })
    }

    /// Health of the provider, embedder and index, in that order.
    pub async fn health(&self) -> Vec<AdapterHealth> {
        health_report(
            self.provider.as_ref(),
            self.embedder.as_ref(),
            self.index.as_ref(),
        )
        .await
    }

    /// Shuts the adapters down, then flushes and closes the database.
    pub async fn close(self) -> Result<(), MnemoError> {
        let Self {
            db,
            registry,
            provider,
            embedder,
            index,
        } = self;
        shutdown_adapters(provider.as_ref(), embedder.as_ref(), index.as_ref()).await;
        drop(registry);
        drop(index);
        db.close().await
    }
}

async fn check_adapter<A: PluginAdapter + ?Sized>(adapter: &A) -> AdapterHealth {
    let status = match adapter.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };
    AdapterHealth {
        adapter_type: adapter.adapter_type(),
        name: adapter.name().to_string(),
        version: adapter.version().to_string(),
        status,
    }
}

pub async fn health_report(
    provider: &dyn ProviderAdapter,
    embedder: &dyn EmbeddingAdapter,
    index: &dyn VectorIndex,
) -> Vec<AdapterHealth> {
    vec![
        check_adapter(provider).await,
        check_adapter(embedder).await,
        check_adapter(index).await,
    ]
}

/// Prints the report and fails if any adapter is unhealthy.
///
/// Degraded adapters are shown but do not stop the run.
pub fn preflight(report: &[AdapterHealth]) -> Result<(), MnemoError> {
    let mut unhealthy = Vec::new();
    for adapter in report {
        let label = format!("{} {} v{}", adapter.adapter_type, adapter.name, adapter.version);
        match &adapter.status {
            HealthStatus::Healthy => println!("{} {label}", "OK  ".green()),
            HealthStatus::Degraded(reason) => println!("{} {label}: {reason}", "WARN".yellow()),
            HealthStatus::Unhealthy(reason) => {
                println!("{} {label}: {reason}", "FAIL".red());
                unhealthy.push(format!("{}: {reason}", adapter.name));
            }
        }
    }
    if unhealthy.is_empty() {
        Ok(())
    } else {
        Err(MnemoError::Internal(format!(
            "unhealthy adapters: {}",
            unhealthy.join("; ")
        )))
    }
}

async fn shutdown_adapters(
    provider: &dyn ProviderAdapter,
    embedder: &dyn EmbeddingAdapter,
    index: &dyn VectorIndex,
) {
    let results = [
        (provider.name().to_string(), provider.shutdown().await),
        (embedder.name().to_string(), embedder.shutdown().await),
        (index.name().to_string(), index.shutdown().await),
    ];
    for (name, result) in results {
        match result {
            Ok(()) => debug!(adapter = %name, "adapter shut down"),
            Err(e) => warn!(adapter = %name, error = %e, "adapter shutdown failed"),
        }
    }
}
