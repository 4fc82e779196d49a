// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed vector index.
//!
//! Embeddings are stored as little-endian f32 BLOBs, one row per entry, keyed
//! by (collection, id). Queries are brute-force cosine scans over a single
//! collection.

use async_trait::async_trait;
use mnemo_core::{
    AdapterType, HealthStatus, IndexHit, IndexRecord, Metadata, MnemoError, Namespace,
    PluginAdapter, VectorIndex,
};
use mnemo_storage::{Database, format_timestamp};
use rusqlite::{OptionalExtension, params};
use tracing::{debug, warn};

use crate::types::{blob_to_vec, cosine_similarity, vec_to_blob};

fn storage_err(e: tokio_rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

fn decode_metadata(raw: &str) -> Metadata {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "discarding unreadable vector metadata");
        Metadata::new()
    })
}

/// Vector index persisted in the shared Mnemo database.
pub struct SqliteVectorIndex {
    db: Database,
}

impl SqliteVectorIndex {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginAdapter for SqliteVectorIndex {
    fn name(&self) -> &str {
        "sqlite-vector-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        let result = self
            .db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0))
            })
            .await;
        Ok(match result {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn add(
        &self,
        namespace: &Namespace,
        id: Option<String>,
        text: &str,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<String, MnemoError> {
        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let collection = namespace.as_str().to_string();
        let text = text.to_string();
        let metadata = serde_json::to_string(&metadata).map_err(MnemoError::storage)?;
        let blob = vec_to_blob(&vector);
        let now = format_timestamp(chrono::Utc::now());
        let row_id = id.clone();

        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
                    params![collection, now],
                )?;
                tx.execute(
                    "INSERT OR REPLACE INTO vectors (collection, id, document, embedding, metadata, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![collection, row_id, text, blob, metadata, now],
                )?;
                tx.commit()
            })
            .await
            .map_err(storage_err)?;

        debug!(namespace = %namespace, id = %id, dims = vector.len(), "vector added");
        Ok(id)
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        k: usize,
        max_distance: Option<f32>,
    ) -> Result<Vec<IndexHit>, MnemoError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let collection = namespace.as_str().to_string();
        let rows = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<(String, String, Vec<u8>, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, document, embedding, metadata FROM vectors WHERE collection = ?1",
                )?;
                let rows = stmt.query_map(params![collection], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                rows.collect()
            })
            .await
            .map_err(storage_err)?;

        let mut scored: Vec<(f32, String, String, String)> = Vec::with_capacity(rows.len());
        for (id, document, blob, metadata) in rows {
            let embedding = blob_to_vec(&blob);
            if embedding.len() != vector.len() {
                warn!(id = %id, expected = vector.len(), got = embedding.len(), "skipping vector with mismatched dimension");
                continue;
            }
            let distance = 1.0 - cosine_similarity(vector, &embedding);
            if max_distance.is_some_and(|max| distance > max) {
                continue;
            }
            scored.push((distance, id, document, metadata));
        }

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, id, text, metadata)| IndexHit {
                id,
                text,
                metadata: decode_metadata(&metadata),
                distance,
            })
            .collect())
    }

    async fn get(
        &self,
        namespace: &Namespace,
        id: &str,
    ) -> Result<Option<IndexRecord>, MnemoError> {
        let collection = namespace.as_str().to_string();
        let id = id.to_string();
        let row = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<(String, String, String)>, rusqlite::Error> {
                conn.query_row(
                    "SELECT id, document, metadata FROM vectors WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
            })
            .await
            .map_err(storage_err)?;

        Ok(row.map(|(id, text, metadata)| IndexRecord {
            id,
            text,
            metadata: decode_metadata(&metadata),
        }))
    }

    async fn delete(&self, namespace: &Namespace, id: &str) -> Result<bool, MnemoError> {
        let collection = namespace.as_str().to_string();
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let n = conn.execute(
                    "DELETE FROM vectors WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                )?;
                Ok(n > 0)
            })
            .await
            .map_err(storage_err)
    }

    async fn count(&self, namespace: &Namespace) -> Result<usize, MnemoError> {
        let collection = namespace.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM vectors WHERE collection = ?1",
                    params![collection],
                    |row| row.get(0),
                )
            })
            .await
            .map(|n| n.max(0) as usize)
            .map_err(storage_err)
    }

    async fn reset(&self, namespace: &Namespace) -> Result<(), MnemoError> {
        let collection = namespace.as_str().to_string();
        let now = format_timestamp(chrono::Utc::now());
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM vectors WHERE collection = ?1", params![collection])?;
                tx.execute("DELETE FROM collections WHERE name = ?1", params![collection])?;
                tx.execute(
                    "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
                    params![collection, now],
                )?;
                tx.commit()
            })
            .await
            .map_err(storage_err)?;
        debug!(namespace = %namespace, "collection reset");
        Ok(())
    }
}
