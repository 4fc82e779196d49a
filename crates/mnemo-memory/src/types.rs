// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types shared by both memory tiers.

use chrono::{DateTime, SecondsFormat, Utc};
use mnemo_core::{Metadata, MetadataValue, MnemoError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Version written into every stored memory's metadata.
pub const METADATA_SCHEMA_VERSION: i64 = 1;

/// Default importance for a plain `store`.
pub const DEFAULT_IMPORTANCE: f64 = 0.5;

/// Category of a long-term memory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Fact,
    Preference,
    Experience,
    Knowledge,
}

impl MemoryType {
    /// Upper-case label used in prompts, e.g. `FACT`.
    pub fn label(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Clamp an importance score into `[0, 1]`. NaN becomes `0`.
pub fn clamp_importance(importance: f64) -> f64 {
    if importance.is_nan() {
        0.0
    } else {
        importance.clamp(0.0, 1.0)
    }
}

/// Normalize a tag list: split embedded commas, trim, drop empties and duplicates.
///
/// First-seen order is kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        for part in tag.as_ref().split(',') {
            let part = part.trim();
            if !part.is_empty() && !out.iter().any(|t| t == part) {
                out.push(part.to_string());
            }
        }
    }
    out
}

/// A persisted long-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermMemory {
    pub content: String,
    pub memory_type: MemoryType,
    importance: f64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    tags: Vec<String>,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl LongTermMemory {
    /// A fresh, never-accessed memory with default importance.
    pub fn new(content: impl Into<String>, memory_type: MemoryType) -> Self {
        let now = Utc::now();
        Self {
            content: content.into(),
            memory_type,
            importance: DEFAULT_IMPORTANCE,
            created_at: now,
            last_accessed: now,
            access_count: 0,
            tags: Vec::new(),
            context: None,
            source: None,
        }
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = clamp_importance(importance);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Importance in `[0, 1]`.
    pub fn importance(&self) -> f64 {
        self.importance
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Record one retrieval: bump the counter and stamp `last_accessed`.
    pub fn mark_accessed(&mut self, at: DateTime<Utc>) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = at;
    }

    /// Flatten into index metadata. `content` is stored as the document, not here.
    pub fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("schema_version".into(), METADATA_SCHEMA_VERSION.into());
        meta.insert("memory_type".into(), self.memory_type.to_string().into());
        meta.insert("importance".into(), self.importance.into());
        meta.insert("created_at".into(), timestamp(self.created_at).into());
        meta.insert("last_accessed".into(), timestamp(self.last_accessed).into());
        meta.insert(
            "access_count".into(),
            i64::try_from(self.access_count).unwrap_or(i64::MAX).into(),
        );
        meta.insert("tags".into(), self.tags.join(",").into());
        if let Some(context) = &self.context {
            meta.insert("context".into(), context.clone().into());
        }
        if let Some(source) = &self.source {
            meta.insert("source".into(), source.clone().into());
        }
        meta
    }

    /// Rebuild a memory from its document text and index metadata.
    ///
    /// Missing keys fall back to defaults; an unknown memory type or a newer
    /// schema version is an error.
    pub fn from_metadata(content: impl Into<String>, meta: &Metadata) -> Result<Self, MnemoError> {
        let version = meta
            .get("schema_version")
            .and_then(MetadataValue::as_i64)
            .unwrap_or(METADATA_SCHEMA_VERSION);
        if version > METADATA_SCHEMA_VERSION {
            return Err(MnemoError::Internal(format!(
                "unsupported memory metadata schema version {version}"
            )));
        }

        let memory_type = match meta.get("memory_type").and_then(MetadataValue::as_str) {
            Some(raw) => raw
                .parse::<MemoryType>()
                .map_err(|_| MnemoError::Internal(format!("unknown memory type `{raw}`")))?,
            None => MemoryType::Knowledge,
        };

        let now = Utc::now();
        let created_at = read_timestamp(meta, "created_at").unwrap_or(now);
        let last_accessed = read_timestamp(meta, "last_accessed").unwrap_or(created_at);

        Ok(Self {
            content: content.into(),
            memory_type,
            importance: clamp_importance(
                meta.get("importance")
                    .and_then(MetadataValue::as_f64)
                    .unwrap_or(DEFAULT_IMPORTANCE),
            ),
            created_at,
            last_accessed,
            access_count: meta
                .get("access_count")
                .and_then(MetadataValue::as_i64)
                .map(|n| n.max(0) as u64)
                .unwrap_or(0),
            tags: normalize_tags(
                meta.get("tags")
                    .and_then(MetadataValue::as_str)
                    .into_iter(),
            ),
            context: meta
                .get("context")
                .and_then(MetadataValue::as_str)
                .map(str::to_string),
            source: meta
                .get("source")
                .and_then(MetadataValue::as_str)
                .map(str::to_string),
        })
    }
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn read_timestamp(meta: &Metadata, key: &str) -> Option<DateTime<Utc>> {
    meta.get(key)
        .and_then(MetadataValue::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// A memory returned from the long-term store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResult {
    pub id: String,
    pub memory: LongTermMemory,
    /// Cosine similarity to the query, when the result came from a search.
    pub similarity: Option<f32>,
}

/// A proposal to persist part of the conversation as a long-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySuggestion {
    pub memory_type: MemoryType,
    pub content: String,
    pub reason: String,
    pub importance: f64,
}

/// Long-term store counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermStats {
    pub total_memories: usize,
    pub collection_name: String,
    pub similarity_threshold: f32,
    pub max_memories_per_query: usize,
}

/// Short-term buffer counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub system_messages: usize,
    pub max_size: usize,
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity in `[-1, 1]`.
///
/// Returns `0.0` for mismatched lengths or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}
