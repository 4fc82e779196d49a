// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Mnemo crates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::MnemoError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator an adapter implements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    VectorIndex,
}

// --- Conversation types ---

/// Speaker of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in provider wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A request to a language-model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// Full prompt, system message first.
    pub messages: Vec<ProviderMessage>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A complete response from a language-model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

// --- Embedding types ---

/// Texts to embed, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

impl EmbeddingInput {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }
}

/// One vector per input text, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Namespaces ---

const SESSION_SEPARATOR: &str = "_session_";

/// Isolation key for a vector-index collection.
///
/// Every long-term memory lives in exactly one namespace; nothing stored in
/// one namespace is visible from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Wraps a raw collection name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derives the namespace for an identity pair.
    ///
    /// `user_{u}_session_{s}` when both are present, `user_{u}_global` for a
    /// user alone, otherwise `default`. Empty strings count as absent.
    ///
    /// A user id that contains the session separator, or ends in a prefix
    /// that completes it, is rejected: with it, distinct pairs such as
    /// `("x_session_y", "z")` and `("x", "y_session_z")` would share a
    /// collection.
    pub fn derive(
        user_id: Option<&str>,
        session_id: Option<&str>,
        default: &str,
    ) -> Result<Self, MnemoError> {
        let user_id = user_id.filter(|u| !u.is_empty());
        let session_id = session_id.filter(|s| !s.is_empty());
        if let Some(u) = user_id
            && format!("{u}_").contains(SESSION_SEPARATOR)
        {
            return Err(MnemoError::Identity(format!(
                "user id '{u}' must not contain '{SESSION_SEPARATOR}' or end in '_session'"
            )));
        }
        Ok(match (user_id, session_id) {
            (Some(u), Some(s)) => Self(format!("user_{u}{SESSION_SEPARATOR}{s}")),
            (Some(u), None) => Self(format!("user_{u}_global")),
            _ => Self(default.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Index metadata ---

/// A scalar metadata value. Vector indexes only accept flat scalar maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Flat key/value metadata attached to an index entry.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A stored index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

/// A nearest-neighbor query hit.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    /// Cosine distance in `[0, 2]`.
    pub distance: f32,
}

impl IndexHit {
    /// Cosine similarity, `1 - distance`.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}
