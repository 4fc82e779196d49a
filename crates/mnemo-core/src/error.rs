// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Mnemo crate.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Language-model completion failures.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding computation failures.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced user, session, or memory does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// An identity that cannot be mapped to its own memory namespace.
    #[error("invalid identity: {0}")]
    Identity(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Builds an embedding failure without an underlying cause.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a provider failure without an underlying cause.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// True for failures raised by a remote collaborator (model or embedding API).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Embedding { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_kind_and_id() {
        let err = MnemoError::NotFound {
            kind: "user",
            id: "user_deadbeef".into(),
        };
        assert_eq!(err.to_string(), "user not found: user_deadbeef");
    }

    #[test]
    fn storage_helper_keeps_source() {
        let err = MnemoError::storage(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
        assert!(!err.is_upstream());
    }

    #[test]
    fn upstream_classification() {
        assert!(MnemoError::provider("rate limited").is_upstream());
        assert!(MnemoError::embedding("bad input").is_upstream());
        assert!(!MnemoError::Config("x".into()).is_upstream());
        assert!(!MnemoError::Internal("x".into()).is_upstream());
    }
}
