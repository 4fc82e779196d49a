// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity records persisted by the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form JSON metadata attached to users and sessions.
pub type JsonMap = Map<String, Value>;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// `user_` followed by 8 hex characters.
    pub user_id: String,
    /// Lookup key. Not unique; lookups return the earliest match.
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub total_sessions: u64,
    #[serde(default)]
    pub metadata: JsonMap,
}

/// A chat session owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// `session_` followed by 12 hex characters.
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub metadata: JsonMap,
}

impl ChatSession {
    /// True when the last activity falls within `window` of `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now - self.last_activity < window
    }
}

/// Aggregate registry counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_users: usize,
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub database_path: String,
}

/// Generates a fresh user id.
pub fn new_user_id() -> String {
    format!("user_{}", short_hex(8))
}

/// Generates a fresh session id.
pub fn new_session_id() -> String {
    format!("session_{}", short_hex(12))
}

fn short_hex(len: usize) -> String {
    let mut hex = uuid::Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_formats() {
        let user = new_user_id();
        assert!(user.starts_with("user_"));
        assert_eq!(user.len(), "user_".len() + 8);
        assert!(user[5..].chars().all(|c| c.is_ascii_hexdigit()));

        let session = new_session_id();
        assert!(session.starts_with("session_"));
        assert_eq!(session.len(), "session_".len() + 12);
    }

    #[test]
    fn activity_window() {
        let now = Utc::now();
        let session = ChatSession {
            session_id: new_session_id(),
            user_id: new_user_id(),
            created_at: now,
            last_activity: now - chrono::Duration::minutes(30),
            metadata: JsonMap::new(),
        };
        assert!(session.is_active_at(now, chrono::Duration::hours(1)));
        assert!(!session.is_active_at(now, chrono::Duration::minutes(10)));
    }
}
