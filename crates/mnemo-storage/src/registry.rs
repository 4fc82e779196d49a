// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User and session registry.
//!
//! Maps users to their chat sessions and derives the memory namespace for
//! each (user, session) pair. Every mutation commits in its own SQLite
//! transaction before returning, so a crash never leaves a half-written registry.

use chrono::{DateTime, Utc};
use mnemo_config::SessionConfig;
use mnemo_core::{MnemoError, Namespace};
use tracing::{debug, info};

use crate::database::Database;
use crate::models::{ChatSession, JsonMap, RegistryStats, User, new_session_id, new_user_id};
use crate::queries::{sessions, users};

/// The instant `window` before now, saturating at the earliest representable time.
fn window_start(window: chrono::Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Persistent registry of users and their chat sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    db: Database,
    active_window: chrono::Duration,
    default_collection: String,
}

impl SessionRegistry {
    /// Build a registry over an open database and log what it holds.
    pub async fn open(
        db: Database,
        config: &SessionConfig,
        default_collection: impl Into<String>,
    ) -> Result<Self, MnemoError> {
        let registry = Self {
            db,
            active_window: i64::try_from(config.active_window_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
            default_collection: default_collection.into(),
        };
        let stats = registry.stats().await?;
        info!(
            users = stats.total_users,
            sessions = stats.total_sessions,
            "session registry loaded"
        );
        Ok(registry)
    }

    /// Register a new user. Usernames are not required to be unique.
    pub async fn create_user(&self, username: &str, metadata: JsonMap) -> Result<String, MnemoError> {
        let now = Utc::now();
        let user = User {
            user_id: new_user_id(),
            username: username.to_string(),
            created_at: now,
            last_login: now,
            total_sessions: 0,
            metadata,
        };
        users::insert_user(&self.db, &user).await?;
        info!(user_id = %user.user_id, username, "user created");
        Ok(user.user_id)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, MnemoError> {
        users::get_user(&self.db, user_id).await
    }

    /// First user registered under `username`, by creation order.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, MnemoError> {
        users::find_user_by_username(&self.db, username).await
    }

    /// All users in creation order.
    pub async fn list_users(&self) -> Result<Vec<User>, MnemoError> {
        users::list_users(&self.db).await
    }

    /// Open a new session for an existing user.
    ///
    /// Increments the user's session count and refreshes `last_login` in the
    /// same transaction. Fails with [`MnemoError::NotFound`] for an unknown user.
    pub async fn create_session(
        &self,
        user_id: &str,
        metadata: JsonMap,
    ) -> Result<String, MnemoError> {
        let now = Utc::now();
        let session = ChatSession {
            session_id: new_session_id(),
            user_id: user_id.to_string(),
            created_at: now,
            last_activity: now,
            metadata,
        };
        if !sessions::insert_session(&self.db, &session).await? {
            return Err(MnemoError::NotFound {
                kind: "user",
                id: user_id.to_string(),
            });
        }
        info!(session_id = %session.session_id, user_id, "session created");
        Ok(session.session_id)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, MnemoError> {
        sessions::get_session(&self.db, session_id).await
    }

    /// Mark a session active now. Unknown ids are ignored.
    pub async fn update_session_activity(&self, session_id: &str) -> Result<(), MnemoError> {
        if !sessions::touch_session(&self.db, session_id, Utc::now()).await? {
            debug!(session_id, "activity update for unknown session ignored");
        }
        Ok(())
    }

    /// Remove a session. Returns `false` when it did not exist.
    pub async fn end_session(&self, session_id: &str) -> Result<bool, MnemoError> {
        let removed = sessions::delete_session(&self.db, session_id).await?;
        if removed {
            info!(session_id, "session ended");
        }
        Ok(removed)
    }

    /// A user's sessions, most recently active first.
    pub async fn get_user_sessions(
        &self,
        user_id: &str,
        active_only: bool,
    ) -> Result<Vec<ChatSession>, MnemoError> {
        let mut list = sessions::list_user_sessions(&self.db, user_id).await?;
        if active_only {
            let now = Utc::now();
            list.retain(|s| s.is_active_at(now, self.active_window));
        }
        Ok(list)
    }

    /// Delete sessions idle for longer than `max_age`. Returns how many were removed.
    pub async fn cleanup_old_sessions(&self, max_age: chrono::Duration) -> Result<usize, MnemoError> {
        let removed = sessions::delete_sessions_before(&self.db, window_start(max_age)).await?;
        if removed > 0 {
            info!(removed, "cleaned up old sessions");
        }
        Ok(removed)
    }

    /// Delete a user together with all of its sessions.
    pub async fn delete_user(&self, user_id: &str) -> Result<bool, MnemoError> {
        let removed = users::delete_user_cascade(&self.db, user_id).await?;
        if removed {
            info!(user_id, "user deleted");
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<RegistryStats, MnemoError> {
        let total_users = users::count_users(&self.db).await?;
        let (total_sessions, active_sessions) =
            sessions::count_sessions(&self.db, window_start(self.active_window)).await?;
        Ok(RegistryStats {
            total_users,
            total_sessions,
            active_sessions,
            database_path: self.db.path().to_string(),
        })
    }

    /// Memory namespace for a user, optionally scoped to one session.
    ///
    /// Fails with [`MnemoError::Identity`] for user ids that could alias
    /// another identity's namespace; registry-issued ids always succeed.
    pub fn namespace_for(
        &self,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Namespace, MnemoError> {
        Namespace::derive(Some(user_id), session_id, &self.default_collection)
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (SessionRegistry, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("registry.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let registry = SessionRegistry::open(db, &SessionConfig::default(), "memory_collection")
            .await
            .unwrap();
        (registry, dir)
    }

    #[tokio::test]
    async fn create_session_for_unknown_user_is_not_found() {
        let (registry, _dir) = setup().await;
        let err = registry
            .create_session("user_nobody", JsonMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::NotFound { kind: "user", .. }));
        assert_eq!(registry.stats().await.unwrap().total_sessions, 0);
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let (registry, _dir) = setup().await;
        let user_id = registry.create_user("alice", JsonMap::new()).await.unwrap();
        let s1 = registry.create_session(&user_id, JsonMap::new()).await.unwrap();
        let s2 = registry.create_session(&user_id, JsonMap::new()).await.unwrap();

        let user = registry.get_user(&user_id).await.unwrap().unwrap();
        assert_eq!(user.total_sessions, 2);

        std::thread::sleep(std::time::Duration::from_millis(5));
        registry.update_session_activity(&s1).await.unwrap();
        let sessions = registry.get_user_sessions(&user_id, true).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, s1);

        assert!(registry.end_session(&s2).await.unwrap());
        assert!(!registry.end_session(&s2).await.unwrap());
        registry.update_session_activity("session_unknown").await.unwrap();

        let stats = registry.stats().await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.active_sessions, 1);
    }

    #[tokio::test]
    async fn delete_user_cascades_to_sessions() {
        let (registry, _dir) = setup().await;
        let user_id = registry.create_user("bob", JsonMap::new()).await.unwrap();
        let s1 = registry.create_session(&user_id, JsonMap::new()).await.unwrap();
        let s2 = registry.create_session(&user_id, JsonMap::new()).await.unwrap();

        assert!(registry.delete_user(&user_id).await.unwrap());
        assert!(registry.get_user(&user_id).await.unwrap().is_none());
        assert!(registry.get_session(&s1).await.unwrap().is_none());
        assert!(registry.get_session(&s2).await.unwrap().is_none());
        assert!(!registry.delete_user(&user_id).await.unwrap());
    }

    #[tokio::test]
    async fn cleanup_keeps_recent_sessions() {
        let (registry, _dir) = setup().await;
        let user_id = registry.create_user("carol", JsonMap::new()).await.unwrap();
        let session = registry.create_session(&user_id, JsonMap::new()).await.unwrap();

        let removed = registry
            .cleanup_old_sessions(chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(registry.get_session(&session).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn namespaces_follow_identity() {
        let (registry, _dir) = setup().await;
        assert_eq!(
            registry.namespace_for("user_1", Some("session_2")).unwrap().as_str(),
            "user_user_1_session_session_2"
        );
        assert_eq!(
            registry.namespace_for("user_1", None).unwrap().as_str(),
            "user_user_1_global"
        );
    }

    #[tokio::test]
    async fn issued_ids_always_map_to_a_namespace() {
        let (registry, _dir) = setup().await;
        let user = registry.create_user("ivy", JsonMap::new()).await.unwrap();
        let session = registry.create_session(&user, JsonMap::new()).await.unwrap();
        assert!(registry.namespace_for(&user, Some(session.as_str())).is_ok());
        assert!(matches!(
            registry.namespace_for("x_session_y", Some("z")),
            Err(MnemoError::Identity(_))
        ));
    }

    #[tokio::test]
    async fn registry_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("registry.db");
        let path = db_path.to_str().unwrap();

        let user_id = {
            let db = Database::open(path).await.unwrap();
            let registry = SessionRegistry::open(db.clone(), &SessionConfig::default(), "m")
                .await
                .unwrap();
            let id = registry.create_user("dana", JsonMap::new()).await.unwrap();
            db.close().await.unwrap();
            id
        };

        let db = Database::open(path).await.unwrap();
        let registry = SessionRegistry::open(db, &SessionConfig::default(), "m")
            .await
            .unwrap();
        let found = registry.find_user_by_username("dana").await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);
    }
}
