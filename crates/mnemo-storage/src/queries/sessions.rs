// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session CRUD operations.

use chrono::{DateTime, Utc};
use mnemo_core::MnemoError;
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, format_timestamp, map_tr_err, parse_metadata, parse_timestamp};
use crate::models::ChatSession;

const SESSION_COLUMNS: &str = "session_id, user_id, created_at, last_activity, metadata";

fn session_from_row(row: &Row<'_>) -> Result<ChatSession, rusqlite::Error> {
    let created_at: String = row.get(2)?;
    let last_activity: String = row.get(3)?;
    let metadata: String = row.get(4)?;
    Ok(ChatSession {
        session_id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_timestamp(2, &created_at)?,
        last_activity: parse_timestamp(3, &last_activity)?,
        metadata: parse_metadata(4, &metadata)?,
    })
}

/// Insert a session and bump its owner's login bookkeeping atomically.
///
/// Returns `false` without writing anything when the owning user does not exist.
pub async fn insert_session(db: &Database, session: &ChatSession) -> Result<bool, MnemoError> {
    let session = session.clone();
    let metadata = serde_json::to_string(&session.metadata).map_err(MnemoError::storage)?;
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let now = format_timestamp(session.created_at);
            let updated = tx.execute(
                "UPDATE users SET total_sessions = total_sessions + 1, last_login = ?1
                 WHERE user_id = ?2",
                params![now, session.user_id],
            )?;
            if updated == 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO sessions (session_id, user_id, created_at, last_activity, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session.session_id,
                    session.user_id,
                    now,
                    format_timestamp(session.last_activity),
                    metadata,
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by id.
pub async fn get_session(db: &Database, session_id: &str) -> Result<Option<ChatSession>, MnemoError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ChatSession>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
                params![session_id],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Set `last_activity`. Returns `false` for an unknown session.
pub async fn touch_session(
    db: &Database,
    session_id: &str,
    at: DateTime<Utc>,
) -> Result<bool, MnemoError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "UPDATE sessions SET last_activity = ?1 WHERE session_id = ?2",
                params![format_timestamp(at), session_id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one session. Returns `false` for an unknown session.
pub async fn delete_session(db: &Database, session_id: &str) -> Result<bool, MnemoError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM sessions WHERE session_id = ?1",
                params![session_id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// A user's sessions, most recently active first.
pub async fn list_user_sessions(
    db: &Database,
    user_id: &str,
) -> Result<Vec<ChatSession>, MnemoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<ChatSession>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ?1
                 ORDER BY last_activity DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![user_id], session_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every session whose last activity is older than `cutoff`.
pub async fn delete_sessions_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<usize, MnemoError> {
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM sessions WHERE last_activity < ?1",
                params![format_timestamp(cutoff)],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Total sessions, and sessions active since `active_since`.
pub async fn count_sessions(
    db: &Database,
    active_since: DateTime<Utc>,
) -> Result<(usize, usize), MnemoError> {
    db.connection()
        .call(move |conn| -> Result<(i64, i64), rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(last_activity > ?1), 0) FROM sessions",
                params![format_timestamp(active_since)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
        })
        .await
        .map(|(total, active)| (total.max(0) as usize, active.max(0) as usize))
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JsonMap, User, new_session_id, new_user_id};
    use crate::queries::users::{get_user, insert_user};
    use chrono::Duration;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_user(db: &Database) -> User {
        let now = Utc::now() - Duration::hours(1);
        let user = User {
            user_id: new_user_id(),
            username: "tester".into(),
            created_at: now,
            last_login: now,
            total_sessions: 0,
            metadata: JsonMap::new(),
        };
        insert_user(db, &user).await.unwrap();
        user
    }

    fn make_session(user_id: &str, last_activity: DateTime<Utc>) -> ChatSession {
        ChatSession {
            session_id: new_session_id(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            last_activity,
            metadata: JsonMap::new(),
        }
    }

    #[tokio::test]
    async fn insert_bumps_owner_counters() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db).await;
        let session = make_session(&user.user_id, Utc::now());

        assert!(insert_session(&db, &session).await.unwrap());
        let owner = get_user(&db, &user.user_id).await.unwrap().unwrap();
        assert_eq!(owner.total_sessions, 1);
        assert!(owner.last_login > user.last_login);

        let loaded = get_session(&db, &session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.user_id, user.user_id);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn insert_for_unknown_user_writes_nothing() {
        let (db, _dir) = setup_db().await;
        let session = make_session("user_ghost", Utc::now());
        assert!(!insert_session(&db, &session).await.unwrap());
        assert!(get_session(&db, &session.session_id).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_sessions_are_removed() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db).await;
        let now = Utc::now();
        let fresh = make_session(&user.user_id, now);
        let stale = make_session(&user.user_id, now - Duration::hours(30));
        insert_session(&db, &fresh).await.unwrap();
        insert_session(&db, &stale).await.unwrap();

        let (total, active) = count_sessions(&db, now - Duration::hours(1)).await.unwrap();
        assert_eq!((total, active), (2, 1));

        let removed = delete_sessions_before(&db, now - Duration::hours(24)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(get_session(&db, &stale.session_id).await.unwrap().is_none());
        assert!(get_session(&db, &fresh.session_id).await.unwrap().is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn listing_orders_by_recent_activity() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db).await;
        let now = Utc::now();
        let older = make_session(&user.user_id, now - Duration::minutes(5));
        let newer = make_session(&user.user_id, now);
        insert_session(&db, &older).await.unwrap();
        insert_session(&db, &newer).await.unwrap();

        let listed = list_user_sessions(&db, &user.user_id).await.unwrap();
        assert_eq!(listed[0].session_id, newer.session_id);

        assert!(touch_session(&db, &older.session_id, now + Duration::minutes(1)).await.unwrap());
        let listed = list_user_sessions(&db, &user.user_id).await.unwrap();
        assert_eq!(listed[0].session_id, older.session_id);

        assert!(!touch_session(&db, "session_missing", now).await.unwrap());
        db.close().await.unwrap();
    }
}
