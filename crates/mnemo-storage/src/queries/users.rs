// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use mnemo_core::MnemoError;
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, format_timestamp, map_tr_err, parse_metadata, parse_timestamp};
use crate::models::User;

const USER_COLUMNS: &str =
    "user_id, username, created_at, last_login, total_sessions, metadata";

fn user_from_row(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    let created_at: String = row.get(2)?;
    let last_login: String = row.get(3)?;
    let total_sessions: i64 = row.get(4)?;
    let metadata: String = row.get(5)?;
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        created_at: parse_timestamp(2, &created_at)?,
        last_login: parse_timestamp(3, &last_login)?,
        total_sessions: total_sessions.max(0) as u64,
        metadata: parse_metadata(5, &metadata)?,
    })
}

/// Insert a new user row.
pub async fn insert_user(db: &Database, user: &User) -> Result<(), MnemoError> {
    let user = user.clone();
    let metadata = serde_json::to_string(&user.metadata).map_err(MnemoError::storage)?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (user_id, username, created_at, last_login, total_sessions, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.user_id,
                    user.username,
                    format_timestamp(user.created_at),
                    format_timestamp(user.last_login),
                    user.total_sessions as i64,
                    metadata,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user by id.
pub async fn get_user(db: &Database, user_id: &str) -> Result<Option<User>, MnemoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                params![user_id],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Earliest-created user with the given username.
pub async fn find_user_by_username(
    db: &Database,
    username: &str,
) -> Result<Option<User>, MnemoError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = ?1
                     ORDER BY created_at ASC, rowid ASC LIMIT 1"
                ),
                params![username],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All users in creation order.
pub async fn list_users(db: &Database) -> Result<Vec<User>, MnemoError> {
    db.connection()
        .call(|conn| -> Result<Vec<User>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of registered users.
pub async fn count_users(db: &Database) -> Result<usize, MnemoError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        })
        .await
        .map(|n| n.max(0) as usize)
        .map_err(map_tr_err)
}

/// Delete a user and every session it owns in one transaction.
///
/// Returns `false` when the user does not exist.
pub async fn delete_user_cascade(db: &Database, user_id: &str) -> Result<bool, MnemoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
            let removed = tx.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JsonMap, new_user_id};
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_user(username: &str, offset_secs: i64) -> User {
        let ts = Utc::now() + Duration::seconds(offset_secs);
        User {
            user_id: new_user_id(),
            username: username.to_string(),
            created_at: ts,
            last_login: ts,
            total_sessions: 0,
            metadata: JsonMap::new(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let mut user = make_user("alice", 0);
        user.metadata
            .insert("theme".into(), serde_json::Value::String("dark".into()));
        insert_user(&db, &user).await.unwrap();

        let loaded = get_user(&db, &user.user_id).await.unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.metadata["theme"], "dark");
        assert_eq!(format_timestamp(loaded.created_at), format_timestamp(user.created_at));

        assert!(get_user(&db, "user_missing").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_usernames_resolve_to_earliest() {
        let (db, _dir) = setup_db().await;
        let first = make_user("sam", -10);
        let second = make_user("sam", 0);
        insert_user(&db, &second).await.unwrap();
        insert_user(&db, &first).await.unwrap();

        let found = find_user_by_username(&db, "sam").await.unwrap().unwrap();
        assert_eq!(found.user_id, first.user_id);
        assert_eq!(count_users(&db).await.unwrap(), 2);

        let listed = list_users(&db).await.unwrap();
        assert_eq!(listed[0].user_id, first.user_id);
        db.close().await.unwrap();
    }
}
