// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Clones of [`Database`] share that thread; do not open extra connections for writes.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use mnemo_core::MnemoError;
use tracing::{debug, info};

use crate::migrations::run_migrations;

/// Handle to the SQLite database shared by the registry and the vector index.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (or create) the database with WAL enabled and run pending migrations.
    pub async fn open(path: &str) -> Result<Self, MnemoError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, MnemoError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(MnemoError::storage)?;
        }

        // Schema setup runs on a plain blocking connection before the async
        // writer thread takes over.
        let setup_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), MnemoError> {
            let mut conn = rusqlite::Connection::open(&setup_path).map_err(MnemoError::storage)?;
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(MnemoError::storage)?;
            }
            run_migrations(&mut conn)
        })
        .await
        .map_err(|e| MnemoError::Internal(format!("database setup task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(MnemoError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )
        })
        .await
        .map_err(map_tr_err)?;

        info!(path, wal_mode, "database opened");
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// The async connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Filesystem path this database was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Checkpoint the WAL and close the writer thread.
    pub async fn close(self) -> Result<(), MnemoError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(MnemoError::storage)?;
        debug!(path = %self.path, "database closed");
        Ok(())
    }
}

/// Maps a tokio-rusqlite failure into the shared error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

/// Timestamp text stored in every table: RFC 3339, millisecond precision, `Z` suffix.
///
/// The fixed width keeps lexicographic and chronological order identical.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored timestamp column.
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parses a stored JSON metadata column.
pub(crate) fn parse_metadata(
    idx: usize,
    raw: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
