// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Mnemo.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer concurrency
//! model via `tokio-rusqlite`. Hosts the user/session registry; the
//! long-term memory vector index shares the same [`Database`].

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod registry;

pub use database::{Database, format_timestamp};
pub use models::{ChatSession, JsonMap, RegistryStats, User};
pub use registry::SessionRegistry;
