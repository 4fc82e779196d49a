// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions over [`Database`](crate::Database).

pub mod sessions;
pub mod users;
