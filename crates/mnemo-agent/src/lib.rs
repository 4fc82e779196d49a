// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory-augmented conversational agent.
//!
//! [`MemoryAgent`] owns both memory tiers for one identity and knows how to
//! build prompts and persist memory suggestions. [`MemoryWorkflow`] drives a
//! single conversation turn through its fixed stages.

pub mod agent;
pub mod workflow;

pub use agent::{MemoryAgent, MemoryStats};
pub use workflow::{MemoryWorkflow, Stage, TurnResult, TurnState, create_memory_workflow};
