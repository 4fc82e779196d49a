// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded short-term conversation buffer.

use std::collections::VecDeque;

use mnemo_core::{ProviderMessage, Role};
use tracing::trace;

use crate::types::ShortTermStats;

/// Ordered, capacity-bounded message log for the current conversation.
///
/// On overflow the oldest non-system message is evicted; system messages
/// are only evicted once nothing else is left.
#[derive(Debug, Clone)]
pub struct ShortTermMemory {
    messages: VecDeque<ProviderMessage>,
    max_size: usize,
}

impl ShortTermMemory {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            messages: VecDeque::with_capacity(max_size + 1),
            max_size,
        }
    }

    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push_back(ProviderMessage::new(role, content));
        while self.messages.len() > self.max_size {
            let victim = self
                .messages
                .iter()
                .position(|m| m.role != Role::System)
                .unwrap_or(0);
            if let Some(evicted) = self.messages.remove(victim) {
                trace!(role = %evicted.role, "evicted short-term message");
            }
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(Role::User, content);
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(Role::Assistant, content);
    }

    pub fn add_system_message(&mut self, content: impl Into<String>) {
        self.add_message(Role::System, content);
    }

    /// Every buffered message, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &ProviderMessage> {
        self.messages.iter()
    }

    /// The buffer as prompt messages, optionally without system entries.
    pub fn conversation_context(&self, include_system: bool) -> Vec<ProviderMessage> {
        self.messages
            .iter()
            .filter(|m| include_system || m.role != Role::System)
            .cloned()
            .collect()
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ProviderMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn last(&self) -> Option<&ProviderMessage> {
        self.messages.back()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> ShortTermStats {
        let count = |role: Role| self.messages.iter().filter(|m| m.role == role).count();
        ShortTermStats {
            total_messages: self.messages.len(),
            user_messages: count(Role::User),
            assistant_messages: count(Role::Assistant),
            system_messages: count(Role::System),
            max_size: self.max_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_keeps_most_recent_in_order() {
        let mut memory = ShortTermMemory::new(10);
        for i in 0..13 {
            memory.add_user_message(format!("message {i}"));
        }
        assert_eq!(memory.len(), 10);
        let contents: Vec<_> = memory.messages().map(|m| m.content.clone()).collect();
        let expected: Vec<_> = (3..13).map(|i| format!("message {i}")).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn system_messages_survive_eviction() {
        let mut memory = ShortTermMemory::new(3);
        memory.add_system_message("rules");
        memory.add_user_message("a");
        memory.add_assistant_message("b");
        memory.add_user_message("c");

        let roles: Vec<_> = memory.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(roles, vec!["rules", "b", "c"]);
    }

    #[test]
    fn only_system_messages_evict_oldest() {
        let mut memory = ShortTermMemory::new(2);
        memory.add_system_message("s1");
        memory.add_system_message("s2");
        memory.add_system_message("s3");
        let contents: Vec<_> = memory.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["s2", "s3"]);
    }

    #[test]
    fn context_can_exclude_system() {
        let mut memory = ShortTermMemory::new(5);
        memory.add_system_message("rules");
        memory.add_user_message("hi");
        memory.add_assistant_message("hello");

        assert_eq!(memory.conversation_context(true).len(), 3);
        let without = memory.conversation_context(false);
        assert_eq!(without.len(), 2);
        assert!(without.iter().all(|m| m.role != Role::System));
        assert_eq!(memory.recent(1)[0].content, "hello");
    }

    #[test]
    fn stats_and_clear() {
        let mut memory = ShortTermMemory::new(4);
        memory.add_user_message("q");
        memory.add_assistant_message("a");
        memory.add_user_message("q2");

        let stats = memory.stats();
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.assistant_messages, 1);
        assert_eq!(stats.system_messages, 0);
        assert_eq!(stats.max_size, 4);

        memory.clear();
        assert!(memory.is_empty());
    }
}
