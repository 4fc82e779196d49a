// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory suggestion analysis: deciding which utterances deserve long-term storage.

use crate::types::{MemorySuggestion, MemoryType};

/// Strategy that proposes long-term memories from a conversation turn.
pub trait MemoryAnalyzer: Send + Sync {
    /// Suggestions derived from the user's utterance alone.
    fn classify(&self, utterance: &str) -> Vec<MemorySuggestion>;

    /// Suggestions for a full turn. The default ignores the response.
    fn analyze(&self, utterance: &str, _response: &str) -> Vec<MemorySuggestion> {
        self.classify(utterance)
    }
}

/// One keyword category of the default analyzer.
#[derive(Debug, Clone, Copy)]
struct Rule {
    patterns: &'static [&'static str],
    memory_type: MemoryType,
    importance: f64,
    reason: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        patterns: &[
            "i like",
            "i prefer",
            "i don't like",
            "i hate",
            "my favorite",
            "i love",
            "i enjoy",
        ],
        memory_type: MemoryType::Preference,
        importance: 0.8,
        reason: "User expressed a preference",
    },
    Rule {
        patterns: &["my name is", "i am", "i work", "i live", "my job"],
        memory_type: MemoryType::Fact,
        importance: 0.9,
        reason: "User shared personal information",
    },
    Rule {
        patterns: &["remember that", "important", "don't forget", "note that"],
        memory_type: MemoryType::Fact,
        importance: 0.8,
        reason: "User indicated this is important to remember",
    },
];

/// Keyword-table analyzer. Stateless and deterministic.
///
/// Every category whose pattern occurs in the lower-cased utterance yields one
/// suggestion carrying the original utterance, in table order.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl MemoryAnalyzer for KeywordAnalyzer {
    fn classify(&self, utterance: &str) -> Vec<MemorySuggestion> {
        let normalized = utterance.to_lowercase().replace('\u{2019}', "'");
        RULES
            .iter()
            .filter(|rule| rule.patterns.iter().any(|p| normalized.contains(p)))
            .map(|rule| MemorySuggestion {
                memory_type: rule.memory_type,
                content: utterance.to_string(),
                reason: rule.reason.to_string(),
                importance: rule.importance,
            })
            .collect()
    }
}
