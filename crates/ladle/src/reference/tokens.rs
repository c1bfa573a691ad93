//! Meaning-carrying token allow-list.

use std::collections::BTreeSet;
use std::collections::HashSet;

/// The closed allow-list of tokens considered semantically relevant for
/// matching. Everything else (stopwords, culinary noise) is dropped before
/// token-set comparison.
#[derive(Debug, Clone, Default)]
pub struct MeaningTokens {
    allow: HashSet<String>,
}

impl MeaningTokens {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            allow: tokens.into_iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.allow.contains(token)
    }

    pub fn len(&self) -> usize {
        self.allow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty()
    }

    /// Reduce normalized text to its ordered meaning-token set.
    pub fn token_set(&self, normalized: &str) -> BTreeSet<String> {
        normalized
            .split_whitespace()
            .filter(|t| self.allow.contains(*t))
            .map(|t| t.to_string())
            .collect()
    }

    /// Deterministic index key for the keep-meaning-tokens tier: the sorted
    /// meaning tokens joined by single spaces.
    pub fn keep_key(&self, normalized: &str) -> String {
        let set = self.token_set(normalized);
        set.into_iter().collect::<Vec<_>>().join(" ")
    }
}
