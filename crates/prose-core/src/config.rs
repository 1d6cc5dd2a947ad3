//! Checker configuration.
//!
//! All tunables of the annotation engine live in [`CheckerConfig`] and are passed in at
//! construction time. Nothing in the engine reads ambient/global settings; hosts that persist
//! preferences can serialize the whole struct (all fields have serde defaults, so partial
//! config files keep working across versions).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the spell checker and the incremental checker scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Whether spell checking runs at all. Pattern (syntax) annotation is not affected.
    pub spelling_enabled: bool,
    /// Interval of the cursor-local spell-check pass, in milliseconds.
    ///
    /// The local pass is a one-shot timer that re-arms itself after each run, so this is the
    /// *minimum* gap between two local passes, not a fixed period.
    pub local_interval_ms: u64,
    /// Number of words checked on each side of the cursor by a local pass.
    pub local_word_bound: usize,
    /// Maximum number of spelling suggestions returned for a word.
    pub max_suggestions: usize,
    /// Words shorter than this (after punctuation trimming) are never flagged as misspelled.
    pub min_word_len: usize,
    /// Seed for the session ignore list. Stored lowercase; matching is case-insensitive.
    pub ignored_words: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            spelling_enabled: true,
            local_interval_ms: 1000,
            local_word_bound: 20,
            max_suggestions: 4,
            min_word_len: 3,
            ignored_words: Vec::new(),
        }
    }
}

impl CheckerConfig {
    /// The local pass interval as a [`Duration`].
    pub fn local_interval(&self) -> Duration {
        Duration::from_millis(self.local_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::default();
        assert!(config.spelling_enabled);
        assert_eq!(config.local_interval(), Duration::from_millis(1000));
        assert_eq!(config.local_word_bound, 20);
        assert_eq!(config.max_suggestions, 4);
        assert_eq!(config.min_word_len, 3);
        assert!(config.ignored_words.is_empty());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: CheckerConfig =
            serde_json::from_str(r#"{ "local_interval_ms": 2000, "ignored_words": ["tui"] }"#)
                .unwrap();
        assert_eq!(config.local_interval_ms, 2000);
        assert_eq!(config.ignored_words, vec!["tui".to_string()]);
        // Unspecified fields fall back to defaults.
        assert!(config.spelling_enabled);
        assert_eq!(config.local_word_bound, 20);
    }

    #[test]
    fn test_round_trip() {
        let mut config = CheckerConfig::default();
        config.spelling_enabled = false;
        config.min_word_len = 4;
        let json = serde_json::to_string(&config).unwrap();
        let back: CheckerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
