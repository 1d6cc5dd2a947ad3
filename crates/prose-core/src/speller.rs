//! The dictionary service: spell-check lookups with graceful degradation.
//!
//! [`Speller`] wraps an optional [`Dictionary`] backend and layers the editor-side policy on
//! top: punctuation trimming, the minimum word length, the session ignore list, and the
//! degrade-to-correct rule. A missing or failing backend never surfaces as an error: words
//! simply stop being flagged, and the condition is logged once at load time by whoever
//! constructed the backend.

use crate::config::CheckerConfig;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// Error produced by a [`Dictionary`] backend.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// A lookup failed inside the backend.
    #[error("dictionary lookup failed: {0}")]
    Lookup(String),
}

/// A spell-check backend.
///
/// Backends receive words after leading/trailing punctuation has been trimmed, but with their
/// original case: backends may be case-sensitive ("Paris" vs "paris"). Lookups must be pure
/// and bounded in cost (in-memory, no network); they run on the hot edit path.
pub trait Dictionary {
    /// Returns `true` if `word` is spelled correctly.
    fn check(&self, word: &str) -> Result<bool, DictionaryError>;

    /// Ordered spelling suggestions for `word` (best first). May be empty.
    fn suggest(&self, word: &str) -> Result<Vec<String>, DictionaryError>;
}

/// A plain in-memory word-list backend.
///
/// Exact-match lookups against a word set; suggestions are limited to case corrections. Useful
/// for user word lists and for tests; full affix-aware checking comes from an external
/// backend crate.
#[derive(Debug, Default, Clone)]
pub struct WordListDictionary {
    words: HashSet<String>,
}

impl WordListDictionary {
    /// Create an empty word list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a word list from an iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a word to the list.
    pub fn insert(&mut self, word: &str) {
        self.words.insert(word.to_string());
    }
}

impl Dictionary for WordListDictionary {
    fn check(&self, word: &str) -> Result<bool, DictionaryError> {
        Ok(self.words.contains(word))
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, DictionaryError> {
        let lower = word.to_lowercase();
        let mut matches: Vec<String> = self
            .words
            .iter()
            .filter(|w| w.to_lowercase() == lower)
            .cloned()
            .collect();
        matches.sort();
        Ok(matches)
    }
}

/// The session ignore list: words the user asked the checker to stop flagging.
///
/// Stored lowercase, matched case-insensitively, append-only during a session. The host seeds
/// it from configuration and reads it back for persistence.
#[derive(Debug, Default, Clone)]
pub struct IgnoreList {
    words: HashSet<String>,
}

impl IgnoreList {
    /// Create an empty ignore list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `word`; returns `true` if it was not already present.
    pub fn insert(&mut self, word: &str) -> bool {
        self.words.insert(word.to_lowercase())
    }

    /// Returns `true` if `word` is ignored (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of ignored words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The ignored words, sorted, for external persistence.
    pub fn words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.iter().cloned().collect();
        words.sort();
        words
    }
}

/// Punctuation stripped from word edges before lookup.
///
/// Most punctuation already separates words; what remains at word edges are quote-like marks
/// and dashes that are word-internal characters elsewhere ("don't", "re-check").
const TRIM_PUNCTUATION: &[char] = &['\'', '’', '‘', '-', '–', '—'];

/// Strip leading/trailing [`TRIM_PUNCTUATION`] from `word`.
pub fn trim_word(word: &str) -> &str {
    word.trim_matches(|ch| TRIM_PUNCTUATION.contains(&ch))
}

/// The editor-facing spell-check service.
pub struct Speller {
    backend: Option<Box<dyn Dictionary>>,
    ignore: IgnoreList,
    max_suggestions: usize,
    min_word_len: usize,
}

impl Speller {
    /// Create a speller without a backend: every word checks as correct.
    pub fn new(config: &CheckerConfig) -> Self {
        Self::with_backend_option(config, None)
    }

    /// Create a speller over `backend`.
    pub fn with_backend(config: &CheckerConfig, backend: Box<dyn Dictionary>) -> Self {
        Self::with_backend_option(config, Some(backend))
    }

    fn with_backend_option(config: &CheckerConfig, backend: Option<Box<dyn Dictionary>>) -> Self {
        let mut ignore = IgnoreList::new();
        for word in &config.ignored_words {
            ignore.insert(word);
        }
        Self {
            backend,
            ignore,
            max_suggestions: config.max_suggestions,
            min_word_len: config.min_word_len,
        }
    }

    /// Replace (or remove) the backend. The caller is expected to request a spelling recheck.
    pub fn set_backend(&mut self, backend: Option<Box<dyn Dictionary>>) {
        self.backend = backend;
    }

    /// Returns `true` if a backend is attached.
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Minimum word length (after trimming) for a word to be flagged.
    pub fn min_word_len(&self) -> usize {
        self.min_word_len
    }

    /// Check whether `word` is spelled correctly.
    ///
    /// Returns `true` when the word is empty after trimming, on the ignore list, when no
    /// backend is attached, or when the backend lookup fails (logged; the word will be
    /// re-checked naturally by the next pass covering it).
    pub fn check(&self, word: &str) -> bool {
        let word = trim_word(word);
        if word.is_empty() || self.ignore.contains(word) {
            return true;
        }
        let Some(backend) = &self.backend else {
            return true;
        };
        backend.check(word).unwrap_or_else(|err| {
            warn!(word, error = %err, "spell check lookup failed; treating word as correct");
            true
        })
    }

    /// Full misspelling test as used by checker passes.
    ///
    /// A word is misspelled only if, after trimming, it reaches the minimum length, contains at
    /// least one alphabetic character (bare numbers are never flagged), and fails [`check`].
    ///
    /// [`check`]: Self::check
    pub fn is_misspelled(&self, word: &str) -> bool {
        let trimmed = trim_word(word);
        if trimmed.chars().count() < self.min_word_len {
            return false;
        }
        if !trimmed.chars().any(char::is_alphabetic) {
            return false;
        }
        !self.check(trimmed)
    }

    /// Ordered suggestions for `word`, capped at the configured maximum.
    ///
    /// Empty when no backend is attached or the lookup fails.
    pub fn suggest(&self, word: &str) -> Vec<String> {
        let word = trim_word(word);
        if word.is_empty() {
            return Vec::new();
        }
        let Some(backend) = &self.backend else {
            return Vec::new();
        };
        match backend.suggest(word) {
            Ok(mut suggestions) => {
                suggestions.truncate(self.max_suggestions);
                suggestions
            }
            Err(err) => {
                warn!(word, error = %err, "spelling suggestion lookup failed");
                Vec::new()
            }
        }
    }

    /// Add `word` (trimmed, lowercased) to the ignore list; returns `true` if newly added.
    pub fn ignore(&mut self, word: &str) -> bool {
        let word = trim_word(word);
        if word.is_empty() {
            return false;
        }
        self.ignore.insert(word)
    }

    /// Returns `true` if `word` is on the ignore list.
    pub fn is_ignored(&self, word: &str) -> bool {
        self.ignore.contains(trim_word(word))
    }

    /// The ignore list contents, sorted, for external persistence.
    pub fn ignored_words(&self) -> Vec<String> {
        self.ignore.words()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingDictionary;

    impl Dictionary for FailingDictionary {
        fn check(&self, _word: &str) -> Result<bool, DictionaryError> {
            Err(DictionaryError::Lookup("backend gone".into()))
        }

        fn suggest(&self, _word: &str) -> Result<Vec<String>, DictionaryError> {
            Err(DictionaryError::Lookup("backend gone".into()))
        }
    }

    fn speller_with_words(words: &[&str]) -> Speller {
        Speller::with_backend(
            &CheckerConfig::default(),
            Box::new(WordListDictionary::from_words(words.iter().copied())),
        )
    }

    #[test]
    fn test_no_backend_everything_correct() {
        let speller = Speller::new(&CheckerConfig::default());
        assert!(speller.check("zzxqj"));
        assert!(!speller.is_misspelled("zzxqj"));
        assert!(speller.suggest("zzxqj").is_empty());
    }

    #[test]
    fn test_backend_check() {
        let speller = speller_with_words(&["hello", "world"]);
        assert!(speller.check("hello"));
        assert!(!speller.check("helo"));
        assert!(speller.is_misspelled("helo"));
        assert!(!speller.is_misspelled("hello"));
    }

    #[test]
    fn test_trimming_before_lookup() {
        let speller = speller_with_words(&["hello"]);
        assert!(speller.check("'hello'"));
        assert!(speller.check("—hello—"));
        // Whole-word punctuation trims to nothing: correct.
        assert!(speller.check("''"));
    }

    #[test]
    fn test_min_length_and_numeric_words_never_flagged() {
        let speller = speller_with_words(&["hello"]);
        assert!(!speller.is_misspelled("ab"));
        assert!(!speller.is_misspelled("2013"));
        assert!(speller.is_misspelled("abc"));
    }

    #[test]
    fn test_ignore_list_overrides_backend() {
        let mut speller = speller_with_words(&["hello"]);
        assert!(speller.is_misspelled("quiedit"));
        assert!(speller.ignore("quiedit"));
        assert!(!speller.ignore("quiedit"));
        assert!(speller.check("quiedit"));
        assert!(!speller.is_misspelled("quiedit"));
        // Case-insensitive.
        assert!(speller.check("Quiedit"));
        assert_eq!(speller.ignored_words(), vec!["quiedit".to_string()]);
    }

    #[test]
    fn test_ignore_seed_from_config() {
        let config = CheckerConfig {
            ignored_words: vec!["Antwerp".into()],
            ..CheckerConfig::default()
        };
        let speller = Speller::with_backend(
            &config,
            Box::new(WordListDictionary::from_words(["hello"])),
        );
        assert!(speller.check("antwerp"));
        assert!(speller.check("Antwerp"));
    }

    #[test]
    fn test_lookup_failure_degrades_to_correct() {
        let speller = Speller::with_backend(&CheckerConfig::default(), Box::new(FailingDictionary));
        assert!(speller.check("anything"));
        assert!(!speller.is_misspelled("anything"));
        assert!(speller.suggest("anything").is_empty());
    }

    #[test]
    fn test_suggest_cap() {
        let config = CheckerConfig {
            max_suggestions: 2,
            ..CheckerConfig::default()
        };
        let speller = Speller::with_backend(
            &config,
            Box::new(WordListDictionary::from_words(["Word", "WORD", "word"])),
        );
        let suggestions = speller.suggest("word");
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn test_word_list_case_sensitive_check() {
        let speller = speller_with_words(&["Paris"]);
        assert!(speller.check("Paris"));
        assert!(!speller.check("paris"));
    }
}
