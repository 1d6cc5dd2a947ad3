#![warn(missing_docs)]
//! `prose-core-spell` - Hunspell-format dictionary backend for `prose-core`.
//!
//! Loads the standard two-artifact dictionary format, an affix file (`<locale>.aff`) plus a
//! word list (`<locale>.dic`), through the pure-Rust `spellbook` crate and exposes it as a
//! [`prose_core::Dictionary`].
//!
//! Dictionary absence is a normal condition, not an error: use [`open_or_disable`] at editor
//! startup to get `Some(backend)` when the files load and a logged `None` (spell checking
//! disabled for the session) when they don't.

use prose_core::{Dictionary, DictionaryError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from loading a Hunspell-format dictionary.
#[derive(Debug, Error)]
pub enum SpellerError {
    /// An affix or word-list file could not be read.
    #[error("failed to read dictionary file: {0}")]
    Io(#[from] std::io::Error),

    /// The affix or word-list contents could not be parsed.
    #[error("failed to parse dictionary: {0}")]
    Parse(String),
}

/// A spell-check backend over Hunspell `.aff`/`.dic` artifacts.
pub struct HunspellDictionary {
    inner: spellbook::Dictionary,
}

impl HunspellDictionary {
    /// Load `<dir>/<locale>.aff` and `<dir>/<locale>.dic`.
    pub fn load(dir: &Path, locale: &str) -> Result<Self, SpellerError> {
        let aff = fs::read_to_string(dir.join(format!("{locale}.aff")))?;
        let dic = fs::read_to_string(dir.join(format!("{locale}.dic")))?;
        Self::from_strings(&aff, &dic)
    }

    /// Build a dictionary from in-memory affix and word-list contents.
    pub fn from_strings(aff: &str, dic: &str) -> Result<Self, SpellerError> {
        let inner = spellbook::Dictionary::new(aff, dic)
            .map_err(|err| SpellerError::Parse(err.to_string()))?;
        Ok(Self { inner })
    }
}

impl Dictionary for HunspellDictionary {
    fn check(&self, word: &str) -> Result<bool, DictionaryError> {
        Ok(self.inner.check(word))
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, DictionaryError> {
        let mut suggestions = Vec::new();
        self.inner.suggest(word, &mut suggestions);
        Ok(suggestions)
    }
}

/// The platform default search path for Hunspell dictionaries.
pub fn system_dictionary_dir() -> PathBuf {
    if cfg!(unix) {
        PathBuf::from("/usr/share/hunspell")
    } else {
        PathBuf::from("resources")
    }
}

/// Load a dictionary, degrading to `None` when it cannot be loaded.
///
/// The failure is logged and permanent for the session: the editor simply runs with spell
/// checking disabled, it never surfaces a startup error for a missing dictionary.
pub fn open_or_disable(dir: &Path, locale: &str) -> Option<Box<dyn Dictionary>> {
    match HunspellDictionary::load(dir, locale) {
        Ok(dictionary) => {
            info!(%locale, dir = %dir.display(), "loaded spelling dictionary");
            Some(Box::new(dictionary))
        }
        Err(err) => {
            warn!(
                %locale,
                dir = %dir.display(),
                error = %err,
                "spelling dictionary unavailable; spell checking disabled"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_AFF: &str = "SET UTF-8\nTRY esianrtolcdugmphbyfvkwz\n";
    const TEST_DIC: &str = "3\nhello\nworld\nprose\n";

    #[test]
    fn test_from_strings_check() {
        let dict = HunspellDictionary::from_strings(TEST_AFF, TEST_DIC).unwrap();
        assert!(dict.check("hello").unwrap());
        assert!(dict.check("world").unwrap());
        assert!(!dict.check("helo").unwrap());
    }

    #[test]
    fn test_suggest_returns_without_error() {
        let dict = HunspellDictionary::from_strings(TEST_AFF, TEST_DIC).unwrap();
        let suggestions = dict.suggest("helo").unwrap();
        // Suggestion quality depends on the affix TRY table; known-good words never appear
        // as their own suggestion target.
        assert!(suggestions.iter().all(|s| s != "helo"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut aff = fs::File::create(dir.path().join("en_TEST.aff")).unwrap();
        aff.write_all(TEST_AFF.as_bytes()).unwrap();
        let mut dic = fs::File::create(dir.path().join("en_TEST.dic")).unwrap();
        dic.write_all(TEST_DIC.as_bytes()).unwrap();

        let dict = HunspellDictionary::load(dir.path(), "en_TEST").unwrap();
        assert!(dict.check("prose").unwrap());
    }

    #[test]
    fn test_missing_files_degrade_to_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_or_disable(dir.path(), "xx_XX").is_none());
    }

    #[test]
    fn test_present_files_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en_TEST.aff"), TEST_AFF).unwrap();
        fs::write(dir.path().join("en_TEST.dic"), TEST_DIC).unwrap();
        let backend = open_or_disable(dir.path(), "en_TEST").unwrap();
        assert!(backend.check("hello").unwrap());
    }
}
