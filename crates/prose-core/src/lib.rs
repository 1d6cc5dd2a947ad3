#![warn(missing_docs)]
//! prose-core - Headless annotation engine for a distraction-free Markdown editor
//!
//! # Overview
//!
//! `prose-core` is the checking kernel of a fullscreen plain-text/Markdown editor: it owns a
//! mutable text buffer and keeps a set of visual annotations (misspelling underlines, Markdown
//! headings, emphasis, links, code spans, …) correct and fresh across edits, without ever
//! blocking typing on a full-document scan. Rendering, file dialogs, theming and window chrome
//! are host concerns; the host reads annotations back through a single query surface.
//!
//! # Core ideas
//!
//! - **Non-destructive annotations**: the document stores only text. Annotations are
//!   `(range, kind)` pairs held beside it; kinds may overlap each other but never themselves.
//! - **Shift with every edit**: each mutation atomically shifts/invalidates the annotations it
//!   touches, so ranges are always valid against the current text.
//! - **Incremental checking**: a synchronous word pass after each edit, a bounded cursor-local
//!   spelling pass on a self-re-arming timer, and a full pass only on load/explicit recheck.
//!   Every pass clears exactly what it recomputes, making passes idempotent in any order.
//! - **Graceful degradation**: a missing or failing dictionary backend disables flagging, it
//!   never surfaces as an error.
//!
//! # Quick start
//!
//! ```rust
//! use prose_core::{AnnotationKind, CheckerConfig, Editor, WordListDictionary};
//!
//! let mut editor = Editor::new(CheckerConfig::default());
//! editor.set_dictionary(Some(Box::new(WordListDictionary::from_words([
//!     "Hello", "world",
//! ]))));
//! editor.open("Helo world");
//!
//! // "Helo" is flagged by the load-time full pass.
//! let misspelled = editor.annotations().of_kind(AnnotationKind::Misspelling);
//! assert_eq!(misspelled[0].range, 0..4);
//!
//! // Fix it; the keystroke-synchronous word pass clears the flag.
//! editor.set_cursor(2);
//! editor.insert("l");
//! assert!(editor.annotations().of_kind(AnnotationKind::Misspelling).is_empty());
//! ```
//!
//! # Module map
//!
//! - [`document`] - rope-backed text buffer and word segmentation
//! - [`annotations`] - the annotation model (per-kind spans, shift, query)
//! - [`speller`] - dictionary service facade, ignore list, degradation policy
//! - [`patterns`] - the pattern-engine seam (implemented by `prose-core-markdown`)
//! - [`scheduler`] - pass queue, local-pass timer, clear-then-add merge
//! - [`editor`] - the edit/command surface tying everything together
//! - [`search`] - plain-text find helpers
//! - [`config`] - construction-time configuration
//!
//! Dictionary backends live outside the kernel; `prose-core-spell` provides a Hunspell-format
//! (`.aff` + `.dic`) backend.

pub mod annotations;
pub mod config;
pub mod document;
pub mod editor;
pub mod patterns;
pub mod scheduler;
pub mod search;
pub mod speller;

pub use annotations::{Annotation, AnnotationKind, AnnotationSet};
pub use config::CheckerConfig;
pub use document::{Document, TextEdit, WordSpan, Words, is_word_separator};
pub use editor::{DocumentStats, Editor, IgnoreOutcome, OutlineEntry};
pub use patterns::PatternEngine;
pub use scheduler::{CheckScheduler, PassStats, SchedulerState};
pub use search::{SearchOptions, find_all, find_next, find_prev};
pub use speller::{
    Dictionary, DictionaryError, IgnoreList, Speller, WordListDictionary, trim_word,
};
