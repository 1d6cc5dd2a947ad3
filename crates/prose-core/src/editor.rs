//! The edit/command surface.
//!
//! [`Editor`] owns the document, cursor and selection, the speller, the optional pattern
//! engine, and the scheduler, and is the single entry point for mutations. Every successful
//! mutation is applied in one atomic step (rope edit plus annotation shift) before any
//! checker pass runs, so annotation ranges are always valid offsets into the current document.
//!
//! After the shift, the surface decides which pass the edit implies and drains it
//! synchronously: a word pass re-checking the word adjacent to the cursor (the word just
//! completed for boundary edits: space, backspace, delete, replaced selection; the word
//! under the cursor for mid-word edits) plus a pattern refresh of the edited line(s). The
//! timer-driven local pass and explicit full passes are driven by [`Editor::tick`] and
//! [`Editor::full_recheck`].

use crate::annotations::{Annotation, AnnotationKind, AnnotationSet};
use crate::config::CheckerConfig;
use crate::document::{Document, TextEdit};
use crate::patterns::PatternEngine;
use crate::scheduler::{CheckScheduler, PassStats, SchedulerState};
use crate::search::{self, SearchOptions};
use crate::speller::{Dictionary, Speller, trim_word};
use std::collections::BTreeMap;
use std::ops::Range;
use std::time::Instant;

/// Result of asking the editor to ignore the word at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreOutcome {
    /// The word was added to the ignore list; misspelling annotations are being refreshed.
    Added(String),
    /// The word was already on the ignore list.
    AlreadyKnown(String),
    /// No word at the cursor.
    NoWord,
}

/// Word, line and character counts for the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    /// Number of words.
    pub words: usize,
    /// Number of logical lines.
    pub lines: usize,
    /// Number of characters.
    pub chars: usize,
}

/// A heading in the document, for outline/navigation views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Span of the heading line annotation.
    pub range: Range<usize>,
    /// Heading level (1 or 2).
    pub level: u8,
    /// Heading text with the leading marker stripped.
    pub text: String,
}

/// The editor surface: document, cursor/selection, checkers, and the command entry points.
pub struct Editor {
    document: Document,
    annotations: AnnotationSet,
    scheduler: CheckScheduler,
    speller: Speller,
    patterns: Option<Box<dyn PatternEngine>>,
    cursor: usize,
    selection: Option<Range<usize>>,
    config: CheckerConfig,
    snippets: BTreeMap<String, String>,
}

impl Editor {
    /// Create an empty editor with no dictionary backend and no pattern engine.
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            document: Document::new(),
            annotations: AnnotationSet::new(0),
            scheduler: CheckScheduler::new(&config),
            speller: Speller::new(&config),
            patterns: None,
            cursor: 0,
            selection: None,
            config,
            snippets: BTreeMap::new(),
        }
    }

    /// Create an editor over initial text and run the load-time full pass.
    pub fn from_text(text: &str, config: CheckerConfig) -> Self {
        let mut editor = Self::new(config);
        editor.open(text);
        editor
    }

    /// Attach (or detach) a dictionary backend and refresh misspelling annotations.
    pub fn set_dictionary(&mut self, backend: Option<Box<dyn Dictionary>>) {
        self.speller.set_backend(backend);
        self.scheduler.request_spelling_refresh();
        self.process_pending();
    }

    /// Attach a pattern engine and re-annotate the whole document.
    pub fn set_pattern_engine(&mut self, engine: Box<dyn PatternEngine>) {
        self.patterns = Some(engine);
        self.full_recheck();
    }

    /// Replace the document contents (file open / new file) and run the full pass.
    pub fn open(&mut self, text: &str) {
        self.document = Document::from_text(text);
        self.annotations.reset(self.document.len());
        self.cursor = 0;
        self.selection = None;
        self.scheduler.request_full();
        self.process_pending();
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The annotation set (the renderer's read surface).
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// All annotations intersecting `range`, for rendering.
    pub fn annotations_in(&self, range: Range<usize>) -> Vec<Annotation> {
        self.annotations.query(range)
    }

    /// The checker configuration this editor was built with.
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Scheduler state, for hosts that surface checking activity.
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Executed-pass counters.
    pub fn pass_stats(&self) -> PassStats {
        self.scheduler.stats()
    }

    /// Reset the executed-pass counters.
    pub fn reset_pass_stats(&mut self) {
        self.scheduler.reset_stats();
    }

    /// The cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor (clamped) and drop the selection.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.document.len());
        self.selection = None;
    }

    /// The current selection.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Select `range` (clamped and normalized) and move the cursor to its end.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.document.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start < end {
            self.selection = Some(start..end);
            self.cursor = end;
        } else {
            self.selection = None;
            self.cursor = start;
        }
    }

    /// Drop the selection, leaving the cursor in place.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Insert `text` at the cursor, replacing the selection if one exists.
    pub fn insert(&mut self, text: &str) {
        if text.is_empty() && self.selection.is_none() {
            return;
        }
        let edit = match self.selection.take() {
            Some(range) => {
                let edit = self.document.replace(range.clone(), text);
                self.annotations.shift_delete(range.clone());
                self.annotations.shift_insert(range.start, edit.inserted);
                edit
            }
            None => {
                let edit = self.document.insert(self.cursor, text);
                self.annotations.shift_insert(edit.start, edit.inserted);
                edit
            }
        };
        self.cursor = edit.start + edit.inserted;
        self.queue_edit_passes(&edit);
        self.process_pending();
    }

    /// Delete the grapheme cluster before the cursor (or the selection).
    pub fn backspace(&mut self) {
        if self.selection.is_some() {
            self.delete_selection();
            return;
        }
        if self.cursor == 0 {
            return;
        }
        let start = self.document.prev_grapheme_start(self.cursor);
        self.delete_range(start..self.cursor);
    }

    /// Delete the grapheme cluster after the cursor (or the selection).
    pub fn delete_forward(&mut self) {
        if self.selection.is_some() {
            self.delete_selection();
            return;
        }
        if self.cursor >= self.document.len() {
            return;
        }
        let end = self.document.next_grapheme_end(self.cursor);
        self.delete_range(self.cursor..end);
    }

    fn delete_selection(&mut self) {
        if let Some(range) = self.selection.take() {
            self.delete_range(range);
        }
    }

    fn delete_range(&mut self, range: Range<usize>) {
        let edit = self.document.delete(range.clone());
        self.annotations.shift_delete(range);
        self.cursor = edit.start;
        self.queue_edit_passes(&edit);
        self.process_pending();
    }

    /// Register a snippet body under `name`.
    pub fn define_snippet(&mut self, name: &str, body: &str) {
        self.snippets.insert(name.to_string(), body.to_string());
    }

    /// Insert the snippet registered under `name` at the cursor; `false` if unknown.
    pub fn insert_snippet(&mut self, name: &str) -> bool {
        let Some(body) = self.snippets.get(name).cloned() else {
            return false;
        };
        self.insert(&body);
        true
    }

    /// Add the word at the cursor to the ignore list.
    ///
    /// On a newly ignored word, a full-document refresh of the `Misspelling` kind runs so
    /// existing annotations over the word disappear.
    pub fn ignore_word_at_cursor(&mut self) -> IgnoreOutcome {
        let Some(span) = self.document.word_span_at(self.cursor) else {
            return IgnoreOutcome::NoWord;
        };
        let word = self.document.slice(span);
        let word = trim_word(&word);
        if word.is_empty() {
            return IgnoreOutcome::NoWord;
        }
        if self.speller.ignore(word) {
            self.scheduler.request_spelling_refresh();
            self.process_pending();
            IgnoreOutcome::Added(word.to_string())
        } else {
            IgnoreOutcome::AlreadyKnown(word.to_string())
        }
    }

    /// Spelling suggestions for the word at the cursor, best first.
    pub fn suggestions_at_cursor(&self) -> Vec<String> {
        let Some(span) = self.document.word_span_at(self.cursor) else {
            return Vec::new();
        };
        self.speller.suggest(&self.document.slice(span))
    }

    /// The ignore list contents, for external persistence.
    pub fn ignored_words(&self) -> Vec<String> {
        self.speller.ignored_words()
    }

    /// Word, line and character counts.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            words: self.document.words_in(0..self.document.len()).count(),
            lines: self.document.line_count(),
            chars: self.document.len(),
        }
    }

    /// Drive the local-pass timer.
    ///
    /// Hosts call this periodically (e.g. from their event loop) with the current time. The
    /// first call arms the timer; when the deadline passes, the local pass runs to completion
    /// and the timer is re-armed. Any other queued passes are drained too.
    pub fn tick(&mut self, now: Instant) {
        if !self.scheduler.local_timer_armed() {
            self.scheduler.arm_local_timer(now);
        }
        if self.scheduler.poll_timer(now) {
            self.process_pending();
            self.scheduler.arm_local_timer(now);
        } else if self.scheduler.has_pending() {
            self.process_pending();
        }
    }

    /// Stop scheduled checking (editor teardown). The timer is not re-armed afterwards.
    pub fn cancel_scheduled_checks(&mut self) {
        self.scheduler.cancel_local_timer();
    }

    /// Re-run everything: clears all annotations and re-checks the whole document.
    ///
    /// Hook for theme or configuration changes and for an explicit user recheck.
    pub fn full_recheck(&mut self) {
        self.scheduler.request_full();
        self.process_pending();
    }

    /// Find the next occurrence of `query` after the cursor, wrapping to the start.
    ///
    /// On a hit the match is selected and the cursor moves to its end.
    pub fn find_next(&mut self, query: &str, options: SearchOptions) -> Option<Range<usize>> {
        let text = self.document.text();
        let hit = search::find_next(&text, query, options, self.cursor)
            .or_else(|| search::find_next(&text, query, options, 0))?;
        self.select(hit.clone());
        Some(hit)
    }

    /// Find the previous occurrence of `query` before the cursor, wrapping to the end.
    pub fn find_prev(&mut self, query: &str, options: SearchOptions) -> Option<Range<usize>> {
        let text = self.document.text();
        let before = self
            .selection
            .as_ref()
            .map(|sel| sel.start)
            .unwrap_or(self.cursor);
        let hit = search::find_prev(&text, query, options, before)
            .or_else(|| search::find_prev(&text, query, options, self.document.len()))?;
        self.select(hit.clone());
        Some(hit)
    }

    /// The document's headings in order, for outline/navigation views.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        for (kind, level) in [(AnnotationKind::Heading1, 1u8), (AnnotationKind::Heading2, 2)] {
            for annotation in self.annotations.of_kind(kind) {
                let text = self.document.slice(annotation.range.clone());
                let text = text.trim_start_matches('#').trim().to_string();
                entries.push(OutlineEntry {
                    range: annotation.range.clone(),
                    level,
                    text,
                });
            }
        }
        entries.sort_by_key(|e| e.range.start);
        entries
    }

    /// Decide and queue the pass implied by an edit.
    ///
    /// Spelling: the word adjacent to the cursor (one position back, so a boundary edit picks
    /// the word just completed). Patterns: the lines spanned by the edit.
    fn queue_edit_passes(&mut self, edit: &TextEdit) {
        let word = self.document.word_span_at(self.cursor.saturating_sub(1));
        let first_line = self.document.char_to_line(edit.start);
        let last_line = self.document.char_to_line(edit.start + edit.inserted);
        self.scheduler.request_word(word, first_line..last_line + 1);
    }

    fn process_pending(&mut self) {
        self.scheduler.run_pending(
            &self.document,
            &mut self.annotations,
            &self.speller,
            self.patterns.as_deref(),
            self.cursor,
        );
    }
}
