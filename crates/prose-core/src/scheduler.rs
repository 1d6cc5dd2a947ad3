//! The incremental checker scheduler.
//!
//! Decides *when* and *over what range* the dictionary service and the pattern engine run,
//! and merges their results into the annotation set. Scheduling is cooperative and
//! single-threaded: passes are queued as explicit requests and executed to completion by
//! [`CheckScheduler::run_pending`], always between document mutations, never concurrently
//! with one.
//!
//! Four pass shapes exist:
//!
//! - **word**: synchronous after an edit; re-checks the single word adjacent to the cursor
//!   and refreshes pattern annotations on the edited line(s).
//! - **local**: timer-driven; re-checks spelling in a bounded, cursor-centered word window.
//!   The timer is a one-shot deadline the host polls and re-arms after completion, so a local
//!   pass can never observe a document mid-mutation.
//! - **full**: document load, explicit recheck, theme/config change; everything, every kind.
//! - **spelling refresh**: full-document re-check of the `Misspelling` kind only (after the
//!   ignore list grows).
//!
//! Every pass clears the exact kind(s) over the exact range it is about to recompute, then
//! adds fresh results. That makes passes idempotent and composable regardless of firing
//! order, and no stale annotation survives a pass that covers its range. Queued word passes
//! always drain before a timer-driven local pass, so the more specific result wins within a
//! tick. Passes never propagate errors: a failed lookup leaves the word unflagged, a
//! malformed rule match is skipped and logged.

use crate::annotations::{Annotation, AnnotationKind, AnnotationSet};
use crate::config::CheckerConfig;
use crate::document::Document;
use crate::patterns::PatternEngine;
use crate::speller::Speller;
use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::debug;

/// A queued checker pass.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pass {
    /// Re-check one word and refresh pattern annotations on the edited lines.
    Word {
        /// Span of the word to re-check (`None` when the edit left no adjacent word).
        word: Option<Range<usize>>,
        /// Line range touched by the edit (end exclusive).
        lines: Range<usize>,
    },
    /// Whole document, every kind.
    Full,
    /// Whole document, `Misspelling` only.
    SpellingRefresh,
    /// Cursor-centered spelling window.
    Local,
}

/// Observable scheduler state, derived from the pass queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing queued.
    Idle,
    /// At least one word pass is queued (word passes drain first).
    WordPending,
    /// A full-document pass (full or spelling refresh) is queued.
    FullPending,
    /// A local pass is queued.
    LocalPending,
}

/// Counters for executed passes, used for instrumentation and locality tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Word passes executed.
    pub word_passes: u64,
    /// Local passes executed.
    pub local_passes: u64,
    /// Full passes executed.
    pub full_passes: u64,
    /// Spelling-refresh passes executed.
    pub spelling_refreshes: u64,
    /// Dictionary lookups performed across all passes.
    pub words_checked: u64,
    /// Lines handed to the pattern engine across all passes.
    pub lines_annotated: u64,
}

/// The checker scheduler: pass queue, local-pass timer, and pass execution.
#[derive(Debug)]
pub struct CheckScheduler {
    spelling_enabled: bool,
    local_bound: usize,
    local_interval: Duration,
    queue: VecDeque<Pass>,
    next_local: Option<Instant>,
    stats: PassStats,
}

impl CheckScheduler {
    /// Create a scheduler from configuration.
    pub fn new(config: &CheckerConfig) -> Self {
        Self {
            spelling_enabled: config.spelling_enabled,
            local_bound: config.local_word_bound,
            local_interval: config.local_interval(),
            queue: VecDeque::new(),
            next_local: None,
            stats: PassStats::default(),
        }
    }

    /// The current state, derived from the queue.
    ///
    /// Word passes dominate (they drain first), then full-document passes, then local.
    pub fn state(&self) -> SchedulerState {
        if self.queue.iter().any(|p| matches!(p, Pass::Word { .. })) {
            SchedulerState::WordPending
        } else if self
            .queue
            .iter()
            .any(|p| matches!(p, Pass::Full | Pass::SpellingRefresh))
        {
            SchedulerState::FullPending
        } else if self.queue.contains(&Pass::Local) {
            SchedulerState::LocalPending
        } else {
            SchedulerState::Idle
        }
    }

    /// Returns `true` if any pass is queued.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Executed-pass counters.
    pub fn stats(&self) -> PassStats {
        self.stats
    }

    /// Reset the executed-pass counters.
    pub fn reset_stats(&mut self) {
        self.stats = PassStats::default();
    }

    /// Queue a word pass for the word at `word`, refreshing patterns over `lines`.
    pub fn request_word(&mut self, word: Option<Range<usize>>, lines: Range<usize>) {
        self.queue.push_back(Pass::Word { word, lines });
    }

    /// Queue a full pass. Absorbs any queued local or spelling-refresh pass.
    pub fn request_full(&mut self) {
        self.queue
            .retain(|p| !matches!(p, Pass::Full | Pass::SpellingRefresh | Pass::Local));
        self.queue.push_back(Pass::Full);
    }

    /// Queue a spelling-refresh pass unless a full pass (which covers it) is already queued.
    pub fn request_spelling_refresh(&mut self) {
        if self.queue.contains(&Pass::Full) || self.queue.contains(&Pass::SpellingRefresh) {
            return;
        }
        self.queue.push_back(Pass::SpellingRefresh);
    }

    /// Queue a local pass (normally done by the timer via [`poll_timer`](Self::poll_timer)).
    pub fn request_local(&mut self) {
        if self.queue.contains(&Pass::Local) || self.queue.contains(&Pass::Full) {
            return;
        }
        self.queue.push_back(Pass::Local);
    }

    /// Arm the one-shot local-pass timer to fire `local_interval` after `now`.
    pub fn arm_local_timer(&mut self, now: Instant) {
        self.next_local = Some(now + self.local_interval);
    }

    /// Disarm the local-pass timer (editor teardown).
    pub fn cancel_local_timer(&mut self) {
        self.next_local = None;
    }

    /// Returns `true` if the local-pass timer is armed.
    pub fn local_timer_armed(&self) -> bool {
        self.next_local.is_some()
    }

    /// Fire the local-pass timer if its deadline has passed.
    ///
    /// On firing, the timer is disarmed and a local pass is queued; the caller re-arms after
    /// the pass has run to completion. Returns `true` if the timer fired.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        match self.next_local {
            Some(deadline) if now >= deadline => {
                self.next_local = None;
                self.request_local();
                true
            }
            _ => false,
        }
    }

    /// Execute every queued pass to completion.
    ///
    /// Drain order: word passes first (in request order), then a full pass, then a spelling
    /// refresh, then a local pass. `cursor` centers the local window.
    pub fn run_pending(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        speller: &Speller,
        patterns: Option<&dyn PatternEngine>,
        cursor: usize,
    ) {
        while let Some(idx) = self
            .queue
            .iter()
            .position(|p| matches!(p, Pass::Word { .. }))
        {
            if let Some(Pass::Word { word, lines }) = self.queue.remove(idx) {
                self.run_word_pass(doc, annotations, speller, patterns, word, lines);
            }
        }

        if self.queue.contains(&Pass::Full) {
            // A full pass rewrites everything; drop the narrower passes it covers.
            self.queue.clear();
            self.run_full_pass(doc, annotations, speller, patterns);
            return;
        }

        if self.queue.contains(&Pass::SpellingRefresh) {
            self.queue.retain(|p| *p != Pass::SpellingRefresh);
            self.run_spelling_refresh(doc, annotations, speller);
        }

        if self.queue.contains(&Pass::Local) {
            self.queue.retain(|p| *p != Pass::Local);
            self.run_local_pass(doc, annotations, speller, cursor);
        }
    }

    fn run_word_pass(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        speller: &Speller,
        patterns: Option<&dyn PatternEngine>,
        word: Option<Range<usize>>,
        lines: Range<usize>,
    ) {
        self.stats.word_passes += 1;

        if self.spelling_enabled
            && let Some(span) = word
        {
            annotations.clear(AnnotationKind::Misspelling, span.clone());
            let text = doc.slice(span.clone());
            self.stats.words_checked += 1;
            if speller.is_misspelled(&text) {
                annotations.add(Annotation::new(span, AnnotationKind::Misspelling));
            }
        }

        if let Some(engine) = patterns {
            self.apply_patterns(doc, annotations, engine, lines);
        }
    }

    fn run_local_pass(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        speller: &Speller,
        cursor: usize,
    ) {
        self.stats.local_passes += 1;
        if !self.spelling_enabled {
            return;
        }
        let window = doc.local_window(cursor, self.local_bound);
        if window.is_empty() {
            return;
        }
        self.check_spelling_range(doc, annotations, speller, window);
    }

    fn run_full_pass(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        speller: &Speller,
        patterns: Option<&dyn PatternEngine>,
    ) {
        self.stats.full_passes += 1;
        annotations.reset(doc.len());
        if let Some(engine) = patterns {
            self.apply_patterns(doc, annotations, engine, 0..doc.line_count());
        }
        if self.spelling_enabled {
            self.check_spelling_range(doc, annotations, speller, 0..doc.len());
        }
    }

    fn run_spelling_refresh(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        speller: &Speller,
    ) {
        self.stats.spelling_refreshes += 1;
        if !self.spelling_enabled {
            return;
        }
        self.check_spelling_range(doc, annotations, speller, 0..doc.len());
    }

    /// Clear `Misspelling` over `range`, then re-check every word intersecting it.
    fn check_spelling_range(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        speller: &Speller,
        range: Range<usize>,
    ) {
        annotations.clear(AnnotationKind::Misspelling, range.clone());
        for word in doc.words_in(range) {
            self.stats.words_checked += 1;
            if speller.is_misspelled(&word.text) {
                annotations.add(Annotation::new(word.range, AnnotationKind::Misspelling));
            }
        }
    }

    /// Clear the engine's kinds over `lines` and apply its fresh annotations.
    fn apply_patterns(
        &mut self,
        doc: &Document,
        annotations: &mut AnnotationSet,
        engine: &dyn PatternEngine,
        lines: Range<usize>,
    ) {
        let line_count = doc.line_count();
        let lines = lines.start.min(line_count)..lines.end.min(line_count);
        if lines.is_empty() {
            return;
        }
        let start = doc.line_to_char(lines.start);
        let end = if lines.end >= line_count {
            doc.len()
        } else {
            doc.line_to_char(lines.end)
        };

        for kind in engine.kinds() {
            annotations.clear(*kind, start..end);
        }

        for annotation in engine.annotate(doc, lines.clone()) {
            if annotation.range.start >= annotation.range.end {
                debug!(?annotation, "skipping zero-width pattern match");
                continue;
            }
            if annotation.range.start < start || annotation.range.end > end {
                debug!(?annotation, "skipping pattern match outside recomputed range");
                continue;
            }
            if !engine.kinds().contains(&annotation.kind) {
                debug!(?annotation, "skipping pattern match of undeclared kind");
                continue;
            }
            annotations.add(annotation);
        }

        self.stats.lines_annotated += lines.len() as u64;
    }
}
