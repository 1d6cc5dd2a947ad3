//! Generic pattern-annotation interface.
//!
//! A [`PatternEngine`] turns document lines into syntax annotations (Markdown headings,
//! emphasis, links, …). The engine declares up front which [`AnnotationKind`]s it produces so
//! the scheduler can clear exactly those kind buckets over exactly the recomputed range before
//! adding fresh results, the clear-then-add step that makes passes idempotent.
//!
//! Engines are evaluated per line: line-anchored rules (`^# …`) must not fire at arbitrary
//! substring boundaries, and no produced annotation may cross a line break. The concrete
//! Markdown rule table lives in the `prose-core-markdown` crate.

use crate::annotations::{Annotation, AnnotationKind};
use crate::document::Document;
use std::ops::Range;

/// A producer of pattern-derived annotations.
pub trait PatternEngine {
    /// The annotation kinds this engine produces.
    ///
    /// The scheduler clears these kinds over the recomputed range before applying
    /// [`annotate`](Self::annotate) results; annotations of other kinds returned by the engine
    /// are discarded.
    fn kinds(&self) -> &[AnnotationKind];

    /// Compute annotations for the given line range (`lines` are line numbers, end exclusive).
    ///
    /// Returned ranges are character offsets into `doc`. Zero-width matches and matches that
    /// leave the line range are rejected by the caller.
    fn annotate(&self, doc: &Document, lines: Range<usize>) -> Vec<Annotation>;
}
