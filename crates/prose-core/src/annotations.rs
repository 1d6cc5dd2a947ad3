//! The annotation model: non-destructive style annotations over document ranges.
//!
//! Annotations decorate text spans without touching document storage. They are indexed by
//! [`AnnotationKind`] so a checker pass can clear and rewrite one kind over one range without
//! disturbing the others; annotations of *different* kinds may overlap freely, annotations of
//! the *same* kind never do.
//!
//! The model is kept valid across document mutations by [`AnnotationSet::shift_insert`] /
//! [`AnnotationSet::shift_delete`], which the edit surface applies atomically with every
//! mutation, before any checker pass runs. Annotations fully inside a deleted range are
//! dropped; annotations straddling an edit are widened/truncated conservatively and left for
//! the next covering pass to recompute.

use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

/// The category of an annotation.
///
/// Same-kind annotations are kept sorted and non-overlapping; the renderer maps each kind to
/// an actual visual style (color, weight, underline), which is theme data outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    /// A word that failed the spell check.
    Misspelling,
    /// `# …` heading line.
    Heading1,
    /// `## …` heading line.
    Heading2,
    /// `*emphasis*` / `_emphasis_` span.
    Emphasis,
    /// `**strong**` / `__strong__` span.
    Strong,
    /// `@citation` key.
    Citation,
    /// `%reference` key.
    Reference,
    /// `[text]`, `[text](url)` or `<url>` link.
    Link,
    /// `` `inline code` `` span.
    InlineCode,
    /// Tab-indented code line.
    BlockCode,
    /// List item prefix (`-`, `*`, `+`, `1.`).
    ListMarker,
    /// `> quoted` line.
    Quote,
    /// Structural keyword marker (`[break]`, `[newpage]`).
    Keyword,
}

impl AnnotationKind {
    /// All kinds, in rendering precedence order (lowest first).
    pub const ALL: [AnnotationKind; 13] = [
        AnnotationKind::Misspelling,
        AnnotationKind::Heading1,
        AnnotationKind::Heading2,
        AnnotationKind::Emphasis,
        AnnotationKind::Strong,
        AnnotationKind::Citation,
        AnnotationKind::Reference,
        AnnotationKind::Link,
        AnnotationKind::InlineCode,
        AnnotationKind::BlockCode,
        AnnotationKind::ListMarker,
        AnnotationKind::Quote,
        AnnotationKind::Keyword,
    ];
}

/// A single annotation: a half-open character range plus its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Half-open character range the annotation covers.
    pub range: Range<usize>,
    /// The annotation category.
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Create a new annotation.
    pub fn new(range: Range<usize>, kind: AnnotationKind) -> Self {
        Self { range, kind }
    }

    /// Returns `true` if this annotation intersects `range`.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.range.start < range.end && range.start < self.range.end
    }
}

/// The set of all current annotations, indexed by kind.
///
/// Mutated only by checker passes and the shift step, always from the single control thread;
/// readers (the renderer) observe either pre-pass or post-pass state, never a partial update.
#[derive(Debug, Default)]
pub struct AnnotationSet {
    by_kind: BTreeMap<AnnotationKind, Vec<Annotation>>,
    doc_len: usize,
}

impl AnnotationSet {
    /// Create an empty set for a document of `doc_len` characters.
    pub fn new(doc_len: usize) -> Self {
        Self {
            by_kind: BTreeMap::new(),
            doc_len,
        }
    }

    /// Document length the set currently considers valid.
    pub fn doc_len(&self) -> usize {
        self.doc_len
    }

    /// Drop every annotation and reset the tracked document length.
    ///
    /// Used when a document is (re)loaded and by the full pass, which rewrites everything.
    pub fn reset(&mut self, doc_len: usize) {
        self.by_kind.clear();
        self.doc_len = doc_len;
    }

    /// Total number of stored annotations across all kinds.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    /// Returns `true` if no annotations are stored.
    pub fn is_empty(&self) -> bool {
        self.by_kind.values().all(Vec::is_empty)
    }

    /// The annotations of `kind`, sorted by start offset.
    pub fn of_kind(&self, kind: AnnotationKind) -> &[Annotation] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove every annotation of `kind` that intersects `range`; returns how many were removed.
    ///
    /// Annotations are removed whole; a partially covered annotation is not split, because the
    /// caller is about to recompute the range anyway.
    pub fn clear(&mut self, kind: AnnotationKind, range: Range<usize>) -> usize {
        let Some(annotations) = self.by_kind.get_mut(&kind) else {
            return 0;
        };
        let before = annotations.len();
        annotations.retain(|a| !a.overlaps(&range));
        before - annotations.len()
    }

    /// Insert an annotation.
    ///
    /// The range must lie inside the document and must not overlap an existing annotation of
    /// the same kind: both are precondition violations (a pass failed to clear before adding),
    /// asserted in debug builds. In release builds the range is clamped and an overlapping or
    /// empty annotation is dropped, preserving the set's invariants. Returns `true` if stored.
    pub fn add(&mut self, annotation: Annotation) -> bool {
        let mut range = annotation.range.clone();
        debug_assert!(
            range.end <= self.doc_len,
            "annotation range {range:?} out of bounds (doc len {})",
            self.doc_len
        );
        range.start = range.start.min(self.doc_len);
        range.end = range.end.min(self.doc_len);
        if range.start >= range.end {
            debug_assert!(false, "empty annotation range {range:?}");
            debug!(?range, kind = ?annotation.kind, "dropping empty annotation");
            return false;
        }

        let annotations = self.by_kind.entry(annotation.kind).or_default();
        let idx = annotations
            .binary_search_by_key(&range.start, |a| a.range.start)
            .unwrap_or_else(|idx| idx);
        let overlaps_prev = idx > 0 && annotations[idx - 1].range.end > range.start;
        let overlaps_next = annotations
            .get(idx)
            .is_some_and(|next| next.range.start < range.end);
        if overlaps_prev || overlaps_next {
            debug_assert!(
                false,
                "same-kind overlap inserting {range:?} ({:?})",
                annotation.kind
            );
            debug!(?range, kind = ?annotation.kind, "dropping overlapping annotation");
            return false;
        }

        annotations.insert(
            idx,
            Annotation {
                range,
                kind: annotation.kind,
            },
        );
        true
    }

    /// All annotations intersecting `range`, sorted by start offset then kind.
    ///
    /// This is the renderer-facing read surface.
    pub fn query(&self, range: Range<usize>) -> Vec<Annotation> {
        let mut result = Vec::new();
        for annotations in self.by_kind.values() {
            // Same-kind annotations are sorted and disjoint: binary search for the first
            // candidate, then take while they still start before the range end.
            let idx = annotations.partition_point(|a| a.range.end <= range.start);
            for a in &annotations[idx..] {
                if a.range.start >= range.end {
                    break;
                }
                result.push(a.clone());
            }
        }
        result.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(a.range.end.cmp(&b.range.end))
                .then(a.kind.cmp(&b.kind))
        });
        result
    }

    /// Shift annotations for an insertion of `len` characters at `at`.
    ///
    /// Annotations starting at or after `at` move right; annotations spanning `at` widen.
    pub fn shift_insert(&mut self, at: usize, len: usize) {
        if len == 0 {
            return;
        }
        for annotations in self.by_kind.values_mut() {
            for a in annotations.iter_mut() {
                if a.range.start >= at {
                    a.range.start += len;
                    a.range.end += len;
                } else if a.range.end > at {
                    a.range.end += len;
                }
            }
        }
        self.doc_len += len;
    }

    /// Shift annotations for a deletion of `range`.
    ///
    /// Annotations fully inside the deleted range are dropped; annotations after it move left;
    /// annotations straddling either edge are truncated to the surviving text.
    pub fn shift_delete(&mut self, range: Range<usize>) {
        let start = range.start.min(self.doc_len);
        let end = range.end.min(self.doc_len).max(start);
        let delta = end - start;
        if delta == 0 {
            return;
        }
        for annotations in self.by_kind.values_mut() {
            annotations.retain_mut(|a| {
                if a.range.end <= start {
                    // Entirely before the deletion.
                    true
                } else if a.range.start >= end {
                    a.range.start -= delta;
                    a.range.end -= delta;
                    true
                } else if a.range.start >= start && a.range.end <= end {
                    // Swallowed by the deletion.
                    false
                } else if a.range.start < start && a.range.end > end {
                    a.range.end -= delta;
                    true
                } else if a.range.start < start {
                    // Tail deleted.
                    a.range.end = start;
                    a.range.start < a.range.end
                } else {
                    // Head deleted.
                    a.range.start = start;
                    a.range.end -= delta;
                    a.range.start < a.range.end
                }
            });
        }
        self.doc_len -= delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AnnotationKind::*;

    fn set_with(doc_len: usize, annotations: &[(Range<usize>, AnnotationKind)]) -> AnnotationSet {
        let mut set = AnnotationSet::new(doc_len);
        for (range, kind) in annotations {
            assert!(set.add(Annotation::new(range.clone(), *kind)));
        }
        set
    }

    fn ranges(set: &AnnotationSet, kind: AnnotationKind) -> Vec<Range<usize>> {
        set.of_kind(kind).iter().map(|a| a.range.clone()).collect()
    }

    #[test]
    fn test_add_and_query() {
        let set = set_with(100, &[(0..10, Heading1), (2..5, Emphasis), (20..30, Misspelling)]);
        let hits = set.query(3..21);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].kind, Heading1);
        assert_eq!(hits[1].kind, Emphasis);
        assert_eq!(hits[2].kind, Misspelling);

        assert!(set.query(10..20).is_empty());
        assert_eq!(set.query(0..1).len(), 1);
    }

    #[test]
    fn test_cross_kind_overlap_allowed() {
        let set = set_with(50, &[(0..10, Heading1), (0..10, Emphasis), (0..10, Link)]);
        assert_eq!(set.query(0..10).len(), 3);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "same-kind overlap")]
    fn test_same_kind_overlap_asserts() {
        let mut set = set_with(50, &[(0..10, Misspelling)]);
        set.add(Annotation::new(5..15, Misspelling));
    }

    #[test]
    fn test_clear_removes_intersecting_whole() {
        let mut set = set_with(100, &[(0..5, Misspelling), (10..20, Misspelling), (30..40, Misspelling)]);
        // Partially covering 15..35 still removes both touched annotations whole.
        assert_eq!(set.clear(Misspelling, 15..35), 2);
        assert_eq!(ranges(&set, Misspelling), vec![0..5]);
    }

    #[test]
    fn test_clear_other_kinds_untouched() {
        let mut set = set_with(100, &[(0..10, Misspelling), (0..10, Heading1)]);
        set.clear(Misspelling, 0..100);
        assert!(set.of_kind(Misspelling).is_empty());
        assert_eq!(set.of_kind(Heading1).len(), 1);
    }

    #[test]
    fn test_shift_insert_after_and_inside() {
        let mut set = set_with(50, &[(10..20, Misspelling), (30..40, Misspelling)]);
        set.shift_insert(15, 5);
        // Spanning annotation widens; later one moves right.
        assert_eq!(ranges(&set, Misspelling), vec![10..25, 35..45]);
        assert_eq!(set.doc_len(), 55);
    }

    #[test]
    fn test_shift_insert_at_start_moves_annotation() {
        let mut set = set_with(50, &[(10..20, Misspelling)]);
        set.shift_insert(10, 3);
        assert_eq!(ranges(&set, Misspelling), vec![13..23]);
    }

    #[test]
    fn test_shift_delete_cases() {
        let mut set = set_with(
            100,
            &[(0..5, Misspelling), (10..20, Misspelling), (26..28, Misspelling), (30..40, Misspelling)],
        );
        set.shift_delete(25..35);
        // 0..5 untouched; 10..20 untouched; 26..28 swallowed; 30..40 head-truncated to 25..30.
        assert_eq!(ranges(&set, Misspelling), vec![0..5, 10..20, 25..30]);
        assert_eq!(set.doc_len(), 90);
    }

    #[test]
    fn test_shift_delete_spanning_shrinks() {
        let mut set = set_with(50, &[(10..30, Misspelling)]);
        set.shift_delete(15..20);
        assert_eq!(ranges(&set, Misspelling), vec![10..25]);
    }

    #[test]
    fn test_shift_delete_tail_truncates() {
        let mut set = set_with(50, &[(10..20, Misspelling)]);
        set.shift_delete(15..25);
        assert_eq!(ranges(&set, Misspelling), vec![10..15]);
    }

    #[test]
    fn test_shift_keeps_kinds_sorted_disjoint() {
        let mut set = set_with(100, &[(0..4, Misspelling), (5..10, Misspelling), (11..20, Misspelling)]);
        set.shift_delete(4..5);
        set.shift_insert(2, 3);
        let spans = ranges(&set, Misspelling);
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap after shift: {spans:?}");
        }
        for span in &spans {
            assert!(span.end <= set.doc_len());
        }
    }

    #[test]
    fn test_reset() {
        let mut set = set_with(50, &[(0..10, Heading1)]);
        set.reset(80);
        assert!(set.is_empty());
        assert_eq!(set.doc_len(), 80);
    }
}
