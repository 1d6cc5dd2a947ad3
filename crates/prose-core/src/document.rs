//! Document storage and word segmentation.
//!
//! The document is an ordered, mutable sequence of Unicode scalar values backed by a
//! [`ropey::Rope`]. All public offsets are **character offsets** (not bytes), and all ranges are
//! half-open. Mutations return a [`TextEdit`] delta that the caller feeds to the annotation
//! model's shift step before any checker pass runs.
//!
//! Word segmentation lives here too: a word is a maximal run of characters outside the
//! separator set (Unicode whitespace plus a fixed punctuation set). Apostrophes and hyphens are
//! deliberately *not* separators, so contractions and hyphenated words are checked whole.

use ropey::Rope;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Punctuation characters that terminate a word, in addition to Unicode whitespace.
const SEPARATOR_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '(', ')', '[', ']', '{', '}', '<', '>', '/', '\\', '|',
    '@', '#', '%', '^', '&', '*', '+', '=', '~', '`', '_', '…', '“', '”', '«', '»', '¿', '¡',
];

/// Returns `true` if `ch` ends a word (whitespace or separator punctuation).
pub fn is_word_separator(ch: char) -> bool {
    ch.is_whitespace() || SEPARATOR_PUNCTUATION.contains(&ch)
}

/// Delta describing a single document mutation, in character offsets.
///
/// A plain insert has `removed == 0`; a plain delete has `inserted == 0`; a replace has both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Character offset at which the mutation happened.
    pub start: usize,
    /// Number of characters removed at `start`.
    pub removed: usize,
    /// Number of characters inserted at `start`.
    pub inserted: usize,
}

/// A word together with its span in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    /// Half-open character range covering the word.
    pub range: Range<usize>,
    /// The word text.
    pub text: String,
}

/// The mutable text buffer.
///
/// Owned exclusively by the edit surface; checker passes only read it. Out-of-bounds offsets
/// are a caller bug (asserted in debug builds) and are clamped in release builds.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a document from initial text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total length in characters.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the document contains no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The text of `range`, clamped to the document.
    pub fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len());
        let end = range.end.min(self.len());
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    /// The character at `offset`, if in bounds.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.len() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// Number of logical lines (an empty document has one).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The text of line `line` without its trailing newline.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        Some(text)
    }

    /// Character offset of the start of line `line` (document length if past the last line).
    pub fn line_to_char(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.len();
        }
        self.rope.line_to_char(line)
    }

    /// Line number containing character `offset` (clamped).
    pub fn char_to_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.len()))
    }

    /// Insert `text` at `offset`, returning the edit delta.
    pub fn insert(&mut self, offset: usize, text: &str) -> TextEdit {
        debug_assert!(offset <= self.len(), "insert offset out of bounds");
        let offset = offset.min(self.len());
        self.rope.insert(offset, text);
        TextEdit {
            start: offset,
            removed: 0,
            inserted: text.chars().count(),
        }
    }

    /// Delete `range`, returning the edit delta.
    pub fn delete(&mut self, range: Range<usize>) -> TextEdit {
        debug_assert!(
            range.start <= range.end && range.end <= self.len(),
            "delete range out of bounds"
        );
        let start = range.start.min(self.len());
        let end = range.end.min(self.len()).max(start);
        if start < end {
            self.rope.remove(start..end);
        }
        TextEdit {
            start,
            removed: end - start,
            inserted: 0,
        }
    }

    /// Replace `range` with `text`, returning the combined edit delta.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> TextEdit {
        let deleted = self.delete(range);
        let inserted = self.insert(deleted.start, text);
        TextEdit {
            start: deleted.start,
            removed: deleted.removed,
            inserted: inserted.inserted,
        }
    }

    /// Start offset of the grapheme cluster preceding `offset` (0 at the document start).
    ///
    /// Used for backspace so that multi-scalar clusters (emoji, combining marks) are removed
    /// whole. Clusters never span a newline, so only the current line needs segmenting.
    pub fn prev_grapheme_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        if offset == 0 {
            return 0;
        }
        let line = self.rope.char_to_line(offset);
        let line_start = self.rope.line_to_char(line);
        if offset == line_start {
            // The preceding character is the newline of the previous line.
            return offset - 1;
        }
        let text = self.line_text(line).unwrap_or_default();
        let col = offset - line_start;
        let mut start_col = 0;
        let mut acc = 0;
        for grapheme in text.graphemes(true) {
            let glen = grapheme.chars().count();
            if acc + glen >= col {
                start_col = acc;
                break;
            }
            acc += glen;
        }
        line_start + start_col
    }

    /// End offset of the grapheme cluster at `offset` (document length at the end).
    pub fn next_grapheme_end(&self, offset: usize) -> usize {
        let len = self.len();
        if offset >= len {
            return len;
        }
        let line = self.rope.char_to_line(offset);
        let line_start = self.rope.line_to_char(line);
        let text = self.line_text(line).unwrap_or_default();
        let line_len = text.chars().count();
        let col = offset - line_start;
        if col >= line_len {
            // The character at `offset` is the newline itself.
            return offset + 1;
        }
        let mut acc = 0;
        for grapheme in text.graphemes(true) {
            let glen = grapheme.chars().count();
            if col < acc + glen {
                return line_start + acc + glen;
            }
            acc += glen;
        }
        offset + 1
    }

    /// The span of the word at (or directly before) `offset`.
    ///
    /// When `offset` sits on a separator directly after a word, the word before it is returned;
    /// this mirrors the "word under cursor" behavior editors use for the word just typed.
    /// Returns `None` when there is no adjacent word.
    pub fn word_span_at(&self, offset: usize) -> Option<Range<usize>> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let mut pos = offset.min(len - 1);
        if is_word_separator(self.rope.char(pos)) {
            if pos == 0 || is_word_separator(self.rope.char(pos - 1)) {
                return None;
            }
            pos -= 1;
        }
        let mut start = pos;
        while start > 0 && !is_word_separator(self.rope.char(start - 1)) {
            start -= 1;
        }
        let mut end = pos + 1;
        while end < len && !is_word_separator(self.rope.char(end)) {
            end += 1;
        }
        Some(start..end)
    }

    /// Iterate the words whose spans intersect `range`.
    ///
    /// Spans are always full word spans, even when a word straddles a range edge; callers that
    /// clear-then-recheck a range should use boundary-aligned ranges (see
    /// [`local_window`](Self::local_window)) so cleared and rechecked spans coincide.
    pub fn words_in(&self, range: Range<usize>) -> Words<'_> {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        let line = self.char_to_line(start);
        let line_start = self.line_to_char(line);
        let chars: Vec<char> = self
            .line_text(line)
            .unwrap_or_default()
            .chars()
            .collect();
        let mut col = start - line_start;
        // Back up to the start of a word straddling `start`.
        if col < chars.len() && !is_word_separator(chars[col]) {
            while col > 0 && !is_word_separator(chars[col - 1]) {
                col -= 1;
            }
        }
        Words {
            doc: self,
            end,
            line,
            line_start,
            chars,
            col,
        }
    }

    /// A boundary-aligned window covering the word at `center` plus up to `bound` words on
    /// each side.
    ///
    /// The window starts at a word start and ends at a word end (or at the document edges), so
    /// clearing annotations over it and rechecking the words inside it touch exactly the same
    /// spans. Used by the cursor-local spell-check pass.
    pub fn local_window(&self, center: usize, bound: usize) -> Range<usize> {
        let len = self.len();
        if len == 0 || bound == 0 {
            return 0..0;
        }
        let center = center.min(len);

        // Cover the word containing the cursor without counting it toward the bound.
        let mut start = center;
        while start > 0 && !is_word_separator(self.rope.char(start - 1)) {
            start -= 1;
        }
        let mut words = 0;
        while start > 0 && words < bound {
            while start > 0 && is_word_separator(self.rope.char(start - 1)) {
                start -= 1;
            }
            if start == 0 {
                break;
            }
            while start > 0 && !is_word_separator(self.rope.char(start - 1)) {
                start -= 1;
            }
            words += 1;
        }

        let mut end = center;
        while end < len && !is_word_separator(self.rope.char(end)) {
            end += 1;
        }
        let mut words = 0;
        while end < len && words < bound {
            while end < len && is_word_separator(self.rope.char(end)) {
                end += 1;
            }
            if end == len {
                break;
            }
            while end < len && !is_word_separator(self.rope.char(end)) {
                end += 1;
            }
            words += 1;
        }

        start..end
    }
}

/// Iterator over [`WordSpan`]s in a document range. Created by [`Document::words_in`].
pub struct Words<'a> {
    doc: &'a Document,
    end: usize,
    line: usize,
    line_start: usize,
    chars: Vec<char>,
    col: usize,
}

impl Iterator for Words<'_> {
    type Item = WordSpan;

    fn next(&mut self) -> Option<WordSpan> {
        loop {
            while self.col < self.chars.len() && is_word_separator(self.chars[self.col]) {
                self.col += 1;
            }
            if self.col >= self.chars.len() {
                self.line += 1;
                if self.line >= self.doc.line_count() {
                    return None;
                }
                self.line_start = self.doc.line_to_char(self.line);
                if self.line_start >= self.end {
                    return None;
                }
                self.chars = self.doc.line_text(self.line)?.chars().collect();
                self.col = 0;
                continue;
            }
            let word_col = self.col;
            while self.col < self.chars.len() && !is_word_separator(self.chars[self.col]) {
                self.col += 1;
            }
            let start = self.line_start + word_col;
            if start >= self.end {
                return None;
            }
            let end = self.line_start + self.col;
            let text: String = self.chars[word_col..self.col].iter().collect();
            return Some(WordSpan {
                range: start..end,
                text,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_texts(doc: &Document, range: Range<usize>) -> Vec<String> {
        doc.words_in(range).map(|w| w.text).collect()
    }

    #[test]
    fn test_insert_delete_replace_deltas() {
        let mut doc = Document::from_text("Hello world");
        let edit = doc.insert(5, ",");
        assert_eq!(edit, TextEdit { start: 5, removed: 0, inserted: 1 });
        assert_eq!(doc.text(), "Hello, world");

        let edit = doc.delete(5..6);
        assert_eq!(edit, TextEdit { start: 5, removed: 1, inserted: 0 });
        assert_eq!(doc.text(), "Hello world");

        let edit = doc.replace(6..11, "there");
        assert_eq!(edit, TextEdit { start: 6, removed: 5, inserted: 5 });
        assert_eq!(doc.text(), "Hello there");
    }

    #[test]
    fn test_line_access() {
        let doc = Document::from_text("one\ntwo\nthree");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(1).as_deref(), Some("two"));
        assert_eq!(doc.line_to_char(1), 4);
        assert_eq!(doc.char_to_line(5), 1);
        assert_eq!(doc.line_text(3), None);
    }

    #[test]
    fn test_word_span_at() {
        let doc = Document::from_text("Hello world");
        assert_eq!(doc.word_span_at(0), Some(0..5));
        assert_eq!(doc.word_span_at(4), Some(0..5));
        // On the separator just after a word: the word before it.
        assert_eq!(doc.word_span_at(5), Some(0..5));
        assert_eq!(doc.word_span_at(6), Some(6..11));
        // Past the end clamps to the last character.
        assert_eq!(doc.word_span_at(100), Some(6..11));
    }

    #[test]
    fn test_word_span_at_in_separator_run() {
        let doc = Document::from_text("a  b");
        // Between the two spaces there is no adjacent word.
        assert_eq!(doc.word_span_at(2), None);
        assert_eq!(doc.word_span_at(1), Some(0..1));
    }

    #[test]
    fn test_words_in_full_document() {
        let doc = Document::from_text("It's a test-case, truly.\nNew line");
        assert_eq!(
            word_texts(&doc, 0..doc.len()),
            vec!["It's", "a", "test-case", "truly", "New", "line"]
        );
    }

    #[test]
    fn test_words_in_returns_full_straddling_spans() {
        let doc = Document::from_text("Hello world");
        let words: Vec<WordSpan> = doc.words_in(2..7).collect();
        assert_eq!(words[0].range, 0..5);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[1].range, 6..11);
    }

    #[test]
    fn test_words_in_empty_document() {
        let doc = Document::new();
        assert_eq!(doc.words_in(0..0).count(), 0);
    }

    #[test]
    fn test_local_window_bounds_word_count() {
        let doc = Document::from_text("aa bb cc dd ee ff gg");
        // Centered in "dd" (offset 10): the containing word plus two words each side.
        let window = doc.local_window(10, 2);
        assert_eq!(doc.slice(window), "bb cc dd ee ff");
    }

    #[test]
    fn test_local_window_clamps_at_edges() {
        let doc = Document::from_text("aa bb");
        let window = doc.local_window(0, 20);
        assert_eq!(window, 0..doc.len());
    }

    #[test]
    fn test_grapheme_boundaries() {
        let doc = Document::from_text("a👍\u{1F3FD}b");
        // The thumbs-up + skin tone modifier is one cluster of two scalars.
        assert_eq!(doc.prev_grapheme_start(3), 1);
        assert_eq!(doc.next_grapheme_end(1), 3);
        assert_eq!(doc.prev_grapheme_start(1), 0);
        assert_eq!(doc.next_grapheme_end(3), 4);
    }

    #[test]
    fn test_grapheme_across_newline() {
        let doc = Document::from_text("ab\ncd");
        assert_eq!(doc.prev_grapheme_start(3), 2); // deletes the newline
        assert_eq!(doc.next_grapheme_end(2), 3);
    }

    #[test]
    fn test_separators() {
        assert!(is_word_separator(' '));
        assert!(is_word_separator('*'));
        assert!(is_word_separator('_'));
        assert!(!is_word_separator('\''));
        assert!(!is_word_separator('-'));
        assert!(!is_word_separator('é'));
    }
}
