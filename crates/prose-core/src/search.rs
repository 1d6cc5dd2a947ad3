//! Plain-text search helpers.
//!
//! Simple substring search over a `&str`, with **character offsets** (not bytes) for all
//! public inputs and outputs. Queries are escaped and compiled to a regex so case folding is
//! Unicode-aware. The editor wraps these in its wrap-around find.

use regex::RegexBuilder;
use std::ops::Range;

/// Options controlling how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, match case exactly. Defaults to `false` (case-insensitive).
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
        }
    }
}

fn compile(query: &str, options: SearchOptions) -> Option<regex::Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(!options.case_sensitive)
        .build()
        .ok()
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

fn byte_to_char(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset.min(text.len())].chars().count()
}

/// Find the next occurrence of `query` at or after character `from`.
///
/// Returns a half-open character range, or `None` when the query is empty or absent.
pub fn find_next(
    text: &str,
    query: &str,
    options: SearchOptions,
    from: usize,
) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }
    let re = compile(query, options)?;
    let start_byte = char_to_byte(text, from);
    let m = re.find_at(text, start_byte)?;
    Some(byte_to_char(text, m.start())..byte_to_char(text, m.end()))
}

/// Find the last occurrence of `query` ending at or before character `before`.
pub fn find_prev(
    text: &str,
    query: &str,
    options: SearchOptions,
    before: usize,
) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }
    let re = compile(query, options)?;
    let limit_byte = char_to_byte(text, before);
    let mut last = None;
    for m in re.find_iter(&text[..limit_byte]) {
        last = Some(byte_to_char(text, m.start())..byte_to_char(text, m.end()));
    }
    last
}

/// Find all occurrences of `query`.
pub fn find_all(text: &str, query: &str, options: SearchOptions) -> Vec<Range<usize>> {
    if query.is_empty() {
        return Vec::new();
    }
    let Some(re) = compile(query, options) else {
        return Vec::new();
    };
    re.find_iter(text)
        .map(|m| byte_to_char(text, m.start())..byte_to_char(text, m.end()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_next_case_insensitive_default() {
        let text = "Alpha beta ALPHA";
        assert_eq!(find_next(text, "alpha", SearchOptions::default(), 0), Some(0..5));
        assert_eq!(find_next(text, "alpha", SearchOptions::default(), 1), Some(11..16));
        assert_eq!(find_next(text, "alpha", SearchOptions::default(), 12), None);
    }

    #[test]
    fn test_find_next_case_sensitive() {
        let options = SearchOptions {
            case_sensitive: true,
        };
        assert_eq!(find_next("Alpha ALPHA", "ALPHA", options, 0), Some(6..11));
    }

    #[test]
    fn test_find_prev() {
        let text = "one two one";
        assert_eq!(find_prev(text, "one", SearchOptions::default(), text.len()), Some(8..11));
        assert_eq!(find_prev(text, "one", SearchOptions::default(), 5), Some(0..3));
    }

    #[test]
    fn test_find_all_char_offsets_with_multibyte() {
        let text = "héllo héllo";
        let hits = find_all(text, "héllo", SearchOptions::default());
        assert_eq!(hits, vec![0..5, 6..11]);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(find_next("abc", "", SearchOptions::default(), 0), None);
        assert!(find_all("abc", "", SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_escaped_literal_query() {
        // A query with regex metacharacters is treated literally.
        assert_eq!(find_next("a.*b", ".*", SearchOptions::default(), 0), Some(1..3));
    }
}
