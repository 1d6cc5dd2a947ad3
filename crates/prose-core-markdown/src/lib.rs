#![warn(missing_docs)]
//! `prose-core-markdown` - Markdown pattern rules for `prose-core`.
//!
//! A small regex rule table covering the Markdown subset a prose editor decorates: headings,
//! emphasis/strong, academic citations and references, links, inline and tab-indented code,
//! list markers, quotes, and section-break keywords. It is *not* a Markdown parser: rules
//! match independently and the renderer layers the resulting annotation kinds.
//!
//! Rules are evaluated per line against the line text without its newline, so line-anchored
//! patterns (`^# …`) behave and no match can cross a line boundary. Within one annotation
//! kind, a later rule's match replaces earlier overlapping matches on the same line (e.g. the
//! full `[text](url)` link form wins over the shorthand `[text]` form); different kinds are
//! independent.

use prose_core::{Annotation, AnnotationKind, Document, PatternEngine};
use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// A single pattern rule: a compiled regex producing annotations of one kind.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
    regex: Regex,
    kind: AnnotationKind,
    capture_group: Option<usize>,
}

impl SyntaxRule {
    /// Compile `pattern` into a rule producing `kind` annotations.
    pub fn new(pattern: &str, kind: AnnotationKind) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            kind,
            capture_group: None,
        })
    }

    /// Annotate only a capture group of each match.
    ///
    /// Example (list marker): pattern `^\s*([-*+])\s`, capture group `1`.
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    /// The annotation kind this rule produces.
    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }
}

/// The Markdown rule table, evaluated per line.
#[derive(Debug, Clone)]
pub struct MarkdownRules {
    rules: Vec<SyntaxRule>,
    kinds: Vec<AnnotationKind>,
}

impl MarkdownRules {
    /// Build an engine from an ordered rule list.
    pub fn new(rules: Vec<SyntaxRule>) -> Self {
        let mut kinds = Vec::new();
        for rule in &rules {
            if !kinds.contains(&rule.kind) {
                kinds.push(rule.kind);
            }
        }
        Self { rules, kinds }
    }

    /// The default Markdown rule table.
    ///
    /// Treated as a versioned constant: hosts reload the engine to change it, rules are not
    /// edited at runtime.
    pub fn markdown_default() -> Result<Self, regex::Error> {
        use AnnotationKind::*;
        Ok(Self::new(vec![
            // Header 1: # Title
            SyntaxRule::new(r"^#(?:[^#].*)?$", Heading1)?,
            // Header 2: ## Title (and deeper)
            SyntaxRule::new(r"^##.*$", Heading2)?,
            // Emphasis: *emphasis* / _emphasis_
            SyntaxRule::new(r"\*[^*]+\*", Emphasis)?,
            SyntaxRule::new(r"_[^_]+_", Emphasis)?,
            // Strong: **strong** / __strong__
            SyntaxRule::new(r"\*\*[^*]+\*\*", Strong)?,
            SyntaxRule::new(r"__[^_]+__", Strong)?,
            // Citation: @Fisher1925
            SyntaxRule::new(r"@\w+", Citation)?,
            // Academic markdown refs: %Figure
            SyntaxRule::new(r"%\w+", Reference)?,
            // Shorthand link first, so the full form overwrites it: [link] vs [link](url)
            SyntaxRule::new(r"\[[^@%\]]+\]", Link)?,
            SyntaxRule::new(r"\[[^@%\]]+\]\(\S+\)", Link)?,
            // Direct links: <url>
            SyntaxRule::new(r"<[^<>\s]+>", Link)?,
            // Code: `inline style`
            SyntaxRule::new(r"`[^`]+`", InlineCode)?,
            // Code: line indented by a single tab
            SyntaxRule::new(r"^\t.+$", BlockCode)?,
            // List markers: -, *, + or 1.
            SyntaxRule::new(r"^\s*([-*+]|\d+\.)\s", ListMarker)?.with_capture_group(1),
            // Quoted line: > …
            SyntaxRule::new(r"^>.*$", Quote)?,
            // Section markers
            SyntaxRule::new(r"\[(?:break|newpage)\]", Keyword)?,
        ]))
    }

    /// The rules, in evaluation order.
    pub fn rules(&self) -> &[SyntaxRule] {
        &self.rules
    }

    /// Run the table over one line, appending into `out`.
    ///
    /// `line_text` must not contain a newline; `line_start` is the char offset of the line.
    fn annotate_line(&self, line_text: &str, line_start: usize, out: &mut Vec<Annotation>) {
        let line_anns_start = out.len();
        for rule in &self.rules {
            match rule.capture_group {
                Some(group) => {
                    for caps in rule.regex.captures_iter(line_text) {
                        let Some(m) = caps.get(group) else {
                            continue;
                        };
                        push_match(
                            out,
                            line_anns_start,
                            line_text,
                            line_start,
                            m.start(),
                            m.end(),
                            rule.kind,
                        );
                    }
                }
                None => {
                    for m in rule.regex.find_iter(line_text) {
                        push_match(
                            out,
                            line_anns_start,
                            line_text,
                            line_start,
                            m.start(),
                            m.end(),
                            rule.kind,
                        );
                    }
                }
            }
        }
    }
}

impl PatternEngine for MarkdownRules {
    fn kinds(&self) -> &[AnnotationKind] {
        &self.kinds
    }

    fn annotate(&self, doc: &Document, lines: Range<usize>) -> Vec<Annotation> {
        let mut out = Vec::new();
        for line in lines {
            let Some(line_text) = doc.line_text(line) else {
                continue;
            };
            let line_start = doc.line_to_char(line);
            self.annotate_line(&line_text, line_start, &mut out);
        }
        out
    }
}

/// Convert a byte-offset match to a char-offset annotation and merge it into `out`.
///
/// Zero-width matches are rejected. A later rule's match evicts earlier same-kind matches on
/// the same line that it overlaps.
fn push_match(
    out: &mut Vec<Annotation>,
    line_anns_start: usize,
    line_text: &str,
    line_start: usize,
    match_start_byte: usize,
    match_end_byte: usize,
    kind: AnnotationKind,
) {
    if match_start_byte >= match_end_byte || match_end_byte > line_text.len() {
        debug!(?kind, "skipping zero-width or out-of-line match");
        return;
    }
    let start_col = line_text[..match_start_byte].chars().count();
    let end_col = line_text[..match_end_byte].chars().count();
    if start_col >= end_col {
        return;
    }
    let range = line_start + start_col..line_start + end_col;

    let mut idx = line_anns_start;
    while idx < out.len() {
        if out[idx].kind == kind && out[idx].overlaps(&range) {
            out.remove(idx);
        } else {
            idx += 1;
        }
    }
    out.push(Annotation::new(range, kind));
}
