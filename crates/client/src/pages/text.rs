//! Visible-text extraction and literal term counting.

use regex::RegexBuilder;
use scraper::Html;

/// Strip markup from an HTML document, returning its text content.
///
/// Text nodes are joined with single spaces; no readability heuristics,
/// the whole document's text participates in counting.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    for piece in document.root_element().text() {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}

/// Count case-insensitive, non-overlapping occurrences of the literal term
/// in `text`. No tokenization or stemming: "cat" matches inside
/// "concatenate".
pub fn count_term(text: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }

    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0)
}
