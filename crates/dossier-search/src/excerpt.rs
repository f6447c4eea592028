//! Excerpts and highlighted previews around matches.

use std::ops::Range;

use itertools::Itertools;

use crate::matcher::Matcher;

/// Characters of context on each side of a match in an excerpt.
pub const EXCERPT_RADIUS: usize = 50;

/// Characters of context on each side of the first match in a preview.
pub const PREVIEW_RADIUS: usize = 200;

const ELLIPSIS: &str = "...";

/// Byte window extending `radius` characters around `range`.
fn window(text: &str, range: &Range<usize>, radius: usize) -> Range<usize> {
    let start = text[..range.start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(range.start, |(i, _)| i);
    let end = text[range.end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| range.end + i);
    start..end
}

fn with_ellipses(text: &str, span: &Range<usize>, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 2 * ELLIPSIS.len());
    if span.start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(body);
    if span.end < text.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Text around one match on a line.
pub fn excerpt(line: &str, range: &Range<usize>, radius: usize) -> String {
    let span = window(line, range, radius);
    with_ellipses(line, &span, line[span.clone()].trim())
}

/// Text around the first match with every match in the window wrapped in
/// `**`. Newlines are flattened to spaces.
pub fn preview(text: &str, matcher: &Matcher, radius: usize) -> Option<String> {
    let first = matcher.find_all(text).next()?;
    let span = window(text, &first, radius);
    let slice = &text[span.clone()];

    let mut body = String::with_capacity(slice.len() + 16);
    let mut last = 0;
    for m in matcher.find_all(slice) {
        body.push_str(&slice[last..m.start]);
        body.push_str("**");
        body.push_str(&slice[m.clone()]);
        body.push_str("**");
        last = m.end;
    }
    body.push_str(&slice[last..]);

    let flat = body.split_whitespace().join(" ");
    Some(with_ellipses(text, &span, &flat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Compiled;

    fn matcher(query: &str) -> Matcher {
        match Matcher::compile(query, false, false).unwrap() {
            Compiled::Exact(m) | Compiled::Literal { matcher: m, .. } => m,
        }
    }

    #[test]
    fn test_excerpt_short_line_is_whole() {
        assert_eq!(excerpt("find the needle here", &(9..15), 50), "find the needle here");
    }

    #[test]
    fn test_excerpt_truncates_both_sides() {
        let line = format!("{}needle{}", "a".repeat(80), "b".repeat(80));
        let out = excerpt(&line, &(80..86), 10);
        assert_eq!(out, format!("...{}needle{}...", "a".repeat(10), "b".repeat(10)));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let line = "ééééé needle ééééé";
        let start = line.find("needle").unwrap();
        let out = excerpt(line, &(start..start + 6), 3);
        assert_eq!(out, "...éé needle éé...");
    }

    #[test]
    fn test_preview_highlights_every_match() {
        let out = preview("Rust is fast.\nI like rust.", &matcher("rust"), 200).unwrap();
        assert_eq!(out, "**Rust** is fast. I like **rust**.");
    }

    #[test]
    fn test_preview_without_match() {
        assert_eq!(preview("nothing here", &matcher("rust"), 200), None);
    }
}
