//! Markdown marker helpers.
//!
//! Headings (`#`), image references (`![alt](path)`) and triple-backtick
//! fences are the only markers the rest of dossier keys off of. Anything
//! that does not follow them is treated as plain prose.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Opening/closing marker of a fenced code block.
pub const FENCE: &str = "```";

static IMAGE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(\s+"[^"]*")?\s*\)"#).expect("valid image regex")
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]]+)\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).expect("valid link regex")
});

/// One line of a document with fence tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Line text without the trailing newline.
    pub text: &'a str,
    /// Inside a fenced code block (fence lines included).
    pub in_code: bool,
}

impl<'a> Line<'a> {
    /// Heading level and text, unless the line sits inside code.
    pub fn heading(&self) -> Option<(usize, &'a str)> {
        if self.in_code { None } else { heading(self.text) }
    }
}

/// Iterate lines, tracking whether each sits inside a fenced code block.
pub fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    let mut in_code = false;
    text.lines().enumerate().map(move |(idx, line)| {
        if is_fence(line) {
            in_code = !in_code;
            return Line {
                number: idx + 1,
                text: line,
                in_code: true,
            };
        }
        Line {
            number: idx + 1,
            text: line,
            in_code,
        }
    })
}

/// Extract heading level and content from a markdown line.
///
/// Requires whitespace after the hashes and removes optional closing
/// hashes, so `## Title ##` yields `(2, "Title")`.
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') || line.len() - trimmed.len() > 3 {
        return None;
    }
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let content = rest.trim();
    let without_closing = content.trim_end_matches('#');
    let content = if without_closing.len() < content.len()
        && (without_closing.is_empty() || without_closing.ends_with([' ', '\t']))
    {
        without_closing.trim_end()
    } else {
        content
    };
    Some((level, content))
}

/// Check whether a line opens or closes a fenced code block.
pub fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with(FENCE)
}

/// Language tag of an opening fence, if present.
pub fn fence_language(line: &str) -> Option<&str> {
    let tag = line.trim_start().strip_prefix(FENCE)?.trim();
    (!tag.is_empty()).then_some(tag)
}

/// Check whether a line is a list item.
pub fn is_bullet(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("+ ") {
        return true;
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && trimmed[digits..].starts_with(". ")
}

/// Check whether a line is a table row.
pub fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.len() > 1 && trimmed[1..].contains('|')
}

/// An image reference found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Alt text.
    pub alt: String,
    /// Referenced path, as written.
    pub path: String,
}

/// Collect every `![alt](path)` reference in order.
pub fn image_refs(text: &str) -> Vec<ImageRef> {
    IMAGE_REF
        .captures_iter(text)
        .map(|caps| ImageRef {
            alt: caps[1].to_string(),
            path: caps[2].to_string(),
        })
        .collect()
}

/// Rewrite image reference paths.
///
/// `map` receives each referenced path and returns the replacement, or
/// `None` to leave the reference untouched. Returns the new text and the
/// number of references rewritten.
pub fn rewrite_image_refs(text: &str, mut map: impl FnMut(&str) -> Option<String>) -> (String, usize) {
    let mut rewritten = 0;
    let out = IMAGE_REF.replace_all(text, |caps: &Captures<'_>| match map(&caps[2]) {
        Some(new_path) => {
            rewritten += 1;
            let title = caps.get(3).map_or("", |m| m.as_str());
            format!("![{}]({}{})", &caps[1], new_path, title)
        }
        None => caps[0].to_string(),
    });
    (out.into_owned(), rewritten)
}

/// A hyperlink (not an image) found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link text.
    pub text: String,
    /// Target URL or path.
    pub url: String,
}

/// Collect every `[text](url)` link that is not an image reference.
pub fn links(text: &str) -> Vec<Link> {
    LINK.captures_iter(text)
        .filter(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            start == 0 || text.as_bytes()[start - 1] != b'!'
        })
        .map(|caps| Link {
            text: caps[1].to_string(),
            url: caps[2].to_string(),
        })
        .collect()
}

/// Split off a leading `---` YAML front matter block.
///
/// Returns the front matter body (without delimiters) and the rest.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text.strip_prefix("---\n").or_else(|| text.strip_prefix("---\r\n")) else {
        return (None, text);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let body = &rest[..offset];
            let after = &rest[offset + line.len()..];
            return (Some(body), after);
        }
        offset += line.len();
    }
    (None, text)
}

/// Look up a `key: value` entry in a front matter block.
pub fn front_matter_value(front_matter: &str, key: &str) -> Option<String> {
    front_matter.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        if !k.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        let value = v.trim().trim_matches(['"', '\'']).trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Lowercase, strip punctuation, and collapse whitespace.
///
/// Two texts that differ only in case, punctuation or spacing normalize
/// to the same string.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if c.is_alphanumeric() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Lowercase alphanumeric tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Split prose into sentences ending in `.`, `!` or `?`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let end = idx + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading("# Title"), Some((1, "Title")));
        assert_eq!(heading("### Deep ###"), Some((3, "Deep")));
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("####### seven"), None);
        assert_eq!(heading("## C#"), Some((2, "C#")));
    }

    #[test]
    fn test_lines_track_fences() {
        let text = "# Title\n```rust\n# not a heading\n```\n## Real";
        let headings: Vec<_> = lines(text).filter_map(|l| l.heading().map(|h| h.1.to_string())).collect();
        assert_eq!(headings, vec!["Title", "Real"]);
    }

    #[test]
    fn test_line_heading_borrows_from_text() {
        let text = String::from("intro\n## Setup\nbody");
        let mut section: Option<&str> = None;
        for line in lines(&text) {
            if let Some((_, title)) = line.heading() {
                section = Some(title);
            }
        }
        assert_eq!(section, Some("Setup"));
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("```python"), Some("python"));
        assert_eq!(fence_language("```"), None);
    }

    #[test]
    fn test_bullets_and_tables() {
        assert!(is_bullet("- item"));
        assert!(is_bullet("12. item"));
        assert!(!is_bullet("-item"));
        assert!(is_table_row("| a | b |"));
        assert!(!is_table_row("a | b"));
    }

    #[test]
    fn test_image_refs_and_links() {
        let text = "See ![chart](images/chart.png \"Chart\") and [docs](https://example.com).";
        let images = image_refs(text);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].path, "images/chart.png");

        let found = links(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://example.com");
    }

    #[test]
    fn test_rewrite_image_refs() {
        let text = "![a](./images/a.png) ![b](other.png)";
        let (out, count) = rewrite_image_refs(text, |p| {
            (p == "./images/a.png").then(|| "images/a.png".to_string())
        });
        assert_eq!(count, 1);
        assert_eq!(out, "![a](images/a.png) ![b](other.png)");
    }

    #[test]
    fn test_front_matter() {
        let text = "---\ntitle: \"Hello\"\nauthor: Ann\n---\n# Body\n";
        let (fm, rest) = split_front_matter(text);
        let fm = fm.unwrap();
        assert_eq!(front_matter_value(fm, "title").as_deref(), Some("Hello"));
        assert_eq!(front_matter_value(fm, "author").as_deref(), Some("Ann"));
        assert_eq!(rest, "# Body\n");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello,   World!\n"), "hello world");
        assert_eq!(normalize_text("hello world"), normalize_text("HELLO\tworld."));
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("One. Two! Version 1.2 is out? Tail");
        assert_eq!(sentences, vec!["One.", "Two!", "Version 1.2 is out?", "Tail"]);
    }
}
