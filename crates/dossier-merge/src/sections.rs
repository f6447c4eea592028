//! Splitting source bodies into sections and blocks.

use dossier_core::markdown::{self, Line};

/// A heading and the text up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text, `None` for text before the first heading.
    pub heading: Option<String>,
    /// Body lines, without the heading.
    pub body: String,
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub code: String,
}

/// A paragraph-level chunk of a section body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Running text that can be split into sentences.
    Prose(String),
    /// Lists, tables, quotes, images and code, kept as written.
    Verbatim(String),
}

/// Split text at every heading outside code.
pub fn sections(text: &str) -> Vec<Section> {
    let mut out = Vec::new();
    let mut heading = None;
    let mut body: Vec<&str> = Vec::new();

    for line in markdown::lines(text) {
        if let Some((_, title)) = line.heading() {
            push_section(&mut out, heading.take(), &body);
            body.clear();
            heading = Some(title.to_string());
        } else {
            body.push(line.text);
        }
    }
    push_section(&mut out, heading, &body);
    out
}

fn push_section(out: &mut Vec<Section>, heading: Option<String>, body: &[&str]) {
    let body = body.join("\n").trim().to_string();
    if heading.is_none() && body.is_empty() {
        return;
    }
    out.push(Section { heading, body });
}

/// Remove fenced code blocks from text, returning them separately.
pub fn extract_code(text: &str) -> (String, Vec<CodeBlock>) {
    let mut prose = Vec::new();
    let mut blocks = Vec::new();
    let mut current: Option<(Option<String>, Vec<&str>)> = None;

    for line in markdown::lines(text) {
        let fence = markdown::is_fence(line.text);
        match current.take() {
            None if fence => {
                current = Some((markdown::fence_language(line.text).map(str::to_string), Vec::new()));
            }
            None => prose.push(line.text),
            Some((language, code)) if fence => blocks.push(CodeBlock {
                language,
                code: code.join("\n"),
            }),
            Some((language, mut code)) => {
                code.push(line.text);
                current = Some((language, code));
            }
        }
    }
    // An unterminated fence keeps its content as code.
    if let Some((language, code)) = current {
        blocks.push(CodeBlock {
            language,
            code: code.join("\n"),
        });
    }

    (collapse_blank_lines(&prose), blocks)
}

/// Group lines into blank-line separated blocks, keeping fences intact.
pub fn blocks(text: &str) -> Vec<Block> {
    let mut out = Vec::new();
    let mut current: Vec<Line<'_>> = Vec::new();

    for line in markdown::lines(text) {
        if line.text.trim().is_empty() && !line.in_code {
            flush_block(&mut out, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    flush_block(&mut out, &current);
    out
}

fn flush_block(out: &mut Vec<Block>, lines: &[Line<'_>]) {
    let Some(first) = lines.first() else {
        return;
    };
    let text = lines.iter().map(|l| l.text).collect::<Vec<_>>().join("\n");
    let verbatim = lines.iter().any(|l| l.in_code)
        || markdown::is_bullet(first.text)
        || markdown::is_table_row(first.text)
        || lines.iter().any(|l| l.text.trim_start().starts_with("!["))
        || first.text.trim_start().starts_with('>');
    out.push(if verbatim {
        Block::Verbatim(text)
    } else {
        Block::Prose(text)
    });
}

fn collapse_blank_lines(lines: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for &line in lines {
        if line.trim().is_empty() && out.last().is_none_or(|l| l.trim().is_empty()) {
            continue;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}

/// Add one `#` to every heading outside code, up to level six.
pub fn demote_headings(text: &str) -> String {
    markdown::lines(text)
        .map(|line| match line.heading() {
            Some((level, _)) if level < 6 => format!("#{}", line.text.trim_start()),
            _ => line.text.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// GitHub-style anchor slug for a heading.
pub fn slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect()
}
