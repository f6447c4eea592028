//! Per-document content signatures.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use dossier_core::ContentHash;
use dossier_core::markdown::{self, Line};

use crate::config::AnalyzerConfig;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid date regex"));

static AUTHOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\*{0,2}(?:author|written by|by)\s*:?\s*\*{0,2}\s+(.+?)\s*$")
        .expect("valid author regex")
});

/// Lines scanned for date and author metadata.
const METADATA_SCAN_LINES: usize = 20;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "because", "been", "before", "being", "between", "both",
    "could", "does", "each", "even", "from", "have", "here", "into", "just", "like", "make",
    "many", "more", "most", "much", "must", "only", "other", "over", "same", "should", "some",
    "such", "than", "that", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "very", "were", "what", "when", "where", "which", "while", "will", "with",
    "would", "your",
];

/// Broad kind of document, detected from its leading markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentType {
    /// Contains a fenced code block.
    Technical,
    /// Opens with a heading.
    Article,
    /// Opens with a list item.
    Notes,
    /// Contains a table.
    Data,
    /// Anything else.
    Document,
}

/// Detected text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextFormat {
    /// Uses at least one markdown marker.
    Markdown,
    /// No markdown markers at all.
    PlainText,
}

/// A heading with its level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1 to 6.
    pub level: usize,
    /// Heading text.
    pub text: String,
}

/// Structural fingerprint of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFingerprint {
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Contains a fenced code block.
    pub has_code: bool,
    /// Contains a hyperlink.
    pub has_links: bool,
    /// Contains an image reference.
    pub has_images: bool,
    /// Contains a table.
    pub has_tables: bool,
    /// Detected format.
    pub format: TextFormat,
}

impl StructureFingerprint {
    /// Lowercased heading texts.
    pub fn heading_set(&self) -> BTreeSet<String> {
        self.headings
            .iter()
            .map(|h| h.text.to_lowercase())
            .collect()
    }
}

/// Metadata extracted from front matter or leading lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title.
    pub title: Option<String>,
    /// Date as written.
    pub date: Option<String>,
    /// Author name.
    pub author: Option<String>,
}

/// Signature of one document, computed once per batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// File that was analyzed.
    pub path: PathBuf,
    /// Document folder the file is the main file of, if any.
    pub document_folder: Option<PathBuf>,
    /// Digest of the normalized text.
    pub hash: ContentHash,
    /// Whitespace-separated word count.
    pub word_count: usize,
    /// Character count.
    pub char_count: usize,
    /// Heading words plus the most frequent body words.
    pub topics: BTreeSet<String>,
    /// Structural fingerprint.
    pub structure: StructureFingerprint,
    /// Detected content type.
    pub content_type: ContentType,
    /// Extracted metadata.
    pub metadata: DocumentMetadata,
    /// Image paths referenced in the text.
    pub image_refs: Vec<String>,
    /// Images stored in the folder's images directory.
    pub folder_image_count: usize,
}

impl ContentAnalysis {
    /// Whether the file is the main file of a document folder.
    pub fn is_document_folder(&self) -> bool {
        self.document_folder.is_some()
    }

    /// Whether the document references or carries images.
    pub fn has_images(&self) -> bool {
        !self.image_refs.is_empty() || self.folder_image_count > 0
    }

    /// Title from metadata, else the folder or file name.
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.metadata.title {
            return title.clone();
        }
        self.document_folder
            .as_deref()
            .unwrap_or(&self.path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Digest of text after lowercasing, stripping punctuation and collapsing
/// whitespace.
pub fn content_hash(text: &str) -> ContentHash {
    let normalized = markdown::normalize_text(text);
    ContentHash::new(*blake3::hash(normalized.as_bytes()).as_bytes())
}

/// Analyze text in memory.
///
/// Returns `None` when the text is shorter than the configured minimum.
pub fn analyze_text(
    config: &AnalyzerConfig,
    path: impl Into<PathBuf>,
    text: &str,
) -> Option<ContentAnalysis> {
    let char_count = text.trim().chars().count();
    if char_count < config.min_content_length {
        return None;
    }

    let (front_matter, body) = markdown::split_front_matter(text);
    let lines: Vec<Line<'_>> = markdown::lines(body).collect();
    let structure = fingerprint(body, &lines);

    Some(ContentAnalysis {
        path: path.into(),
        document_folder: None,
        hash: content_hash(text),
        word_count: text.split_whitespace().count(),
        char_count,
        topics: extract_topics(config, &lines),
        content_type: detect_content_type(&lines, &structure),
        metadata: extract_metadata(front_matter, &lines),
        image_refs: markdown::image_refs(body)
            .into_iter()
            .map(|r| r.path)
            .collect(),
        structure,
        folder_image_count: 0,
    })
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

fn topic_word(word: &str, min_len: usize) -> bool {
    word.chars().count() >= min_len
        && !is_stop_word(word)
        && !word.chars().all(|c| c.is_ascii_digit())
}

fn extract_topics(config: &AnalyzerConfig, lines: &[Line<'_>]) -> BTreeSet<String> {
    let mut topics = BTreeSet::new();
    let mut frequencies: HashMap<String, usize> = HashMap::new();

    for line in lines {
        if let Some((_, text)) = line.heading() {
            topics.extend(
                markdown::tokens(text).filter(|w| topic_word(w, config.min_heading_word_len)),
            );
        } else if !line.in_code {
            for word in markdown::tokens(line.text) {
                if topic_word(&word, config.min_body_word_len) {
                    *frequencies.entry(word).or_default() += 1;
                }
            }
        }
    }

    topics.extend(
        frequencies
            .into_iter()
            .sorted_by(|(wa, ca), (wb, cb)| cb.cmp(ca).then_with(|| wa.cmp(wb)))
            .take(config.max_body_topics)
            .map(|(word, _)| word),
    );
    topics
}

fn fingerprint(body: &str, lines: &[Line<'_>]) -> StructureFingerprint {
    let headings: Vec<Heading> = lines
        .iter()
        .filter_map(|l| l.heading())
        .map(|(level, text)| Heading {
            level,
            text: text.to_string(),
        })
        .collect();
    let has_code = lines.iter().any(|l| markdown::is_fence(l.text));
    let has_links = !markdown::links(body).is_empty();
    let has_images = !markdown::image_refs(body).is_empty();
    let has_tables = lines
        .iter()
        .any(|l| !l.in_code && markdown::is_table_row(l.text));
    let has_bullets = lines.iter().any(|l| !l.in_code && markdown::is_bullet(l.text));

    let format = if !headings.is_empty() || has_code || has_links || has_images || has_tables || has_bullets
    {
        TextFormat::Markdown
    } else {
        TextFormat::PlainText
    };

    StructureFingerprint {
        headings,
        has_code,
        has_links,
        has_images,
        has_tables,
        format,
    }
}

fn detect_content_type(lines: &[Line<'_>], structure: &StructureFingerprint) -> ContentType {
    if structure.has_code {
        return ContentType::Technical;
    }
    let first = lines.iter().find(|l| !l.text.trim().is_empty());
    if first.is_some_and(|l| l.heading().is_some()) {
        return ContentType::Article;
    }
    if first.is_some_and(|l| markdown::is_bullet(l.text)) {
        return ContentType::Notes;
    }
    if structure.has_tables {
        return ContentType::Data;
    }
    ContentType::Document
}

fn extract_metadata(front_matter: Option<&str>, lines: &[Line<'_>]) -> DocumentMetadata {
    let from_fm = |key: &str| front_matter.and_then(|fm| markdown::front_matter_value(fm, key));

    let title = from_fm("title").or_else(|| {
        lines
            .iter()
            .find_map(|l| l.heading().filter(|(level, _)| *level == 1))
            .map(|(_, text)| text.to_string())
    });

    let leading = || lines.iter().take(METADATA_SCAN_LINES).filter(|l| !l.in_code);

    let date = from_fm("date").or_else(|| {
        leading().find_map(|l| ISO_DATE.find(l.text).map(|m| m.as_str().to_string()))
    });

    let author = from_fm("author").or_else(|| {
        leading()
            .filter(|l| l.heading().is_none())
            .find_map(|l| AUTHOR_LINE.captures(l.text).map(|c| c[1].trim_matches('*').trim().to_string()))
            .filter(|a| !a.is_empty())
    });

    DocumentMetadata {
        title,
        date,
        author,
    }
}
