//! Relevance scoring of one document.

use serde::{Deserialize, Serialize};

use dossier_core::markdown;

use crate::excerpt::{EXCERPT_RADIUS, excerpt};
use crate::matcher::Matcher;

/// Points per match anywhere.
const MATCH_WEIGHT: f64 = 10.0;
/// Extra points per match on a heading line.
const HEADING_WEIGHT: f64 = 50.0;
/// Extra points per match in the first lines.
const LEADING_WEIGHT: f64 = 20.0;
/// Lines counted as the document's opening.
const LEADING_LINES: usize = 5;
/// Points per query word present verbatim.
const WORD_WEIGHT: f64 = 15.0;
/// Documents longer than this many characters are damped.
const LONG_DOCUMENT_CHARS: usize = 10_000;
const LONG_DOCUMENT_FACTOR: f64 = 0.8;

/// One match with its surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchExcerpt {
    /// 1-based line number.
    pub line: usize,
    /// Text around the match.
    pub excerpt: String,
    /// Nearest heading above the match.
    pub section: Option<String>,
}

/// Matches and score of one document.
#[derive(Debug, Clone)]
pub(crate) struct Scored {
    pub score: f64,
    pub match_count: usize,
    pub excerpts: Vec<MatchExcerpt>,
}

/// Score `text` against `matcher`. `None` when nothing matches.
pub(crate) fn score_document(text: &str, matcher: &Matcher, max_excerpts: usize) -> Option<Scored> {
    let mut match_count = 0;
    let mut heading_matches = 0;
    let mut leading_matches = 0;
    let mut excerpts = Vec::new();
    let mut section: Option<&str> = None;

    for line in markdown::lines(text) {
        let heading = line.heading();
        if let Some((_, title)) = heading {
            section = Some(title);
        }
        for range in matcher.find_all(line.text) {
            match_count += 1;
            if heading.is_some() {
                heading_matches += 1;
            }
            if line.number <= LEADING_LINES {
                leading_matches += 1;
            }
            if excerpts.len() < max_excerpts {
                excerpts.push(MatchExcerpt {
                    line: line.number,
                    excerpt: excerpt(line.text, &range, EXCERPT_RADIUS),
                    section: section.map(str::to_string),
                });
            }
        }
    }

    if match_count == 0 {
        return None;
    }

    let mut score = MATCH_WEIGHT * match_count as f64
        + HEADING_WEIGHT * heading_matches as f64
        + LEADING_WEIGHT * leading_matches as f64
        + WORD_WEIGHT * matcher.words_present(text) as f64;
    if text.chars().count() > LONG_DOCUMENT_CHARS {
        score *= LONG_DOCUMENT_FACTOR;
    }

    Some(Scored {
        score,
        match_count,
        excerpts,
    })
}
