//! Comprehensive strategy: cross-source sentence deduplication and
//! reorganization by theme.
//!
//! A prose sentence that appears (after normalization) in more than one
//! source is kept only where it first occurs. Sentences shorter than three
//! words are never treated as duplicates. Lists, tables, quotes, images and
//! code are carried over verbatim.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;

use dossier_core::markdown;

use crate::render::{RenderContext, Rendered};
use crate::sections::{Block, blocks, sections};
use crate::source::SourceDocument;
use crate::structured::{Themes, add_to_theme, references};

/// Normalized sentences shorter than this are never deduplicated.
const MIN_SENTENCE_WORDS: usize = 3;

/// Cross-source topics listed in the executive summary.
const SUMMARY_TOPICS: usize = 5;

/// Where each normalized sentence first appears and how many sources share it.
#[derive(Default)]
struct SentenceIndex {
    first: HashMap<String, usize>,
    sources: HashMap<String, BTreeSet<usize>>,
}

impl SentenceIndex {
    fn build(sources: &[SourceDocument]) -> Self {
        let mut index = Self::default();
        for (idx, source) in sources.iter().enumerate() {
            for section in sections(&source.body) {
                for block in blocks(&section.body) {
                    let Block::Prose(text) = block else { continue };
                    let flat = flatten(&text);
                    for key in sentences_of(&flat).filter_map(dedup_key) {
                        index.first.entry(key.clone()).or_insert(idx);
                        index.sources.entry(key).or_default().insert(idx);
                    }
                }
            }
        }
        index
    }

    /// Whether `sentence` in source `idx` repeats an earlier source.
    fn is_duplicate(&self, sentence: &str, idx: usize) -> bool {
        let Some(key) = dedup_key(sentence) else {
            return false;
        };
        let shared = self.sources.get(&key).is_some_and(|s| s.len() > 1);
        shared && self.first.get(&key).is_some_and(|&first| first != idx)
    }
}

fn flatten(text: &str) -> String {
    text.lines().map(str::trim).join(" ")
}

fn sentences_of(text: &str) -> impl Iterator<Item = &str> {
    markdown::split_sentences(text).into_iter()
}

fn dedup_key(sentence: &str) -> Option<String> {
    let normalized = markdown::normalize_text(sentence);
    (normalized.split(' ').count() >= MIN_SENTENCE_WORDS).then_some(normalized)
}

pub fn render(ctx: &RenderContext<'_>, sources: &[SourceDocument]) -> Rendered {
    let index = SentenceIndex::build(sources);
    let mut removed = 0usize;
    let mut intros = Themes::new();
    let mut themes = Themes::new();

    for (idx, source) in sources.iter().enumerate() {
        for section in sections(&source.body) {
            let mut kept: Vec<String> = Vec::new();
            for block in blocks(&section.body) {
                match block {
                    Block::Verbatim(text) => kept.push(text),
                    Block::Prose(text) => {
                        let flat = flatten(&text);
                        let sentences: Vec<&str> = sentences_of(&flat)
                            .filter(|s| {
                                let duplicate = index.is_duplicate(s, idx);
                                removed += usize::from(duplicate);
                                !duplicate
                            })
                            .collect();
                        if !sentences.is_empty() {
                            kept.push(sentences.join(" "));
                        }
                    }
                }
            }
            if kept.is_empty() {
                continue;
            }
            let text = kept.join("\n\n");
            match &section.heading {
                Some(heading) => add_to_theme(&mut themes, heading, &source.title, text),
                None => add_to_theme(&mut intros, "Introduction", &source.title, text),
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", ctx.title));
    out.push_str(&executive_summary(ctx, sources, removed));

    for theme in intros.values().chain(themes.values()) {
        out.push_str(&format!("## {}\n\n", theme.title));
        let contributors = theme.entries.iter().map(|(s, _)| s.as_str()).unique().join(", ");
        out.push_str(&format!("*Sources: {contributors}*\n\n"));
        for (source, text) in &theme.entries {
            out.push_str(&format!("*From {source}:*\n\n{text}\n\n"));
        }
    }

    let references = references(sources);
    if !references.is_empty() {
        out.push_str("## References\n\n");
        out.push_str(&references);
    }

    out.push_str(&source_appendix(sources));

    Rendered {
        text: out.trim_end().to_string() + "\n",
        duplicates_removed: removed,
    }
}

fn executive_summary(ctx: &RenderContext<'_>, sources: &[SourceDocument], removed: usize) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for topic in sources.iter().flat_map(|s| s.topics.iter()) {
        *counts.entry(topic.as_str()).or_default() += 1;
    }
    let shared: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|(_, n)| *n >= 2)
        .sorted_by(|(ta, na), (tb, nb)| nb.cmp(na).then_with(|| ta.cmp(tb)))
        .take(SUMMARY_TOPICS)
        .collect();

    let mut out = String::from("## Executive Summary\n\n");
    out.push_str(&format!(
        "This document consolidates {} sources on {} ({}). {} duplicate sentences were removed.\n\n",
        sources.len(),
        ctx.topic,
        ctx.generated,
        removed
    ));
    if shared.is_empty() {
        out.push_str("The sources share no common topics.\n\n");
    } else {
        out.push_str("Key topics across sources:\n\n");
        for (topic, n) in shared {
            out.push_str(&format!("- **{topic}** ({n} sources)\n"));
        }
        out.push('\n');
    }
    out
}

fn source_appendix(sources: &[SourceDocument]) -> String {
    let mut out = String::from("## Source Files\n\n");
    out.push_str("| # | Title | Source | Words | Images |\n");
    out.push_str("|---|---|---|---|---|\n");
    for (idx, source) in sources.iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | `{}` | {} | {} |\n",
            idx + 1,
            source.title,
            source.path.display(),
            source.word_count,
            source.images.len()
        ));
    }
    out
}
