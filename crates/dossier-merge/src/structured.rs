//! Structured strategy: sections pooled into themes by heading.


use indexmap::IndexMap;
use itertools::Itertools;

use dossier_core::markdown;

use crate::render::{RenderContext, Rendered};
use crate::sections::{CodeBlock, extract_code, sections};
use crate::source::SourceDocument;

/// A theme: one heading text with every source's body under it.
#[derive(Debug, Default)]
pub(crate) struct Theme {
    /// Heading as first written.
    pub title: String,
    /// (source title, text) in source order.
    pub entries: Vec<(String, String)>,
}

/// Themes keyed by lowercased heading, in first-seen order.
pub(crate) type Themes = IndexMap<String, Theme>;

pub(crate) fn add_to_theme(themes: &mut Themes, heading: &str, source: &str, text: String) {
    let theme = themes
        .entry(heading.trim().to_lowercase())
        .or_insert_with(|| Theme {
            title: heading.trim().to_string(),
            entries: Vec::new(),
        });
    theme.entries.push((source.to_string(), text));
}

pub fn render(ctx: &RenderContext<'_>, sources: &[SourceDocument]) -> Rendered {
    let mut intros: Vec<(&str, String)> = Vec::new();
    let mut themes = Themes::new();
    let mut code: Vec<(&str, CodeBlock)> = Vec::new();

    for source in sources {
        let (prose, blocks) = extract_code(&source.body);
        code.extend(blocks.into_iter().map(|b| (source.title.as_str(), b)));

        for section in sections(&prose) {
            if section.body.is_empty() {
                continue;
            }
            match &section.heading {
                Some(heading) => add_to_theme(&mut themes, heading, &source.title, section.body),
                None => intros.push((source.title.as_str(), section.body)),
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", ctx.title));

    out.push_str("## Overview\n\n");
    out.push_str(&format!(
        "This document consolidates {} sources on {}: {}.\n\n",
        sources.len(),
        ctx.topic,
        sources.iter().map(|s| s.title.as_str()).join(", ")
    ));
    for (source, text) in &intros {
        out.push_str(&format!("*From {source}:*\n\n{text}\n\n"));
    }

    for theme in themes.values() {
        out.push_str(&format!("## {}\n\n", theme.title));
        for (source, text) in &theme.entries {
            out.push_str(&format!("*From {source}:*\n\n{text}\n\n"));
        }
    }

    if !code.is_empty() {
        out.push_str("## Code Examples\n\n");
        for (source, block) in &code {
            let language = block.language.as_deref().unwrap_or("");
            let label = if language.is_empty() { "Snippet" } else { language };
            out.push_str(&format!("### {label} (from {source})\n\n"));
            out.push_str(&format!("```{language}\n{}\n```\n\n", block.code));
        }
    }

    let references = references(sources);
    if !references.is_empty() {
        out.push_str("## References\n\n");
        out.push_str(&references);
    }

    Rendered {
        text: out.trim_end().to_string() + "\n",
        duplicates_removed: 0,
    }
}

/// Links and images across sources, attributed, first occurrence kept.
pub(crate) fn references(sources: &[SourceDocument]) -> String {
    let links: Vec<(String, String, &str)> = sources
        .iter()
        .flat_map(|s| {
            markdown::links(&s.body)
                .into_iter()
                .map(move |l| (l.text, l.url, s.title.as_str()))
        })
        .unique_by(|(_, url, _)| url.clone())
        .collect();
    let images: Vec<(String, &str)> = sources
        .iter()
        .flat_map(|s| {
            s.images.iter().filter_map(move |p| {
                p.file_name()
                    .map(|n| (n.to_string_lossy().into_owned(), s.title.as_str()))
            })
        })
        .collect();

    let mut out = String::new();
    if !links.is_empty() {
        out.push_str("### Links\n\n");
        for (text, url, source) in &links {
            out.push_str(&format!("- [{text}]({url}) (from {source})\n"));
        }
        out.push('\n');
    }
    if !images.is_empty() {
        out.push_str("### Images\n\n");
        for (name, source) in &images {
            out.push_str(&format!("- `{name}` (from {source})\n"));
        }
        out.push('\n');
    }
    out
}
