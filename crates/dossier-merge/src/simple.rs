//! Simple strategy: sources in order under a table of contents.

use std::collections::HashMap;

use crate::render::{RenderContext, Rendered};
use crate::sections::{demote_headings, slug};
use crate::source::SourceDocument;

pub fn render(ctx: &RenderContext<'_>, sources: &[SourceDocument]) -> Rendered {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", ctx.title));
    out.push_str(&format!(
        "> Consolidated from {} documents on {}.\n\n",
        sources.len(),
        ctx.generated
    ));

    out.push_str("## Table of Contents\n\n");
    let anchors = unique_anchors(sources.iter().map(|s| s.title.as_str()));
    for (idx, (source, anchor)) in sources.iter().zip(&anchors).enumerate() {
        out.push_str(&format!("{}. [{}](#{})\n", idx + 1, source.title, anchor));
    }

    for source in sources {
        out.push_str("\n---\n\n");
        out.push_str(&format!("## {}\n\n", source.title));
        out.push_str(&format!("*Source: `{}`*\n\n", source.name));
        out.push_str(&demote_headings(&source.body));
        out.push('\n');
    }

    out.push_str("\n---\n\n");
    out.push_str(&metadata_block(ctx, sources));

    Rendered {
        text: out,
        duplicates_removed: 0,
    }
}

/// Anchors with GitHub's `-1`, `-2` suffixes for repeated titles.
fn unique_anchors<'a>(titles: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    titles
        .map(|title| {
            let base = slug(title);
            let count = seen.entry(base.clone()).or_default();
            let anchor = if *count == 0 {
                base
            } else {
                format!("{base}-{count}")
            };
            *count += 1;
            anchor
        })
        .collect()
}

fn metadata_block(ctx: &RenderContext<'_>, sources: &[SourceDocument]) -> String {
    let total_words: usize = sources.iter().map(|s| s.word_count).sum();
    let mut out = String::from("## Consolidation Metadata\n\n");
    out.push_str(&format!("- **Topic**: {}\n", ctx.topic));
    out.push_str(&format!("- **Sources**: {}\n", sources.len()));
    out.push_str(&format!("- **Total words**: {total_words}\n"));
    out.push_str(&format!("- **Generated**: {}\n\n", ctx.generated));

    out.push_str("| Source | Title | Words | Images |\n");
    out.push_str("|---|---|---|---|\n");
    for source in sources {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            source.name,
            source.title,
            source.word_count,
            source.images.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_anchors() {
        let anchors = unique_anchors(["Notes", "Notes", "Other"].into_iter());
        assert_eq!(anchors, vec!["notes", "notes-1", "other"]);
    }
}
