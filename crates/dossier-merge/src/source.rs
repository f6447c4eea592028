//! Loading consolidation sources.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use dossier_analyze::{AnalyzerConfig, analyze_text};
use dossier_core::markdown;
use dossier_core::{Error, Result, Warning, WarningKind};
use dossier_store::DocumentStore;

/// A source that was left out of the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// One readable source document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Document folder, or the file itself for a loose file.
    pub path: PathBuf,
    /// Folder name, or file stem for a loose file.
    pub name: String,
    /// Extracted title, else the name.
    pub title: String,
    /// Text without front matter or the leading title heading.
    pub body: String,
    /// Whitespace-separated words in the body.
    pub word_count: usize,
    /// Topics of the full text.
    pub topics: BTreeSet<String>,
    /// Files in the images subdirectory of the containing folder.
    pub images: Vec<PathBuf>,
}

/// Sources that could be read, plus the ones that could not.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<SkippedSource>,
    pub warnings: Vec<Warning>,
}

/// Read every source, keeping the ones with content.
///
/// A source may be a document folder, its main file, or any other
/// markdown file.
pub fn load_sources(
    store: &DocumentStore,
    analyzer: &AnalyzerConfig,
    paths: &[PathBuf],
) -> LoadedSources {
    let mut loaded = LoadedSources::default();
    let topic_config = AnalyzerConfig {
        min_content_length: 0,
        ..analyzer.clone()
    };

    for path in paths {
        let source = Origin::of(store, path);
        let mut skip = |reason: String| {
            warn!(path = %source.path.display(), %reason, "skipping consolidation source");
            loaded
                .warnings
                .push(Warning::new(&source.path, reason.clone(), WarningKind::SkippedSource));
            loaded.skipped.push(SkippedSource {
                path: source.path.clone(),
                reason,
            });
        };

        let text = match source.read(store) {
            Ok(text) => text,
            Err(e) => {
                skip(e.to_string());
                continue;
            }
        };
        if text.trim().is_empty() {
            skip("document is empty".to_string());
            continue;
        }

        let analysis = analyze_text(&topic_config, &source.path, &text);
        let title = analysis
            .as_ref()
            .and_then(|a| a.metadata.title.clone())
            .unwrap_or_else(|| source.name.clone());
        let body = strip_title(&text);
        if body.trim().is_empty() {
            skip("no content besides the title".to_string());
            continue;
        }

        loaded.documents.push(SourceDocument {
            word_count: body.split_whitespace().count(),
            topics: analysis.map(|a| a.topics).unwrap_or_default(),
            images: store.list_images(&source.folder),
            path: source.path,
            name: source.name,
            title,
            body,
        });
    }
    loaded
}

/// Where a source's text and images come from.
struct Origin {
    path: PathBuf,
    /// Folder holding the images subdirectory.
    folder: PathBuf,
    /// Set for a file that is not its folder's main file.
    loose_file: Option<PathBuf>,
    name: String,
}

impl Origin {
    /// A main file stands for its document folder. Any other file is
    /// read on its own.
    fn of(store: &DocumentStore, path: &Path) -> Self {
        if path.is_file() {
            if let Some(parent) = path.parent().filter(|p| *p != store.root())
                && store.get_main_document_file(parent).as_deref() == Some(path)
            {
                return Self::folder(parent);
            }
            return Self {
                path: path.to_path_buf(),
                folder: path.parent().map(Path::to_path_buf).unwrap_or_default(),
                loose_file: Some(path.to_path_buf()),
                name: file_label(path.file_stem()),
            };
        }
        Self::folder(path)
    }

    fn folder(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            folder: path.to_path_buf(),
            loose_file: None,
            name: file_label(path.file_name()),
        }
    }

    fn read(&self, store: &DocumentStore) -> Result<String> {
        match &self.loose_file {
            Some(file) => fs::read_to_string(file).map_err(|e| Error::io("read source", file, e)),
            None => store.read_main_content(&self.folder),
        }
    }
}

fn file_label(name: Option<&std::ffi::OsStr>) -> String {
    name.map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Drop front matter and a leading level-one heading.
pub fn strip_title(text: &str) -> String {
    let (_, body) = markdown::split_front_matter(text);
    let mut lines = body.lines().skip_while(|l| l.trim().is_empty()).peekable();
    if lines
        .peek()
        .and_then(|l| markdown::heading(l))
        .is_some_and(|(level, _)| level == 1)
    {
        lines.next();
    }
    let rest: Vec<&str> = lines.skip_while(|l| l.trim().is_empty()).collect();
    rest.join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_title() {
        assert_eq!(strip_title("# Title\n\nBody line\n"), "Body line");
        assert_eq!(strip_title("---\ntitle: X\n---\n# T\nA\n## B\n"), "A\n## B");
        assert_eq!(strip_title("## Not a title\ntext"), "## Not a title\ntext");
        assert_eq!(strip_title("# Only"), "");
    }
}
