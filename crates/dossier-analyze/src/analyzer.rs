//! Store-backed analysis entry points.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dossier_core::{Error, Result, Warning, WarningKind};
use dossier_store::DocumentStore;

use crate::analysis::{ContentAnalysis, analyze_text};
use crate::candidates::{ConsolidationCandidate, find_candidates};
use crate::config::AnalyzerConfig;
use crate::duplicates::{DuplicateFinder, DuplicateReport};

/// Analyses of a batch of files, with what was left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisBatch {
    /// Successful analyses, in input order.
    pub analyses: Vec<ContentAnalysis>,
    /// Files below the minimum content length.
    pub skipped_short: usize,
    /// Files that are not a document folder's main file.
    pub skipped_non_canonical: usize,
    /// Files that could not be read.
    pub warnings: Vec<Warning>,
}

/// Consolidation candidates with the inputs that were left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateReport {
    /// Candidates, most similar first.
    pub candidates: Vec<ConsolidationCandidate>,
    /// Number of documents compared.
    pub files_analyzed: usize,
    /// Documents below the minimum content length.
    pub files_skipped_short: usize,
    /// Files that are not a document folder's main file.
    pub files_skipped_non_canonical: usize,
    /// Per-file problems encountered while analyzing.
    pub warnings: Vec<Warning>,
}

impl CandidateReport {
    /// Check if any candidates were found.
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// Analyzes files and document folders of one store.
#[derive(Debug)]
pub struct ContentAnalyzer<'s> {
    store: &'s DocumentStore,
    config: AnalyzerConfig,
}

impl<'s> ContentAnalyzer<'s> {
    /// Create an analyzer with default config.
    pub fn new(store: &'s DocumentStore) -> Self {
        Self::with_config(store, AnalyzerConfig::default())
    }

    /// Create an analyzer with custom config.
    pub fn with_config(store: &'s DocumentStore, config: AnalyzerConfig) -> Self {
        Self { store, config }
    }

    /// Analyzer configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze text in memory.
    pub fn analyze_text(&self, path: impl Into<PathBuf>, text: &str) -> Option<ContentAnalysis> {
        analyze_text(&self.config, path, text)
    }

    /// Analyze one file, or the main file of a document folder.
    ///
    /// Returns `Ok(None)` when the content is shorter than the minimum.
    pub fn analyze_content(&self, path: &Path) -> Result<Option<ContentAnalysis>> {
        let (file, folder) = if path.is_dir() {
            let main = self.store.get_main_document_file(path).ok_or_else(|| {
                Error::validation(format!("not a document folder: {}", path.display()))
            })?;
            (main, Some(path.to_path_buf()))
        } else {
            (path.to_path_buf(), self.owning_folder(path))
        };

        let text = fs::read_to_string(&file).map_err(|e| Error::io("read", &file, e))?;
        let Some(mut analysis) = analyze_text(&self.config, &file, &text) else {
            debug!(path = %file.display(), "content below minimum length");
            return Ok(None);
        };

        if let Some(folder) = folder {
            analysis.folder_image_count = self.store.list_images(&folder).len();
            analysis.document_folder = Some(folder);
        }
        Ok(Some(analysis))
    }

    /// Analyze many files, skipping the ones that fail.
    pub fn analyze_all(&self, files: &[PathBuf]) -> AnalysisBatch {
        let mut batch = AnalysisBatch::default();
        for file in files {
            if self.config.canonical_only && !self.is_canonical(file) {
                batch.skipped_non_canonical += 1;
                continue;
            }
            match self.analyze_content(file) {
                Ok(Some(analysis)) => batch.analyses.push(analysis),
                Ok(None) => batch.skipped_short += 1,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "skipping unreadable file");
                    batch.warnings.push(Warning::read_error(file, &e));
                }
            }
        }
        batch
    }

    /// Analyze the main file of each document folder.
    pub fn analyze_folders(&self, folders: &[PathBuf]) -> AnalysisBatch {
        let mut files = Vec::with_capacity(folders.len());
        let mut warnings = Vec::new();
        for folder in folders {
            match self.store.get_main_document_file(folder) {
                Some(main) => files.push(main),
                None => warnings.push(Warning::new(
                    folder,
                    "no main document file",
                    WarningKind::SkippedSource,
                )),
            }
        }
        let mut batch = self.analyze_all(&files);
        warnings.append(&mut batch.warnings);
        batch.warnings = warnings;
        batch
    }

    /// Find exact and similar duplicates among `files`.
    pub fn find_duplicates(&self, files: &[PathBuf]) -> DuplicateReport {
        let batch = self.analyze_all(files);
        let mut report = DuplicateFinder::with_config(self.config.clone()).find_duplicates(&batch.analyses);
        report.files_skipped_short = batch.skipped_short;
        report.warnings = batch.warnings;
        report
    }

    /// Find groups of files sharing a topic that are worth merging.
    pub fn find_consolidation_candidates(&self, files: &[PathBuf]) -> CandidateReport {
        let batch = self.analyze_all(files);
        CandidateReport {
            candidates: find_candidates(&self.config, &batch.analyses),
            files_analyzed: batch.analyses.len(),
            files_skipped_short: batch.skipped_short,
            files_skipped_non_canonical: batch.skipped_non_canonical,
            warnings: batch.warnings,
        }
    }

    /// Document folder whose main file is `file`. The store root is never one.
    fn owning_folder(&self, file: &Path) -> Option<PathBuf> {
        let parent = file.parent().filter(|p| *p != self.store.root())?;
        (self.store.get_main_document_file(parent).as_deref() == Some(file))
            .then(|| parent.to_path_buf())
    }

    fn is_canonical(&self, path: &Path) -> bool {
        if path.is_dir() {
            self.store.is_document_folder(path)
        } else {
            self.owning_folder(path).is_some()
        }
    }
}
