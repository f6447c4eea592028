//! The consolidation engine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dossier_analyze::{AnalyzerConfig, ConsolidationCandidate, Strategy, title_case};
use dossier_core::{DEFAULT_CATEGORY, Error, Result, Warning, WarningKind};
use dossier_store::{DocumentStore, FsOperation, FsOps, sanitize_name, unique_folder_path, validate_filename};

use crate::category::CategoryResolver;
use crate::enhance::{ContentEnhancer, EnhancementOutcome, RetryPolicy, enhance_with_retry};
use crate::images::copy_images;
use crate::options::ConsolidateOptions;
use crate::render::{RenderContext, render};
use crate::source::{SkippedSource, SourceDocument, load_sources};

/// Everything a consolidation did, or would do in dry-run mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationReport {
    /// New document folder.
    pub target: PathBuf,
    /// Main file of the new folder.
    pub main_file: PathBuf,
    /// Title of the merged document.
    pub title: String,
    /// Category the folder was placed in.
    pub category: String,
    /// Strategy used.
    pub strategy: Strategy,
    /// Whether the disk was left untouched.
    pub dry_run: bool,
    /// Sources whose content was merged.
    pub sources: Vec<PathBuf>,
    /// Sources left out, with reasons.
    pub skipped_sources: Vec<SkippedSource>,
    /// Words in the merged document.
    pub total_words: usize,
    /// Sentences dropped as cross-source duplicates.
    pub duplicates_removed: usize,
    /// Image files copied into the new folder.
    pub images_copied: usize,
    /// Image references pointed at the copies.
    pub references_rewritten: usize,
    /// Filesystem operations performed (or planned).
    pub operations: Vec<FsOperation>,
    /// Result of the optional enhancement step.
    pub enhancement: EnhancementOutcome,
    /// Non-fatal problems.
    pub warnings: Vec<Warning>,
}

/// Merges document folders into a new one. Sources are never modified.
pub struct Consolidator<'s> {
    store: &'s DocumentStore,
    analyzer: AnalyzerConfig,
    enhancer: Option<Arc<dyn ContentEnhancer>>,
    resolver: Option<Box<dyn CategoryResolver>>,
}

impl<'s> Consolidator<'s> {
    /// Create a consolidator without enhancer or category resolver.
    pub fn new(store: &'s DocumentStore) -> Self {
        Self {
            store,
            analyzer: AnalyzerConfig::default(),
            enhancer: None,
            resolver: None,
        }
    }

    /// Use a custom analyzer config for topic extraction.
    pub fn with_analyzer_config(mut self, config: AnalyzerConfig) -> Self {
        self.analyzer = config;
        self
    }

    /// Inject the external enhancement step.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn ContentEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Inject a category resolver used when no category is given.
    pub fn with_category_resolver(mut self, resolver: impl CategoryResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Merge `sources` into a new document folder about `topic`.
    ///
    /// Unreadable or empty sources are skipped with a warning; the call
    /// fails only when none remain. In dry-run mode the returned report
    /// lists the planned operations and nothing is written.
    pub async fn consolidate(
        &self,
        sources: &[PathBuf],
        topic: &str,
        options: &ConsolidateOptions,
    ) -> Result<ConsolidationReport> {
        let topic = topic.trim();
        if sources.is_empty() {
            return Err(Error::validation("no sources to consolidate"));
        }
        if topic.is_empty() {
            return Err(Error::validation("topic cannot be empty"));
        }
        let enhancer = match (options.enhance, &self.enhancer) {
            (true, None) => {
                return Err(Error::config("enhancement requested but no enhancer is configured"));
            }
            (true, Some(enhancer)) => Some(Arc::clone(enhancer)),
            (false, _) => None,
        };

        let loaded = load_sources(self.store, &self.analyzer, sources);
        if loaded.documents.is_empty() {
            return Err(Error::content(format!(
                "none of the {} sources has readable content",
                sources.len()
            )));
        }
        let mut warnings = loaded.warnings;
        let documents = loaded.documents;

        let title = title_case(topic);
        let generated = Local::now().format("%Y-%m-%d").to_string();
        let ctx = RenderContext {
            title: &title,
            topic,
            generated: &generated,
        };
        let rendered = render(options.strategy, &ctx, &documents);
        debug!(
            strategy = %options.strategy,
            sources = documents.len(),
            duplicates_removed = rendered.duplicates_removed,
            "rendered merged document"
        );

        let category = self.resolve_category(topic, &documents, &rendered.text, options, &mut warnings)?;
        let config = self.store.config();
        let name = options.target_name.as_deref().unwrap_or(topic);
        let folder = sanitize_name(name, config.max_name_length);
        if folder.is_empty() {
            return Err(Error::validation(format!(
                "target name '{name}' contains no usable characters"
            )));
        }
        let target = unique_folder_path(&self.store.root().join(&category), &folder);

        let (text, enhancement) = match enhancer {
            Some(enhancer) => {
                let policy = RetryPolicy {
                    attempts: options.enhance_attempts,
                    timeout: options.enhance_timeout(),
                    backoff: options.enhance_backoff(),
                };
                enhance_with_retry(enhancer.as_ref(), topic, &rendered.text, policy).await
            }
            None => (rendered.text, EnhancementOutcome::Skipped),
        };
        if let EnhancementOutcome::FellBack { error, .. } = &enhancement {
            warnings.push(Warning::new(&target, error.clone(), WarningKind::EnhancementFailed));
        }

        let ops = FsOps::recording(options.dry_run);
        let main_file = self.store.prepare_document_folder(&ops, &target)?;
        let images = copy_images(
            &ops,
            &documents,
            &config.images_dir,
            &target.join(&config.images_dir),
        );
        let (text, references_rewritten) = images.rewrite(&text);
        ops.write(&main_file, &text)?;
        warnings.extend(images.warnings);

        info!(
            target = %target.display(),
            sources = documents.len(),
            dry_run = options.dry_run,
            "consolidated document folders"
        );

        Ok(ConsolidationReport {
            main_file,
            title,
            category,
            strategy: options.strategy,
            dry_run: options.dry_run,
            sources: documents.iter().map(|d| d.path.clone()).collect(),
            skipped_sources: loaded.skipped,
            total_words: text.split_whitespace().count(),
            duplicates_removed: rendered.duplicates_removed,
            images_copied: images.copied,
            references_rewritten,
            operations: ops.take_journal(),
            enhancement,
            warnings,
            target,
        })
    }

    /// Merge a candidate found by the analyzer, using its strategy and title.
    pub async fn consolidate_candidate(
        &self,
        candidate: &ConsolidationCandidate,
        options: &ConsolidateOptions,
    ) -> Result<ConsolidationReport> {
        let options = ConsolidateOptions {
            strategy: candidate.strategy,
            ..options.clone()
        };
        self.consolidate(&candidate.paths, &candidate.recommended_title, &options)
            .await
    }

    fn resolve_category(
        &self,
        topic: &str,
        documents: &[SourceDocument],
        text: &str,
        options: &ConsolidateOptions,
        warnings: &mut Vec<Warning>,
    ) -> Result<String> {
        if let Some(category) = &options.category {
            let category = category.trim();
            validate_filename(category).map_err(Error::validation)?;
            return Ok(category.to_string());
        }

        let dominant = dominant_topic(documents).unwrap_or(topic);
        let Some(resolved) = self.resolver.as_ref().and_then(|r| r.resolve(dominant, text)) else {
            return Ok(DEFAULT_CATEGORY.to_string());
        };
        match validate_filename(resolved.trim()) {
            Ok(()) => Ok(resolved.trim().to_string()),
            Err(reason) => {
                warn!(category = %resolved, %reason, "resolved category rejected");
                warnings.push(Warning::new(
                    self.store.root(),
                    format!("category '{resolved}' rejected: {reason}"),
                    WarningKind::CategoryRejected,
                ));
                Ok(DEFAULT_CATEGORY.to_string())
            }
        }
    }
}

/// Topic shared by the most sources, ties broken alphabetically.
fn dominant_topic(documents: &[SourceDocument]) -> Option<&str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for topic in documents.iter().flat_map(|d| d.topics.iter()) {
        *counts.entry(topic.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(ta, ca), (tb, cb)| ca.cmp(cb).then_with(|| tb.cmp(ta)))
        .map(|(topic, _)| topic)
}
