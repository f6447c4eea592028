//! The search engine.

use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dossier_core::{DocumentFolder, Error, Result, Warning, WarningKind};
use dossier_store::DocumentStore;

use crate::excerpt::{PREVIEW_RADIUS, preview};
use crate::matcher::{Compiled, Matcher};
use crate::options::SearchOptions;
use crate::score::{MatchExcerpt, Scored, score_document};

/// A matching document folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The folder whose main file matched.
    pub folder: DocumentFolder,
    /// Relevance score, higher is better.
    pub score: f64,
    /// Raw number of matches in the main file.
    pub match_count: usize,
    /// The first matches, with line numbers and sections.
    pub excerpts: Vec<MatchExcerpt>,
    /// Text around the first match with every match wrapped in `**`.
    pub preview: String,
}

/// Ranked results plus everything that went wrong on the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Results, best first, at most `limit`.
    pub results: Vec<SearchResult>,
    /// Matching folders found before truncation to `limit`.
    pub total_matches: usize,
    /// Document folders inspected.
    pub folders_scanned: usize,
    /// Folders that could not be read.
    pub processing_errors: Vec<Warning>,
    /// Pattern fallbacks, unknown categories, traversal problems.
    pub warnings: Vec<Warning>,
    /// Traversal stopped once enough matches were collected.
    pub truncated_scan: bool,
}

/// Full-text search over a store's document folders.
pub struct SearchEngine<'s> {
    store: &'s DocumentStore,
}

impl<'s> SearchEngine<'s> {
    /// Create a search engine over `store`.
    pub fn new(store: &'s DocumentStore) -> Self {
        Self { store }
    }

    /// Search every document folder's main file for `query`.
    ///
    /// An empty query is rejected. An unknown category, an invalid regex
    /// and unreadable folders are reported in the response instead of
    /// failing the call.
    pub fn search_documents(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::validation("search query cannot be empty"));
        }

        let mut response = SearchResponse::default();
        let root = match &options.category {
            Some(category) => match self.store.category_path(category) {
                Some(path) => path,
                None => {
                    warn!(category = %category, "unknown category");
                    response.warnings.push(Warning::new(
                        self.store.root().join(category),
                        format!("category '{category}' does not exist"),
                        WarningKind::UnknownCategory,
                    ));
                    return Ok(response);
                }
            },
            None => self.store.root().to_path_buf(),
        };

        let matcher = match Matcher::compile(query, options.use_regex, options.case_sensitive)? {
            Compiled::Exact(matcher) => matcher,
            Compiled::Literal { matcher, error } => {
                warn!(query, %error, "invalid pattern, searching literally");
                response.warnings.push(Warning::new(
                    &root,
                    format!("invalid pattern '{query}': {error}"),
                    WarningKind::InvalidPattern,
                ));
                matcher
            }
        };

        let pool = options.candidate_pool();
        let mut results = Vec::new();
        let mut processing_errors = Vec::new();
        let mut scanned = 0;

        let scan = self.store.visit_document_folders(&root, true, |folder| {
            scanned += 1;
            match self.search_folder(folder, &matcher, options) {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %folder.display(), error = %err, "failed to search folder");
                    processing_errors.push(Warning::read_error(folder, &err));
                }
            }
            if results.len() >= pool {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        results.sort_by(rank);
        response.total_matches = results.len();
        results.truncate(options.limit);

        info!(
            query,
            root = %root.display(),
            scanned,
            matches = response.total_matches,
            truncated = scan.stopped_early,
            "search complete"
        );

        response.results = results;
        response.folders_scanned = scanned;
        response.processing_errors = processing_errors;
        response.warnings.extend(scan.warnings);
        response.truncated_scan = scan.stopped_early;
        Ok(response)
    }

    fn search_folder(
        &self,
        folder: &Path,
        matcher: &Matcher,
        options: &SearchOptions,
    ) -> Result<Option<SearchResult>> {
        let text = self.store.read_main_content(folder)?;
        let Some(Scored {
            score,
            match_count,
            excerpts,
        }) = score_document(&text, matcher, options.max_excerpts)
        else {
            return Ok(None);
        };

        let folder = self.store.load_document_folder(folder)?;
        debug!(path = %folder.path.display(), score, match_count, "folder matched");
        Ok(Some(SearchResult {
            preview: preview(&text, matcher, PREVIEW_RADIUS).unwrap_or_default(),
            folder,
            score,
            match_count,
            excerpts,
        }))
    }
}

/// Score, then raw match count, then newest first, then path.
fn rank(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.match_count.cmp(&a.match_count))
        .then_with(|| b.folder.timestamps.modified.cmp(&a.folder.timestamps.modified))
        .then_with(|| a.folder.path.cmp(&b.folder.path))
}
