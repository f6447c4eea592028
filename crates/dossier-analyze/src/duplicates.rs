//! Duplicate detection over content signatures.
//!
//! Runs in two passes:
//! 1. Group analyses by content hash. Every hash shared by two or more
//!    documents is an exact group.
//! 2. Compare one representative per hash pairwise. Pairs at or above the
//!    similarity threshold are edges, and every connected component is one
//!    similar group.
//!
//! Raising the threshold can only remove edges, so the set of reported
//! similar pairs shrinks monotonically.

use std::collections::BTreeMap;
use std::path::PathBuf;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use dossier_core::{ContentHash, Warning};

use crate::analysis::ContentAnalysis;
use crate::config::AnalyzerConfig;
use crate::similarity::{similarity, upper_bound};

/// Similarity above which non-folder duplicates are safe to delete.
const DELETE_SIMILARITY: f64 = 0.95;

/// How a group's members relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DuplicateKind {
    /// Identical normalized text.
    Exact,
    /// Pairwise similarity at or above the threshold.
    Similar,
}

/// Suggested follow-up for a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendedAction {
    MergeWithImages,
    MergeDocumentFolders,
    DeleteDuplicates,
    ReviewManually,
    ConsolidateContent,
}

impl RecommendedAction {
    /// Pick an action from the group's traits.
    pub fn decide(has_document_folder: bool, has_images: bool, similarity: f64) -> Self {
        match (has_document_folder, has_images) {
            (true, true) => Self::MergeWithImages,
            (true, false) => Self::MergeDocumentFolders,
            (false, _) if similarity > DELETE_SIMILARITY => Self::DeleteDuplicates,
            (false, true) => Self::ReviewManually,
            (false, false) => Self::ConsolidateContent,
        }
    }
}

/// Two documents whose similarity met the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    pub a: PathBuf,
    pub b: PathBuf,
    pub similarity: f64,
}

/// A set of documents that duplicate each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Exact or similar.
    pub kind: DuplicateKind,

    /// Member paths, sorted.
    pub paths: Vec<PathBuf>,

    /// 1.0 for exact groups, mean pair similarity for similar groups.
    pub similarity: f64,

    /// Qualifying pairs (empty for exact groups).
    pub pairs: Vec<SimilarPair>,

    /// Shared hash of an exact group.
    pub hash: Option<ContentHash>,

    /// Suggested follow-up.
    pub action: RecommendedAction,
}

impl DuplicateGroup {
    /// Get the number of documents in the group.
    pub fn count(&self) -> usize {
        self.paths.len()
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Exact groups first, then similar groups, each ordered by first path.
    pub groups: Vec<DuplicateGroup>,

    /// Number of documents compared.
    pub files_analyzed: usize,

    /// Documents skipped for being shorter than the minimum length.
    pub files_skipped_short: usize,

    /// Threshold used for the similar pass.
    pub threshold: f64,

    /// Per-file problems encountered while analyzing.
    pub warnings: Vec<Warning>,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Groups of the given kind.
    pub fn groups_of(&self, kind: DuplicateKind) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(move |g| g.kind == kind)
    }

    /// Every qualifying pair across all similar groups.
    pub fn similar_pairs(&self) -> impl Iterator<Item = &SimilarPair> {
        self.groups.iter().flat_map(|g| g.pairs.iter())
    }
}

/// Duplicate finder over precomputed analyses.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: AnalyzerConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Find exact and similar groups among `analyses`.
    pub fn find_duplicates(&self, analyses: &[ContentAnalysis]) -> DuplicateReport {
        let mut by_hash: BTreeMap<ContentHash, Vec<&ContentAnalysis>> = BTreeMap::new();
        for analysis in analyses {
            by_hash.entry(analysis.hash).or_default().push(analysis);
        }

        let mut groups: Vec<DuplicateGroup> = by_hash
            .iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(hash, members)| exact_group(*hash, members))
            .collect();

        // First occurrence in input order stands in for its hash.
        let representatives: Vec<&ContentAnalysis> = analyses
            .iter()
            .unique_by(|a| a.hash)
            .collect();
        groups.extend(self.similar_groups(&representatives));

        groups.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.paths.cmp(&b.paths)));

        debug!(
            files = analyses.len(),
            groups = groups.len(),
            threshold = self.config.similarity_threshold,
            "duplicate detection finished"
        );

        DuplicateReport {
            groups,
            files_analyzed: analyses.len(),
            files_skipped_short: 0,
            threshold: self.config.similarity_threshold,
            warnings: Vec::new(),
        }
    }

    fn similar_groups(&self, docs: &[&ContentAnalysis]) -> Vec<DuplicateGroup> {
        let threshold = self.config.similarity_threshold;
        let mut sets = DisjointSet::new(docs.len());
        let mut edges: Vec<(usize, usize, f64)> = Vec::new();
        let mut skipped = 0usize;

        for (i, j) in (0..docs.len()).tuple_combinations() {
            if upper_bound(docs[i].word_count, docs[j].word_count) < threshold {
                skipped += 1;
                continue;
            }
            let score = similarity(docs[i], docs[j]);
            if score >= threshold {
                sets.union(i, j);
                edges.push((i, j, score));
            }
        }
        if skipped > 0 {
            debug!(skipped, "pairs pruned by word-count bound");
        }

        let mut components: BTreeMap<usize, Vec<(usize, usize, f64)>> = BTreeMap::new();
        for edge in edges {
            components.entry(sets.find(edge.0)).or_default().push(edge);
        }

        components
            .into_values()
            .map(|edges| {
                let members: Vec<&ContentAnalysis> = edges
                    .iter()
                    .flat_map(|&(i, j, _)| [i, j])
                    .sorted()
                    .dedup()
                    .map(|idx| docs[idx])
                    .collect();
                let mean = edges.iter().map(|e| e.2).sum::<f64>() / edges.len() as f64;
                let pairs = edges
                    .iter()
                    .map(|&(i, j, score)| SimilarPair {
                        a: docs[i].path.clone(),
                        b: docs[j].path.clone(),
                        similarity: score,
                    })
                    .collect();
                DuplicateGroup {
                    kind: DuplicateKind::Similar,
                    paths: sorted_paths(&members),
                    similarity: mean,
                    pairs,
                    hash: None,
                    action: action_for(&members, mean),
                }
            })
            .collect()
    }
}

fn exact_group(hash: ContentHash, members: &[&ContentAnalysis]) -> DuplicateGroup {
    DuplicateGroup {
        kind: DuplicateKind::Exact,
        paths: sorted_paths(members),
        similarity: 1.0,
        pairs: Vec::new(),
        hash: Some(hash),
        action: action_for(members, 1.0),
    }
}

fn sorted_paths(members: &[&ContentAnalysis]) -> Vec<PathBuf> {
    members.iter().map(|m| m.path.clone()).sorted().collect()
}

fn action_for(members: &[&ContentAnalysis], similarity: f64) -> RecommendedAction {
    RecommendedAction::decide(
        members.iter().any(|m| m.is_document_folder()),
        members.iter().any(|m| m.has_images()),
        similarity,
    )
}

/// Union-find with path halving.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}
