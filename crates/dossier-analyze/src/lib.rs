//! Content analysis for dossier.
//!
//! This crate turns documents into comparable signatures and finds
//! relationships between them:
//!
//! - **Signatures** - normalized-text hash, topics, structural fingerprint,
//!   content type and metadata for one document
//! - **Duplicate detection** - exact groups by hash, similar groups by a
//!   weighted topic/structure/content score
//! - **Consolidation candidates** - documents sharing a topic that are
//!   similar enough to merge, with a suggested strategy
//!
//! ```rust,ignore
//! use dossier_analyze::{AnalyzerConfig, ContentAnalyzer};
//! use dossier_store::{DocumentStore, StoreConfig};
//!
//! let store = DocumentStore::new(StoreConfig::new("/path/to/corpus")).unwrap();
//! let folders = store.find_document_folders(store.root(), true);
//!
//! let analyzer = ContentAnalyzer::new(&store);
//! let report = analyzer.find_duplicates(&folders);
//!
//! for group in &report.groups {
//!     println!("{} {:?}: {}", group.kind, group.paths, group.action);
//! }
//! ```

mod analysis;
mod analyzer;
mod candidates;
mod config;
mod duplicates;
pub mod similarity;

pub use analysis::{
    ContentAnalysis, ContentType, DocumentMetadata, Heading, StructureFingerprint, TextFormat,
    analyze_text, content_hash,
};
pub use analyzer::{AnalysisBatch, CandidateReport, ContentAnalyzer};
pub use candidates::{ConsolidationCandidate, Strategy, choose_strategy, find_candidates, title_case};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use duplicates::{
    DuplicateFinder, DuplicateGroup, DuplicateKind, DuplicateReport, RecommendedAction, SimilarPair,
};

// Re-export core types
pub use dossier_core::{ContentHash, Warning, WarningKind};
