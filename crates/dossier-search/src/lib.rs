//! Full-text search for dossier.
//!
//! Walks the document folders below the store root (or one category),
//! matches each main file against a literal or regex query, and ranks the
//! matching folders. Headings and the first lines of a document weigh
//! more than body text; very long documents are damped.
//!
//! ```rust,no_run
//! use dossier_search::{SearchEngine, SearchOptions};
//! use dossier_store::{DocumentStore, StoreConfig};
//!
//! let store = DocumentStore::new(StoreConfig::new("/path/to/corpus")).unwrap();
//! let response = SearchEngine::new(&store)
//!     .search_documents("kubernetes", &SearchOptions::default())
//!     .unwrap();
//!
//! for result in &response.results {
//!     println!("{:.1} {}", result.score, result.folder.path.display());
//!     println!("    {}", result.preview);
//! }
//! ```

mod engine;
mod excerpt;
mod matcher;
mod options;
mod score;

pub use engine::{SearchEngine, SearchResponse, SearchResult};
pub use excerpt::{EXCERPT_RADIUS, PREVIEW_RADIUS};
pub use options::{SearchOptions, SearchOptionsBuilder};
pub use score::MatchExcerpt;

// Re-export core types for convenience
pub use dossier_core::{Error, Result, Warning, WarningKind};
