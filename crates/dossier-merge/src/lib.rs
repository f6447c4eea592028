//! Consolidation engine for dossier.
//!
//! Merges several document folders into one new folder. Sources are read,
//! never modified. Three layouts are available:
//!
//! - **simple** - table of contents, then every source under its own
//!   heading, then a metadata table
//! - **structured** - sections pooled by heading into themes, with code
//!   examples and references collected at the end
//! - **comprehensive** - like structured, but sentences repeated across
//!   sources are kept only once, with an executive summary up front
//!
//! Every source image is copied into the new folder's images directory and
//! references to it are rewritten. All writes go through
//! [`FsOps`](dossier_store::FsOps), so a dry run reports the planned
//! operations without touching the disk.
//!
//! ```rust,ignore
//! use dossier_merge::{ConsolidateOptions, Consolidator, Strategy};
//! use dossier_store::{DocumentStore, StoreConfig};
//!
//! let store = DocumentStore::new(StoreConfig::new("/path/to/corpus"))?;
//! let options = ConsolidateOptions::builder()
//!     .strategy(Strategy::Structured)
//!     .dry_run(true)
//!     .build()?;
//!
//! let report = Consolidator::new(&store)
//!     .consolidate(&sources, "kubernetes", &options)
//!     .await?;
//! for op in &report.operations {
//!     println!("{op:?}");
//! }
//! ```

mod category;
mod comprehensive;
mod engine;
mod enhance;
mod images;
mod options;
mod render;
mod sections;
mod simple;
mod source;
mod structured;

pub use category::{CategoryResolver, KeywordCategories};
pub use engine::{ConsolidationReport, Consolidator};
pub use enhance::{ContentEnhancer, EnhancementOutcome, RetryPolicy, enhance_with_retry};
pub use options::{ConsolidateOptions, ConsolidateOptionsBuilder};
pub use source::SkippedSource;

// Re-export types that appear in the public API
pub use dossier_analyze::Strategy;
pub use dossier_core::{Error, Result, Warning, WarningKind};
pub use futures::future::BoxFuture;
