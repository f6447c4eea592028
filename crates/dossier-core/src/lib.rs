//! Core types and traits for dossier.
//!
//! This crate provides the data structures shared by every dossier crate:
//! the [`DocumentFolder`] unit, content hashes, the error taxonomy, non-fatal
//! warnings, store configuration, and the markdown marker helpers that
//! analysis, consolidation and search all key off of.

mod config;
mod error;
mod folder;
mod hash;
pub mod markdown;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Error, Result, Warning, WarningKind};
pub use folder::{DocumentFolder, Timestamps};
pub use hash::ContentHash;

/// Category bucket used when nothing better is known.
pub const DEFAULT_CATEGORY: &str = "Consolidated";
