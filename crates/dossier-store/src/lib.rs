//! Document folder store for dossier.
//!
//! A document folder is a directory holding one main content file (named
//! after the folder) plus an `images/` subdirectory. This crate creates,
//! moves, deletes, reads and discovers them.
//!
//! # Example
//!
//! ```rust,no_run
//! use dossier_store::{DocumentStore, StoreConfig};
//!
//! let store = DocumentStore::new(StoreConfig::new("/path/to/corpus")).unwrap();
//! let folder = store.create_document_folder("My Doc!", "Notes", "").unwrap();
//! assert!(folder.ends_with("Notes/my-doc"));
//!
//! for path in store.find_document_folders(store.root(), true) {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! Discovery normalizes each folder once: a main file called `index.md`
//! inside `my-doc/` is renamed to `my-doc.md`. Every other read is free of
//! side effects.

mod fs_ops;
mod naming;
mod resolve;
mod store;
mod walk;

pub use fs_ops::{FsOperation, FsOps};
pub use naming::{sanitize_name, unique_folder_path, validate_filename};
pub use resolve::{IMAGE_EXTENSIONS, is_image};
pub use store::DocumentStore;
pub use walk::FolderScan;

// Re-export core types for convenience
pub use dossier_core::{DocumentFolder, Error, Result, StoreConfig, Warning, WarningKind};
