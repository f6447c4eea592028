//! Store configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a document folder store.
///
/// Everything the store needs to know about the corpus layout is injected
/// here; no component probes fixed filesystem locations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct StoreConfig {
    /// Root directory of the corpus.
    pub root: PathBuf,

    /// Name of the images subdirectory inside each document folder.
    #[builder(default = "default_images_dir()")]
    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    /// Extension given to newly created main files.
    #[builder(default = "default_main_extension()")]
    #[serde(default = "default_main_extension")]
    pub main_extension: String,

    /// Extensions recognized as document main files.
    #[builder(default = "default_document_extensions()")]
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    /// Generic main-file stems that get renamed to the folder name.
    #[builder(default = "default_canonical_names()")]
    #[serde(default = "default_canonical_names")]
    pub canonical_names: Vec<String>,

    /// Maximum length of a sanitized folder name.
    #[builder(default = "100")]
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Maximum depth to traverse below the root (None = unlimited).
    #[builder(default = "Some(8)")]
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,

    /// Include hidden entries (starting with .).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Glob patterns for directory names to skip during traversal.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_images_dir() -> String {
    "images".to_string()
}

fn default_main_extension() -> String {
    "md".to_string()
}

fn default_document_extensions() -> Vec<String> {
    ["md", "markdown", "txt", "rst", "org"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_canonical_names() -> Vec<String> {
    ["main", "document", "index"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_name_length() -> usize {
    100
}

fn default_max_depth() -> Option<usize> {
    Some(8)
}

impl StoreConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            _ => {}
        }
        if let Some(0) = self.max_name_length {
            return Err("max_name_length must be positive".to_string());
        }
        if let Some(ref ext) = self.main_extension
            && ext.trim_start_matches('.').is_empty()
        {
            return Err("main_extension cannot be empty".to_string());
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Create a new store config builder.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Create a config with defaults for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images_dir: default_images_dir(),
            main_extension: default_main_extension(),
            document_extensions: default_document_extensions(),
            canonical_names: default_canonical_names(),
            max_name_length: default_max_name_length(),
            max_depth: default_max_depth(),
            include_hidden: false,
            ignore_patterns: Vec::new(),
        }
    }

    /// Main extension without a leading dot.
    pub fn main_extension(&self) -> &str {
        self.main_extension.trim_start_matches('.')
    }

    /// Check whether an extension marks a document main file.
    pub fn is_document_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        ext.eq_ignore_ascii_case(self.main_extension())
            || self
                .document_extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Check whether a file stem is one of the generic main-file names.
    pub fn is_canonical_name(&self, stem: &str) -> bool {
        self.canonical_names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(stem))
    }

    /// Check if hidden entries should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}
