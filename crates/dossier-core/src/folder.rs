//! The document folder unit.

use std::path::PathBuf;
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Folder metadata timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last modification time of the main file.
    pub modified: SystemTime,
    /// Creation time (if available, platform-dependent).
    pub created: Option<SystemTime>,
}

impl Timestamps {
    /// Create timestamps with all available times.
    pub fn new(modified: SystemTime, created: Option<SystemTime>) -> Self {
        Self { modified, created }
    }
}

/// A directory holding exactly one main content file plus an images dir.
///
/// Once a directory qualifies as a document folder it is a leaf: traversal
/// never descends into it, and its main file is named after the folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFolder {
    /// Absolute path of the folder.
    pub path: PathBuf,
    /// Folder name (last path component).
    pub name: CompactString,
    /// Category, i.e. the parent directory's name.
    pub category: CompactString,
    /// Resolved main content file.
    pub main_file: PathBuf,
    /// Images subdirectory (may not exist yet).
    pub images_dir: PathBuf,
    /// Total size of all files in the folder, in bytes.
    pub size: u64,
    /// Main file timestamps.
    pub timestamps: Timestamps,
    /// Number of image files in the images subdirectory.
    pub image_count: usize,
}

impl DocumentFolder {
    /// Check whether the folder carries any images.
    pub fn has_images(&self) -> bool {
        self.image_count > 0
    }

    /// Main file extension, if any.
    pub fn main_extension(&self) -> Option<&str> {
        self.main_file.extension().and_then(|e| e.to_str())
    }

    /// Whether the main file name already matches the folder name.
    pub fn is_normalized(&self) -> bool {
        self.main_file
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem == self.name.as_str())
    }
}
