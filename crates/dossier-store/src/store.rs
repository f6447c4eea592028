//! The document folder store.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info, warn};

use dossier_core::{DocumentFolder, Error, Result, StoreConfig, Timestamps, Warning, WarningKind};

use crate::fs_ops::FsOps;
use crate::naming::{sanitize_name, validate_filename};
use crate::resolve::{folder_name, is_image, normalized_main_path, resolve_main_file};
use crate::walk::{FolderScan, walk_document_folders};

/// Create, move, delete, read and discover document folders under one root.
#[derive(Debug)]
pub struct DocumentStore {
    config: Arc<StoreConfig>,
    ignore: GlobSet,
    ops: FsOps,
}

impl DocumentStore {
    /// Create a store over the configured root.
    ///
    /// Fails with a configuration error when an ignore pattern does not
    /// compile. The root does not have to exist yet.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::config(format!("invalid ignore pattern '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let ignore = builder
            .build()
            .map_err(|e| Error::config(format!("invalid ignore patterns: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            ignore,
            ops: FsOps::live(),
        })
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Root directory of the corpus.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Check whether `path` is an existing directory with a resolvable main file.
    pub fn is_document_folder(&self, path: &Path) -> bool {
        resolve_main_file(&self.config, path).is_some()
    }

    /// Resolve the main file of a folder. Never touches the disk.
    pub fn get_main_document_file(&self, path: &Path) -> Option<PathBuf> {
        resolve_main_file(&self.config, path)
    }

    /// Rename the main file to match the folder name.
    ///
    /// Idempotent: on an already normalized folder nothing is renamed and
    /// the same path is returned.
    pub fn normalize(&self, path: &Path) -> Result<PathBuf> {
        let current = self.require_main_file(path)?;
        let target = normalized_main_path(path, &current);
        if current == target {
            return Ok(current);
        }
        if target.exists() {
            return Err(Error::validation(format!(
                "cannot normalize {}: {} already exists",
                path.display(),
                target.display()
            )));
        }

        info!(
            from = %current.display(),
            to = %target.display(),
            "normalizing main file name"
        );
        self.ops.rename(&current, &target)
    }

    /// Compute the path a new document folder would get, without creating it.
    pub fn plan_document_folder(&self, name: &str, category: &str) -> Result<PathBuf> {
        let folder = sanitize_name(name, self.config.max_name_length);
        if folder.is_empty() {
            return Err(Error::validation(format!(
                "name '{name}' contains no usable characters"
            )));
        }
        validate_filename(&folder).map_err(Error::validation)?;

        let category = category.trim();
        if category.is_empty() {
            return Err(Error::validation("category cannot be empty"));
        }
        validate_filename(category).map_err(Error::validation)?;

        let path = self.config.root.join(category).join(&folder);
        if path.exists() {
            return Err(Error::validation(format!(
                "document folder already exists: {}",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Create a folder, its images subfolder and its main file.
    ///
    /// An empty `initial_content` writes a title heading. Steps are not
    /// rolled back if a later one fails.
    pub fn create_document_folder(
        &self,
        name: &str,
        category: &str,
        initial_content: &str,
    ) -> Result<PathBuf> {
        self.create_document_folder_with(&self.ops, name, category, initial_content)
    }

    /// Same as [`create_document_folder`](Self::create_document_folder), routing
    /// every mutation through `ops` (which may be in dry-run mode).
    pub fn create_document_folder_with(
        &self,
        ops: &FsOps,
        name: &str,
        category: &str,
        initial_content: &str,
    ) -> Result<PathBuf> {
        let path = self.plan_document_folder(name, category)?;
        self.populate_folder(ops, &path, name, initial_content)?;
        Ok(path)
    }

    /// Create an empty folder and its images subfolder at a vetted path.
    ///
    /// Returns the normalized main-file path, which is not written yet.
    pub fn prepare_document_folder(&self, ops: &FsOps, path: &Path) -> Result<PathBuf> {
        if path.exists() {
            return Err(Error::validation(format!(
                "document folder already exists: {}",
                path.display()
            )));
        }
        ops.create_dir_all(path)?;
        ops.create_dir_all(&path.join(&self.config.images_dir))?;
        Ok(self.main_file_path(path))
    }

    /// Normalized main-file path for a folder, whether or not it exists.
    pub fn main_file_path(&self, path: &Path) -> PathBuf {
        path.join(format!(
            "{}.{}",
            folder_name(path),
            self.config.main_extension()
        ))
    }

    fn populate_folder(&self, ops: &FsOps, path: &Path, title: &str, content: &str) -> Result<()> {
        ops.create_dir_all(path)?;
        ops.create_dir_all(&path.join(&self.config.images_dir))?;

        let main_file = self.main_file_path(path);
        let body = if content.trim().is_empty() {
            format!("# {}\n", title.trim())
        } else {
            content.to_string()
        };
        ops.write(&main_file, &body)?;

        info!(path = %path.display(), dry_run = ops.is_dry_run(), "created document folder");
        Ok(())
    }

    /// Move a document folder with a single rename.
    ///
    /// The main file is normalized at the new location. Returns the new
    /// folder path.
    pub fn move_document_folder(&self, src: &Path, dst: &Path) -> Result<PathBuf> {
        self.require_document_folder(src)?;
        if dst.exists() {
            return Err(Error::validation(format!(
                "destination already exists: {}",
                dst.display()
            )));
        }
        if dst.starts_with(src) {
            return Err(Error::validation(format!(
                "cannot move {} into itself",
                src.display()
            )));
        }
        if let Some(parent) = dst.parent()
            && !parent.exists()
        {
            self.ops.create_dir_all(parent)?;
        }

        self.ops.rename(src, dst)?;
        if let Err(err) = self.normalize(dst) {
            warn!(path = %dst.display(), error = %err, "moved folder could not be normalized");
        }
        info!(from = %src.display(), to = %dst.display(), "moved document folder");
        Ok(dst.to_path_buf())
    }

    /// Recursively delete a document folder.
    pub fn delete_document_folder(&self, path: &Path) -> Result<()> {
        self.require_document_folder(path)?;
        self.ops.remove_dir_all(path)?;
        info!(path = %path.display(), "deleted document folder");
        Ok(())
    }

    /// Discover document folders below `root`.
    pub fn find_document_folders(&self, root: &Path, recursive: bool) -> Vec<PathBuf> {
        self.scan_document_folders(root, recursive).folders
    }

    /// Discover document folders below `root`, normalizing each one once.
    ///
    /// Normalization failures are logged and reported; the folder is still
    /// returned with its un-normalized main file.
    pub fn scan_document_folders(&self, root: &Path, recursive: bool) -> FolderScan {
        self.visit_document_folders(root, recursive, |_| ControlFlow::Continue(()))
    }

    /// Like [`scan_document_folders`](Self::scan_document_folders), but hands
    /// each normalized folder to `visit` as soon as it is found.
    ///
    /// Traversal stops once `visit` breaks, and the returned scan is marked
    /// `stopped_early`.
    pub fn visit_document_folders(
        &self,
        root: &Path,
        recursive: bool,
        mut visit: impl FnMut(&Path) -> ControlFlow<()>,
    ) -> FolderScan {
        walk_document_folders(&self.config, &self.ignore, root, recursive, |folder, warnings| {
            if let Err(err) = self.normalize(folder) {
                warn!(path = %folder.display(), error = %err, "normalize failed");
                warnings.push(Warning::new(
                    folder,
                    err.to_string(),
                    WarningKind::NormalizeFailed,
                ));
            }
            visit(folder)
        })
    }

    /// Load metadata for one document folder.
    pub fn load_document_folder(&self, path: &Path) -> Result<DocumentFolder> {
        let main_file = self.require_main_file(path)?;
        let metadata =
            fs::metadata(&main_file).map_err(|e| Error::io("read metadata", &main_file, e))?;
        let timestamps = Timestamps::new(
            metadata.modified().unwrap_or(UNIX_EPOCH),
            metadata.created().ok(),
        );

        let images_dir = path.join(&self.config.images_dir);
        let image_count = self.list_images(path).len();
        let category = path
            .parent()
            .map(folder_name)
            .unwrap_or_default();

        Ok(DocumentFolder {
            path: path.to_path_buf(),
            name: folder_name(path).into(),
            category: category.into(),
            main_file,
            images_dir,
            size: dir_size(path),
            timestamps,
            image_count,
        })
    }

    /// Read the main file's text.
    pub fn read_main_content(&self, path: &Path) -> Result<String> {
        let main_file = self.require_main_file(path)?;
        fs::read_to_string(&main_file).map_err(|e| Error::io("read main file", &main_file, e))
    }

    /// Replace the main file's text.
    pub fn write_main_content(&self, path: &Path, content: &str) -> Result<PathBuf> {
        let main_file = self.require_main_file(path)?;
        self.ops.write(&main_file, content)
    }

    /// Image files in a folder's images subdirectory, sorted by name.
    pub fn list_images(&self, path: &Path) -> Vec<PathBuf> {
        let images_dir = path.join(&self.config.images_dir);
        let Ok(entries) = fs::read_dir(&images_dir) else {
            return Vec::new();
        };
        let mut images: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .map(|e| e.path())
            .filter(|p| is_image(p))
            .collect();
        images.sort();
        images
    }

    /// Immediate subdirectories of the root that are not document folders.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let root = &self.config.root;
        let entries = fs::read_dir(root).map_err(|e| Error::io("list categories", root, e))?;
        let mut categories: Vec<String> = entries
            .flatten()
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .map(|e| e.path())
            .filter(|p| !self.config.should_skip_hidden(&folder_name(p)))
            .filter(|p| !self.is_document_folder(p))
            .map(|p| folder_name(&p))
            .collect();
        categories.sort();
        Ok(categories)
    }

    /// Path of a category directory, if it exists.
    pub fn category_path(&self, category: &str) -> Option<PathBuf> {
        if validate_filename(category).is_err() {
            return None;
        }
        let path = self.config.root.join(category);
        path.is_dir().then_some(path)
    }

    fn require_main_file(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }
        resolve_main_file(&self.config, path).ok_or_else(|| {
            Error::validation(format!("not a document folder: {}", path.display()))
        })
    }

    fn require_document_folder(&self, path: &Path) -> Result<()> {
        self.require_main_file(path).map(|main| {
            debug!(path = %path.display(), main = %main.display(), "validated document folder");
        })
    }
}

/// Total size of all regular files under a directory.
fn dir_size(dir: &Path) -> u64 {
    let mut size = 0u64;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            match entry.file_type() {
                Ok(t) if t.is_dir() => size += dir_size(&path),
                Ok(t) if t.is_file() => {
                    size += entry.metadata().map(|m| m.len()).unwrap_or(0);
                }
                _ => {}
            }
        }
    }
    size
}
