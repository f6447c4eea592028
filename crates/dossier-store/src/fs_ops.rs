//! Mutating filesystem calls, with an optional dry-run mode.
//!
//! Every write the store or the consolidation engine performs goes through
//! [`FsOps`]. In dry-run mode each call is a no-op that logs and returns the
//! path that would have resulted, so callers can preview a whole operation
//! without touching the disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dossier_core::{Error, Result};

/// A recorded filesystem mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FsOperation {
    /// Create a directory (and missing parents).
    CreateDirectory { path: PathBuf },
    /// Write a file.
    WriteFile { path: PathBuf, bytes: u64 },
    /// Copy a file.
    Copy {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Rename a file or directory.
    Rename {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Recursively remove a directory.
    RemoveDirectory { path: PathBuf },
}

impl FsOperation {
    /// Path the operation produces or affects.
    pub fn target(&self) -> &Path {
        match self {
            Self::CreateDirectory { path }
            | Self::WriteFile { path, .. }
            | Self::RemoveDirectory { path } => path,
            Self::Copy { destination, .. } | Self::Rename { destination, .. } => destination,
        }
    }
}

/// Executor for filesystem mutations.
#[derive(Debug, Default)]
pub struct FsOps {
    dry_run: bool,
    journal: Option<Mutex<Vec<FsOperation>>>,
}

impl FsOps {
    /// Execute every operation, recording nothing.
    pub fn live() -> Self {
        Self::default()
    }

    /// Execute (or, when `dry_run`, only record) every operation.
    pub fn recording(dry_run: bool) -> Self {
        Self {
            dry_run,
            journal: Some(Mutex::new(Vec::new())),
        }
    }

    /// Whether mutations are skipped.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Drain the recorded operations.
    pub fn take_journal(&self) -> Vec<FsOperation> {
        self.journal
            .as_ref()
            .map(|j| std::mem::take(&mut *j.lock().unwrap_or_else(|e| e.into_inner())))
            .unwrap_or_default()
    }

    fn record(&self, op: FsOperation) {
        debug!(dry_run = self.dry_run, ?op, "filesystem operation");
        if let Some(journal) = &self.journal {
            journal.lock().unwrap_or_else(|e| e.into_inner()).push(op);
        }
    }

    /// Create a directory and its missing parents.
    pub fn create_dir_all(&self, path: &Path) -> Result<PathBuf> {
        self.record(FsOperation::CreateDirectory {
            path: path.to_path_buf(),
        });
        if !self.dry_run {
            fs::create_dir_all(path).map_err(|e| Error::io("create directory", path, e))?;
        }
        Ok(path.to_path_buf())
    }

    /// Write a file, replacing any existing content.
    pub fn write(&self, path: &Path, contents: &str) -> Result<PathBuf> {
        self.record(FsOperation::WriteFile {
            path: path.to_path_buf(),
            bytes: contents.len() as u64,
        });
        if !self.dry_run {
            fs::write(path, contents).map_err(|e| Error::io("write file", path, e))?;
        }
        Ok(path.to_path_buf())
    }

    /// Copy a file, overwriting the destination.
    pub fn copy(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        self.record(FsOperation::Copy {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
        if !self.dry_run {
            fs::copy(source, destination).map_err(|e| Error::io("copy file", source, e))?;
        }
        Ok(destination.to_path_buf())
    }

    /// Rename a file or directory in one step.
    pub fn rename(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        self.record(FsOperation::Rename {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
        if !self.dry_run {
            fs::rename(source, destination).map_err(|e| Error::io("rename", source, e))?;
        }
        Ok(destination.to_path_buf())
    }

    /// Recursively remove a directory.
    pub fn remove_dir_all(&self, path: &Path) -> Result<PathBuf> {
        self.record(FsOperation::RemoveDirectory {
            path: path.to_path_buf(),
        });
        if !self.dry_run {
            fs::remove_dir_all(path).map_err(|e| Error::io("remove directory", path, e))?;
        }
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let ops = FsOps::recording(true);

        let dir = temp.path().join("new");
        assert_eq!(ops.create_dir_all(&dir).unwrap(), dir);
        ops.write(&dir.join("a.md"), "hello").unwrap();

        assert!(!dir.exists());
        let journal = ops.take_journal();
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[1].target(), dir.join("a.md"));
        assert!(ops.take_journal().is_empty());
    }

    #[test]
    fn test_live_writes() {
        let temp = TempDir::new().unwrap();
        let ops = FsOps::live();

        let dir = temp.path().join("new");
        ops.create_dir_all(&dir).unwrap();
        ops.write(&dir.join("a.md"), "hello").unwrap();
        ops.copy(&dir.join("a.md"), &dir.join("b.md")).unwrap();

        assert_eq!(fs::read_to_string(dir.join("b.md")).unwrap(), "hello");
        assert!(ops.take_journal().is_empty());
    }
}
