//! Error types shared by all dossier operations.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias defaulting to the dossier [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort an operation.
///
/// Per-item failures inside a batch are not errors; they are recorded as
/// [`Warning`]s on the batch report instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A file or folder does not exist.
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// Bad argument, or a path that is not a document folder.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Nothing usable could be extracted from the inputs.
    #[error("Content processing failed: {message}")]
    ContentProcessing { message: String },

    /// A required setting is missing or invalid.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The optional enhancement step did not answer in time.
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// The optional enhancement step failed to reach its service.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Filesystem error with operation context.
    #[error("{operation} failed at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an I/O error with operation and path context.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io {
                operation,
                path,
                source,
            },
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a content processing error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::ContentProcessing {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether an automatic retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }
}

/// Kind of non-fatal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A file could not be read.
    ReadError,
    /// Metadata could not be read.
    MetadataError,
    /// The main file could not be renamed to match its folder.
    NormalizeFailed,
    /// A consolidation source was dropped.
    SkippedSource,
    /// A search pattern did not compile and was searched literally.
    InvalidPattern,
    /// A search category does not exist.
    UnknownCategory,
    /// An image could not be copied.
    ImageCopy,
    /// The optional enhancement step gave up.
    EnhancementFailed,
    /// A resolved category was not a usable directory name.
    CategoryRejected,
}

/// Non-fatal warning collected during a batch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl Warning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a read error warning from any displayable error.
    pub fn read_error(path: impl Into<PathBuf>, error: &dyn std::fmt::Display) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = Error::io(
            "read",
            "/missing/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_io_keeps_operation_context() {
        let err = Error::io(
            "rename",
            "/some/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("rename"));
        assert!(message.contains("/some/path"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(Error::Network { message: "reset".into() }.is_retryable());
        assert!(!Error::validation("bad").is_retryable());
    }

    #[test]
    fn test_warning_read_error() {
        let io = std::io::Error::other("boom");
        let warning = Warning::read_error("/x", &io);
        assert_eq!(warning.kind, WarningKind::ReadError);
        assert!(warning.message.contains("boom"));
    }
}
