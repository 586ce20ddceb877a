//! Error types for FASTQ QC
//!
//! Structural defects found by the validator are *data* and end up in
//! [`ValidationResult::errors`](crate::validation::ValidationResult). The
//! variants here are the fatal, per-file failures: the file cannot be
//! reached, cannot be read, or carries nothing a metric can be computed from.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for QC operations
pub type Result<T> = std::result::Result<T, QcError>;

#[derive(Debug, Error)]
pub enum QcError {
    /// Input path does not exist
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Input path exists but may not be read
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure, including reads failing mid-stream
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A calculator saw no bases it could use
    #[error("No valid bases found for {metric} in {}", path.display())]
    NoUsableBases { path: PathBuf, metric: &'static str },

    /// Fast read count requires whole 4-line records
    #[error("Line count {lines} in {} is not divisible by 4", path.display())]
    LineCount { path: PathBuf, lines: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QcError {
    /// Map an `io::Error` raised while touching `path` onto the taxonomy
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => QcError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => QcError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => QcError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// The file's content cannot yield a statistic (ValueError-class)
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, QcError::NoUsableBases { .. } | QcError::LineCount { .. })
    }

    /// The file could not be reached or read
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            QcError::NotFound { .. } | QcError::PermissionDenied { .. } | QcError::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kinds_are_mapped() {
        let path = Path::new("reads.fastq");

        let err = QcError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, QcError::NotFound { .. }));
        assert!(err.is_filesystem());

        let err = QcError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, QcError::PermissionDenied { .. }));

        let err = QcError::from_io(path, io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, QcError::Io { .. }));
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_malformed_input_classification() {
        let err = QcError::LineCount {
            path: PathBuf::from("r1.fastq"),
            lines: 7,
        };
        assert!(err.is_malformed_input());
        assert!(!err.is_filesystem());
        assert_eq!(err.to_string(), "Line count 7 in r1.fastq is not divisible by 4");
    }
}
