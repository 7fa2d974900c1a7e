//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the strict `try_*` storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The intent registry is not valid YAML.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// Registry file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_yaml::Error,
    },
    /// A ledger line is not a valid entry.
    #[error("invalid ledger line {line} in {path}: {source}")]
    Ledger {
        /// Ledger file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// An entry could not be serialized.
    #[error("failed to serialize trace entry: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A regex built from an intent ID failed to compile.
    #[error("invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a missing-file error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
