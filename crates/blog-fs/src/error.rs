//! Error types for blog-fs

use std::path::PathBuf;

/// Result type for blog-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blog-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("Unsafe path {path:?}: {reason}")]
    UnsafePath { path: String, reason: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unsafe_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsafePath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a sanitization failure rather than an I/O problem.
    pub fn is_path_rejection(&self) -> bool {
        matches!(self, Self::InvalidPath { .. } | Self::UnsafePath { .. })
    }
}
