//! Error types for the content store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing stored objects.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object under this digest and name.
    #[error("Object not found: {digest}/{filename}")]
    NotFound { digest: String, filename: String },

    /// Filename cannot be used as a single path segment.
    #[error("Invalid object name: {0:?}")]
    InvalidName(String),

    /// Failed to create a digest directory.
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an object.
    #[error("Failed to write file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a file into the store.
    #[error("Failed to move file from {from} to {destination}: {error}")]
    MoveFailed {
        from: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(digest: &str, filename: &str) -> Self {
        Self::NotFound {
            digest: digest.to_string(),
            filename: filename.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
