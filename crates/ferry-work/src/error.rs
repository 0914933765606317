// error.rs — Error types for the work context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or navigating a work context.
#[derive(Debug, Error)]
pub enum WorkError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A checkout-relative path is absolute, not normalized, or escapes the checkout.
    #[error("'{path}' is not a valid path: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    /// An author string is not of the form `Name <email>`.
    #[error("author '{value}' doesn't match the expected format 'Name <email>'")]
    InvalidAuthor { value: String },

    /// Failed to serialize/deserialize change data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl WorkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkError::IoError {
            path: path.into(),
            source,
        }
    }
}
