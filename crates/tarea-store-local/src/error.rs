//! Error types for local store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during `LocalStore` operations.
#[derive(Error, Debug)]
pub enum LocalStoreError {
    /// Task was not found in the stored collection.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Note was not found in the stored collection.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// Stored document could not be decoded.
    #[error("Failed to parse {path}: {source}")]
    Decode {
        /// Offending document.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored record rejected the requested change.
    #[error("Invalid change: {0}")]
    Invalid(#[from] tarea_core::CoreError),

    /// Failed to serialize a collection to JSON.
    #[error("Failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to acquire the write lock.
    #[error("Store lock error")]
    LockError,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<tempfile::PersistError> for LocalStoreError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::IoError(err.error)
    }
}

/// Result alias for local store operations.
pub type Result<T> = std::result::Result<T, LocalStoreError>;
