//! Error types and Result aliases for vaultindex.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using vaultindex's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vaultindex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Index document error.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// File watching error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures raised while reading or patching index documents.
///
/// Every variant is caught at the per-folder or per-event boundary, logged,
/// and swallowed. None of them aborts a rebuild.
#[derive(Error, Debug)]
pub enum IndexError {
    /// An expected index document (or other vault entry) is missing.
    #[error("document not found: '{path}'")]
    DocumentNotFound { path: String },

    /// The underlying vault failed to read or write.
    #[error("read/write failure on '{path}': {reason}")]
    ReadWrite { path: String, reason: String },

    /// A rename whose previous location can no longer be resolved.
    #[error("cannot resolve rename from '{from}' to '{to}'")]
    StructuralAmbiguity { from: String, to: String },
}

/// File watcher errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to watch path.
    #[error("failed to watch path '{path}': {reason}")]
    WatchFailed { path: String, reason: String },

    /// The event channel was closed.
    #[error("event channel closed")]
    Channel,
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IndexError {
    /// Create a not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::DocumentNotFound { path: path.into() }
    }

    /// Create a read/write error.
    pub fn read_write(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::ReadWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means the target document does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound { .. })
    }
}
