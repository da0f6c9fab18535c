//! # Hook Preferences Errors
//!
//! Error types surfaced by the hook preferences store.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields on every variant so messages stay readable in logs
//!
//! Normalization problems (non-boolean values, unknown keys) never appear
//! here: they are recovered where they happen.

use thiserror::Error;

/// Errors returned by store, gateway, notifier and codec operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the key-value domain failed. Terminal for the call.
    #[error("Storage backend {backend} unavailable: {reason}")]
    StorageUnavailable { backend: String, reason: String },

    /// An import document was not a JSON object of the expected shape.
    #[error("Failed to parse configuration document: {reason}")]
    ParseError { reason: String },

    /// A file for export or import could not be created, written or read.
    #[error("I/O error on {path}: {reason}")]
    IoError { path: String, reason: String },

    /// A change subscription could not be established.
    #[error("Change notifier unavailable: {reason}")]
    NotifierUnavailable { reason: String },

    /// Store settings failed validation.
    #[error("Invalid store settings: {reason}")]
    InvalidSettings { reason: String },
}

impl StoreError {
    pub fn storage(backend: impl Into<String>, reason: impl ToString) -> Self {
        Self::StorageUnavailable {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(reason: impl ToString) -> Self {
        Self::ParseError {
            reason: reason.to_string(),
        }
    }

    pub fn io(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure came from the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}
