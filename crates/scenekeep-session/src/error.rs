//! Error types for the edit session
//!
//! Only operations with a caller who can act on the failure return these:
//! saving, selecting, performing edits, loading configuration. Invariant
//! violations inside the session (discarding without a snapshot, a broken
//! diff worker) are logged and absorbed so the session stays usable.

use scenekeep_model::{ChangesError, ElementKey, ModelError};
use std::path::PathBuf;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Document is marked read-only
    #[error("document is not editable")]
    ReadOnly,

    /// Element referenced by an operation does not exist
    #[error("element not found: {0}")]
    ElementNotFound(ElementKey),

    /// Document model rejected an operation
    #[error("document error: {0}")]
    Model(#[from] ModelError),

    /// Save model could not be prepared
    #[error("change computation failed: {0}")]
    Changes(#[from] ChangesError),

    /// Persistence collaborator rejected the save
    #[error("save failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Whether the user can retry without changing anything
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence(PersistenceError::Network(_) | PersistenceError::Timeout { .. })
        )
    }
}

/// Errors reported by a persistence backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Backend did not answer in time
    #[error("save timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Someone else saved a newer version first
    #[error("version conflict: saving version {attempted}, stored version is {stored}")]
    VersionConflict { attempted: u64, stored: u64 },

    /// Caller may not write to this document or folder
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Backend rejected the payload
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parsed but semantically invalid
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
