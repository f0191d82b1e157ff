//! Persistence seam
//!
//! Storage lives outside the session. A save hands the backend a
//! [`SaveRequest`] and gets back the identifiers storage assigned.

use crate::error::PersistenceError;
use scenekeep_model::ChangeOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What storage assigned on a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub uid: String,
    pub version: u64,
    pub url: String,
    pub slug: String,
    pub id: u64,
}

/// Caller-side save parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Overrides the session's configured change options
    pub change_options: Option<ChangeOptions>,
    /// Target folder; defaults to the document's current folder
    pub folder_uid: Option<String>,
    /// Version history message
    pub message: Option<String>,
}

impl SaveOptions {
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_folder(mut self, folder_uid: impl Into<String>) -> Self {
        self.folder_uid = Some(folder_uid.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_change_options(mut self, options: ChangeOptions) -> Self {
        self.change_options = Some(options);
        self
    }
}

/// Payload handed to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    /// Sanitized save model with unsaved view state reverted
    pub save_model: Value,
    pub folder_uid: Option<String>,
    pub message: Option<String>,
    /// Version the edit started from
    pub base_version: u64,
}

/// Storage backend
#[cfg_attr(test, mockall::automock)]
pub trait DocumentPersistence {
    /// Persist a document
    ///
    /// # Errors
    /// Any [`PersistenceError`]; the session stays unchanged on failure
    fn save_document(&mut self, request: &SaveRequest) -> Result<SaveResult, PersistenceError>;
}
