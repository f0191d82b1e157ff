//! Error types for the document model

use crate::layout::ElementKey;

/// Errors raised by document and layout operations
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No element with this key exists in the layout
    #[error("element not found: {0}")]
    ElementNotFound(ElementKey),

    /// An element with this key is already present
    #[error("duplicate element key: {0}")]
    DuplicateKey(ElementKey),

    /// Operation does not apply to this element
    #[error("invalid target '{key}': {reason}")]
    InvalidTarget { key: ElementKey, reason: String },

    /// Document could not be converted to or from JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while summarizing changes between two save models
#[derive(Debug, thiserror::Error)]
pub enum ChangesError {
    /// Save models must be JSON objects
    #[error("{side} save model is not an object")]
    NotAnObject { side: &'static str },
}
