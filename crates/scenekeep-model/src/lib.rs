//! scenekeep document model
//!
//! Owned, serializable document trees plus the tooling the edit session
//! needs to reason about them.
//!
//! # Core Concepts
//!
//! - [`Document`]: the editable dashboard state tree (value type, deep `Clone`)
//! - [`LayoutNode`] / [`ElementRef`]: closed set of layout element kinds
//! - [`sanitize`]: turns a serialized document into plain, thread-safe data
//! - [`diff_values`] / [`DocumentChanges`]: structural comparison of save models
//! - [`ContentHash`]: Blake3 fingerprint of a save model
//!
//! # Example
//!
//! ```rust
//! use scenekeep_model::{ChangeOptions, Document, DocumentChanges};
//!
//! let before = Document::new("Ops");
//! let mut after = before.clone();
//! after.title = "Ops (v2)".to_string();
//!
//! let changes = DocumentChanges::compute(
//!     &before.save_model().unwrap(),
//!     &after.save_model().unwrap(),
//!     ChangeOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(changes.diff_count, 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod changes;
mod diff;
mod document;
mod error;
mod hash;
mod layout;
mod path;
mod sanitize;

pub use changes::{prepare_save_model, ChangeOptions, DocumentChanges};
pub use diff::{diff_values, group_by_section, DiffEntry, DiffOp};
pub use document::{
    Document, DocumentLink, DocumentMeta, TimeRange, Variable, VariableKind, VariableValue,
};
pub use error::{ChangesError, ModelError};
pub use hash::{ContentHash, HashError};
pub use layout::{
    ElementKey, ElementKind, ElementRef, GridItem, GridRow, LayoutNode, RemovedElement,
    RemovedNode, VizPanel,
};
pub use path::{DocPath, PathError};
pub use sanitize::{is_transient_key, sanitize, TRANSIENT_PREFIXES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
