//! scenekeep edit sessions
//!
//! Lets a user enter edit mode on a [`Document`](scenekeep_model::Document),
//! make undoable edits, and either save or discard them back to the
//! pre-edit snapshot.
//!
//! # Architecture
//!
//! ```text
//! SceneSession (controller)
//!     ├── SnapshotStore        pre-edit copy + location
//!     ├── ChangeTracker        dirty flag, diff worker thread
//!     ├── UndoRedoStack        bounded history of UndoEntry closures
//!     ├── EventBus             synchronous listeners
//!     └── Navigator            host router seam
//! ```
//!
//! # Example
//!
//! ```rust
//! use scenekeep_model::Document;
//! use scenekeep_session::{actions, ExitOptions, ExitOutcome, SceneSession};
//!
//! let mut session = SceneSession::with_defaults(Document::new("Ops"));
//! let edit = actions::change_title(session.document(), "Ops (draft)");
//! session.perform(edit).unwrap();
//! assert!(session.is_editing());
//! assert!(session.is_dirty());
//!
//! let outcome = session.exit_edit_mode(ExitOptions::discard());
//! assert_eq!(outcome, ExitOutcome::Exited { restored: true });
//! assert_eq!(session.document().title, "Ops");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod actions;
mod config;
mod controller;
mod error;
mod events;
mod history;
mod navigation;
mod persistence;
mod registry;
mod snapshot;
mod tracker;

pub use config::{DiffMode, DiscardPrompt, SessionConfig};
pub use controller::{ExitOptions, ExitOutcome, Overlay, SceneSession};
pub use error::{ConfigError, PersistenceError, SessionError};
pub use events::{
    ChangeSource, ConfirmOutcome, ConfirmRequest, ConfirmationId, EventBus, Listener, SceneEvent,
    SubscriptionId,
};
pub use history::{EditFn, UndoEntry, UndoRedoStack};
pub use navigation::{strip_edit_params, MemoryNavigator, Navigator, UrlState};
pub use persistence::{DocumentPersistence, SaveOptions, SaveRequest, SaveResult};
pub use registry::{ActiveSessionGuard, SessionId, SessionRegistry};
pub use snapshot::{InitialSnapshot, SnapshotStore};
pub use tracker::{compute_outcome, ChangeTracker, ChangeTrackingMessage, DiffOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
