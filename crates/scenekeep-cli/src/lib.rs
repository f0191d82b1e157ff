//! Library half of the `scenekeep` binary
//!
//! - [`script`]: replay JSON edit scripts through an edit session
//! - [`diff`]: compare two documents and render the changes
//! - [`logging`]: tracing subscriber setup

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod diff;
pub mod logging;
pub mod script;

pub use diff::{diff_documents, load_document, render_text, DiffError};
pub use logging::{init_logging, LogFormat};
pub use script::{load_script, run_script, ReplayReport, Script, ScriptError, ScriptStep};
