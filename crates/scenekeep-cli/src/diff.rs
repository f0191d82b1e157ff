//! Document diffing and change rendering

use scenekeep_model::{
    group_by_section, ChangeOptions, ChangesError, DiffOp, Document, DocumentChanges, ModelError,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Changes(#[from] ChangesError),
}

/// Read a document from a JSON file
///
/// # Errors
/// `DiffError::Io` or `DiffError::Parse`
pub fn load_document(path: &Path) -> Result<Document, DiffError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DiffError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DiffError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Compare two documents by their save models
///
/// # Errors
/// `DiffError::Model` if a document cannot be serialized
pub fn diff_documents(
    initial: &Document,
    changed: &Document,
    options: ChangeOptions,
) -> Result<DocumentChanges, DiffError> {
    Ok(DocumentChanges::compute(
        &initial.save_model()?,
        &changed.save_model()?,
        options,
    )?)
}

/// Human-readable change listing, grouped by section
#[must_use]
pub fn render_text(changes: &DocumentChanges) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} change(s){}",
        changes.diff_count,
        if changes.is_new { " (new document)" } else { "" }
    );
    for (flag, label) in [
        (changes.has_time_changes, "time range changed"),
        (changes.has_refresh_change, "refresh changed"),
        (changes.has_variable_value_changes, "variable values changed"),
    ] {
        if flag {
            let _ = writeln!(out, "  note: {label}");
        }
    }

    for (section, entries) in group_by_section(&changes.diffs) {
        let _ = writeln!(out, "[{section}]");
        for entry in entries {
            let _ = match &entry.op {
                DiffOp::Added { value } => writeln!(out, "  + {} = {}", entry.path, value),
                DiffOp::Removed { value } => writeln!(out, "  - {} = {}", entry.path, value),
                DiffOp::Replaced { from, to } => {
                    writeln!(out, "  ~ {}: {} -> {}", entry.path, from, to)
                }
            };
        }
    }
    out
}
