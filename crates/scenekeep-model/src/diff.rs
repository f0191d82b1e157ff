//! Structural diff between two save models
//!
//! Not a text diff: objects are compared key by key, arrays index by index,
//! and every difference is reported at the deepest path where it occurs.

use crate::path::DocPath;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// What happened at a path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DiffOp {
    /// Present only in the changed model
    Added { value: Value },

    /// Present only in the initial model
    Removed { value: Value },

    /// Present in both with different values
    Replaced { from: Value, to: Value },
}

/// One difference, addressed by path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: DocPath,
    pub op: DiffOp,
}

impl DiffEntry {
    /// Top-level save-model key the change belongs to (`layout`, `title`, ...)
    #[inline]
    #[must_use]
    pub fn section(&self) -> &str {
        self.path.first().unwrap_or("$")
    }
}

/// Diff two JSON values
///
/// Entries come out in traversal order: object keys sorted, array indices
/// ascending.
#[must_use]
pub fn diff_values(initial: &Value, changed: &Value) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    diff_into(&DocPath::root(), initial, changed, &mut out);
    out
}

fn diff_into(path: &DocPath, initial: &Value, changed: &Value, out: &mut Vec<DiffEntry>) {
    match (initial, changed) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let child = path.child(key.as_str());
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => diff_into(&child, x, y, out),
                    (Some(x), None) => out.push(DiffEntry {
                        path: child,
                        op: DiffOp::Removed { value: x.clone() },
                    }),
                    (None, Some(y)) => out.push(DiffEntry {
                        path: child,
                        op: DiffOp::Added { value: y.clone() },
                    }),
                    (None, None) => {}
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for index in 0..a.len().max(b.len()) {
                let child = path.index(index);
                match (a.get(index), b.get(index)) {
                    (Some(x), Some(y)) => diff_into(&child, x, y, out),
                    (Some(x), None) => out.push(DiffEntry {
                        path: child,
                        op: DiffOp::Removed { value: x.clone() },
                    }),
                    (None, Some(y)) => out.push(DiffEntry {
                        path: child,
                        op: DiffOp::Added { value: y.clone() },
                    }),
                    (None, None) => {}
                }
            }
        }
        (a, b) if a == b => {}
        (a, b) => out.push(DiffEntry {
            path: path.clone(),
            op: DiffOp::Replaced {
                from: a.clone(),
                to: b.clone(),
            },
        }),
    }
}

/// Group entries by top-level section
#[must_use]
pub fn group_by_section(diffs: &[DiffEntry]) -> BTreeMap<&str, Vec<&DiffEntry>> {
    let mut groups: BTreeMap<&str, Vec<&DiffEntry>> = BTreeMap::new();
    for entry in diffs {
        groups.entry(entry.section()).or_default().push(entry);
    }
    groups
}
