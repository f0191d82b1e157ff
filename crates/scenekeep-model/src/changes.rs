//! Change summary between a baseline and a live save model
//!
//! Time range, auto-refresh, and variable selections change constantly while
//! someone just looks at a dashboard. Unless the caller opts in, those
//! values are copied from the baseline before diffing so they never count
//! as edits, but they are still reported through the `has_*` flags.

use crate::diff::{diff_values, DiffEntry};
use crate::error::ChangesError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Which view-state changes count as edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeOptions {
    pub save_time_range: bool,
    pub save_variables: bool,
    pub save_refresh: bool,
}

/// Result of comparing two save models
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentChanges {
    pub diffs: Vec<DiffEntry>,
    pub diff_count: usize,
    pub has_changes: bool,
    pub has_time_changes: bool,
    pub has_variable_value_changes: bool,
    pub has_refresh_change: bool,
    /// Baseline was never saved
    pub is_new: bool,
}

impl DocumentChanges {
    /// Compare `changed` against `initial`
    ///
    /// # Errors
    /// Returns `ChangesError::NotAnObject` if either model is not a JSON object
    pub fn compute(
        initial: &Value,
        changed: &Value,
        options: ChangeOptions,
    ) -> Result<Self, ChangesError> {
        let initial_map = initial
            .as_object()
            .ok_or(ChangesError::NotAnObject { side: "initial" })?;
        let changed_map = changed
            .as_object()
            .ok_or(ChangesError::NotAnObject { side: "changed" })?;

        let has_time_changes = initial_map.get("time") != changed_map.get("time");
        let has_refresh_change = initial_map.get("refresh") != changed_map.get("refresh");
        let has_variable_value_changes =
            variable_values_differ(initial_map.get("variables"), changed_map.get("variables"));

        let prepared = prepare_save_model(initial, changed, options)?;
        let diffs = diff_values(initial, &prepared);
        let diff_count = diffs.len();

        Ok(Self {
            diffs,
            diff_count,
            has_changes: diff_count > 0,
            has_time_changes,
            has_variable_value_changes,
            has_refresh_change,
            is_new: initial_map.get("uid").map_or(true, Value::is_null),
        })
    }
}

/// The model that would actually be persisted
///
/// Copy of `changed` with every view-state field the options do not opt
/// into reverted to its `initial` value.
///
/// # Errors
/// Returns `ChangesError::NotAnObject` if either model is not a JSON object
pub fn prepare_save_model(
    initial: &Value,
    changed: &Value,
    options: ChangeOptions,
) -> Result<Value, ChangesError> {
    let initial_map = initial
        .as_object()
        .ok_or(ChangesError::NotAnObject { side: "initial" })?;
    let mut prepared = changed.clone();
    let prepared_map = prepared
        .as_object_mut()
        .ok_or(ChangesError::NotAnObject { side: "changed" })?;

    if !options.save_time_range {
        copy_field(initial_map, prepared_map, "time");
    }
    if !options.save_refresh {
        copy_field(initial_map, prepared_map, "refresh");
    }
    if !options.save_variables {
        reset_variable_values(initial_map.get("variables"), prepared_map.get_mut("variables"));
    }
    Ok(prepared)
}

fn copy_field(from: &Map<String, Value>, to: &mut Map<String, Value>, key: &str) {
    match from.get(key) {
        Some(value) => {
            to.insert(key.to_string(), value.clone());
        }
        None => {
            to.remove(key);
        }
    }
}

fn current_values(variables: Option<&Value>) -> BTreeMap<&str, Option<&Value>> {
    variables
        .and_then(Value::as_array)
        .map(|vars| {
            vars.iter()
                .filter_map(|var| Some((var.get("name")?.as_str()?, var.get("current"))))
                .collect()
        })
        .unwrap_or_default()
}

/// Compares selections of variables present on both sides
fn variable_values_differ(initial: Option<&Value>, changed: Option<&Value>) -> bool {
    let initial = current_values(initial);
    current_values(changed)
        .into_iter()
        .any(|(name, current)| initial.get(name).is_some_and(|before| *before != current))
}

fn reset_variable_values(initial: Option<&Value>, changed: Option<&mut Value>) {
    let initial = current_values(initial);
    let Some(vars) = changed.and_then(Value::as_array_mut) else {
        return;
    };

    for var in vars.iter_mut().filter_map(Value::as_object_mut) {
        let Some(name) = var.get("name").and_then(Value::as_str) else {
            continue;
        };
        match initial.get(name) {
            Some(Some(current)) => {
                var.insert("current".to_string(), (*current).clone());
            }
            Some(None) => {
                var.remove("current");
            }
            None => {}
        }
    }
}
