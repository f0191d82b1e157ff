//! Edit-script replay
//!
//! A script is a JSON file with an optional starting document and a list
//! of steps:
//!
//! ```json
//! {
//!   "document": { "title": "Ops" },
//!   "steps": [
//!     { "op": "setTitle", "title": "Ops v2" },
//!     { "op": "undo" },
//!     { "op": "exit", "skipConfirm": true }
//!   ]
//! }
//! ```
//!
//! Steps drive a [`SceneSession`] exactly as a UI would; the resulting
//! [`ReplayReport`] records what each step did and every event published.

use parking_lot::Mutex;
use scenekeep_model::{Document, DocumentChanges, ElementKey, GridItem, TimeRange, VizPanel};
use scenekeep_session::{
    actions, ConfirmOutcome, DocumentPersistence, ExitOptions, ExitOutcome, MemoryNavigator,
    PersistenceError, SaveOptions, SaveRequest, SaveResult, SceneSession, SessionConfig,
    SessionError, UrlState,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Script file contents
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub document: Option<Document>,
    /// Location the session starts at
    #[serde(default)]
    pub url: Option<String>,
    pub steps: Vec<ScriptStep>,
}

fn default_plugin() -> String {
    "timeseries".to_string()
}

/// One user action
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScriptStep {
    Enter,
    SetTitle {
        title: String,
    },
    SetDescription {
        description: String,
    },
    SetTimeRange {
        from: String,
        to: String,
    },
    SetPanelTitle {
        key: String,
        title: String,
    },
    AddPanel {
        key: String,
        title: String,
        #[serde(default = "default_plugin")]
        plugin_id: String,
        #[serde(default)]
        row: Option<String>,
        #[serde(default)]
        index: Option<usize>,
    },
    RemoveElement {
        key: String,
    },
    Select {
        key: String,
    },
    Undo,
    Redo,
    MarkDirty,
    MoveToFolder {
        folder_uid: Option<String>,
    },
    RestoreVersion {
        document: Document,
    },
    Exit {
        #[serde(default)]
        skip_confirm: bool,
        #[serde(default)]
        restore: bool,
    },
    /// Answer the pending discard confirmation
    Confirm {
        #[serde(default)]
        cancel: bool,
    },
    Save {
        #[serde(default)]
        message: Option<String>,
        /// Make the backend reject this save with the given reason
        #[serde(default)]
        fail: Option<String>,
    },
}

impl ScriptStep {
    /// Name as written in the script
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::SetTitle { .. } => "setTitle",
            Self::SetDescription { .. } => "setDescription",
            Self::SetTimeRange { .. } => "setTimeRange",
            Self::SetPanelTitle { .. } => "setPanelTitle",
            Self::AddPanel { .. } => "addPanel",
            Self::RemoveElement { .. } => "removeElement",
            Self::Select { .. } => "select",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::MarkDirty => "markDirty",
            Self::MoveToFolder { .. } => "moveToFolder",
            Self::RestoreVersion { .. } => "restoreVersion",
            Self::Exit { .. } => "exit",
            Self::Confirm { .. } => "confirm",
            Self::Save { .. } => "save",
        }
    }
}

/// Script loading and replay errors
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("cannot read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("step {index} ({op}) failed: {source}")]
    Step {
        index: usize,
        op: &'static str,
        #[source]
        source: SessionError,
    },

    #[error("step {index}: no confirmation is pending")]
    NoPendingConfirmation { index: usize },
}

/// What one step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub op: &'static str,
    pub outcome: String,
}

/// Result of a replay
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    pub events: Vec<String>,
    pub is_editing: bool,
    pub is_dirty: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub changes: Option<DocumentChanges>,
    pub document: Document,
}

/// Read and parse a script file
///
/// # Errors
/// `ScriptError::Io` or `ScriptError::Parse`
pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// In-process storage backing `save` steps
#[derive(Debug, Default)]
struct ScriptPersistence {
    saves: u64,
    fail_next: Option<String>,
}

impl DocumentPersistence for ScriptPersistence {
    fn save_document(&mut self, request: &SaveRequest) -> Result<SaveResult, PersistenceError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(PersistenceError::Rejected(reason));
        }
        self.saves += 1;

        let title = request
            .save_model
            .get("title")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("dashboard");
        let slug = slugify(title);
        let uid = request
            .save_model
            .get("uid")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("{slug}-{}", self.saves), str::to_string);

        Ok(SaveResult {
            url: format!("/d/{uid}/{slug}"),
            slug,
            uid,
            version: request.base_version + 1,
            id: self.saves,
        })
    }
}

fn slugify(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "dashboard".to_string()
    } else {
        slug
    }
}

/// Replay `script` through a fresh session
///
/// # Errors
/// Stops at the first failing step with `ScriptError::Step` or
/// `ScriptError::NoPendingConfirmation`
pub fn run_script(script: Script, config: SessionConfig) -> Result<ReplayReport, ScriptError> {
    let start = script.url.as_deref().map(UrlState::parse).unwrap_or_default();
    let document = script.document.unwrap_or_default();
    let mut session = SceneSession::new(document, Box::new(MemoryNavigator::new(start)), config);

    let events = Arc::new(Mutex::new(Vec::new()));
    {
        let events = Arc::clone(&events);
        session.subscribe(move |event| events.lock().push(event.name().to_string()));
    }

    let mut persistence = ScriptPersistence::default();
    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.into_iter().enumerate() {
        let op = step.op();
        tracing::debug!("Step {}: {}", index, op);
        let outcome = apply_step(&mut session, &mut persistence, step, index)?;
        steps.push(StepRecord { index, op, outcome });
    }

    if !session.flush_changes(FLUSH_TIMEOUT) {
        tracing::warn!("Diff worker did not catch up; change summary may be stale");
    }
    let changes = if session.is_editing() {
        session.latest_changes()
    } else {
        None
    };
    let events = events.lock().clone();

    Ok(ReplayReport {
        steps,
        events,
        is_editing: session.is_editing(),
        is_dirty: session.is_dirty(),
        undo_depth: session.history().undo_len(),
        redo_depth: session.history().redo_len(),
        changes,
        document: session.document().clone(),
    })
}

fn apply_step(
    session: &mut SceneSession,
    persistence: &mut ScriptPersistence,
    step: ScriptStep,
    index: usize,
) -> Result<String, ScriptError> {
    let op = step.op();
    let fail = |source: SessionError| ScriptError::Step { index, op, source };

    let outcome = match step {
        ScriptStep::Enter => {
            session.enter_edit_mode();
            "editing".to_string()
        }
        ScriptStep::SetTitle { title } => {
            let entry = actions::change_title(session.document(), title);
            session.perform(entry).map_err(fail)?;
            "applied".to_string()
        }
        ScriptStep::SetDescription { description } => {
            let entry = actions::change_description(session.document(), description);
            session.perform(entry).map_err(fail)?;
            "applied".to_string()
        }
        ScriptStep::SetTimeRange { from, to } => {
            let entry = actions::set_time_range(session.document(), TimeRange { from, to });
            session.perform(entry).map_err(fail)?;
            "applied".to_string()
        }
        ScriptStep::SetPanelTitle { key, title } => {
            let entry = actions::set_panel_title(session.document(), &ElementKey::new(key), title)
                .map_err(fail)?;
            session.perform(entry).map_err(fail)?;
            "applied".to_string()
        }
        ScriptStep::AddPanel {
            key,
            title,
            plugin_id,
            row,
            index: position,
        } => {
            let item = GridItem::for_panel(VizPanel::new(key, title, plugin_id), 0, 0, 12, 8);
            let entry = actions::add_item(
                session.document(),
                row.map(ElementKey::new),
                position.unwrap_or(usize::MAX),
                item,
            )
            .map_err(fail)?;
            session.perform(entry).map_err(fail)?;
            "applied".to_string()
        }
        ScriptStep::RemoveElement { key } => {
            let entry =
                actions::remove_element(session.document(), &ElementKey::new(key)).map_err(fail)?;
            session.perform(entry).map_err(fail)?;
            "applied".to_string()
        }
        ScriptStep::Select { key } => {
            session.select(ElementKey::new(key)).map_err(fail)?;
            "selected".to_string()
        }
        ScriptStep::Undo => applied_or_empty(session.undo()),
        ScriptStep::Redo => applied_or_empty(session.redo()),
        ScriptStep::MarkDirty => {
            session.mark_dirty();
            "dirty".to_string()
        }
        ScriptStep::MoveToFolder { folder_uid } => {
            session.move_to_folder(folder_uid);
            "moved".to_string()
        }
        ScriptStep::RestoreVersion { document } => {
            session.restore_version(document).map_err(fail)?;
            "restored".to_string()
        }
        ScriptStep::Exit {
            skip_confirm,
            restore,
        } => describe_exit(session.exit_edit_mode(ExitOptions {
            skip_confirm,
            restore_initial_state: restore,
        })),
        ScriptStep::Confirm { cancel } => {
            let id = session
                .pending_confirmation()
                .map(|request| request.id)
                .ok_or(ScriptError::NoPendingConfirmation { index })?;
            let answer = if cancel {
                ConfirmOutcome::Cancelled
            } else {
                ConfirmOutcome::Confirmed
            };
            describe_exit(session.resolve_confirmation(id, answer))
        }
        ScriptStep::Save { message, fail: reject } => {
            persistence.fail_next = reject;
            let options = SaveOptions {
                message,
                ..SaveOptions::default()
            };
            match session.save(persistence, options) {
                Ok(result) => format!("saved {} v{}", result.uid, result.version),
                // a rejected save is an expected outcome, not a script error
                Err(SessionError::Persistence(err)) => format!("save failed: {err}"),
                Err(err) => return Err(fail(err)),
            }
        }
    };
    Ok(outcome)
}

fn applied_or_empty(applied: bool) -> String {
    let outcome = if applied { "applied" } else { "nothing to do" };
    outcome.to_string()
}

fn describe_exit(outcome: ExitOutcome) -> String {
    match outcome {
        ExitOutcome::Exited { restored: true } => "exited (discarded)".to_string(),
        ExitOutcome::Exited { restored: false } => "exited".to_string(),
        ExitOutcome::ConfirmationRequested(id) => format!("awaiting {id}"),
        ExitOutcome::Cancelled => "cancelled".to_string(),
        ExitOutcome::NothingToDiscard => "nothing to discard".to_string(),
        ExitOutcome::UnknownConfirmation => "unknown confirmation".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Script {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_steps() {
        let script = parse(
            r#"{"steps": [
                {"op": "addPanel", "key": "p1", "title": "CPU", "row": "r1"},
                {"op": "exit", "skipConfirm": true},
                {"op": "moveToFolder", "folderUid": "f1"}
            ]}"#,
        );
        assert!(matches!(
            &script.steps[0],
            ScriptStep::AddPanel { plugin_id, row: Some(row), index: None, .. }
                if plugin_id == "timeseries" && row == "r1"
        ));
        assert!(matches!(
            script.steps[1],
            ScriptStep::Exit { skip_confirm: true, restore: false }
        ));
        assert_eq!(script.steps[2].op(), "moveToFolder");
    }

    #[test]
    fn rejects_unknown_op() {
        let result: Result<Script, _> = serde_json::from_str(r#"{"steps": [{"op": "fly"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Service Overview!"), "service-overview");
        assert_eq!(slugify("!!!"), "dashboard");
    }

    #[test]
    fn confirm_without_request_fails() {
        let script = parse(r#"{"steps": [{"op": "confirm"}]}"#);
        let err = run_script(script, SessionConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::NoPendingConfirmation { index: 0 }));
    }
}
