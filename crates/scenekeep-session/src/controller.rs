//! Edit session controller
//!
//! [`SceneSession`] owns the live document and moves it between view and
//! edit mode:
//!
//! ```text
//!   View ──enter_edit_mode / perform──▶ Editing
//!   Editing ──exit_edit_mode (clean or skip_confirm)──▶ View
//!   Editing ──exit_edit_mode (dirty)──▶ AwaitingConfirmation
//!   AwaitingConfirmation ──Confirmed──▶ View (restored)
//!   AwaitingConfirmation ──Cancelled──▶ Editing
//!   Editing ──save──▶ Editing (re-baselined, clean)
//! ```
//!
//! Entering edit mode snapshots the document and the current location.
//! Exiting either keeps the edits or restores the snapshot.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::{
    ChangeSource, ConfirmOutcome, ConfirmRequest, ConfirmationId, EventBus, SceneEvent,
    SubscriptionId,
};
use crate::history::{UndoEntry, UndoRedoStack};
use crate::navigation::{strip_edit_params, MemoryNavigator, Navigator, UrlState};
use crate::persistence::{DocumentPersistence, SaveOptions, SaveRequest, SaveResult};
use crate::registry::{ActiveSessionGuard, SessionId, SessionRegistry};
use crate::snapshot::{InitialSnapshot, SnapshotStore};
use crate::tracker::ChangeTracker;
use chrono::Utc;
use scenekeep_model::{prepare_save_model, Document, DocumentChanges, ElementKey};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Modal surface shown over the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    SaveDrawer,
    ShareDrawer,
    Settings,
    Modal(String),
}

/// How to leave edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitOptions {
    /// Do not ask before throwing away unsaved changes
    pub skip_confirm: bool,
    /// Restore the snapshot even if nothing is dirty
    pub restore_initial_state: bool,
}

impl ExitOptions {
    /// Throw away edits without asking
    #[must_use]
    pub fn discard() -> Self {
        Self {
            skip_confirm: true,
            restore_initial_state: true,
        }
    }
}

/// Result of an exit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Back in view mode
    Exited { restored: bool },
    /// Waiting for [`SceneSession::resolve_confirmation`]
    ConfirmationRequested(ConfirmationId),
    /// User kept editing
    Cancelled,
    /// No snapshot to go back to; nothing changed
    NothingToDiscard,
    /// Answer did not match the pending request; ignored
    UnknownConfirmation,
}

/// One document's edit session
pub struct SceneSession {
    id: SessionId,
    config: SessionConfig,
    document: Document,
    is_editing: bool,
    selection: Option<ElementKey>,
    overlay: Option<Overlay>,
    snapshots: SnapshotStore,
    tracker: ChangeTracker,
    history: UndoRedoStack,
    bus: EventBus,
    navigator: Box<dyn Navigator>,
    pending_confirmation: Option<ConfirmRequest>,
    next_confirmation: u64,
}

impl SceneSession {
    /// Open a session in view mode
    #[must_use]
    pub fn new(document: Document, navigator: Box<dyn Navigator>, config: SessionConfig) -> Self {
        let id = SessionId::new();
        tracing::info!("Opened session {} for '{}'", id, document.title);

        Self {
            id,
            tracker: ChangeTracker::new(config.diff_mode, config.change_options),
            history: UndoRedoStack::new(config.max_undo_entries),
            config,
            document,
            is_editing: false,
            selection: None,
            overlay: None,
            snapshots: SnapshotStore::new(),
            bus: EventBus::new(),
            navigator,
            pending_confirmation: None,
            next_confirmation: 0,
        }
    }

    /// Session with default configuration and an in-memory navigator
    #[must_use]
    pub fn with_defaults(document: Document) -> Self {
        Self::new(
            document,
            Box::new(MemoryNavigator::default()),
            SessionConfig::default(),
        )
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// Whether there is a snapshot to go back to
    #[inline]
    #[must_use]
    pub fn can_discard(&self) -> bool {
        self.snapshots.has_snapshot()
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &UndoRedoStack {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn selection(&self) -> Option<&ElementKey> {
        self.selection.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn initial_snapshot(&self) -> Option<&InitialSnapshot> {
        self.snapshots.get()
    }

    /// Location captured when edit mode was entered
    #[must_use]
    pub fn initial_url_state(&self) -> Option<&UrlState> {
        self.snapshots.get().and_then(|snapshot| snapshot.url.as_ref())
    }

    #[inline]
    #[must_use]
    pub fn pending_confirmation(&self) -> Option<&ConfirmRequest> {
        self.pending_confirmation.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Latest change summary against the edit baseline
    pub fn latest_changes(&self) -> Option<DocumentChanges> {
        self.tracker.poll()
    }

    /// Wait for pending diffs; see [`ChangeTracker::flush`]
    pub fn flush_changes(&self, timeout: Duration) -> bool {
        self.tracker.flush(timeout)
    }

    /// Observe session events
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent<'_>) + Send + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Make this session the active one in `registry`
    pub fn activate<'r>(&self, registry: &'r SessionRegistry) -> ActiveSessionGuard<'r> {
        registry.activate(self.id)
    }

    /// Select an element
    ///
    /// # Errors
    /// Returns `SessionError::ElementNotFound` if no element has `key`
    pub fn select(&mut self, key: ElementKey) -> Result<(), SessionError> {
        if !self.document.contains_key(&key) {
            return Err(SessionError::ElementNotFound(key));
        }
        self.selection = Some(key);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn show_overlay(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Snapshot the document and start tracking changes
    ///
    /// Already editing: nothing happens, the existing snapshot stays.
    pub fn enter_edit_mode(&mut self) {
        if self.is_editing {
            tracing::debug!("Session {} already editing; keeping snapshot", self.id);
            return;
        }

        let location = self.navigator.location();
        self.snapshots.save(&self.document, Some(location));
        // dirtiness is measured against the snapshot just taken
        self.tracker.set_dirty(false);
        match self.document.save_model() {
            Ok(model) => self.tracker.set_baseline(model),
            Err(err) => {
                tracing::warn!("No diff baseline for '{}': {}", self.document.title, err);
                self.tracker.clear_baseline();
            }
        }

        self.is_editing = true;
        self.tracker.set_editing(true);
        self.bus.publish(&SceneEvent::EditModeChanged { is_editing: true });
        self.tracker.start_tracking_changes(&mut self.bus);
        tracing::info!("Session {} entered edit mode", self.id);
    }

    /// Apply an edit and record it for undo
    ///
    /// Enters edit mode first if needed.
    ///
    /// # Errors
    /// Returns `SessionError::ReadOnly` if the document is not editable
    pub fn perform(&mut self, mut entry: UndoEntry) -> Result<(), SessionError> {
        if !self.document.editable {
            return Err(SessionError::ReadOnly);
        }
        if !self.is_editing {
            self.enter_edit_mode();
        }

        entry.apply_redo(&mut self.document);
        tracing::debug!("Performed '{}'", entry.description());
        self.bus.publish(&SceneEvent::StateChanged {
            document: &self.document,
            source: ChangeSource::User,
            description: Some(entry.description()),
        });
        self.history.push_action(entry);
        Ok(())
    }

    /// Revert the last edit; false if there was nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(description) = self.history.undo_action(&mut self.document) else {
            return false;
        };
        self.bus.publish(&SceneEvent::StateChanged {
            document: &self.document,
            source: ChangeSource::User,
            description: Some(description.as_str()),
        });
        if !self.history.can_undo() {
            self.selection = None;
        }
        true
    }

    /// Re-apply the last undone edit; false if there was nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(description) = self.history.redo_action(&mut self.document) else {
            return false;
        };
        self.bus.publish(&SceneEvent::StateChanged {
            document: &self.document,
            source: ChangeSource::User,
            description: Some(description.as_str()),
        });
        true
    }

    /// Flag unsaved changes that did not go through the history
    ///
    /// Enters edit mode first if needed.
    pub fn mark_dirty(&mut self) {
        if !self.is_editing {
            self.enter_edit_mode();
        }
        self.tracker.set_dirty(true);
    }

    /// Move to another folder; takes effect on the next save
    ///
    /// Enters edit mode first if needed, so discarding restores the old folder.
    pub fn move_to_folder(&mut self, folder_uid: Option<String>) {
        if !self.is_editing {
            self.enter_edit_mode();
        }
        tracing::debug!("Moving '{}' to folder {:?}", self.document.title, folder_uid);
        self.document.meta.folder_uid = folder_uid;
        self.tracker.set_dirty(true);
    }

    /// Change the document without counting it as a user edit
    pub fn apply_system_update<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Document),
    {
        update(&mut self.document);
        self.bus.publish(&SceneEvent::StateChanged {
            document: &self.document,
            source: ChangeSource::System,
            description: None,
        });
    }

    /// Replace the content with an older version, keeping identity and
    /// storage metadata; the result is unsaved
    ///
    /// # Errors
    /// Returns `SessionError::ReadOnly` if the document is not editable
    pub fn restore_version(&mut self, version: Document) -> Result<(), SessionError> {
        if !self.document.editable {
            return Err(SessionError::ReadOnly);
        }
        if !self.is_editing {
            self.enter_edit_mode();
        }

        let restored_from = version.version;
        let mut restored = version;
        restored.uid.clone_from(&self.document.uid);
        restored.version = self.document.version;
        restored.meta = std::mem::take(&mut self.document.meta);
        self.document = restored;

        self.history.clear();
        self.selection = None;
        self.bus.publish(&SceneEvent::StateChanged {
            document: &self.document,
            source: ChangeSource::User,
            description: Some("Restore version"),
        });
        self.tracker.set_dirty(true);
        tracing::info!("Restored '{}' from version {}", self.document.title, restored_from);
        Ok(())
    }

    /// Leave edit mode
    ///
    /// Unsaved changes are discarded; unless `skip_confirm` is set they are
    /// only discarded after a [`ConfirmOutcome::Confirmed`] answer.
    pub fn exit_edit_mode(&mut self, options: ExitOptions) -> ExitOutcome {
        if !self.can_discard() {
            tracing::error!("Trying to discard back to a state that does not exist");
            return ExitOutcome::NothingToDiscard;
        }

        let dirty = self.is_dirty();
        if dirty && !options.skip_confirm {
            self.next_confirmation += 1;
            let prompt = &self.config.discard_prompt;
            let request = ConfirmRequest {
                id: ConfirmationId::new(self.next_confirmation),
                title: prompt.title.clone(),
                text: prompt.text.clone(),
                yes_text: prompt.yes_text.clone(),
            };
            let id = request.id;
            self.bus.publish(&SceneEvent::ConfirmDiscard(&request));
            self.pending_confirmation = Some(request);
            tracing::debug!("Waiting for {} before discarding", id);
            return ExitOutcome::ConfirmationRequested(id);
        }

        let restored = self.exit_edit_mode_confirmed(options.restore_initial_state || dirty);
        ExitOutcome::Exited { restored }
    }

    /// Answer a pending discard confirmation
    pub fn resolve_confirmation(&mut self, id: ConfirmationId, outcome: ConfirmOutcome) -> ExitOutcome {
        match self.pending_confirmation.take() {
            Some(request) if request.id == id => match outcome {
                ConfirmOutcome::Confirmed => ExitOutcome::Exited {
                    restored: self.exit_edit_mode_confirmed(true),
                },
                ConfirmOutcome::Cancelled => {
                    tracing::debug!("Discard cancelled; still editing");
                    ExitOutcome::Cancelled
                }
            },
            pending => {
                self.pending_confirmation = pending;
                tracing::warn!("Ignoring answer to unknown confirmation {}", id);
                ExitOutcome::UnknownConfirmation
            }
        }
    }

    fn exit_edit_mode_confirmed(&mut self, restore: bool) -> bool {
        self.tracker.stop_tracking_changes(&mut self.bus);

        let snapshot = self.snapshots.take();
        let location = snapshot
            .as_ref()
            .and_then(|s| s.url.clone())
            .unwrap_or_else(|| self.navigator.location());
        self.navigator.replace(strip_edit_params(
            &location,
            &self.config.edit_only_query_params,
        ));

        let restored = match snapshot {
            Some(snapshot) if restore => {
                self.document = snapshot.document;
                self.tracker.set_dirty(false);
                self.bus.publish(&SceneEvent::StateChanged {
                    document: &self.document,
                    source: ChangeSource::System,
                    description: None,
                });
                true
            }
            _ => false,
        };

        self.is_editing = false;
        self.tracker.set_editing(false);
        self.tracker.clear_baseline();
        self.selection = None;
        self.overlay = None;
        self.pending_confirmation = None;
        self.history.clear();

        self.bus.publish(&SceneEvent::EditModeChanged { is_editing: false });
        if restored {
            self.bus.publish(&SceneEvent::Discarded);
        }
        tracing::info!(
            "Session {} left edit mode ({})",
            self.id,
            if restored { "discarded" } else { "kept" }
        );
        restored
    }

    /// Persist the document
    ///
    /// View-state changes the options do not opt into are saved with their
    /// baseline values. On failure the session is left untouched.
    ///
    /// # Errors
    /// - `SessionError::Model` / `Changes` if the save model cannot be built
    /// - `SessionError::Persistence` if the backend rejects the save
    pub fn save(
        &mut self,
        persistence: &mut dyn DocumentPersistence,
        options: SaveOptions,
    ) -> Result<SaveResult, SessionError> {
        let change_options = options.change_options.unwrap_or(self.config.change_options);
        let live = self.document.save_model()?;
        let save_model = match self.tracker.baseline() {
            Some(initial) => prepare_save_model(&initial, &live, change_options)?,
            None => live,
        };

        let request = SaveRequest {
            save_model,
            folder_uid: options
                .folder_uid
                .or_else(|| self.document.meta.folder_uid.clone()),
            message: options.message,
            base_version: self.document.version,
        };
        tracing::info!(
            "Saving '{}' from version {}",
            self.document.title,
            request.base_version
        );

        match persistence.save_document(&request) {
            Ok(result) => {
                let SaveRequest {
                    save_model,
                    folder_uid,
                    ..
                } = request;
                self.save_completed(save_model, result.clone(), folder_uid);
                Ok(result)
            }
            Err(err) => {
                tracing::error!("Saving '{}' failed: {}", self.document.title, err);
                let reason = err.to_string();
                self.bus.publish(&SceneEvent::SaveFailed { reason: &reason });
                Err(err.into())
            }
        }
    }

    /// Adopt the identifiers storage assigned and re-baseline on what was
    /// saved; editing continues
    ///
    /// The tracker keeps its bus subscription; re-baselining makes any diff
    /// still in flight stale.
    pub fn save_completed(
        &mut self,
        saved_model: Value,
        result: SaveResult,
        folder_uid: Option<String>,
    ) {
        self.document.uid = Some(result.uid.clone());
        self.document.version = result.version;
        let meta = &mut self.document.meta;
        meta.id = Some(result.id);
        meta.url = Some(result.url);
        meta.slug = Some(result.slug);
        if folder_uid.is_some() {
            meta.folder_uid = folder_uid;
        }
        meta.can_save = true;
        meta.can_edit = true;
        meta.updated = Some(Utc::now());

        self.tracker.set_dirty(false);
        self.overlay = None;
        self.pending_confirmation = None;

        if self.is_editing {
            let mut baseline = saved_model;
            if let Value::Object(map) = &mut baseline {
                map.insert("uid".to_string(), Value::from(result.uid.as_str()));
                map.insert("version".to_string(), Value::from(result.version));
            }
            self.tracker.set_baseline(baseline);
            self.snapshots.rebaseline(&self.document);
            self.tracker.start_tracking_changes(&mut self.bus);
        } else {
            self.tracker.clear_baseline();
            self.snapshots.clear();
        }

        self.bus.publish(&SceneEvent::SaveCompleted {
            uid: &result.uid,
            version: result.version,
        });
        tracing::info!(
            "Saved '{}' as {} version {}",
            self.document.title,
            result.uid,
            result.version
        );
    }
}

impl Drop for SceneSession {
    fn drop(&mut self) {
        self.tracker.terminate(&mut self.bus);
        tracing::debug!("Closed session {}", self.id);
    }
}

impl fmt::Debug for SceneSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneSession")
            .field("id", &self.id)
            .field("title", &self.document.title)
            .field("is_editing", &self.is_editing)
            .field("is_dirty", &self.is_dirty())
            .field("selection", &self.selection)
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;
    use crate::config::DiffMode;
    use crate::error::PersistenceError;
    use crate::navigation::MockNavigator;
    use crate::persistence::MockDocumentPersistence;
    use mockall::predicate::eq;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn inline_config() -> SessionConfig {
        SessionConfig::new().with_diff_mode(DiffMode::Inline)
    }

    fn session() -> SceneSession {
        SceneSession::new(
            Document::new("Ops"),
            Box::new(MemoryNavigator::default()),
            inline_config(),
        )
    }

    fn saved_result(version: u64) -> SaveResult {
        SaveResult {
            uid: "dash-1".into(),
            version,
            url: "/d/dash-1/ops".into(),
            slug: "ops".into(),
            id: 42,
        }
    }

    #[test]
    fn exit_restores_snapshot_url_without_edit_params() {
        let start = UrlState::new("/d/dash-1")
            .with_query("orgId", "1")
            .with_query("editview", "settings");

        let mut navigator = MockNavigator::new();
        navigator.expect_location().return_const(start);
        navigator
            .expect_replace()
            .with(eq(UrlState::new("/d/dash-1").with_query("orgId", "1")))
            .times(1)
            .return_const(());

        let mut session = SceneSession::new(Document::new("Ops"), Box::new(navigator), inline_config());
        let entry = actions::change_title(session.document(), "Changed");
        session.perform(entry).unwrap();

        let outcome = session.exit_edit_mode(ExitOptions::discard());
        assert_eq!(outcome, ExitOutcome::Exited { restored: true });
        assert_eq!(session.document().title, "Ops");
    }

    #[test]
    fn save_keeps_tracker_subscription() {
        let mut session = session();
        session.enter_edit_mode();
        let before = session.tracker.subscription();
        assert!(before.is_some());

        let entry = actions::change_title(session.document(), "Changed");
        session.perform(entry).unwrap();
        let saved = session.document().save_model().unwrap();
        session.save_completed(saved, saved_result(1), None);

        assert_eq!(session.tracker.subscription(), before);
        let entry = actions::change_title(session.document(), "Again");
        session.perform(entry).unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.latest_changes().unwrap().diff_count, 1);
    }

    #[test]
    fn failed_save_leaves_state_alone() {
        let mut session = session();
        let entry = actions::change_title(session.document(), "Changed");
        session.perform(entry).unwrap();

        let failures = Arc::new(Mutex::new(Vec::new()));
        {
            let failures = Arc::clone(&failures);
            session.subscribe(move |event| {
                if let SceneEvent::SaveFailed { reason } = event {
                    failures.lock().push((*reason).to_string());
                }
            });
        }

        let mut persistence = MockDocumentPersistence::new();
        persistence
            .expect_save_document()
            .times(1)
            .returning(|_| Err(PersistenceError::Network("connection reset".into())));

        let err = session.save(&mut persistence, SaveOptions::default()).unwrap_err();
        assert!(err.is_retryable());
        assert!(session.is_dirty());
        assert!(session.is_editing());
        assert_eq!(session.document().version, 0);
        assert!(session.document().uid.is_none());
        assert_eq!(*failures.lock(), vec!["network error: connection reset".to_string()]);
    }

    #[test]
    fn save_sends_baseline_time_and_adopts_ids() {
        let mut session = session();
        let entry = actions::change_title(session.document(), "Ops v2");
        session.perform(entry).unwrap();
        let entry = actions::set_time_range(
            session.document(),
            scenekeep_model::TimeRange {
                from: "now-1h".into(),
                to: "now".into(),
            },
        );
        session.perform(entry).unwrap();

        let mut persistence = MockDocumentPersistence::new();
        persistence
            .expect_save_document()
            .withf(|request| {
                request.save_model["title"] == "Ops v2"
                    && request.save_model["time"]["from"] == "now-6h"
                    && request.message.as_deref() == Some("first")
            })
            .times(1)
            .returning(|_| Ok(saved_result(1)));

        let result = session
            .save(&mut persistence, SaveOptions::default().with_message("first"))
            .unwrap();
        assert_eq!(result.version, 1);
        assert!(!session.is_dirty());
        assert!(session.is_editing());
        assert_eq!(session.document().uid.as_deref(), Some("dash-1"));
        assert_eq!(session.document().meta.id, Some(42));
        assert!(session.document().meta.updated.is_some());
        assert!(session.tracker().is_tracking());
    }

    #[test]
    fn read_only_document_rejects_edits() {
        let mut document = Document::new("Locked");
        document.editable = false;
        let mut session = SceneSession::with_defaults(document);

        let entry = actions::change_title(session.document(), "x");
        assert!(matches!(session.perform(entry), Err(SessionError::ReadOnly)));
        assert!(!session.is_editing());
    }

    #[test]
    fn system_update_does_not_dirty() {
        let mut session = session();
        session.enter_edit_mode();
        session.apply_system_update(|doc| doc.version = 9);
        assert!(!session.is_dirty());
        assert_eq!(session.document().version, 9);
    }

    #[test]
    fn select_requires_existing_element() {
        let mut session = session();
        assert!(matches!(
            session.select(ElementKey::new("nope")),
            Err(SessionError::ElementNotFound(_))
        ));
        assert!(session.selection().is_none());
    }

    #[test]
    fn restore_version_keeps_identity() {
        let mut current = Document::new("Ops");
        current.uid = Some("dash-1".into());
        current.version = 7;
        current.meta.slug = Some("ops".into());
        let mut session = SceneSession::new(current, Box::new(MemoryNavigator::default()), inline_config());

        let mut old = Document::new("Ops (old)");
        old.uid = Some("other".into());
        old.version = 3;
        session.restore_version(old).unwrap();

        let doc = session.document();
        assert_eq!(doc.title, "Ops (old)");
        assert_eq!(doc.uid.as_deref(), Some("dash-1"));
        assert_eq!(doc.version, 7);
        assert_eq!(doc.meta.slug.as_deref(), Some("ops"));
        assert!(session.is_editing());
        assert!(session.is_dirty());
    }

    #[test]
    fn debug_output_is_compact() {
        let session = session();
        let debug = format!("{session:?}");
        assert!(debug.contains("SceneSession"));
        assert!(debug.contains("Ops"));
    }
}
