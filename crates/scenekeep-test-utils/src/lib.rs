//! Testing utilities for the scenekeep workspace
//!
//! Shared fixtures, an in-memory persistence backend, and recorders for
//! navigation and session events.

#![allow(missing_docs)]

use parking_lot::Mutex;
use scenekeep_model::{
    Document, ElementKey, GridItem, GridRow, LayoutNode, Variable, VariableKind, VariableValue,
    VizPanel,
};
use scenekeep_session::{
    DocumentPersistence, MemoryNavigator, Navigator, PersistenceError, SaveRequest, SaveResult,
    SceneEvent, SceneSession, SessionConfig, UrlState,
};
use std::sync::Arc;

/// Saved dashboard with a row, two panels and one variable
pub fn sample_document() -> Document {
    let mut doc = Document::new("Service overview");
    doc.uid = Some("svc-overview".to_string());
    doc.version = 3;
    doc.tags = vec!["ops".to_string()];
    doc.refresh = Some("1m".to_string());
    doc.variables.push(Variable {
        name: "env".to_string(),
        label: Some("Environment".to_string()),
        kind: VariableKind::Custom,
        query: "prod,staging".to_string(),
        current: VariableValue::new("prod"),
    });
    doc.layout.push(LayoutNode::Row(GridRow {
        key: ElementKey::new("row-hosts"),
        title: "Hosts".to_string(),
        collapsed: false,
        y: 0,
        children: vec![GridItem::for_panel(
            VizPanel::new("panel-cpu", "CPU", "timeseries"),
            0,
            1,
            12,
            8,
        )],
    }));
    doc.layout.push(LayoutNode::Item(GridItem::for_panel(
        VizPanel::new("panel-mem", "Memory", "stat"),
        0,
        9,
        6,
        4,
    )));
    doc.meta.folder_uid = Some("folder-ops".to_string());
    doc.meta.can_save = true;
    doc.meta.can_edit = true;
    doc
}

/// Grid item for a fresh panel keyed `key`
pub fn panel_item(key: &str, title: &str) -> GridItem {
    GridItem::for_panel(VizPanel::new(key, title, "timeseries"), 0, 0, 12, 8)
}

/// Location a session typically enters edit mode from
pub fn edit_url() -> UrlState {
    UrlState::new("/d/svc-overview/service-overview")
        .with_query("orgId", "1")
        .with_query("editview", "settings")
}

/// Persistence backend that keeps every request in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistence {
    inner: Arc<Mutex<PersistenceState>>,
}

#[derive(Debug, Default)]
struct PersistenceState {
    requests: Vec<SaveRequest>,
    stored_version: u64,
    fail_next: Option<PersistenceError>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next save fail with `error`
    pub fn fail_next(&self, error: PersistenceError) {
        self.inner.lock().fail_next = Some(error);
    }

    pub fn requests(&self) -> Vec<SaveRequest> {
        self.inner.lock().requests.clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().requests.len()
    }
}

impl DocumentPersistence for InMemoryPersistence {
    fn save_document(&mut self, request: &SaveRequest) -> Result<SaveResult, PersistenceError> {
        let mut state = self.inner.lock();
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        state.stored_version = state.stored_version.max(request.base_version) + 1;
        state.requests.push(request.clone());
        let uid = request
            .save_model
            .get("uid")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("gen-{}", state.requests.len()), str::to_string);

        Ok(SaveResult {
            url: format!("/d/{uid}"),
            slug: uid.clone(),
            uid,
            version: state.stored_version,
            id: state.requests.len() as u64,
        })
    }
}

/// Navigator whose state stays observable after boxing it into a session
#[derive(Debug, Clone, Default)]
pub struct SharedNavigator {
    inner: Arc<Mutex<MemoryNavigator>>,
}

impl SharedNavigator {
    pub fn new(start: UrlState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryNavigator::new(start))),
        }
    }

    pub fn replaced(&self) -> Vec<UrlState> {
        self.inner.lock().replaced().to_vec()
    }

    pub fn current(&self) -> UrlState {
        self.inner.lock().location()
    }

    /// Simulate in-app navigation
    pub fn push(&self, url: UrlState) {
        self.inner.lock().push(url);
    }
}

impl Navigator for SharedNavigator {
    fn location(&self) -> UrlState {
        self.inner.lock().location()
    }

    fn replace(&mut self, url: UrlState) {
        self.inner.lock().replace(url);
    }
}

/// Owned copy of a [`SceneEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    StateChanged { title: String, user: bool },
    EditModeChanged(bool),
    ConfirmDiscard(u64),
    SaveCompleted { uid: String, version: u64 },
    SaveFailed(String),
    Discarded,
}

/// Collects every event a session publishes
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventRecorder {
    /// Subscribe a new recorder to `session`
    pub fn attach(session: &mut SceneSession) -> Self {
        let recorder = Self::default();
        let events = Arc::clone(&recorder.events);
        session.subscribe(move |event| events.lock().push(RecordedEvent::from(event)));
        recorder
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn count(&self, pred: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| pred(event)).count()
    }
}

impl From<&SceneEvent<'_>> for RecordedEvent {
    fn from(event: &SceneEvent<'_>) -> Self {
        match event {
            SceneEvent::StateChanged {
                document, source, ..
            } => Self::StateChanged {
                title: document.title.clone(),
                user: *source == scenekeep_session::ChangeSource::User,
            },
            SceneEvent::EditModeChanged { is_editing } => Self::EditModeChanged(*is_editing),
            SceneEvent::ConfirmDiscard(request) => Self::ConfirmDiscard(request.id.get()),
            SceneEvent::SaveCompleted { uid, version } => Self::SaveCompleted {
                uid: (*uid).to_string(),
                version: *version,
            },
            SceneEvent::SaveFailed { reason } => Self::SaveFailed((*reason).to_string()),
            SceneEvent::Discarded => Self::Discarded,
        }
    }
}

/// Session over [`sample_document`] entered from [`edit_url`]
pub fn setup_session(config: SessionConfig) -> (SceneSession, SharedNavigator, EventRecorder) {
    let navigator = SharedNavigator::new(edit_url());
    let mut session = SceneSession::new(sample_document(), Box::new(navigator.clone()), config);
    let recorder = EventRecorder::attach(&mut session);
    (session, navigator, recorder)
}
