//! Change tracking
//!
//! While tracking, every user-sourced state change marks the session dirty
//! and, when a baseline save model exists, posts the live save model for
//! diffing against it. Diffs run on a dedicated worker thread by default;
//! the newest summary is read with [`ChangeTracker::poll`].
//!
//! Posting is ordered: the worker processes messages in the order they were
//! sent and the stored summary always reflects the latest finished post.
//! A dead worker is released and tracking degrades to the dirty flag.

use crate::config::DiffMode;
use crate::events::{ChangeSource, EventBus, SceneEvent, SubscriptionId};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use scenekeep_model::{ChangeOptions, ContentHash, Document, DocumentChanges};
use serde_json::Value;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Unit of work for the diff worker
///
/// Both models are sanitized JSON, so the message is plain data that can
/// cross threads.
#[derive(Debug, Clone)]
pub struct ChangeTrackingMessage {
    pub initial: Arc<Value>,
    pub changed: Value,
    pub options: ChangeOptions,
    /// Monotonic posting order
    pub sequence: u64,
}

/// What the worker produced for one message
#[derive(Debug, Clone)]
pub enum DiffOutcome {
    Computed {
        sequence: u64,
        changes: DocumentChanges,
    },
    Failed {
        sequence: u64,
        reason: String,
    },
}

/// Diff one message; shared by the worker and inline mode
#[must_use]
pub fn compute_outcome(message: &ChangeTrackingMessage) -> DiffOutcome {
    match DocumentChanges::compute(&message.initial, &message.changed, message.options) {
        Ok(changes) => DiffOutcome::Computed {
            sequence: message.sequence,
            changes,
        },
        Err(err) => DiffOutcome::Failed {
            sequence: message.sequence,
            reason: err.to_string(),
        },
    }
}

enum WorkerCommand {
    Diff(ChangeTrackingMessage),
    Flush(Sender<()>),
}

/// Background diff thread
///
/// Outcomes are written straight into the shared tracker state, so only
/// the newest summary is ever held. Dropping the worker signals shutdown
/// and never waits for queued diffs.
#[derive(Debug)]
struct DiffWorker {
    commands: Option<Sender<WorkerCommand>>,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DiffWorker {
    fn spawn(state: Arc<Mutex<TrackerState>>) -> std::io::Result<Self> {
        let (command_tx, command_rx) = channel::unbounded();
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);
        let handle = thread::Builder::new()
            .name("scenekeep-diff".to_string())
            .spawn(move || run_worker(&command_rx, &shutdown_rx, &state))?;

        Ok(Self {
            commands: Some(command_tx),
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    fn post(&self, message: ChangeTrackingMessage) -> bool {
        self.commands
            .as_ref()
            .is_some_and(|tx| tx.send(WorkerCommand::Diff(message)).is_ok())
    }

    /// Wait until everything posted so far has been processed
    fn flush(&self, timeout: Duration) -> bool {
        let Some(tx) = self.commands.as_ref() else {
            return false;
        };
        let (ack_tx, ack_rx) = channel::bounded(1);
        if tx.send(WorkerCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(timeout).is_ok()
    }
}

impl Drop for DiffWorker {
    fn drop(&mut self) {
        // a disconnected shutdown channel wins over any queued diff
        self.shutdown.take();
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                if handle.join().is_err() {
                    tracing::warn!("Diff worker panicked");
                }
            } else {
                tracing::debug!("Diff worker still busy; detaching");
            }
        }
    }
}

fn shutdown_requested(shutdown: &Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

fn run_worker(
    commands: &Receiver<WorkerCommand>,
    shutdown: &Receiver<()>,
    state: &Mutex<TrackerState>,
) {
    tracing::debug!("Diff worker started");
    loop {
        channel::select! {
            recv(shutdown) -> _ => break,
            recv(commands) -> command => match command {
                Ok(WorkerCommand::Diff(message)) => {
                    if shutdown_requested(shutdown) {
                        break;
                    }
                    let outcome = compute_outcome(&message);
                    if shutdown_requested(shutdown) {
                        break;
                    }
                    record(state, outcome);
                }
                Ok(WorkerCommand::Flush(ack)) => {
                    let _ = ack.send(());
                }
                Err(_) => break,
            },
        }
    }
    tracing::debug!("Diff worker stopped");
}

#[derive(Debug, Default)]
struct TrackerState {
    dirty: bool,
    editing: bool,
    baseline: Option<Arc<Value>>,
    last_posted: Option<ContentHash>,
    sequence: u64,
    /// Sequence number at the time the baseline was set
    baseline_start: u64,
    latest: Option<DocumentChanges>,
}

/// Store one diff outcome, keeping only the newest summary
fn record(state: &Mutex<TrackerState>, outcome: DiffOutcome) {
    match outcome {
        DiffOutcome::Computed { sequence, changes } => {
            let mut state = state.lock();
            // results from before a re-baseline are stale
            if sequence > state.baseline_start {
                state.latest = Some(changes);
            }
        }
        DiffOutcome::Failed { sequence, reason } => {
            tracing::warn!("Diff #{} failed: {}", sequence, reason);
        }
    }
}

#[derive(Debug)]
struct Shared {
    mode: DiffMode,
    options: ChangeOptions,
    state: Arc<Mutex<TrackerState>>,
    worker: Mutex<Option<DiffWorker>>,
}

impl Shared {
    fn on_state_changed(&self, document: &Document, source: ChangeSource) {
        if source == ChangeSource::System {
            return;
        }

        let message = {
            let mut state = self.state.lock();
            if !state.dirty {
                tracing::debug!("Document '{}' is now dirty", document.title);
            }
            state.dirty = true;

            if !state.editing || self.mode == DiffMode::Disabled {
                return;
            }
            let Some(initial) = state.baseline.clone() else {
                return;
            };

            let changed = match document.save_model() {
                Ok(model) => model,
                Err(err) => {
                    tracing::warn!("Cannot build save model for diffing: {}", err);
                    return;
                }
            };
            let hash = match ContentHash::compute_serializable(&changed) {
                Ok(hash) => hash,
                Err(err) => {
                    tracing::warn!("Cannot hash save model: {}", err);
                    return;
                }
            };
            if state.last_posted == Some(hash) {
                return;
            }
            state.last_posted = Some(hash);
            state.sequence += 1;

            ChangeTrackingMessage {
                initial,
                changed,
                options: self.options,
                sequence: state.sequence,
            }
        };

        match self.mode {
            DiffMode::Inline => record(&self.state, compute_outcome(&message)),
            DiffMode::Worker => self.post(message),
            DiffMode::Disabled => {}
        }
    }

    fn post(&self, message: ChangeTrackingMessage) {
        let mut worker = self.worker.lock();
        let Some(active) = worker.as_ref() else {
            return;
        };
        if !active.post(message) {
            tracing::warn!("Diff worker is gone; falling back to dirty-flag tracking");
            *worker = None;
        }
    }
}

/// Dirty flag plus optional background diffing
#[derive(Debug)]
pub struct ChangeTracker {
    shared: Arc<Shared>,
    subscription: Option<SubscriptionId>,
}

impl ChangeTracker {
    /// Create a tracker; in worker mode this spawns the diff thread
    #[must_use]
    pub fn new(mode: DiffMode, options: ChangeOptions) -> Self {
        let state = Arc::new(Mutex::new(TrackerState::default()));
        let worker = match mode {
            DiffMode::Worker => match DiffWorker::spawn(Arc::clone(&state)) {
                Ok(worker) => Some(worker),
                Err(err) => {
                    tracing::warn!("Cannot start diff worker, tracking dirty flag only: {}", err);
                    None
                }
            },
            DiffMode::Inline | DiffMode::Disabled => None,
        };

        Self {
            shared: Arc::new(Shared {
                mode,
                options,
                state,
                worker: Mutex::new(worker),
            }),
            subscription: None,
        }
    }

    /// Subscribe to state changes on `bus`; no-op if already tracking
    pub fn start_tracking_changes(&mut self, bus: &mut EventBus) {
        if self.subscription.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let id = bus.subscribe(move |event| {
            if let SceneEvent::StateChanged {
                document, source, ..
            } = event
            {
                shared.on_state_changed(document, *source);
            }
        });
        self.subscription = Some(id);
        tracing::debug!("Change tracking started");
    }

    /// Unsubscribe; the dirty flag is left as is
    pub fn stop_tracking_changes(&mut self, bus: &mut EventBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
            tracing::debug!("Change tracking stopped");
        }
    }

    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop tracking and release the worker; safe to call repeatedly
    pub fn terminate(&mut self, bus: &mut EventBus) {
        self.stop_tracking_changes(bus);
        if self.shared.worker.lock().take().is_some() {
            tracing::debug!("Diff worker released");
        }
    }

    /// Whether a diff worker is attached
    #[must_use]
    pub fn has_worker(&self) -> bool {
        self.shared.worker.lock().is_some()
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> DiffMode {
        self.shared.mode
    }

    /// Start diffing against a new baseline save model
    pub fn set_baseline(&self, model: Value) {
        let mut state = self.shared.state.lock();
        state.baseline = Some(Arc::new(model));
        state.last_posted = None;
        state.baseline_start = state.sequence;
        state.latest = None;
    }

    pub fn clear_baseline(&self) {
        let mut state = self.shared.state.lock();
        state.baseline = None;
        state.last_posted = None;
        state.baseline_start = state.sequence;
        state.latest = None;
    }

    /// Baseline save model, if any
    #[must_use]
    pub fn baseline(&self) -> Option<Arc<Value>> {
        self.shared.state.lock().baseline.clone()
    }

    /// Diffs are only posted while editing
    pub fn set_editing(&self, editing: bool) {
        self.shared.state.lock().editing = editing;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.state.lock().dirty
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.shared.state.lock().dirty = dirty;
    }

    /// Latest summary of finished diffs
    ///
    /// The worker publishes into shared state as it finishes, so polling
    /// never blocks and never sees more than one summary.
    #[must_use]
    pub fn poll(&self) -> Option<DocumentChanges> {
        self.latest_changes()
    }

    #[must_use]
    pub fn latest_changes(&self) -> Option<DocumentChanges> {
        self.shared.state.lock().latest.clone()
    }

    /// Block until the worker has processed every posted message
    ///
    /// Returns true immediately outside worker mode. Returns false on
    /// timeout or if the worker is gone.
    pub fn flush(&self, timeout: Duration) -> bool {
        if self.shared.mode != DiffMode::Worker {
            return true;
        }
        self.shared
            .worker
            .lock()
            .as_ref()
            .is_some_and(|worker| worker.flush(timeout))
    }

    #[cfg(test)]
    pub(crate) fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }
}
