//! Session event bus
//!
//! Listeners run synchronously on the publishing thread, in subscription
//! order. Events borrow from the session, so a listener that needs data
//! later has to copy it out.

use scenekeep_model::Document;
use std::fmt;

/// Who caused a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// A user edit; marks the session dirty
    User,
    /// Bookkeeping by the system (version bumps, restores); never dirties
    System,
}

/// Identifies one pending discard confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfirmationId(u64);

impl ConfirmationId {
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConfirmationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "confirm-{}", self.0)
    }
}

/// Request to ask the user whether unsaved changes may be thrown away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub id: ConfirmationId,
    pub title: String,
    pub text: String,
    pub yes_text: String,
}

/// Answer to a [`ConfirmRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Cancelled,
}

/// Something observable happened to the session
#[derive(Debug, Clone, Copy)]
pub enum SceneEvent<'a> {
    /// Document content changed
    StateChanged {
        document: &'a Document,
        source: ChangeSource,
        description: Option<&'a str>,
    },
    EditModeChanged { is_editing: bool },
    ConfirmDiscard(&'a ConfirmRequest),
    SaveCompleted { uid: &'a str, version: u64 },
    SaveFailed { reason: &'a str },
    /// Document was restored to its pre-edit snapshot
    Discarded,
}

impl SceneEvent<'_> {
    /// Short stable name, used in logs and replay output
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::EditModeChanged { .. } => "edit_mode_changed",
            Self::ConfirmDiscard(_) => "confirm_discard",
            Self::SaveCompleted { .. } => "save_completed",
            Self::SaveFailed { .. } => "save_failed",
            Self::Discarded => "discarded",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Boxed event listener
pub type Listener = Box<dyn FnMut(&SceneEvent<'_>) + Send>;

/// Synchronous publish/subscribe channel owned by a session
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent<'_>) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener
    pub fn publish(&mut self, event: &SceneEvent<'_>) {
        tracing::trace!("Publishing {} to {} listeners", event.name(), self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn delivers_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| seen.lock().push(format!("{tag}:{}", event.name())));
        }

        bus.publish(&SceneEvent::Discarded);
        assert_eq!(*seen.lock(), vec!["first:discarded", "second:discarded"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let id = {
            let count = Arc::clone(&count);
            bus.subscribe(move |_| *count.lock() += 1)
        };

        bus.publish(&SceneEvent::EditModeChanged { is_editing: true });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&SceneEvent::EditModeChanged { is_editing: false });

        assert_eq!(*count.lock(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn state_changed_borrows_document() {
        let document = Document::new("Ops");
        let titles = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        {
            let titles = Arc::clone(&titles);
            bus.subscribe(move |event| {
                if let SceneEvent::StateChanged { document, source, .. } = event {
                    titles.lock().push((document.title.clone(), *source));
                }
            });
        }

        bus.publish(&SceneEvent::StateChanged {
            document: &document,
            source: ChangeSource::User,
            description: None,
        });
        assert_eq!(*titles.lock(), vec![("Ops".to_string(), ChangeSource::User)]);
    }
}
