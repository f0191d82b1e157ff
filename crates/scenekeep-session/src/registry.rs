//! Active-session registry
//!
//! Hosts that need "the session currently on screen" hold a
//! [`SessionRegistry`] and activate sessions through scoped guards.
//! Dropping a guard reinstates whatever was active before it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracks which session is active
#[derive(Debug, Default)]
pub struct SessionRegistry {
    current: RwLock<Option<SessionId>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<SessionId> {
        *self.current.read()
    }

    /// Make `id` active until the returned guard is dropped
    #[must_use = "the session is deactivated when the guard is dropped"]
    pub fn activate(&self, id: SessionId) -> ActiveSessionGuard<'_> {
        let previous = self.current.write().replace(id);
        tracing::debug!("Activated session {}", id);
        ActiveSessionGuard {
            registry: self,
            id,
            previous,
        }
    }
}

/// Scope during which a session is active
#[derive(Debug)]
pub struct ActiveSessionGuard<'a> {
    registry: &'a SessionRegistry,
    id: SessionId,
    previous: Option<SessionId>,
}

impl ActiveSessionGuard<'_> {
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for ActiveSessionGuard<'_> {
    fn drop(&mut self) {
        let mut current = self.registry.current.write();
        if *current == Some(self.id) {
            *current = self.previous;
            tracing::debug!("Deactivated session {}", self.id);
        } else {
            tracing::warn!(
                "Session {} deactivated out of order; leaving registry unchanged",
                self.id
            );
        }
    }
}
