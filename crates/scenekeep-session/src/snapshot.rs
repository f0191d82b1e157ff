//! Pre-edit snapshot
//!
//! Holds at most one deep copy of the document plus the location the user
//! entered edit mode from. Discarding restores both.

use crate::navigation::UrlState;
use chrono::{DateTime, Utc};
use scenekeep_model::Document;

/// State captured when edit mode was entered
#[derive(Debug, Clone, PartialEq)]
pub struct InitialSnapshot {
    pub document: Document,
    pub url: Option<UrlState>,
    pub taken_at: DateTime<Utc>,
}

/// Single-slot snapshot storage
#[derive(Debug, Default)]
pub struct SnapshotStore {
    initial: Option<InitialSnapshot>,
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with a deep copy of `document`
    pub fn save(&mut self, document: &Document, url: Option<UrlState>) {
        self.initial = Some(InitialSnapshot {
            document: document.clone(),
            url,
            taken_at: Utc::now(),
        });
    }

    /// Copy a new document into the slot, keeping the captured location
    pub fn rebaseline(&mut self, document: &Document) {
        let url = self.initial.take().and_then(|snapshot| snapshot.url);
        self.save(document, url);
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&InitialSnapshot> {
        self.initial.as_ref()
    }

    /// Empty the slot, returning what it held
    pub fn take(&mut self) -> Option<InitialSnapshot> {
        self.initial.take()
    }

    pub fn clear(&mut self) {
        self.initial = None;
    }

    #[inline]
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.initial.is_some()
    }
}
