//! Undo / redo history
//!
//! Each entry carries two closures over the document. The stack calls them
//! and moves entries between the undo and redo sides; it never inspects
//! the document itself.

use scenekeep_model::{Document, ElementKey};
use std::collections::VecDeque;
use std::fmt;

/// Edit closure stored in the history
pub type EditFn = Box<dyn FnMut(&mut Document) + Send>;

/// A reversible edit
pub struct UndoEntry {
    description: String,
    source: Option<ElementKey>,
    undo: EditFn,
    redo: EditFn,
}

impl UndoEntry {
    /// Build an entry from its undo and redo closures
    pub fn new<U, R>(description: impl Into<String>, undo: U, redo: R) -> Self
    where
        U: FnMut(&mut Document) + Send + 'static,
        R: FnMut(&mut Document) + Send + 'static,
    {
        Self {
            description: description.into(),
            source: None,
            undo: Box::new(undo),
            redo: Box::new(redo),
        }
    }

    /// Element the edit targets
    #[must_use]
    pub fn with_source(mut self, key: ElementKey) -> Self {
        self.source = Some(key);
        self
    }

    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<&ElementKey> {
        self.source.as_ref()
    }

    /// Run the undo closure
    pub fn apply_undo(&mut self, document: &mut Document) {
        (self.undo)(document);
    }

    /// Run the redo closure
    pub fn apply_redo(&mut self, document: &mut Document) {
        (self.redo)(document);
    }
}

impl fmt::Debug for UndoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoEntry")
            .field("description", &self.description)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Bounded undo stack plus redo stack
#[derive(Debug)]
pub struct UndoRedoStack {
    undo: VecDeque<UndoEntry>,
    redo: Vec<UndoEntry>,
    max_entries: usize,
}

impl UndoRedoStack {
    /// Stack keeping at most `max_entries` undo entries (at least 1)
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record an already-applied edit; invalidates redo
    pub fn push_action(&mut self, entry: UndoEntry) {
        self.redo.clear();
        self.undo.push_back(entry);
        if self.undo.len() > self.max_entries {
            if let Some(dropped) = self.undo.pop_front() {
                tracing::debug!("Undo history full, dropping '{}'", dropped.description);
            }
        }
    }

    /// Revert the most recent edit
    ///
    /// Returns its description, or `None` if there was nothing to undo.
    pub fn undo_action(&mut self, document: &mut Document) -> Option<String> {
        let mut entry = self.undo.pop_back()?;
        entry.apply_undo(document);
        let description = entry.description.clone();
        self.redo.push(entry);
        Some(description)
    }

    /// Re-apply the most recently undone edit
    pub fn redo_action(&mut self, document: &mut Document) -> Option<String> {
        let mut entry = self.redo.pop()?;
        entry.apply_redo(document);
        let description = entry.description.clone();
        self.undo.push_back(entry);
        Some(description)
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Description of the entry `undo_action` would revert
    #[must_use]
    pub fn peek_undo(&self) -> Option<&str> {
        self.undo.back().map(UndoEntry::description)
    }

    #[must_use]
    pub fn peek_redo(&self) -> Option<&str> {
        self.redo.last().map(UndoEntry::description)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for UndoRedoStack {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retitle(doc: &mut Document, title: &str) -> UndoEntry {
        let old = std::mem::replace(&mut doc.title, title.to_string());
        let new = title.to_string();
        UndoEntry::new(
            format!("Rename to {title}"),
            move |d: &mut Document| d.title.clone_from(&old),
            move |d: &mut Document| d.title.clone_from(&new),
        )
    }

    #[test]
    fn undo_then_redo() {
        let mut doc = Document::new("A");
        let mut stack = UndoRedoStack::new(10);

        let entry = retitle(&mut doc, "B");
        stack.push_action(entry);
        assert!(stack.can_undo());
        assert!(!stack.can_redo());

        assert_eq!(stack.undo_action(&mut doc).as_deref(), Some("Rename to B"));
        assert_eq!(doc.title, "A");
        assert!(stack.can_redo());

        assert_eq!(stack.redo_action(&mut doc).as_deref(), Some("Rename to B"));
        assert_eq!(doc.title, "B");
        assert_eq!(stack.undo_len(), 1);
        assert_eq!(stack.redo_len(), 0);
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut doc = Document::new("A");
        let mut stack = UndoRedoStack::default();
        assert!(stack.undo_action(&mut doc).is_none());
        assert!(stack.redo_action(&mut doc).is_none());
        assert_eq!(doc.title, "A");
    }

    #[test]
    fn push_clears_redo() {
        let mut doc = Document::new("A");
        let mut stack = UndoRedoStack::new(10);

        let entry = retitle(&mut doc, "B");
        stack.push_action(entry);
        stack.undo_action(&mut doc);
        assert!(stack.can_redo());

        let entry = retitle(&mut doc, "C");
        stack.push_action(entry);
        assert!(!stack.can_redo());
        assert_eq!(stack.peek_undo(), Some("Rename to C"));
    }

    #[test]
    fn oldest_entries_drop_past_limit() {
        let mut doc = Document::new("0");
        let mut stack = UndoRedoStack::new(2);
        for title in ["1", "2", "3"] {
            let entry = retitle(&mut doc, title);
            stack.push_action(entry);
        }

        assert_eq!(stack.undo_len(), 2);
        stack.undo_action(&mut doc);
        stack.undo_action(&mut doc);
        assert_eq!(doc.title, "1");
        assert!(!stack.can_undo());
    }

    #[test]
    fn source_is_recorded() {
        let entry = UndoEntry::new("noop", |_: &mut Document| {}, |_: &mut Document| {})
            .with_source(ElementKey::new("panel-1"));
        assert_eq!(entry.source().map(ElementKey::as_str), Some("panel-1"));
        assert!(format!("{entry:?}").contains("noop"));
    }
}
