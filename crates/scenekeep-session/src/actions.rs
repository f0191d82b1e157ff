//! Ready-made undoable edits
//!
//! Each builder validates against the live document, captures the values
//! it will need to revert, and returns an [`UndoEntry`] whose redo closure
//! performs the edit. Nothing is applied until the entry is performed.

use crate::error::SessionError;
use crate::history::UndoEntry;
use parking_lot::Mutex;
use scenekeep_model::{
    Document, ElementKey, ElementKind, GridItem, ModelError, RemovedElement, TimeRange,
};
use std::sync::Arc;

/// Rename the document
#[must_use]
pub fn change_title(document: &Document, title: impl Into<String>) -> UndoEntry {
    let old = document.title.clone();
    let new = title.into();
    UndoEntry::new(
        "Change title",
        move |doc: &mut Document| doc.title.clone_from(&old),
        move |doc: &mut Document| doc.title.clone_from(&new),
    )
}

#[must_use]
pub fn change_description(document: &Document, description: impl Into<String>) -> UndoEntry {
    let old = document.description.clone();
    let new = description.into();
    UndoEntry::new(
        "Change description",
        move |doc: &mut Document| doc.description.clone_from(&old),
        move |doc: &mut Document| doc.description.clone_from(&new),
    )
}

/// Change the default time range
#[must_use]
pub fn set_time_range(document: &Document, time: TimeRange) -> UndoEntry {
    let old = document.time.clone();
    UndoEntry::new(
        "Change time range",
        move |doc: &mut Document| doc.time = old.clone(),
        move |doc: &mut Document| doc.time = time.clone(),
    )
}

/// Retitle a panel
///
/// # Errors
/// Returns `SessionError::ElementNotFound` if `key` is not a panel
pub fn set_panel_title(
    document: &Document,
    key: &ElementKey,
    title: impl Into<String>,
) -> Result<UndoEntry, SessionError> {
    let old = match document.find_element(key) {
        Some(element) if element.kind() == ElementKind::Panel => element.title().to_string(),
        _ => return Err(SessionError::ElementNotFound(key.clone())),
    };
    let new = title.into();

    let undo_key = key.clone();
    let redo_key = key.clone();
    Ok(UndoEntry::new(
        "Change panel title",
        move |doc: &mut Document| set_title_of(doc, &undo_key, &old),
        move |doc: &mut Document| set_title_of(doc, &redo_key, &new),
    )
    .with_source(key.clone()))
}

fn set_title_of(doc: &mut Document, key: &ElementKey, title: &str) {
    match doc.panel_mut(key) {
        Some(panel) => panel.title = title.to_string(),
        None => tracing::warn!("Panel {} vanished before its title could be set", key),
    }
}

/// Add a grid item at the top level or inside `row`
///
/// # Errors
/// - `SessionError::Model(DuplicateKey)` if the item or panel key is taken
/// - `SessionError::ElementNotFound` if `row` does not exist
/// - `SessionError::Model(InvalidTarget)` if `row` is not a row
pub fn add_item(
    document: &Document,
    row: Option<ElementKey>,
    index: usize,
    item: GridItem,
) -> Result<UndoEntry, SessionError> {
    for key in [&item.key, &item.panel.key] {
        if document.contains_key(key) {
            return Err(ModelError::DuplicateKey(key.clone()).into());
        }
    }
    if let Some(row_key) = &row {
        match document.find_element(row_key) {
            None => return Err(SessionError::ElementNotFound(row_key.clone())),
            Some(element) if element.kind() != ElementKind::Row => {
                return Err(ModelError::InvalidTarget {
                    key: row_key.clone(),
                    reason: "not a row".to_string(),
                }
                .into());
            }
            Some(_) => {}
        }
    }

    let item_key = item.key.clone();
    let undo_key = item_key.clone();
    Ok(UndoEntry::new(
        format!("Add {}", item.panel.title),
        move |doc: &mut Document| {
            if doc.remove_element(&undo_key).is_none() {
                tracing::warn!("Cannot undo add: {} is gone", undo_key);
            }
        },
        move |doc: &mut Document| {
            if let Err(err) = doc.insert_item(row.as_ref(), index, item.clone()) {
                tracing::warn!("Cannot add item: {}", err);
            }
        },
    )
    .with_source(item_key))
}

/// Remove a row, grid item, or panel
///
/// The removed subtree is kept by the entry so undo puts it back at the
/// same position.
///
/// # Errors
/// Returns `SessionError::ElementNotFound` if nothing has `key`
pub fn remove_element(document: &Document, key: &ElementKey) -> Result<UndoEntry, SessionError> {
    let element = document
        .find_element(key)
        .ok_or_else(|| SessionError::ElementNotFound(key.clone()))?;
    let description = match element.title() {
        "" => format!("Remove {key}"),
        title => format!("Remove {title}"),
    };

    let removed: Arc<Mutex<Option<RemovedElement>>> = Arc::new(Mutex::new(None));
    let undo_slot = Arc::clone(&removed);
    let redo_key = key.clone();
    Ok(UndoEntry::new(
        description,
        move |doc: &mut Document| {
            let Some(element) = undo_slot.lock().take() else {
                return;
            };
            if let Err(err) = doc.restore_element(element) {
                tracing::warn!("Cannot undo removal: {}", err);
            }
        },
        move |doc: &mut Document| {
            let element = doc.remove_element(&redo_key);
            if element.is_none() {
                tracing::warn!("Cannot remove {}: not found", redo_key);
            }
            *removed.lock() = element;
        },
    )
    .with_source(key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::UndoRedoStack;
    use pretty_assertions::assert_eq;
    use scenekeep_model::{GridRow, LayoutNode, VizPanel};

    fn doc() -> Document {
        let mut doc = Document::new("Ops");
        doc.layout.push(LayoutNode::Row(GridRow {
            key: ElementKey::new("row-1"),
            title: "Hosts".into(),
            collapsed: false,
            y: 0,
            children: vec![GridItem::for_panel(
                VizPanel::new("panel-1", "CPU", "timeseries"),
                0,
                1,
                12,
                8,
            )],
        }));
        doc.layout.push(LayoutNode::Item(GridItem::for_panel(
            VizPanel::new("panel-2", "Memory", "stat"),
            0,
            9,
            6,
            4,
        )));
        doc
    }

    fn perform(doc: &mut Document, stack: &mut UndoRedoStack, mut entry: UndoEntry) {
        entry.apply_redo(doc);
        stack.push_action(entry);
    }

    #[test]
    fn title_round_trip() {
        let mut doc = doc();
        let original = doc.clone();
        let mut stack = UndoRedoStack::default();

        let entry = change_title(&doc, "Ops v2");
        perform(&mut doc, &mut stack, entry);
        assert_eq!(doc.title, "Ops v2");

        stack.undo_action(&mut doc);
        assert_eq!(doc, original);
    }

    #[test]
    fn time_range_round_trip() {
        let mut doc = doc();
        let mut stack = UndoRedoStack::default();
        let entry = set_time_range(
            &doc,
            TimeRange {
                from: "now-1h".into(),
                to: "now".into(),
            },
        );
        perform(&mut doc, &mut stack, entry);
        assert_eq!(doc.time.from, "now-1h");

        stack.undo_action(&mut doc);
        assert_eq!(doc.time, TimeRange::default());
    }

    #[test]
    fn panel_title_targets_panels_only() {
        let doc = doc();
        assert!(set_panel_title(&doc, &ElementKey::new("panel-1"), "x").is_ok());
        assert!(matches!(
            set_panel_title(&doc, &ElementKey::new("row-1"), "x"),
            Err(SessionError::ElementNotFound(_))
        ));
    }

    #[test]
    fn remove_row_and_undo_restores_position() {
        let mut doc = doc();
        let original = doc.clone();
        let mut stack = UndoRedoStack::default();

        let entry = remove_element(&doc, &ElementKey::new("row-1")).unwrap();
        assert_eq!(entry.description(), "Remove Hosts");
        perform(&mut doc, &mut stack, entry);
        assert!(!doc.contains_key(&ElementKey::new("panel-1")));

        stack.undo_action(&mut doc);
        assert_eq!(doc, original);

        stack.redo_action(&mut doc);
        assert_eq!(doc.layout.len(), 1);
    }

    #[test]
    fn add_into_row_and_undo() {
        let mut doc = doc();
        let original = doc.clone();
        let mut stack = UndoRedoStack::default();
        let item = GridItem::for_panel(VizPanel::new("panel-3", "Disk", "gauge"), 12, 1, 12, 8);

        let entry = add_item(&doc, Some(ElementKey::new("row-1")), 1, item).unwrap();
        perform(&mut doc, &mut stack, entry);
        assert_eq!(doc.layout[0].items().len(), 2);

        stack.undo_action(&mut doc);
        assert_eq!(doc, original);
    }

    #[test]
    fn add_rejects_bad_targets() {
        let doc = doc();
        let dup = GridItem::for_panel(VizPanel::new("panel-1", "dup", "stat"), 0, 0, 1, 1);
        assert!(matches!(
            add_item(&doc, None, 0, dup),
            Err(SessionError::Model(ModelError::DuplicateKey(_)))
        ));

        let item = GridItem::for_panel(VizPanel::new("panel-9", "x", "stat"), 0, 0, 1, 1);
        assert!(matches!(
            add_item(&doc, Some(ElementKey::new("missing")), 0, item.clone()),
            Err(SessionError::ElementNotFound(_))
        ));
        assert!(matches!(
            add_item(&doc, Some(ElementKey::new("grid-item-panel-2")), 0, item),
            Err(SessionError::Model(ModelError::InvalidTarget { .. }))
        ));
    }

    #[test]
    fn remove_unknown_key_fails() {
        assert!(matches!(
            remove_element(&doc(), &ElementKey::new("nope")),
            Err(SessionError::ElementNotFound(_))
        ));
    }
}
