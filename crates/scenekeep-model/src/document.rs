//! The editable document
//!
//! A [`Document`] is an owned value tree. Cloning it yields a fully
//! independent copy, which is what edit-session snapshots rely on.

use crate::error::ModelError;
use crate::hash::{ContentHash, HashError};
use crate::layout::{
    ElementKey, ElementRef, GridItem, LayoutNode, RemovedElement, RemovedNode, VizPanel,
};
use crate::sanitize::sanitize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dashboard-level time range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            from: "now-6h".to_string(),
            to: "now".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Query,
    Custom,
    Constant,
    Interval,
    Textbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariableValue {
    pub text: String,
    pub value: String,
}

impl VariableValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            value,
        }
    }
}

/// Template variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub kind: VariableKind,
    #[serde(default)]
    pub query: String,
    /// Currently selected value
    #[serde(default)]
    pub current: VariableValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Storage metadata; never part of the save model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default)]
    pub folder_uid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub can_save: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

/// Full state tree of an editable dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Assigned by storage on first save
    #[serde(default)]
    pub uid: Option<String>,
    /// Incremented by storage on each successful save
    #[serde(default)]
    pub version: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_editable")]
    pub editable: bool,
    #[serde(default)]
    pub time: TimeRange,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub links: Vec<DocumentLink>,
    #[serde(default)]
    pub layout: Vec<LayoutNode>,
    #[serde(default)]
    pub meta: DocumentMeta,
}

fn default_editable() -> bool {
    true
}

impl Document {
    /// Empty, unsaved document
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uid: None,
            version: 0,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            editable: true,
            time: TimeRange::default(),
            refresh: None,
            variables: Vec::new(),
            links: Vec::new(),
            layout: Vec::new(),
            meta: DocumentMeta::default(),
        }
    }

    /// Whether storage has never seen this document
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.uid.is_none()
    }

    /// Persisted representation: `meta` dropped, then sanitized
    ///
    /// # Errors
    /// Returns error if the document cannot be serialized
    pub fn save_model(&self) -> Result<Value, ModelError> {
        Ok(self.to_save_value()?)
    }

    /// Fingerprint of the save model
    ///
    /// # Errors
    /// Returns error if the document cannot be serialized
    pub fn content_hash(&self) -> Result<ContentHash, HashError> {
        ContentHash::compute_serializable(&self.to_save_value()?)
    }

    fn to_save_value(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("meta");
        }
        Ok(sanitize(value))
    }

    /// Panels in layout order (rows expanded in place)
    pub fn panels(&self) -> impl Iterator<Item = &VizPanel> {
        self.layout
            .iter()
            .flat_map(LayoutNode::items)
            .map(|item| &item.panel)
    }

    /// Locate any element by key
    #[must_use]
    pub fn find_element(&self, key: &ElementKey) -> Option<ElementRef<'_>> {
        for node in &self.layout {
            if let LayoutNode::Row(row) = node {
                if &row.key == key {
                    return Some(ElementRef::Row(row));
                }
            }
            for item in node.items() {
                if &item.key == key {
                    return Some(ElementRef::Item(item));
                }
                if &item.panel.key == key {
                    return Some(ElementRef::Panel(&item.panel));
                }
            }
        }
        None
    }

    #[must_use]
    pub fn contains_key(&self, key: &ElementKey) -> bool {
        self.find_element(key).is_some()
    }

    /// Mutable access to a panel by its key
    pub fn panel_mut(&mut self, key: &ElementKey) -> Option<&mut VizPanel> {
        self.layout.iter_mut().find_map(|node| match node {
            LayoutNode::Item(item) => (&item.panel.key == key).then_some(&mut item.panel),
            LayoutNode::Row(row) => row
                .children
                .iter_mut()
                .find(|item| &item.panel.key == key)
                .map(|item| &mut item.panel),
        })
    }

    /// Insert a grid item at the top level or inside a row
    ///
    /// `index` past the end appends.
    ///
    /// # Errors
    /// - `ModelError::DuplicateKey` if the item or its panel key is taken
    /// - `ModelError::ElementNotFound` / `InvalidTarget` if `row` is not a row
    pub fn insert_item(
        &mut self,
        row: Option<&ElementKey>,
        index: usize,
        item: GridItem,
    ) -> Result<(), ModelError> {
        for key in [&item.key, &item.panel.key] {
            if self.contains_key(key) {
                return Err(ModelError::DuplicateKey(key.clone()));
            }
        }

        match row {
            None => {
                let index = index.min(self.layout.len());
                self.layout.insert(index, LayoutNode::Item(item));
            }
            Some(row_key) => {
                let children = self.row_children_mut(row_key)?;
                let index = index.min(children.len());
                children.insert(index, item);
            }
        }
        Ok(())
    }

    /// Take an element out of the layout
    ///
    /// Removing a panel removes the grid item that holds it.
    pub fn remove_element(&mut self, key: &ElementKey) -> Option<RemovedElement> {
        let top_level = self.layout.iter().position(|node| match node {
            LayoutNode::Row(row) => &row.key == key,
            LayoutNode::Item(item) => &item.key == key || &item.panel.key == key,
        });
        if let Some(index) = top_level {
            let node = match self.layout.remove(index) {
                LayoutNode::Row(row) => RemovedNode::Row(row),
                LayoutNode::Item(item) => RemovedNode::Item(item),
            };
            return Some(RemovedElement {
                parent: None,
                index,
                node,
            });
        }

        self.layout.iter_mut().find_map(|node| {
            let LayoutNode::Row(row) = node else {
                return None;
            };
            let child = row
                .children
                .iter()
                .position(|item| &item.key == key || &item.panel.key == key)?;
            Some(RemovedElement {
                parent: Some(row.key.clone()),
                index: child,
                node: RemovedNode::Item(row.children.remove(child)),
            })
        })
    }

    /// Put a previously removed element back at its recorded position
    ///
    /// # Errors
    /// - `ModelError::DuplicateKey` if the key was reused meanwhile
    /// - `ModelError::ElementNotFound` if the parent row is gone
    pub fn restore_element(&mut self, removed: RemovedElement) -> Result<(), ModelError> {
        if self.contains_key(removed.key()) {
            return Err(ModelError::DuplicateKey(removed.key().clone()));
        }

        match (removed.parent, removed.node) {
            (None, RemovedNode::Row(row)) => {
                let index = removed.index.min(self.layout.len());
                self.layout.insert(index, LayoutNode::Row(row));
                Ok(())
            }
            (parent, RemovedNode::Item(item)) => {
                self.insert_item(parent.as_ref(), removed.index, item)
            }
            (Some(parent), RemovedNode::Row(row)) => Err(ModelError::InvalidTarget {
                key: row.key,
                reason: format!("rows cannot be nested (parent {parent})"),
            }),
        }
    }

    fn row_children_mut(&mut self, row_key: &ElementKey) -> Result<&mut Vec<GridItem>, ModelError> {
        let node = self
            .layout
            .iter_mut()
            .find(|node| node.key() == row_key)
            .ok_or_else(|| ModelError::ElementNotFound(row_key.clone()))?;

        match node {
            LayoutNode::Row(row) => Ok(&mut row.children),
            LayoutNode::Item(item) => Err(ModelError::InvalidTarget {
                key: item.key.clone(),
                reason: "not a row".to_string(),
            }),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("New dashboard")
    }
}
