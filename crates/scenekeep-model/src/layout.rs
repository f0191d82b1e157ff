//! Layout tree
//!
//! The layout is a closed set of node kinds: grid rows, grid items, and the
//! visualization panels grid items carry. Code that needs to tell them apart
//! matches on [`LayoutNode`] or [`ElementRef`] instead of probing types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Stable key of a layout element (row, grid item, or panel)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKey(String);

impl ElementKey {
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ElementKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A visualization panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VizPanel {
    pub key: ElementKey,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub plugin_id: String,
    /// Plugin options, opaque to the session layer
    #[serde(default)]
    pub options: Value,
    #[serde(default)]
    pub field_config: Value,
}

impl VizPanel {
    #[must_use]
    pub fn new(key: impl Into<ElementKey>, title: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: String::new(),
            plugin_id: plugin_id.into(),
            options: Value::Null,
            field_config: Value::Null,
        }
    }
}

/// Grid cell holding exactly one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridItem {
    pub key: ElementKey,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub panel: VizPanel,
}

impl GridItem {
    /// Grid item keyed after its panel (`grid-item-<panel key>`)
    #[must_use]
    pub fn for_panel(panel: VizPanel, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            key: ElementKey::new(format!("grid-item-{}", panel.key)),
            x,
            y,
            width,
            height,
            panel,
        }
    }
}

/// Collapsible row grouping grid items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub key: ElementKey,
    pub title: String,
    #[serde(default)]
    pub collapsed: bool,
    pub y: u32,
    #[serde(default)]
    pub children: Vec<GridItem>,
}

/// Top-level layout node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutNode {
    Row(GridRow),
    Item(GridItem),
}

impl LayoutNode {
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ElementKey {
        match self {
            Self::Row(row) => &row.key,
            Self::Item(item) => &item.key,
        }
    }

    /// Grid items directly owned by this node
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[GridItem] {
        match self {
            Self::Row(row) => &row.children,
            Self::Item(item) => std::slice::from_ref(item),
        }
    }
}

/// Discriminant of a layout element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Row,
    Item,
    Panel,
}

/// Borrowed view of any layout element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRef<'a> {
    Row(&'a GridRow),
    Item(&'a GridItem),
    Panel(&'a VizPanel),
}

impl ElementRef<'_> {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Row(_) => ElementKind::Row,
            Self::Item(_) => ElementKind::Item,
            Self::Panel(_) => ElementKind::Panel,
        }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &ElementKey {
        match self {
            Self::Row(row) => &row.key,
            Self::Item(item) => &item.key,
            Self::Panel(panel) => &panel.key,
        }
    }

    /// Human-facing title of the element
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Row(row) => &row.title,
            Self::Item(item) => &item.panel.title,
            Self::Panel(panel) => &panel.title,
        }
    }
}

/// Node taken out of the layout
#[derive(Debug, Clone, PartialEq)]
pub enum RemovedNode {
    Row(GridRow),
    Item(GridItem),
}

/// Everything needed to put a removed element back where it was
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedElement {
    /// Row the item lived in; `None` for top-level nodes
    pub parent: Option<ElementKey>,
    pub index: usize,
    pub node: RemovedNode,
}

impl RemovedElement {
    #[must_use]
    pub fn key(&self) -> &ElementKey {
        match &self.node {
            RemovedNode::Row(row) => &row.key,
            RemovedNode::Item(item) => &item.key,
        }
    }

    /// Keys of every element that left the layout with this removal
    #[must_use]
    pub fn contained_keys(&self) -> Vec<ElementKey> {
        match &self.node {
            RemovedNode::Row(row) => std::iter::once(row.key.clone())
                .chain(
                    row.children
                        .iter()
                        .flat_map(|item| [item.key.clone(), item.panel.key.clone()]),
                )
                .collect(),
            RemovedNode::Item(item) => vec![item.key.clone(), item.panel.key.clone()],
        }
    }
}
