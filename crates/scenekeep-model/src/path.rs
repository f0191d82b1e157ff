//! Paths into save models
//!
//! [`DocPath`] addresses a single value inside a document's JSON save model,
//! e.g. `layout.0.panel.title`. Diff entries are keyed by it.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Hierarchical address of a value within a save model
///
/// Object keys and array indices are both stored as string segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// Empty path (the whole document)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level key this path lives under, if any
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Path one level up; `None` at the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Append an object key
    #[inline]
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(key.into());
        next
    }

    /// Append an array index
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// `layout.0` is a prefix of `layout.0.panel.title`
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "$" {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.chars().any(char::is_whitespace) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl serde::Serialize for DocPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Errors parsing a [`DocPath`]
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path contains empty segment")]
    EmptySegment,

    #[error("invalid segment: {0:?} (whitespace not allowed)")]
    InvalidSegment(String),
}
