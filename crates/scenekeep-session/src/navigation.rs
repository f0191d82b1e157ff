//! Location handling
//!
//! The session never talks to a real router. It reads and replaces the
//! current location through [`Navigator`], which hosts implement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Path plus query parameters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UrlState {
    pub path: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl UrlState {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Parse `path?k=v&k2=v2`; a key without `=` gets an empty value
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_string(), value.to_string())
            })
            .collect();
        Self {
            path: path.to_string(),
            query,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_param(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            if value.is_empty() {
                write!(f, "{sep}{key}")?;
            } else {
                write!(f, "{sep}{key}={value}")?;
            }
        }
        Ok(())
    }
}

/// Host router seam
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send {
    /// Current location
    fn location(&self) -> UrlState;

    /// Replace the current location without adding a history entry
    fn replace(&mut self, url: UrlState);
}

/// Navigator that only remembers where it is
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigator {
    current: UrlState,
    replaced: Vec<UrlState>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(start: UrlState) -> Self {
        Self {
            current: start,
            replaced: Vec::new(),
        }
    }

    /// Locations passed to `replace`, oldest first
    #[inline]
    #[must_use]
    pub fn replaced(&self) -> &[UrlState] {
        &self.replaced
    }

    /// Simulate the user navigating inside the app
    pub fn push(&mut self, url: UrlState) {
        self.current = url;
    }
}

impl Navigator for MemoryNavigator {
    fn location(&self) -> UrlState {
        self.current.clone()
    }

    fn replace(&mut self, url: UrlState) {
        self.replaced.push(url.clone());
        self.current = url;
    }
}

/// Copy of `url` without the given query parameters
#[must_use]
pub fn strip_edit_params(url: &UrlState, params: &[String]) -> UrlState {
    let mut stripped = url.clone();
    stripped
        .query
        .retain(|key, _| !params.iter().any(|param| param == key));
    stripped
}
