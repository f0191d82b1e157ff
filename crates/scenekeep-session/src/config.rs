//! Session configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! max_undo_entries = 50
//! diff_mode = "inline"
//! edit_only_query_params = ["editview", "editPanel"]
//!
//! [change_options]
//! save_time_range = true
//!
//! [discard_prompt]
//! title = "Discard?"
//! ```

use crate::error::ConfigError;
use scenekeep_model::ChangeOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where save-model diffs are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// On a background thread fed in posting order
    #[default]
    Worker,
    /// Synchronously, on the caller's thread
    Inline,
    /// Not at all; only the dirty flag is maintained
    Disabled,
}

/// Texts of the "discard unsaved changes?" confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscardPrompt {
    pub title: String,
    pub text: String,
    pub yes_text: String,
}

impl Default for DiscardPrompt {
    fn default() -> Self {
        Self {
            title: "Discard changes to dashboard?".to_string(),
            text: "You have unsaved changes to this dashboard. Are you sure you want to discard them?"
                .to_string(),
            yes_text: "Discard".to_string(),
        }
    }
}

/// Edit session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Undo history depth; oldest entries are dropped beyond it
    pub max_undo_entries: usize,
    pub diff_mode: DiffMode,
    /// Query parameters that only make sense while editing
    pub edit_only_query_params: Vec<String>,
    /// Which view-state changes count as edits
    pub change_options: ChangeOptions,
    pub discard_prompt: DiscardPrompt,
}

impl SessionConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_max_undo_entries(mut self, max: usize) -> Self {
        self.max_undo_entries = max;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_change_options(mut self, options: ChangeOptions) -> Self {
        self.change_options = options;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_edit_only_query_params(mut self, params: Vec<String>) -> Self {
        self.edit_only_query_params = params;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown enum values
    /// - `ConfigError::Invalid` if a value is out of range
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`SessionConfig::from_toml_str`]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_undo_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_undo_entries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.edit_only_query_params.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid {
                field: "edit_only_query_params",
                reason: "parameter names cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_undo_entries: 100,
            diff_mode: DiffMode::Worker,
            edit_only_query_params: vec![
                "editview".to_string(),
                "editPanel".to_string(),
                "editIndex".to_string(),
            ],
            change_options: ChangeOptions::default(),
            discard_prompt: DiscardPrompt::default(),
        }
    }
}
