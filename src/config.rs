//! Sync configuration
//!
//! All fields have defaults so an empty (or absent) config file is valid.
//!
//! ```yaml
//! sheet: Spreadsheet
//! default_group: Uncategorised
//! binding: expression
//! headers:
//!   name: Name
//!   value: Value
//!   description: Description
//! ```

use crate::error::SyncResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Object identifier of the parameter table
pub const DEFAULT_SHEET: &str = "Spreadsheet";

/// Variable set label for parameters without a group
pub const DEFAULT_GROUP: &str = "Uncategorised";

/// Header labels marking the three parameter columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLabels {
    pub name: String,
    pub value: String,
    pub description: String,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            value: "Value".to_string(),
            description: "Description".to_string(),
        }
    }
}

/// How rebuilt variable set properties get their values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
    /// Reference the table cell through its alias
    #[default]
    Expression,
    /// Copy the value
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub sheet: String,
    pub headers: HeaderLabels,
    pub default_group: String,
    pub binding: BindingMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_string(),
            headers: HeaderLabels::default(),
            default_group: DEFAULT_GROUP.to_string(),
            binding: BindingMode::default(),
        }
    }
}

impl SyncConfig {
    /// Load a YAML config file
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> SyncResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
