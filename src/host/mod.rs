//! Host document capabilities
//!
//! The sync core only talks to a document through these traits. An adapter
//! implements them against a real host; [`MemoryDocument`] is the bundled
//! YAML-backed implementation.

mod memory;

pub use memory::{MemoryContainer, MemoryDocument, MemorySheet};

use crate::core::units::HostUnit;
use crate::error::SyncResult;
use std::path::Path;

/// Kind of document object the sync cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Parameter table
    Sheet,
    /// Variable container
    VarSet,
}

/// Identifier, label and kind of a document object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub identifier: String,
    pub label: String,
    pub kind: ObjectKind,
}

/// Content of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Coordinate not populated
    Empty,
    Text(String),
    Number(f64),
    /// Magnitude in the host's base unit for the family
    Quantity { magnitude: f64, unit: HostUnit },
}

impl CellContent {
    pub fn is_empty(&self) -> bool {
        match self {
            CellContent::Empty => true,
            CellContent::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Literal text of the cell, if it holds text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellContent::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            CellContent::Empty => "empty",
            CellContent::Text(_) => "text",
            CellContent::Number(_) => "number",
            CellContent::Quantity { .. } => "quantity",
        }
    }
}

/// Tabular object
pub trait Sheet {
    /// Coordinates of every populated cell
    fn used_cells(&self) -> Vec<String>;

    fn cell(&self, coord: &str) -> CellContent;

    /// Store a literal string
    fn set_text(&mut self, coord: &str, text: &str) -> SyncResult<()>;

    /// Store a unit-tagged value such as `"10 mm"`
    fn set_quantity(&mut self, coord: &str, quantity: &str) -> SyncResult<()>;

    /// Store a bare number
    fn set_float(&mut self, coord: &str, value: f64) -> SyncResult<()>;

    /// Remove `count` rows starting at `row`, shifting later rows up
    fn remove_rows(&mut self, row: u32, count: u32) -> SyncResult<()>;

    fn alias(&self, coord: &str) -> Option<String>;

    fn set_alias(&mut self, coord: &str, alias: &str) -> SyncResult<()>;

    fn recompute(&mut self) -> SyncResult<()>;
}

/// Variable container
pub trait Container {
    /// Property names, in creation order
    fn properties(&self) -> Vec<String>;

    /// Current numeric value of a property
    fn value(&self, name: &str) -> Option<f64>;

    fn add_scalar_property(&mut self, name: &str) -> SyncResult<()>;

    fn set_literal(&mut self, name: &str, value: f64) -> SyncResult<()>;

    fn set_expression(&mut self, name: &str, expression: &str) -> SyncResult<()>;

    fn recompute(&mut self) -> SyncResult<()>;
}

/// An open host document
pub trait Document {
    type Sheet: Sheet;
    type Container: Container;

    fn objects(&self) -> Vec<ObjectInfo>;

    /// Create an object; returns its identifier
    fn add_object(&mut self, kind: ObjectKind, label: &str) -> SyncResult<String>;

    fn remove_object(&mut self, identifier: &str) -> SyncResult<()>;

    fn sheet(&self, identifier: &str) -> Option<&Self::Sheet>;

    fn sheet_mut(&mut self, identifier: &str) -> Option<&mut Self::Sheet>;

    fn container(&self, identifier: &str) -> Option<&Self::Container>;

    fn container_mut(&mut self, identifier: &str) -> Option<&mut Self::Container>;

    fn recompute(&mut self) -> SyncResult<()>;

    /// Persist to the path the document was opened from
    fn save(&mut self) -> SyncResult<()>;

    fn save_as(&mut self, path: &Path) -> SyncResult<()>;

    /// Objects of one kind
    fn objects_of(&self, kind: ObjectKind) -> Vec<ObjectInfo> {
        self.objects()
            .into_iter()
            .filter(|obj| obj.kind == kind)
            .collect()
    }
}
