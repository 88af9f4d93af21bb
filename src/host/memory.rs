//! In-memory host document persisted as YAML
//!
//! ```yaml
//! objects:
//!   - name: Spreadsheet
//!     label: Spreadsheet
//!     type: sheet
//!     cells:
//!       A1: Name
//!       B1: Value
//!       C1: Description
//!       A2: width
//!       B2: { value: 10, unit: mm }
//!       C2: panel width
//!     aliases:
//!       B2: width
//!   - name: VarSet
//!     label: Uncategorised
//!     type: var_set
//!     properties:
//!       - name: width
//!         value: 10.0
//!         expression: Spreadsheet.width
//! ```

use super::{CellContent, Container, Document, ObjectInfo, ObjectKind, Sheet};
use crate::core::coordinate::parse_coordinate;
use crate::core::units::UnitConverter;
use crate::error::{SyncError, SyncResult};
use crate::types::Binding;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Accepted document file extensions
const DOCUMENT_EXTENSIONS: &[&str] = &["yaml", "yml"];

fn is_identifier(name: &str) -> SyncResult<bool> {
    let pattern = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map_err(|e| SyncError::Host(format!("Regex error: {}", e)))?;
    Ok(pattern.is_match(name))
}

/// Whether `name` reads as a cell address within the host's `A1`..`ZZ` range
fn is_cell_address(name: &str) -> SyncResult<bool> {
    let pattern = Regex::new(r"^[A-Z]{1,2}[0-9]+$")
        .map_err(|e| SyncError::Host(format!("Regex error: {}", e)))?;
    Ok(pattern.is_match(name))
}

fn normalize_coord(coord: &str) -> SyncResult<String> {
    let (column, row) = parse_coordinate(coord)?;
    Ok(format!("{}{}", column, row))
}

//==============================================================================
// Sheet
//==============================================================================

/// A stored cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredCell {
    Number(f64),
    Text(String),
    /// Magnitude and unit as written
    Quantity { value: f64, unit: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySheet {
    #[serde(default)]
    cells: BTreeMap<String, StoredCell>,
    /// Coordinate → alias
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    aliases: BTreeMap<String, String>,
}

impl MemorySheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinate carrying the given alias
    pub fn coord_for_alias(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(_, a)| a.as_str() == alias)
            .map(|(coord, _)| coord.as_str())
    }

    fn insert(&mut self, coord: &str, cell: StoredCell) -> SyncResult<()> {
        let coord = normalize_coord(coord)?;
        self.cells.insert(coord, cell);
        Ok(())
    }

    fn shift_rows<T>(
        map: BTreeMap<String, T>,
        row: u32,
        count: u32,
    ) -> SyncResult<BTreeMap<String, T>> {
        let mut shifted = BTreeMap::new();
        for (coord, item) in map {
            let (column, r) = parse_coordinate(&coord)?;
            if r >= row && r < row + count {
                continue;
            }
            let new_row = if r >= row + count { r - count } else { r };
            shifted.insert(format!("{}{}", column, new_row), item);
        }
        Ok(shifted)
    }
}

impl Sheet for MemorySheet {
    fn used_cells(&self) -> Vec<String> {
        self.cells.keys().cloned().collect()
    }

    fn cell(&self, coord: &str) -> CellContent {
        let Ok(coord) = normalize_coord(coord) else {
            return CellContent::Empty;
        };
        match self.cells.get(&coord) {
            None => CellContent::Empty,
            Some(StoredCell::Text(s)) => CellContent::Text(s.clone()),
            Some(StoredCell::Number(v)) => CellContent::Number(*v),
            Some(StoredCell::Quantity { value, unit }) => {
                let (magnitude, unit) = UnitConverter::new().resolve(*value, unit);
                CellContent::Quantity { magnitude, unit }
            }
        }
    }

    fn set_text(&mut self, coord: &str, text: &str) -> SyncResult<()> {
        if text.is_empty() {
            let coord = normalize_coord(coord)?;
            self.cells.remove(&coord);
            return Ok(());
        }
        self.insert(coord, StoredCell::Text(text.to_string()))
    }

    fn set_quantity(&mut self, coord: &str, quantity: &str) -> SyncResult<()> {
        let parsed = UnitConverter::new().split_quantity(quantity)?;
        let cell = match parsed {
            Some((value, Some(unit))) => StoredCell::Quantity {
                value,
                unit: unit.to_string(),
            },
            Some((value, None)) => StoredCell::Number(value),
            None => {
                return Err(SyncError::Host(format!(
                    "Cannot set {} to '{}': not a quantity",
                    coord, quantity
                )))
            }
        };
        self.insert(coord, cell)
    }

    fn set_float(&mut self, coord: &str, value: f64) -> SyncResult<()> {
        self.insert(coord, StoredCell::Number(value))
    }

    fn remove_rows(&mut self, row: u32, count: u32) -> SyncResult<()> {
        if count == 0 {
            return Ok(());
        }
        self.cells = Self::shift_rows(std::mem::take(&mut self.cells), row, count)?;
        self.aliases = Self::shift_rows(std::mem::take(&mut self.aliases), row, count)?;
        Ok(())
    }

    fn alias(&self, coord: &str) -> Option<String> {
        let coord = normalize_coord(coord).ok()?;
        self.aliases.get(&coord).cloned()
    }

    fn set_alias(&mut self, coord: &str, alias: &str) -> SyncResult<()> {
        let coord = normalize_coord(coord)?;
        if alias.is_empty() {
            self.aliases.remove(&coord);
            return Ok(());
        }
        if !is_identifier(alias)? || is_cell_address(alias)? {
            return Err(SyncError::Host(format!(
                "Invalid alias '{}' for cell {}",
                alias, coord
            )));
        }
        if let Some(existing) = self.coord_for_alias(alias) {
            if existing != coord {
                return Err(SyncError::Host(format!(
                    "Alias '{}' is already used by cell {}",
                    alias, existing
                )));
            }
        }
        self.aliases.insert(coord, alias.to_string());
        Ok(())
    }

    fn recompute(&mut self) -> SyncResult<()> {
        // Cells hold values only, nothing to evaluate
        Ok(())
    }
}

//==============================================================================
// Variable set
//==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredProperty {
    name: String,
    #[serde(default)]
    value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryContainer {
    #[serde(default)]
    properties: Vec<StoredProperty>,
    #[serde(skip)]
    recomputes: usize,
}

impl MemoryContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How a property gets its value
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.find(name).map(|p| match &p.expression {
            Some(expr) => Binding::Expression(expr.clone()),
            None => Binding::Literal(p.value),
        })
    }

    /// Number of times this container was recomputed since load
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    fn find(&self, name: &str) -> Option<&StoredProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn find_mut(&mut self, name: &str) -> SyncResult<&mut StoredProperty> {
        self.properties
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| SyncError::Host(format!("No property '{}'", name)))
    }
}

impl Container for MemoryContainer {
    fn properties(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }

    fn value(&self, name: &str) -> Option<f64> {
        self.find(name).map(|p| p.value)
    }

    fn add_scalar_property(&mut self, name: &str) -> SyncResult<()> {
        if !is_identifier(name)? {
            return Err(SyncError::Host(format!("Invalid property name '{}'", name)));
        }
        if self.find(name).is_some() {
            return Err(SyncError::Host(format!("Property '{}' already exists", name)));
        }
        self.properties.push(StoredProperty {
            name: name.to_string(),
            value: 0.0,
            expression: None,
        });
        Ok(())
    }

    fn set_literal(&mut self, name: &str, value: f64) -> SyncResult<()> {
        let property = self.find_mut(name)?;
        property.value = value;
        property.expression = None;
        Ok(())
    }

    fn set_expression(&mut self, name: &str, expression: &str) -> SyncResult<()> {
        let property = self.find_mut(name)?;
        property.expression = Some(expression.to_string());
        Ok(())
    }

    fn recompute(&mut self) -> SyncResult<()> {
        self.recomputes += 1;
        Ok(())
    }
}

//==============================================================================
// Document
//==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ObjectData {
    Sheet(MemorySheet),
    VarSet(MemoryContainer),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredObject {
    name: String,
    label: String,
    #[serde(flatten)]
    data: ObjectData,
}

impl StoredObject {
    fn kind(&self) -> ObjectKind {
        match self.data {
            ObjectData::Sheet(_) => ObjectKind::Sheet,
            ObjectData::VarSet(_) => ObjectKind::VarSet,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DocumentFile {
    #[serde(default)]
    objects: Vec<StoredObject>,
}

/// YAML-backed document
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    objects: Vec<StoredObject>,
    path: Option<PathBuf>,
}

impl MemoryDocument {
    /// Create an empty, unsaved document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document file
    pub fn open(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Err(SyncError::Validation(format!(
                "Couldn't find file '{}'",
                path.display()
            )));
        }
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !DOCUMENT_EXTENSIONS.contains(&extension) {
            return Err(SyncError::Validation(format!(
                "Invalid file '{}': expected a .yaml or .yml document",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let mut document = Self::from_yaml(&content)?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn from_yaml(content: &str) -> SyncResult<Self> {
        let file: DocumentFile = if content.trim().is_empty() {
            DocumentFile::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(Self {
            objects: file.objects,
            path: None,
        })
    }

    pub fn to_yaml(&self) -> SyncResult<String> {
        let file = DocumentFile {
            objects: self.objects.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn unique_name(&self, kind: ObjectKind, label: &str) -> String {
        let sanitized: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let base = if sanitized.is_empty() || sanitized.starts_with(|c: char| c.is_ascii_digit()) {
            match kind {
                ObjectKind::Sheet => "Spreadsheet".to_string(),
                ObjectKind::VarSet => "VarSet".to_string(),
            }
        } else {
            sanitized
        };

        let taken = |name: &str| self.objects.iter().any(|o| o.name == name);
        if !taken(&base) {
            return base;
        }
        let mut index = 1;
        loop {
            let candidate = format!("{}{:03}", base, index);
            if !taken(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    /// Evaluate a `<table>.<alias>` reference against the document's sheets
    fn evaluate_reference(&self, expression: &str) -> SyncResult<f64> {
        let (table, alias) = expression.split_once('.').ok_or_else(|| {
            SyncError::Host(format!("Unsupported expression '{}'", expression))
        })?;

        let sheet = self
            .objects
            .iter()
            .filter(|o| o.name == table || o.label == table)
            .find_map(|o| match &o.data {
                ObjectData::Sheet(sheet) => Some(sheet),
                ObjectData::VarSet(_) => None,
            })
            .ok_or_else(|| {
                SyncError::Host(format!("Expression '{}': no sheet '{}'", expression, table))
            })?;

        let coord = sheet.coord_for_alias(alias).ok_or_else(|| {
            SyncError::Host(format!("Expression '{}': no cell aliased '{}'", expression, alias))
        })?;

        match sheet.cell(coord) {
            CellContent::Number(v) => Ok(v),
            CellContent::Quantity { magnitude, .. } => Ok(magnitude),
            other => Err(SyncError::Host(format!(
                "Expression '{}': cell {} holds {}, not a number",
                expression,
                coord,
                other.kind_name()
            ))),
        }
    }

    fn write_to(&self, path: &Path) -> SyncResult<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

impl Document for MemoryDocument {
    type Sheet = MemorySheet;
    type Container = MemoryContainer;

    fn objects(&self) -> Vec<ObjectInfo> {
        self.objects
            .iter()
            .map(|o| ObjectInfo {
                identifier: o.name.clone(),
                label: o.label.clone(),
                kind: o.kind(),
            })
            .collect()
    }

    fn add_object(&mut self, kind: ObjectKind, label: &str) -> SyncResult<String> {
        let name = self.unique_name(kind, label);
        let data = match kind {
            ObjectKind::Sheet => ObjectData::Sheet(MemorySheet::new()),
            ObjectKind::VarSet => ObjectData::VarSet(MemoryContainer::new()),
        };
        self.objects.push(StoredObject {
            name: name.clone(),
            label: label.to_string(),
            data,
        });
        Ok(name)
    }

    fn remove_object(&mut self, identifier: &str) -> SyncResult<()> {
        let index = self
            .objects
            .iter()
            .position(|o| o.name == identifier)
            .ok_or_else(|| SyncError::Host(format!("No object '{}'", identifier)))?;
        self.objects.remove(index);
        Ok(())
    }

    fn sheet(&self, identifier: &str) -> Option<&MemorySheet> {
        self.objects.iter().find_map(|o| match &o.data {
            ObjectData::Sheet(sheet) if o.name == identifier => Some(sheet),
            _ => None,
        })
    }

    fn sheet_mut(&mut self, identifier: &str) -> Option<&mut MemorySheet> {
        self.objects.iter_mut().find_map(|o| match &mut o.data {
            ObjectData::Sheet(sheet) if o.name == identifier => Some(sheet),
            _ => None,
        })
    }

    fn container(&self, identifier: &str) -> Option<&MemoryContainer> {
        self.objects.iter().find_map(|o| match &o.data {
            ObjectData::VarSet(container) if o.name == identifier => Some(container),
            _ => None,
        })
    }

    fn container_mut(&mut self, identifier: &str) -> Option<&mut MemoryContainer> {
        self.objects.iter_mut().find_map(|o| match &mut o.data {
            ObjectData::VarSet(container) if o.name == identifier => Some(container),
            _ => None,
        })
    }

    fn recompute(&mut self) -> SyncResult<()> {
        // Resolve every expression first, then write the results back
        let mut resolved = Vec::new();
        for (obj_index, object) in self.objects.iter().enumerate() {
            if let ObjectData::VarSet(container) = &object.data {
                for (prop_index, property) in container.properties.iter().enumerate() {
                    if let Some(expression) = &property.expression {
                        let value = self.evaluate_reference(expression)?;
                        resolved.push((obj_index, prop_index, value));
                    }
                }
            }
        }

        for (obj_index, prop_index, value) in resolved {
            if let ObjectData::VarSet(container) = &mut self.objects[obj_index].data {
                container.properties[prop_index].value = value;
            }
        }
        Ok(())
    }

    fn save(&mut self) -> SyncResult<()> {
        let path = self.path.clone().ok_or_else(|| {
            SyncError::Host("Document was never saved; use save_as".to_string())
        })?;
        self.write_to(&path)
    }

    fn save_as(&mut self, path: &Path) -> SyncResult<()> {
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}
