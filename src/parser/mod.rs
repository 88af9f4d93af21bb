//! Parameter file parsing
//!
//! A parameter file holds parallel sequences, one entry per parameter:
//!
//! ```yaml
//! Name:        [width, tilt, count]
//! Value:       [10 mm, 15 deg, 4]
//! Description: [panel width, "", bolts per side]
//! VarSet:      [Panel, Panel, null]
//! ```
//!
//! `Description` and `VarSet` (also accepted as `Group`) are optional. JSON
//! files use the same keys.

use crate::core::units::UnitConverter;
use crate::error::{SyncError, SyncResult};
use crate::types::{ParameterRecord, ParameterSet, Value};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Serialization format of a parameter file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFormat {
    Yaml,
    Json,
}

impl ParameterFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> SyncResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(ParameterFormat::Yaml),
            Some("json") => Ok(ParameterFormat::Json),
            _ => Err(SyncError::Validation(format!(
                "Unsupported parameter file '{}'. Use .yaml, .yml or .json",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParameterColumns {
    #[serde(rename = "Name")]
    name: Option<Vec<String>>,
    #[serde(rename = "Value")]
    value: Option<Vec<serde_json::Value>>,
    #[serde(rename = "Description")]
    description: Option<Vec<Option<String>>>,
    #[serde(rename = "VarSet", alias = "Group")]
    group: Option<Vec<Option<String>>>,
}

/// Parse a parameter file
///
/// # Example
/// ```no_run
/// use paramsync::parser::parse_parameters;
/// use std::path::Path;
///
/// let params = parse_parameters(Path::new("params.yaml"))?;
/// println!("Parameters: {}", params.len());
/// # Ok::<(), paramsync::error::SyncError>(())
/// ```
pub fn parse_parameters(path: &Path) -> SyncResult<ParameterSet> {
    let format = ParameterFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_parameters_str(&content, format)
}

/// Parse parameter file content
pub fn parse_parameters_str(content: &str, format: ParameterFormat) -> SyncResult<ParameterSet> {
    let columns: ParameterColumns = match format {
        ParameterFormat::Yaml => serde_yaml::from_str(content)?,
        ParameterFormat::Json => serde_json::from_str(content)?,
    };
    build_parameter_set(columns, UnitConverter::new())
}

fn check_length(column: &str, len: Option<usize>, expected: usize) -> SyncResult<()> {
    match len {
        Some(len) if len != expected => Err(SyncError::Validation(format!(
            "'{}' has {} entries, expected {} (one per name)",
            column, len, expected
        ))),
        _ => Ok(()),
    }
}

fn build_parameter_set(
    columns: ParameterColumns,
    units: UnitConverter,
) -> SyncResult<ParameterSet> {
    let names = columns
        .name
        .ok_or_else(|| SyncError::Validation("Missing 'Name' list".to_string()))?;
    let values = columns
        .value
        .ok_or_else(|| SyncError::Validation("Missing 'Value' list".to_string()))?;

    check_length("Value", Some(values.len()), names.len())?;
    check_length("Description", columns.description.as_ref().map(Vec::len), names.len())?;
    check_length("VarSet", columns.group.as_ref().map(Vec::len), names.len())?;

    let mut seen = HashSet::new();
    let mut params = ParameterSet::new();

    for (index, (name, raw)) in names.into_iter().zip(values).enumerate() {
        if name.trim().is_empty() {
            return Err(SyncError::Validation(format!(
                "Parameter #{} has an empty name",
                index + 1
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(SyncError::Validation(format!(
                "Duplicate parameter name '{}'",
                name
            )));
        }

        let value = parse_value(&raw, units).map_err(|e| annotate(e, &name))?;
        let description = columns
            .description
            .as_ref()
            .and_then(|d| d[index].clone())
            .unwrap_or_default();
        let group = columns.group.as_ref().and_then(|g| g[index].clone());

        params.push(ParameterRecord {
            name,
            value,
            description,
            group,
        });
    }

    Ok(params)
}

fn annotate(error: SyncError, name: &str) -> SyncError {
    match error {
        SyncError::Type(msg) => SyncError::Type(format!("Parameter '{}': {}", name, msg)),
        SyncError::Unit(msg) => SyncError::Unit(format!("Parameter '{}': {}", name, msg)),
        other => other,
    }
}

fn parse_value(raw: &serde_json::Value, units: UnitConverter) -> SyncResult<Value> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Dimensionless)
            .ok_or_else(|| SyncError::Type(format!("Number {} is out of range", n))),
        serde_json::Value::String(s) => units.parse_value(s),
        other => Err(SyncError::Type(format!(
            "Value ({}) must be a number or a quantity string",
            other
        ))),
    }
}
