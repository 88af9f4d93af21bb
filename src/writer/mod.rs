use crate::error::SyncResult;
use crate::parser::ParameterFormat;
use crate::types::{ParameterSet, Value};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ParameterColumnsOut {
    #[serde(rename = "Name")]
    name: Vec<String>,
    #[serde(rename = "Value")]
    value: Vec<serde_json::Value>,
    #[serde(rename = "Description")]
    description: Vec<String>,
    #[serde(rename = "VarSet", skip_serializing_if = "Option::is_none")]
    group: Option<Vec<Option<String>>>,
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Dimensionless(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Quantity { .. } => serde_json::Value::String(value.to_string()),
    }
}

/// Render a parameter set in parameter file layout
pub fn parameters_to_string(params: &ParameterSet, format: ParameterFormat) -> SyncResult<String> {
    let has_groups = params.iter().any(|r| r.group.is_some());
    let columns = ParameterColumnsOut {
        name: params.iter().map(|r| r.name.clone()).collect(),
        value: params.iter().map(|r| value_to_json(&r.value)).collect(),
        description: params.iter().map(|r| r.description.clone()).collect(),
        group: has_groups.then(|| params.iter().map(|r| r.group.clone()).collect()),
    };

    let content = match format {
        ParameterFormat::Yaml => serde_yaml::to_string(&columns)?,
        ParameterFormat::Json => {
            let mut json = serde_json::to_string_pretty(&columns)?;
            json.push('\n');
            json
        }
    };
    Ok(content)
}

/// Write a parameter file; the format follows the extension
pub fn write_parameters(path: &Path, params: &ParameterSet) -> SyncResult<()> {
    let format = ParameterFormat::from_path(path)?;
    fs::write(path, parameters_to_string(params, format)?)?;
    Ok(())
}
