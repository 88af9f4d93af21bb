use std::collections::BTreeSet;
use std::fmt;

//==============================================================================
// Values
//==============================================================================

/// Supported unit families. Each family fixes the base unit values are
/// normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    /// Millimeter
    Length,
    /// Degree
    Angle,
}

impl UnitFamily {
    /// Name of the base unit the family normalizes to
    pub fn base_unit(&self) -> &'static str {
        match self {
            UnitFamily::Length => "millimeter",
            UnitFamily::Angle => "degree",
        }
    }
}

/// A parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Plain number without unit
    Dimensionless(f64),
    /// Magnitude in the family's base unit
    Quantity { magnitude: f64, family: UnitFamily },
}

impl Value {
    pub fn length(millimeters: f64) -> Self {
        Value::Quantity {
            magnitude: millimeters,
            family: UnitFamily::Length,
        }
    }

    pub fn angle(degrees: f64) -> Self {
        Value::Quantity {
            magnitude: degrees,
            family: UnitFamily::Angle,
        }
    }

    /// Numeric part of the value, in base units for quantities
    pub fn magnitude(&self) -> f64 {
        match self {
            Value::Dimensionless(v) => *v,
            Value::Quantity { magnitude, .. } => *magnitude,
        }
    }

    pub fn family(&self) -> Option<UnitFamily> {
        match self {
            Value::Dimensionless(_) => None,
            Value::Quantity { family, .. } => Some(*family),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Dimensionless(v) => write!(f, "{v}"),
            Value::Quantity { magnitude, family } => {
                let abbr = match family {
                    UnitFamily::Length => "mm",
                    UnitFamily::Angle => "deg",
                };
                write!(f, "{magnitude} {abbr}")
            }
        }
    }
}

//==============================================================================
// Parameters
//==============================================================================

/// One named parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub name: String,
    pub value: Value,
    pub description: String,
    /// Label of the variable set the parameter belongs to
    pub group: Option<String>,
}

impl ParameterRecord {
    pub fn new(name: impl Into<String>, value: Value, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            description: description.into(),
            group: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Ordered collection of parameters with unique names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    records: Vec<ParameterRecord>,
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ParameterRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ParameterRecord> {
        self.records.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }
}

impl FromIterator<ParameterRecord> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = ParameterRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ParameterSet {
    type Item = ParameterRecord;
    type IntoIter = std::vec::IntoIter<ParameterRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a ParameterRecord;
    type IntoIter = std::slice::Iter<'a, ParameterRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

//==============================================================================
// Table layout
//==============================================================================

/// Where the parameter columns live in a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub name_column: String,
    pub value_column: String,
    pub description_column: String,
    /// Row holding the header labels, always the first used row
    pub title_row: u32,
    pub rows: BTreeSet<u32>,
    pub columns: BTreeSet<String>,
}

impl TableLayout {
    /// Rows below the header
    pub fn content_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.iter().copied().filter(move |r| *r != self.title_row)
    }

    /// Last used row
    pub fn last_row(&self) -> u32 {
        self.rows.iter().next_back().copied().unwrap_or(self.title_row)
    }

    pub fn name_cell(&self, row: u32) -> String {
        format!("{}{}", self.name_column, row)
    }

    pub fn value_cell(&self, row: u32) -> String {
        format!("{}{}", self.value_column, row)
    }

    pub fn description_cell(&self, row: u32) -> String {
        format!("{}{}", self.description_column, row)
    }
}

//==============================================================================
// Variable sets
//==============================================================================

/// How a variable set property gets its value
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Literal(f64),
    /// `<table>.<alias>` reference
    Expression(String),
}

//==============================================================================
// Diff
//==============================================================================

/// A difference between the parameters in the document and the incoming set
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEvent {
    Removed {
        name: String,
        value: Value,
        description: String,
    },
    Changed {
        name: String,
        old: Value,
        new: Value,
    },
}

impl DiffEvent {
    pub fn name(&self) -> &str {
        match self {
            DiffEvent::Removed { name, .. } | DiffEvent::Changed { name, .. } => name,
        }
    }
}

impl fmt::Display for DiffEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffEvent::Removed {
                name,
                value,
                description,
            } => write!(
                f,
                "Parameter will be deleted: name = '{name}', val = {value}, desc = '{description}'"
            ),
            DiffEvent::Changed { name, old, new } => {
                write!(f, "Parameter will change: name = '{name}', {old} -> {new}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::length(10.0).to_string(), "10 mm");
        assert_eq!(Value::angle(2.5).to_string(), "2.5 deg");
        assert_eq!(Value::Dimensionless(3.0).to_string(), "3");
    }

    #[test]
    fn test_layout_content_rows_skip_title() {
        let layout = TableLayout {
            name_column: "A".to_string(),
            value_column: "B".to_string(),
            description_column: "C".to_string(),
            title_row: 2,
            rows: [2, 3, 5].into_iter().collect(),
            columns: ["A", "B", "C"].iter().map(|c| c.to_string()).collect(),
        };
        assert_eq!(layout.content_rows().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(layout.last_row(), 5);
        assert_eq!(layout.value_cell(5), "B5");
    }
}
