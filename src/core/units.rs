//! Unit conversion between parameter values and unit-tagged cells
//!
//! The host stores quantities in its internal base unit per family and tags
//! them with the family. Only length and angle are synchronized; every other
//! family the host knows about is rejected on decode.

use crate::diagnostics::Diagnostics;
use crate::error::{SyncError, SyncResult};
use crate::types::{UnitFamily, Value};
use regex::Regex;

/// Unit family as reported by a unit-tagged cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostUnit {
    Length,
    Angle,
    /// Any family outside the supported pair (Mass, Time, ...)
    Other(String),
}

impl HostUnit {
    fn from_type_name(name: &str) -> Self {
        match name {
            "Length" => HostUnit::Length,
            "Angle" => HostUnit::Angle,
            other => HostUnit::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            HostUnit::Length => "Length",
            HostUnit::Angle => "Angle",
            HostUnit::Other(name) => name,
        }
    }
}

struct UnitDef {
    /// Accepted spellings, the first is the host abbreviation
    names: &'static [&'static str],
    family: &'static str,
    /// Factor to the family's base unit
    scale: f64,
}

#[rustfmt::skip]
const UNITS: &[UnitDef] = &[
    // Length, base millimeter
    UnitDef { names: &["mm", "millimeter", "millimeters", "millimetre", "millimetres"], family: "Length", scale: 1.0 },
    UnitDef { names: &["um", "µm", "micrometer", "micrometers", "micron"], family: "Length", scale: 0.001 },
    UnitDef { names: &["cm", "centimeter", "centimeters", "centimetre"], family: "Length", scale: 10.0 },
    UnitDef { names: &["m", "meter", "meters", "metre", "metres"], family: "Length", scale: 1000.0 },
    UnitDef { names: &["km", "kilometer", "kilometers", "kilometre"], family: "Length", scale: 1_000_000.0 },
    UnitDef { names: &["in", "inch", "inches", "\""], family: "Length", scale: 25.4 },
    UnitDef { names: &["ft", "foot", "feet", "'"], family: "Length", scale: 304.8 },
    // Angle, base degree
    UnitDef { names: &["deg", "degree", "degrees", "°"], family: "Angle", scale: 1.0 },
    UnitDef { names: &["rad", "radian", "radians"], family: "Angle", scale: 180.0 / std::f64::consts::PI },
    UnitDef { names: &["arcmin", "arcminute", "arcminutes"], family: "Angle", scale: 1.0 / 60.0 },
    UnitDef { names: &["arcsec", "arcsecond", "arcseconds"], family: "Angle", scale: 1.0 / 3600.0 },
    // Known to the host but not synchronized
    UnitDef { names: &["g", "gram", "grams"], family: "Mass", scale: 0.001 },
    UnitDef { names: &["kg", "kilogram", "kilograms"], family: "Mass", scale: 1.0 },
    UnitDef { names: &["s", "second", "seconds"], family: "TimeSpan", scale: 1.0 },
    UnitDef { names: &["min", "minute", "minutes"], family: "TimeSpan", scale: 60.0 },
    UnitDef { names: &["h", "hour", "hours"], family: "TimeSpan", scale: 3600.0 },
    UnitDef { names: &["N", "newton", "newtons"], family: "Force", scale: 1.0 },
    UnitDef { names: &["Pa", "pascal", "pascals"], family: "Pressure", scale: 1.0 },
];

/// A unit found in the conversion table
#[derive(Debug, Clone, PartialEq)]
pub struct KnownUnit {
    pub abbreviation: &'static str,
    pub family: HostUnit,
    pub scale: f64,
}

/// Stateless converter backed by a static unit table
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConverter;

impl UnitConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Look up a unit by abbreviation or name
    pub fn lookup(&self, unit: &str) -> Option<KnownUnit> {
        let unit = unit.trim();
        UNITS
            .iter()
            .find(|def| def.names.contains(&unit))
            .or_else(|| {
                // Names are case-insensitive, abbreviations are not ("m" vs "M")
                let lower = unit.to_lowercase();
                UNITS
                    .iter()
                    .find(|def| def.names[1..].contains(&lower.as_str()))
            })
            .map(|def| KnownUnit {
                abbreviation: def.names[0],
                family: HostUnit::from_type_name(def.family),
                scale: def.scale,
            })
    }

    /// Split a quantity literal such as `"10 mm"` or `"2.5"` into magnitude
    /// and unit. Returns `None` if the text does not start with a number.
    pub fn split_quantity<'t>(&self, text: &'t str) -> SyncResult<Option<(f64, Option<&'t str>)>> {
        let pattern = Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(\S.*?)?\s*$")
            .map_err(|e| SyncError::Validation(format!("Regex error: {}", e)))?;

        let Some(captures) = pattern.captures(text) else {
            return Ok(None);
        };
        let magnitude: f64 = match captures.get(1).map(|m| m.as_str().parse()) {
            Some(Ok(v)) => v,
            _ => return Ok(None),
        };
        let unit = captures.get(2).map(|m| m.as_str());
        Ok(Some((magnitude, unit)))
    }

    /// Decode a unit-tagged host value. Only length and angle are supported.
    pub fn decode(&self, magnitude: f64, unit: &HostUnit) -> SyncResult<Value> {
        match unit {
            HostUnit::Length => Ok(Value::length(magnitude)),
            HostUnit::Angle => Ok(Value::angle(magnitude)),
            HostUnit::Other(_) => Err(SyncError::Unit(format!(
                "Unknown unit type '{}'",
                unit.type_name()
            ))),
        }
    }

    /// Parse a parameter value literal (`"10 mm"`, `"90 deg"`, `"3"`) into a
    /// [`Value`] normalized to the family's base unit.
    pub fn parse_value(&self, text: &str) -> SyncResult<Value> {
        let (magnitude, unit) = self.split_quantity(text)?.ok_or_else(|| {
            SyncError::Type(format!(
                "Value '{}' must be a number or a quantity like '10 mm'",
                text
            ))
        })?;

        let Some(unit) = unit else {
            return Ok(Value::Dimensionless(magnitude));
        };

        let known = self
            .lookup(unit)
            .ok_or_else(|| SyncError::Unit(format!("Unknown unit '{}' in '{}'", unit, text)))?;
        self.decode(magnitude * known.scale, &known.family)
    }

    /// Resolve a stored `(magnitude, unit)` pair to the host's base unit.
    /// Unknown units keep their magnitude and are reported as their own family.
    pub fn resolve(&self, magnitude: f64, unit: &str) -> (f64, HostUnit) {
        match self.lookup(unit) {
            Some(known) => (magnitude * known.scale, known.family),
            None => (magnitude, HostUnit::Other(unit.to_string())),
        }
    }

    /// Host abbreviation for a unit name. Unrecognised units are passed
    /// through unchanged with a warning.
    pub fn host_abbreviation(&self, unit: &str, diagnostics: &mut Diagnostics) -> String {
        match self.lookup(unit) {
            Some(known) => known.abbreviation.to_string(),
            None => {
                diagnostics.warn(format!(
                    "Unknown unit '{}', writing it unconverted",
                    unit
                ));
                unit.to_string()
            }
        }
    }

    /// Text for the unit-tagged setter, e.g. `"10 mm"`
    pub fn encode_quantity(
        &self,
        magnitude: f64,
        family: UnitFamily,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let abbreviation = self.host_abbreviation(family.base_unit(), diagnostics);
        format!("{} {}", magnitude, abbreviation)
    }
}
