//! Cell coordinate parsing (`B12` → column `B`, row 12)

use crate::error::{SyncError, SyncResult};
use regex::Regex;

/// Split a cell coordinate into its column letters and row number
pub fn parse_coordinate(coord: &str) -> SyncResult<(String, u32)> {
    let pattern = Regex::new(r"^([A-Za-z]+)([0-9]+)$")
        .map_err(|e| SyncError::Structural(format!("Regex error: {}", e)))?;

    let captures = pattern.captures(coord.trim()).ok_or_else(|| {
        SyncError::Structural(format!(
            "Invalid cell coordinate '{}': expected column letters followed by a row number",
            coord
        ))
    })?;

    let column = captures[1].to_uppercase();
    let row: u32 = captures[2]
        .parse()
        .map_err(|e| SyncError::Structural(format!("Invalid row in '{}': {}", coord, e)))?;

    Ok((column, row))
}
