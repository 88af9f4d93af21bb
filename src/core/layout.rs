//! Locating the parameter table inside a sheet
//!
//! The table is found by its header labels rather than by fixed positions:
//! whichever cells hold "Name", "Value" and "Description" define the three
//! columns, and their (shared) row is the title row. The title row must be
//! the first used row of the sheet.

use crate::config::HeaderLabels;
use crate::core::coordinate::parse_coordinate;
use crate::error::{SyncError, SyncResult};
use crate::host::{CellContent, Sheet};
use crate::types::TableLayout;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct TableLayoutDetector {
    headers: HeaderLabels,
}

impl TableLayoutDetector {
    pub fn new(headers: HeaderLabels) -> Self {
        Self { headers }
    }

    /// Scan every used cell of a sheet
    pub fn detect_sheet<S: Sheet + ?Sized>(&self, sheet: &S) -> SyncResult<TableLayout> {
        let cells = sheet.used_cells().into_iter().map(|coord| {
            let content = sheet.cell(&coord);
            (coord, content)
        });
        self.detect(cells)
    }

    /// Build the layout from `(coordinate, content)` pairs
    pub fn detect<I>(&self, cells: I) -> SyncResult<TableLayout>
    where
        I: IntoIterator<Item = (String, CellContent)>,
    {
        let mut name_column: Option<String> = None;
        let mut value_column: Option<String> = None;
        let mut description_column: Option<String> = None;
        let mut title_row: Option<u32> = None;
        let mut rows = BTreeSet::new();
        let mut columns = BTreeSet::new();

        for (coord, content) in cells {
            if content.is_empty() {
                continue;
            }
            let (column, row) = parse_coordinate(&coord)?;

            if let Some(text) = content.as_text() {
                let slot = if text == self.headers.name {
                    Some(&mut name_column)
                } else if text == self.headers.value {
                    Some(&mut value_column)
                } else if text == self.headers.description {
                    Some(&mut description_column)
                } else {
                    None
                };

                if let Some(slot) = slot {
                    *slot = Some(column.clone());
                    match title_row {
                        None => title_row = Some(row),
                        Some(existing) if existing != row => {
                            return Err(SyncError::Structural(format!(
                                "Header '{}' at {} is not on title row {}",
                                text, coord, existing
                            )));
                        }
                        Some(_) => {}
                    }
                }
            }

            columns.insert(column);
            rows.insert(row);
        }

        let name_column = name_column.ok_or_else(|| {
            SyncError::Structural(format!("No '{}' column found", self.headers.name))
        })?;
        let value_column = value_column.ok_or_else(|| {
            SyncError::Structural(format!("No '{}' column found", self.headers.value))
        })?;
        let description_column = description_column.ok_or_else(|| {
            SyncError::Structural(format!("No '{}' column found", self.headers.description))
        })?;
        if rows.is_empty() || columns.is_empty() {
            return Err(SyncError::Structural("Spreadsheet is empty".to_string()));
        }
        let title_row =
            title_row.ok_or_else(|| SyncError::Structural("No title row found".to_string()))?;

        let first_row = rows.iter().next().copied().unwrap_or(title_row);
        if title_row != first_row {
            return Err(SyncError::Structural(format!(
                "Title row {} is below data in row {}",
                title_row, first_row
            )));
        }

        Ok(TableLayout {
            name_column,
            value_column,
            description_column,
            title_row,
            rows,
            columns,
        })
    }
}
