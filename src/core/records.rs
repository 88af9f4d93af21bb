//! Reading and writing parameter rows

use crate::core::layout::TableLayoutDetector;
use crate::core::units::UnitConverter;
use crate::diagnostics::Diagnostics;
use crate::error::{SyncError, SyncResult};
use crate::host::{CellContent, Sheet};
use crate::types::{ParameterRecord, ParameterSet, TableLayout, Value};

/// Reads parameter records from the rows of a detected table
pub struct RecordReader<'a, S: Sheet + ?Sized> {
    sheet: &'a S,
    layout: &'a TableLayout,
    units: UnitConverter,
}

impl<'a, S: Sheet + ?Sized> RecordReader<'a, S> {
    pub fn new(sheet: &'a S, layout: &'a TableLayout, units: UnitConverter) -> Self {
        Self {
            sheet,
            layout,
            units,
        }
    }

    /// Read every row below the title row, top to bottom. Rows without a
    /// value are skipped.
    pub fn read_all(&self, diagnostics: &mut Diagnostics) -> SyncResult<ParameterSet> {
        let mut params = ParameterSet::new();
        for row in self.layout.content_rows() {
            if let Some(record) = self.read(row, diagnostics)? {
                params.push(record);
            }
        }
        Ok(params)
    }

    /// Read the record at `row`; `None` (with a warning) when its value cell
    /// is empty
    pub fn read(
        &self,
        row: u32,
        diagnostics: &mut Diagnostics,
    ) -> SyncResult<Option<ParameterRecord>> {
        if row == self.layout.title_row {
            return Err(SyncError::Validation(format!(
                "Row {} is the title row, not a parameter",
                row
            )));
        }

        let value_coord = self.layout.value_cell(row);
        let Some(value) = self.read_value(&value_coord)? else {
            diagnostics.warn(format!("Row {} has no value in {}, skipped", row, value_coord));
            return Ok(None);
        };

        let mut name = self.read_text(&self.layout.name_cell(row))?;
        if name.is_none() {
            name = self.sheet.alias(&value_coord);
        }

        let description = self
            .read_text(&self.layout.description_cell(row))?
            .unwrap_or_default();

        let name = name.unwrap_or_else(|| {
            diagnostics.warn(format!("No name found for row with value = {}", value));
            String::new()
        });

        Ok(Some(ParameterRecord {
            name,
            value,
            description,
            group: None,
        }))
    }

    /// Text of a cell; `None` when the cell is blank
    fn read_text(&self, coord: &str) -> SyncResult<Option<String>> {
        match self.sheet.cell(coord) {
            CellContent::Empty => Ok(None),
            CellContent::Text(s) if s.trim().is_empty() => Ok(None),
            CellContent::Text(s) => Ok(Some(s)),
            other => Err(SyncError::Type(format!(
                "Cell {} holds a {}, expected text",
                coord,
                other.kind_name()
            ))),
        }
    }

    /// Value of a cell; `None` when the cell is blank
    fn read_value(&self, coord: &str) -> SyncResult<Option<Value>> {
        let content = self.sheet.cell(coord);
        if content.is_empty() {
            return Ok(None);
        }
        match content {
            CellContent::Number(v) => Ok(Some(Value::Dimensionless(v))),
            CellContent::Quantity { magnitude, unit } => self
                .units
                .decode(magnitude, &unit)
                .map(Some)
                .map_err(|e| match e {
                    SyncError::Unit(msg) => SyncError::Unit(format!("{} (cell {})", msg, coord)),
                    other => other,
                }),
            CellContent::Empty => Ok(None),
            CellContent::Text(s) => Err(SyncError::Type(format!(
                "Cell {} holds text '{}', expected a number or quantity",
                coord, s
            ))),
        }
    }
}

/// Rewrites the parameter table of a sheet
pub struct RecordWriter<'a, S: Sheet + ?Sized> {
    sheet: &'a mut S,
    layout: TableLayout,
    detector: TableLayoutDetector,
    units: UnitConverter,
}

impl<'a, S: Sheet + ?Sized> RecordWriter<'a, S> {
    pub fn new(
        sheet: &'a mut S,
        layout: TableLayout,
        detector: TableLayoutDetector,
        units: UnitConverter,
    ) -> Self {
        Self {
            sheet,
            layout,
            detector,
            units,
        }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn into_layout(self) -> TableLayout {
        self.layout
    }

    /// Remove every content row and re-detect the now header-only table
    pub fn reset(&mut self) -> SyncResult<()> {
        let content_rows: Vec<u32> = self.layout.content_rows().collect();
        for row in content_rows.into_iter().rev() {
            self.sheet.remove_rows(row, 1)?;
        }
        self.layout = self.detector.detect_sheet(&*self.sheet)?;
        Ok(())
    }

    /// Append a record below the last used row; returns the row written
    pub fn write(
        &mut self,
        record: &ParameterRecord,
        diagnostics: &mut Diagnostics,
    ) -> SyncResult<u32> {
        if record.name.trim().is_empty() {
            return Err(SyncError::Validation(format!(
                "Cannot write a parameter without a name (value = {})",
                record.value
            )));
        }

        let row = self.layout.last_row() + 1;

        self.sheet.set_text(&self.layout.name_cell(row), &record.name)?;
        self.sheet
            .set_text(&self.layout.description_cell(row), &record.description)?;

        let value_coord = self.layout.value_cell(row);
        match record.value {
            Value::Quantity { magnitude, family } => {
                let text = self.units.encode_quantity(magnitude, family, diagnostics);
                self.sheet.set_quantity(&value_coord, &text)?;
            }
            Value::Dimensionless(v) => self.sheet.set_float(&value_coord, v)?,
        }

        self.sheet.set_alias(&value_coord, &record.name)?;

        self.layout.rows.insert(row);
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySheet;

    fn header_only() -> MemorySheet {
        let mut sheet = MemorySheet::new();
        sheet.set_text("A1", "Name").unwrap();
        sheet.set_text("B1", "Value").unwrap();
        sheet.set_text("C1", "Description").unwrap();
        sheet
    }

    fn detect(sheet: &MemorySheet) -> TableLayout {
        TableLayoutDetector::default().detect_sheet(sheet).unwrap()
    }

    #[test]
    fn test_read_quantity_row() {
        let mut sheet = header_only();
        sheet.set_text("A2", "width").unwrap();
        sheet.set_quantity("B2", "10 mm").unwrap();
        sheet.set_text("C2", "panel width").unwrap();

        let layout = detect(&sheet);
        let mut diags = Diagnostics::new();
        let record = RecordReader::new(&sheet, &layout, UnitConverter::new())
            .read(2, &mut diags)
            .unwrap()
            .unwrap();

        assert_eq!(record, ParameterRecord::new("width", Value::length(10.0), "panel width"));
        assert!(diags.entries().is_empty());
    }

    #[test]
    fn test_read_falls_back_to_alias() {
        let mut sheet = header_only();
        sheet.set_quantity("B2", "30 deg").unwrap();
        sheet.set_alias("B2", "tilt").unwrap();

        let layout = detect(&sheet);
        let mut diags = Diagnostics::new();
        let record = RecordReader::new(&sheet, &layout, UnitConverter::new())
            .read(2, &mut diags)
            .unwrap()
            .unwrap();

        assert_eq!(record.name, "tilt");
        assert_eq!(record.value, Value::angle(30.0));
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_read_unresolved_name_warns() {
        let mut sheet = header_only();
        sheet.set_float("B2", 3.0).unwrap();

        let layout = detect(&sheet);
        let mut diags = Diagnostics::new();
        let record = RecordReader::new(&sheet, &layout, UnitConverter::new())
            .read(2, &mut diags)
            .unwrap()
            .unwrap();

        assert_eq!(record.name, "");
        assert_eq!(diags.warnings().count(), 1);
        assert!(diags.entries()[0].message.contains("value = 3"));
    }

    #[test]
    fn test_read_unsupported_family_is_fatal() {
        let mut sheet = header_only();
        sheet.set_text("A2", "mass").unwrap();
        sheet.set_quantity("B2", "2 kg").unwrap();

        let layout = detect(&sheet);
        let err = RecordReader::new(&sheet, &layout, UnitConverter::new())
            .read_all(&mut Diagnostics::new())
            .unwrap_err();
        assert!(matches!(err, SyncError::Unit(_)));
    }

    #[test]
    fn test_read_skips_row_without_value() {
        let mut sheet = header_only();
        sheet.set_text("A2", "width").unwrap();
        sheet.set_quantity("B2", "10 mm").unwrap();
        sheet.set_text("E3", "note beside the table").unwrap();

        let layout = detect(&sheet);
        let mut diags = Diagnostics::new();
        let reader = RecordReader::new(&sheet, &layout, UnitConverter::new());
        assert_eq!(reader.read(3, &mut diags).unwrap(), None);

        let params = reader.read_all(&mut diags).unwrap();
        assert_eq!(params.names(), vec!["width"]);
        assert_eq!(diags.warnings().count(), 2);
        assert!(diags.entries()[0].message.contains("Row 3"));
    }

    #[test]
    fn test_read_text_value_is_type_error() {
        let mut sheet = header_only();
        sheet.set_text("A2", "finish").unwrap();
        sheet.set_text("B2", "matte").unwrap();

        let layout = detect(&sheet);
        let err = RecordReader::new(&sheet, &layout, UnitConverter::new())
            .read(2, &mut Diagnostics::new())
            .unwrap_err();
        assert!(matches!(err, SyncError::Type(_)));
    }

    #[test]
    fn test_write_appends_and_aliases() {
        let mut sheet = header_only();
        let layout = detect(&sheet);
        let mut diags = Diagnostics::new();

        let mut writer = RecordWriter::new(
            &mut sheet,
            layout,
            TableLayoutDetector::default(),
            UnitConverter::new(),
        );
        let first = writer
            .write(&ParameterRecord::new("height", Value::length(20.0), ""), &mut diags)
            .unwrap();
        let second = writer
            .write(&ParameterRecord::new("count", Value::Dimensionless(4.0), "bolts"), &mut diags)
            .unwrap();
        assert_eq!((first, second), (2, 3));
        assert_eq!(writer.layout().last_row(), 3);

        assert_eq!(sheet.alias("B2"), Some("height".to_string()));
        assert_eq!(sheet.alias("B3"), Some("count".to_string()));
        assert_eq!(sheet.cell("B3"), CellContent::Number(4.0));
        assert_eq!(sheet.cell("C2"), CellContent::Empty);
    }

    #[test]
    fn test_write_rejects_empty_name() {
        let mut sheet = header_only();
        let layout = detect(&sheet);
        let mut writer = RecordWriter::new(
            &mut sheet,
            layout,
            TableLayoutDetector::default(),
            UnitConverter::new(),
        );
        let unnamed = ParameterRecord::new("", Value::Dimensionless(1.0), "");
        let err = writer.write(&unnamed, &mut Diagnostics::new()).unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[test]
    fn test_reset_keeps_title_row() {
        let mut sheet = header_only();
        for row in 2..=4 {
            sheet.set_text(&format!("A{}", row), &format!("p{}", row)).unwrap();
            sheet.set_float(&format!("B{}", row), f64::from(row)).unwrap();
            sheet.set_alias(&format!("B{}", row), &format!("p{}", row)).unwrap();
        }
        let layout = detect(&sheet);

        let mut writer = RecordWriter::new(
            &mut sheet,
            layout,
            TableLayoutDetector::default(),
            UnitConverter::new(),
        );
        writer.reset().unwrap();
        let layout = writer.into_layout();

        assert_eq!(layout.rows.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(sheet.used_cells(), vec!["A1", "B1", "C1"]);
        assert_eq!(sheet.coord_for_alias("p2"), None);
    }
}
