//! Extract and apply use cases
//!
//! `apply` walks a fixed sequence of stages and stops at the first failure.
//! The document may already be modified in memory at that point, but nothing
//! is persisted until the final save, so the caller just drops it.

use crate::config::{BindingMode, SyncConfig};
use crate::core::containers::VariableContainerSync;
use crate::core::diff::diff;
use crate::core::layout::TableLayoutDetector;
use crate::core::merge::merge;
use crate::core::records::{RecordReader, RecordWriter};
use crate::core::units::UnitConverter;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{SyncError, SyncResult};
use crate::host::{Document, ObjectKind, Sheet};
use crate::types::{DiffEvent, ParameterSet, TableLayout};
use std::fmt;
use std::path::PathBuf;

/// Progress of an apply call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApplyStage {
    Opened,
    LayoutDetected,
    Diffed,
    Cleared,
    Rewritten,
    ContainersRebuilt,
    Saved,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplyStage::Opened => "opened",
            ApplyStage::LayoutDetected => "layout detected",
            ApplyStage::Diffed => "diffed",
            ApplyStage::Cleared => "cleared",
            ApplyStage::Rewritten => "rewritten",
            ApplyStage::ContainersRebuilt => "containers rebuilt",
            ApplyStage::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// Options for a single apply call
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Save to this path instead of the document's own
    pub save_as: Option<PathBuf>,
    /// Report the diff without touching the document
    pub dry_run: bool,
}

/// Outcome of a successful apply
#[derive(Debug)]
pub struct ApplyReport {
    /// Last stage reached (`Saved`, or `Diffed` for a dry run)
    pub stage: ApplyStage,
    pub changes: Vec<DiffEvent>,
    pub rows_written: usize,
    /// Identifiers of the rebuilt variable sets
    pub containers: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of an extraction
#[derive(Debug)]
pub struct Extraction {
    pub params: ParameterSet,
    pub layout: TableLayout,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct SyncOrchestrator {
    config: SyncConfig,
    units: UnitConverter,
    detector: TableLayoutDetector,
    containers: VariableContainerSync,
}

impl SyncOrchestrator {
    pub fn new(config: SyncConfig) -> Self {
        let detector = TableLayoutDetector::new(config.headers.clone());
        let containers = VariableContainerSync::new(config.default_group.clone());
        Self {
            config,
            units: UnitConverter::new(),
            detector,
            containers,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn sheet<'d, D: Document>(&self, doc: &'d D) -> SyncResult<&'d D::Sheet> {
        doc.sheet(&self.config.sheet).ok_or_else(|| self.missing_sheet(doc))
    }

    fn sheet_mut<'d, D: Document>(&self, doc: &'d mut D) -> SyncResult<&'d mut D::Sheet> {
        if doc.sheet(&self.config.sheet).is_none() {
            return Err(self.missing_sheet(&*doc));
        }
        doc.sheet_mut(&self.config.sheet)
            .ok_or_else(|| SyncError::Structural(format!("No sheet '{}'", self.config.sheet)))
    }

    fn missing_sheet<D: Document>(&self, doc: &D) -> SyncError {
        let available: Vec<String> = doc
            .objects_of(ObjectKind::Sheet)
            .into_iter()
            .map(|o| o.identifier)
            .collect();
        SyncError::Structural(format!(
            "No sheet '{}' in document (sheets: {})",
            self.config.sheet,
            if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            }
        ))
    }

    /// Detect the parameter table of the configured sheet
    pub fn detect_layout<D: Document>(&self, doc: &D) -> SyncResult<TableLayout> {
        self.detector.detect_sheet(self.sheet(doc)?)
    }

    /// Read the parameters of the table, completed by the variable sets
    pub fn extract<D: Document>(&self, doc: &D) -> SyncResult<Extraction> {
        let mut diagnostics = Diagnostics::new();

        let sheet = self.sheet(doc)?;
        let layout = self.detector.detect_sheet(sheet)?;
        let mut table = RecordReader::new(sheet, &layout, self.units).read_all(&mut diagnostics)?;

        let containers = self.containers.collect(doc);
        for record in table.iter_mut().filter(|r| r.group.is_none()) {
            if let Some(held) = containers.get(&record.name) {
                record.group = held.group.clone();
            }
        }

        let params = merge(&table, &containers);
        diagnostics.info(format!(
            "Extracted {} parameter(s): {} from sheet '{}', {} from variable sets only",
            params.len(),
            table.len(),
            self.config.sheet,
            params.len() - table.len()
        ));

        Ok(Extraction {
            params,
            layout,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Replace the document's parameters with `params`
    pub fn apply<D: Document>(
        &self,
        doc: &mut D,
        params: &ParameterSet,
        options: &ApplyOptions,
    ) -> SyncResult<ApplyReport> {
        let mut stage = ApplyStage::Opened;
        let mut diagnostics = Diagnostics::new();

        let result = self.run_apply(doc, params, options, &mut stage, &mut diagnostics);
        match result {
            Ok((changes, rows_written, containers)) => Ok(ApplyReport {
                stage,
                changes,
                rows_written,
                containers,
                diagnostics: diagnostics.into_vec(),
            }),
            Err(e) => {
                tracing::error!(stage = %stage, "apply aborted: {}", e);
                Err(e)
            }
        }
    }

    fn advance(stage: &mut ApplyStage, next: ApplyStage) {
        tracing::debug!(from = %stage, to = %next, "apply stage");
        *stage = next;
    }

    fn run_apply<D: Document>(
        &self,
        doc: &mut D,
        params: &ParameterSet,
        options: &ApplyOptions,
        stage: &mut ApplyStage,
        diagnostics: &mut Diagnostics,
    ) -> SyncResult<(Vec<DiffEvent>, usize, Vec<String>)> {
        let layout = self.detect_layout(&*doc)?;
        Self::advance(stage, ApplyStage::LayoutDetected);

        let previous =
            RecordReader::new(self.sheet(&*doc)?, &layout, self.units).read_all(diagnostics)?;
        let changes = diff(&previous, params, diagnostics);
        for event in &changes {
            match event {
                DiffEvent::Removed { .. } => diagnostics.warn(event.to_string()),
                DiffEvent::Changed { .. } => diagnostics.info(event.to_string()),
            }
        }
        Self::advance(stage, ApplyStage::Diffed);

        if options.dry_run {
            diagnostics.info("Dry run, document left untouched");
            return Ok((changes, 0, Vec::new()));
        }

        let sheet = self.sheet_mut(doc)?;
        let mut writer = RecordWriter::new(sheet, layout, self.detector.clone(), self.units);
        writer.reset()?;
        Self::advance(stage, ApplyStage::Cleared);

        for record in params {
            writer.write(record, diagnostics)?;
        }
        drop(writer);
        self.sheet_mut(doc)?.recompute()?;
        Self::advance(stage, ApplyStage::Rewritten);

        let binding_table = match self.config.binding {
            BindingMode::Expression => Some(self.config.sheet.as_str()),
            BindingMode::Literal => None,
        };
        let containers = self
            .containers
            .rebuild(doc, params, binding_table, diagnostics)?;
        Self::advance(stage, ApplyStage::ContainersRebuilt);

        doc.recompute()?;
        match &options.save_as {
            Some(path) => doc.save_as(path)?,
            None => doc.save()?,
        }
        Self::advance(stage, ApplyStage::Saved);

        Ok((changes, params.len(), containers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::types::{ParameterRecord, Value};

    fn document() -> MemoryDocument {
        MemoryDocument::from_yaml(
            r#"
objects:
  - name: Spreadsheet
    label: Spreadsheet
    type: sheet
    cells:
      A1: Name
      B1: Value
      C1: Description
      A2: width
      B2: { value: 10, unit: mm }
      C2: panel width
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_stage_order() {
        assert!(ApplyStage::Opened < ApplyStage::Diffed);
        assert!(ApplyStage::ContainersRebuilt < ApplyStage::Saved);
        assert_eq!(ApplyStage::LayoutDetected.to_string(), "layout detected");
    }

    #[test]
    fn test_dry_run_leaves_document_untouched() {
        let mut doc = document();
        let before = doc.to_yaml().unwrap();
        let params: ParameterSet = vec![ParameterRecord::new("depth", Value::length(5.0), "")]
            .into_iter()
            .collect();

        let report = SyncOrchestrator::new(SyncConfig::default())
            .apply(
                &mut doc,
                &params,
                &ApplyOptions {
                    dry_run: true,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(report.stage, ApplyStage::Diffed);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].name(), "width");
        assert_eq!(doc.to_yaml().unwrap(), before);
    }

    #[test]
    fn test_apply_without_path_stops_before_saved() {
        let mut doc = document();
        let params = ParameterSet::new();

        let err = SyncOrchestrator::new(SyncConfig::default())
            .apply(&mut doc, &params, &ApplyOptions::default())
            .unwrap_err();
        assert!(matches!(err, SyncError::Host(_)));
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let doc = document();
        let config = SyncConfig {
            sheet: "Params".to_string(),
            ..Default::default()
        };
        let err = SyncOrchestrator::new(config).extract(&doc).unwrap_err();
        assert!(matches!(err, SyncError::Structural(_)));
        assert!(err.to_string().contains("Spreadsheet"));
    }
}
