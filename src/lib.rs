//! Paramsync - engineering parameters between a parameter table and variable sets
//!
//! A document holds a parameter table (a sheet with `Name`, `Value` and
//! `Description` columns) and variable sets that expose those parameters to
//! the rest of the model. This library reads the table into a typed
//! [`ParameterSet`], rewrites it from a parameter file, and rebuilds the
//! variable sets so they reference the table again.
//!
//! # Features
//!
//! - Header-driven table detection, anywhere in the sheet
//! - Length and angle units normalized to millimeters and degrees
//! - Diff report of removed and changed parameters before overwriting
//! - Variable sets grouped by parameter group, bound by expression or literal
//! - YAML/JSON parameter files
//!
//! # Example
//!
//! ```no_run
//! use paramsync::config::SyncConfig;
//! use paramsync::core::{ApplyOptions, SyncOrchestrator};
//! use paramsync::host::MemoryDocument;
//! use paramsync::parser::parse_parameters;
//! use std::path::Path;
//!
//! let mut doc = MemoryDocument::open(Path::new("part.yaml"))?;
//! let params = parse_parameters(Path::new("params.yaml"))?;
//!
//! let sync = SyncOrchestrator::new(SyncConfig::default());
//! let report = sync.apply(&mut doc, &params, &ApplyOptions::default())?;
//! println!("Changes: {}", report.changes.len());
//! # Ok::<(), paramsync::error::SyncError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{SyncError, SyncResult};
pub use types::{DiffEvent, ParameterRecord, ParameterSet, TableLayout, UnitFamily, Value};
