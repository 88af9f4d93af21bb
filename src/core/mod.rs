//! Sync engine: unit handling, table layout, record codec and the
//! extract/apply use cases

pub mod containers;
pub mod coordinate;
pub mod diff;
pub mod layout;
pub mod merge;
pub mod orchestrator;
pub mod records;
pub mod units;

pub use containers::VariableContainerSync;
pub use diff::{diff, ValueComparator};
pub use layout::TableLayoutDetector;
pub use merge::merge;
pub use orchestrator::{ApplyOptions, ApplyReport, ApplyStage, Extraction, SyncOrchestrator};
pub use records::{RecordReader, RecordWriter};
pub use units::UnitConverter;
