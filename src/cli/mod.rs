//! CLI command handlers

pub mod commands;

pub use commands::{apply, extract, layout, load_config};
