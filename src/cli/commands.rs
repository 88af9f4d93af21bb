use crate::config::{BindingMode, SyncConfig};
use crate::core::{ApplyOptions, ApplyStage, SyncOrchestrator};
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::SyncResult;
use crate::host::MemoryDocument;
use crate::parser;
use crate::types::{DiffEvent, ParameterSet, TableLayout};
use crate::writer;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Build the sync config from an optional file plus command line overrides
pub fn load_config(path: Option<&Path>, sheet: Option<String>) -> SyncResult<SyncConfig> {
    let mut config = match path {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };
    if let Some(sheet) = sheet {
        config.sheet = sheet;
    }
    Ok(config)
}

fn print_diagnostics(diagnostics: &[Diagnostic], verbose: bool) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => {
                println!("   {} {}", "⚠️".yellow(), diagnostic.message.yellow())
            }
            Severity::Info if verbose => println!("   {}", diagnostic.message.dimmed()),
            Severity::Info => {}
        }
    }
}

fn print_layout(layout: &TableLayout) {
    println!(
        "   Columns: name {} | value {} | description {}",
        layout.name_column.bright_blue(),
        layout.value_column.bright_blue(),
        layout.description_column.bright_blue()
    );
    println!(
        "   Rows: title {} | last {} | {} parameter row(s)",
        layout.title_row,
        layout.last_row(),
        layout.content_rows().count()
    );
}

fn print_parameters(params: &ParameterSet) {
    let width = params.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for record in params {
        let mut line = format!(
            "   {:<width$}  {}",
            record.name.bright_blue(),
            record.value.to_string().bold(),
            width = width
        );
        if !record.description.is_empty() {
            line.push_str(&format!("  {}", record.description.dimmed()));
        }
        if let Some(group) = &record.group {
            line.push_str(&format!("  [{}]", group.cyan()));
        }
        println!("{}", line);
    }
}

fn print_change(event: &DiffEvent) {
    match event {
        DiffEvent::Removed { .. } => {
            println!("   {} {}", "-".red().bold(), event.to_string().red())
        }
        DiffEvent::Changed { .. } => {
            println!("   {} {}", "~".yellow().bold(), event.to_string().yellow())
        }
    }
}

/// Execute the extract command
pub fn extract(
    config: &SyncConfig,
    document: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> SyncResult<()> {
    let sync = SyncOrchestrator::new(config.clone());

    println!("{}", "📐 Paramsync - Extracting parameters".bold().green());
    println!("   Document: {}", document.display());
    println!("   Sheet: {}\n", sync.config().sheet);

    let doc = MemoryDocument::open(&document)?;
    let extraction = sync.extract(&doc)?;

    if verbose {
        println!("{}", "🗂  Table layout:".cyan());
        print_layout(&extraction.layout);
        println!();
    }
    print_diagnostics(&extraction.diagnostics, verbose);

    match output {
        Some(path) => {
            writer::write_parameters(&path, &extraction.params)?;
            println!(
                "{}",
                format!(
                    "✅ Wrote {} parameter(s) to {}",
                    extraction.params.len(),
                    path.display()
                )
                .bold()
                .green()
            );
        }
        None => {
            println!(
                "{}",
                format!("✅ {} parameter(s):", extraction.params.len())
                    .bold()
                    .green()
            );
            print_parameters(&extraction.params);
        }
    }

    Ok(())
}

/// Execute the apply command
pub fn apply(
    config: &SyncConfig,
    document: PathBuf,
    params: PathBuf,
    save_as: Option<PathBuf>,
    literal: bool,
    dry_run: bool,
    verbose: bool,
) -> SyncResult<()> {
    println!("{}", "📐 Paramsync - Applying parameters".bold().green());
    println!("   Document: {}", document.display());
    println!("   Parameters: {}", params.display());
    if let Some(path) = &save_as {
        println!("   Save as: {}", path.display());
    }
    println!();

    if dry_run {
        println!(
            "{}",
            "📋 DRY RUN MODE - No changes will be written\n".yellow()
        );
    }

    let mut config = config.clone();
    if literal {
        config.binding = BindingMode::Literal;
    }

    let incoming = parser::parse_parameters(&params)?;
    if verbose {
        println!("   Read {} parameter(s)\n", incoming.len());
    }

    let mut doc = MemoryDocument::open(&document)?;
    let report = SyncOrchestrator::new(config).apply(
        &mut doc,
        &incoming,
        &ApplyOptions { save_as, dry_run },
    )?;

    if report.changes.is_empty() {
        println!("{}", "   No parameter removed or changed".dimmed());
    } else {
        println!("{}", "🔍 Differences:".bold().cyan());
        for event in &report.changes {
            print_change(event);
        }
    }
    println!();
    print_diagnostics(&report.diagnostics, verbose);

    if report.stage == ApplyStage::Saved {
        println!(
            "{}",
            format!(
                "✅ Wrote {} parameter(s), rebuilt {} variable set(s)",
                report.rows_written,
                report.containers.len()
            )
            .bold()
            .green()
        );
        if verbose {
            for identifier in &report.containers {
                println!("   {}", identifier.cyan());
            }
        }
    } else {
        println!("{}", "📋 Dry run complete - no changes written".yellow());
    }

    Ok(())
}

/// Execute the layout command
pub fn layout(config: &SyncConfig, document: PathBuf) -> SyncResult<()> {
    let sync = SyncOrchestrator::new(config.clone());

    println!("{}", "🗂  Paramsync - Table layout".bold().green());
    println!("   Document: {}", document.display());
    println!("   Sheet: {}\n", sync.config().sheet);

    let doc = MemoryDocument::open(&document)?;
    let layout = sync.detect_layout(&doc)?;
    print_layout(&layout);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_overrides_sheet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paramsync.yaml");
        fs::write(&path, "sheet: Params\nbinding: literal\n").unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.sheet, "Params");
        assert_eq!(config.binding, BindingMode::Literal);

        let config = load_config(Some(&path), Some("Table".to_string())).unwrap();
        assert_eq!(config.sheet, "Table");
    }

    #[test]
    fn test_load_config_defaults() {
        assert_eq!(load_config(None, None).unwrap(), SyncConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/paramsync.yaml")), None).is_err());
    }
}
