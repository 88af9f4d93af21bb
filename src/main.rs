use clap::{Parser, Subcommand};
use paramsync::cli;
use paramsync::error::SyncResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paramsync")]
#[command(about = "Sync engineering parameters between a parameter table and variable sets.")]
#[command(long_about = "Paramsync - parameter table <-> variable set synchronization

A document keeps its engineering parameters in a sheet with Name, Value and
Description columns. Paramsync extracts them to a parameter file, and applies
an edited parameter file back: the table is rewritten, each value cell gets
an alias, and the variable sets are rebuilt to reference the table.

COMMANDS:
  extract  - Read the parameter table (and variable sets) of a document
  apply    - Overwrite the parameter table from a parameter file
  layout   - Show where the parameter table was detected

EXAMPLES:
  paramsync extract part.yaml                   # Print parameters
  paramsync extract part.yaml -o params.yaml    # Save a parameter file
  paramsync apply part.yaml params.yaml -n      # Preview removed/changed
  paramsync apply part.yaml params.yaml --save-as part-v2.yaml

LOGGING:
  Diagnostics go to stderr. Set RUST_LOG (e.g. RUST_LOG=paramsync=debug)
  to change the level.")]
#[command(version)]
struct Cli {
    /// Sync configuration file (YAML)
    #[arg(long, global = true, env = "PARAMSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Identifier of the parameter table sheet (overrides the config file)
    #[arg(long, global = true, env = "PARAMSYNC_SHEET")]
    sheet: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Read the parameters of a document.

The parameter table is located by its header labels (Name, Value,
Description by default). Parameters that only live in a variable set are
added after the table rows, with their set label as group.

OUTPUT:
  Without --output the parameters are printed.
  With --output they are written as a parameter file (.yaml, .yml or .json):

  Name:        [width, tilt]
  Value:       [10 mm, 15 deg]
  Description: [panel width, '']
  VarSet:      [Panel, Panel]")]
    /// Read the parameters of a document
    Extract {
        /// Path to the document (.yaml or .yml)
        document: PathBuf,

        /// Write a parameter file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show diagnostics and layout details
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Overwrite the parameter table from a parameter file.

Steps:
  1. Detect the parameter table
  2. Report parameters that will be deleted or changed
  3. Clear the table and write every parameter, aliasing each value cell
  4. Rebuild the variable sets, one per group
  5. Save

Nothing is written if any step fails.

BINDING:
  By default each variable set property references its table cell
  (Spreadsheet.width). Use --literal to copy values instead.

Use --dry-run to only report the differences.")]
    /// Overwrite the parameter table from a parameter file
    Apply {
        /// Path to the document (.yaml or .yml)
        document: PathBuf,

        /// Parameter file (.yaml, .yml or .json)
        params: PathBuf,

        /// Save to another path instead of overwriting the document
        #[arg(long)]
        save_as: Option<PathBuf>,

        /// Copy values into the variable sets instead of referencing the table
        #[arg(long)]
        literal: bool,

        /// Report differences without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show all diagnostics
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the detected parameter table layout
    Layout {
        /// Path to the document (.yaml or .yml)
        document: PathBuf,
    },
}

fn main() -> SyncResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paramsync=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = cli::load_config(cli.config.as_deref(), cli.sheet)?;

    match cli.command {
        Commands::Extract {
            document,
            output,
            verbose,
        } => cli::extract(&config, document, output, verbose),

        Commands::Apply {
            document,
            params,
            save_as,
            literal,
            dry_run,
            verbose,
        } => cli::apply(&config, document, params, save_as, literal, dry_run, verbose),

        Commands::Layout { document } => cli::layout(&config, document),
    }
}
