//! Command-line interface definitions for gridctl.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `gridctl` binary.
#[derive(Parser, Debug)]
#[command(
    name = "gridctl",
    about = "Place and relocate items in a slot grid",
    version
)]
pub struct Cli {
    /// Logging controls shared across slotgrid binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Which mode to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a RON script holding a grid configuration and a list of steps.
    Run(RunArgs),
    /// Apply directives given on the command line to a fresh grid.
    Apply(ApplyArgs),
}

/// Output options shared by every command.
#[derive(Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Print step reports and the final grid as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the script, e.g.
    /// `(grid: (columns: 10), steps: [place(name: "A", width: 2)])`.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Output controls.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `apply` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// One or more directives in RON syntax, e.g. `place(name: "A", width: 2)`
    /// or `relocate(name: "A", row: 1, col: 0)`.
    #[arg(value_name = "DIRECTIVE", num_args = 1..)]
    pub directives: Vec<String>,

    /// Optional grid configuration file (RON).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the number of columns.
    #[arg(long)]
    pub columns: Option<usize>,

    /// Override the number of rows.
    #[arg(long)]
    pub rows: Option<usize>,

    /// Output controls.
    #[command(flatten)]
    pub output: OutputArgs,
}
