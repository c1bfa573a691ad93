//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ladle: canonicalize recipe ingredient lines
#[derive(Parser)]
#[command(name = "ladle")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a Stage-1 NDJSON file into canonical records
    Run {
        /// Path to the Stage-1 input (NDJSON, one ingredient line per row)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory holding the reference snapshot tables
        #[arg(short, long, value_name = "DIR")]
        reference: PathBuf,

        /// Output path for canonical records (default: <input>.canonical.jsonl)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for the machine-readable error report (JSON)
        #[arg(long)]
        errors: Option<PathBuf>,

        /// Output path for the human-readable report (text)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Pin the date used for density effective windows (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,
    },

    /// Run a single ad-hoc line through the pipeline and show each decision
    Explain {
        /// Directory holding the reference snapshot tables
        #[arg(short, long, value_name = "DIR")]
        reference: PathBuf,

        /// The ingredient line text
        #[arg(value_name = "TEXT")]
        text: String,

        /// Quantity string as extracted upstream (e.g. "1/2")
        #[arg(short, long)]
        qty: Option<String>,

        /// Unit string as extracted upstream (e.g. "cup")
        #[arg(short, long)]
        unit: Option<String>,

        /// Modifier text (e.g. "packed", "finely chopped")
        #[arg(short, long)]
        modifiers: Option<String>,
    },
}
