//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use turnstile::DuplicatePolicy;

/// Turnstile: multi-stage data admission pipeline
#[derive(Parser)]
#[command(name = "turnstile")]
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
    /// Run a batch through the admission pipeline
    Run {
        /// Path to the data file (CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Externally predicted admission probability (0-1)
        #[arg(long)]
        predicted_admit: f64,

        /// Externally predicted rejection probability (0-1)
        #[arg(long)]
        predicted_reject: f64,

        /// SQLite database to load admitted records into
        #[arg(long, default_value = "turnstile.db")]
        db: PathBuf,

        /// Upper bound for values in a `price` column
        #[arg(long)]
        max_price: Option<f64>,

        /// Divergence threshold for the alignment verdict
        #[arg(long)]
        threshold: Option<f64>,

        /// Duplicate handling in the semantic stage
        #[arg(long, value_enum, default_value_t = DuplicateChoice::RejectAll)]
        duplicates: DuplicateChoice,

        /// Print the full batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Infer and print the schema for a data file without loading anything
    Schema {
        /// Path to the data file (CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// CLI surface for the duplicate policy.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DuplicateChoice {
    RejectAll,
    KeepFirst,
    DropAllButFirst,
}

impl From<DuplicateChoice> for DuplicatePolicy {
    fn from(choice: DuplicateChoice) -> Self {
        match choice {
            DuplicateChoice::RejectAll => DuplicatePolicy::RejectAll,
            DuplicateChoice::KeepFirst => DuplicatePolicy::KeepFirst,
            DuplicateChoice::DropAllButFirst => DuplicatePolicy::DropAllButFirst,
        }
    }
}
