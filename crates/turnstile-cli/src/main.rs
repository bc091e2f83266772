//! Turnstile CLI - multi-stage data admission pipeline.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            file,
            predicted_admit,
            predicted_reject,
            db,
            max_price,
            threshold,
            duplicates,
            json,
        } => commands::run::run(
            file,
            predicted_admit,
            predicted_reject,
            db,
            max_price,
            threshold,
            duplicates,
            json,
            cli.verbose,
        ),

        Commands::Schema { file } => commands::schema::run(file, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
