//! ladle CLI - batch canonicalizer for recipe ingredient lines.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            reference,
            output,
            errors,
            report,
            today,
        } => commands::run::run(input, reference, output, errors, report, today, cli.verbose),

        Commands::Explain {
            reference,
            text,
            qty,
            unit,
            modifiers,
        } => commands::explain::run(reference, text, qty, unit, modifiers, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
