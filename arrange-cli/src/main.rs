//! `arrange` CLI - command-line harness for the ordering engine
//!
//! Reads a JSON items file holding a flat list and a tree, applies
//! drag-and-drop style moves through the optimistic layer, and writes
//! the result back.

mod cli;
mod commands;
mod error;
mod store;

use arrange_core::{ArrangeSettings, TracingConfig, TracingLevel, init_tracing};
use clap::Parser;
use cli::Cli;
use commands::Context;
use error::CliError;

fn main() {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    if let Err(e) = run(cli) {
        if !quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = commands::load_settings(cli.config.as_deref())?;
    init_logging(&settings, cli.verbose, cli.quiet)?;

    let ctx = Context::new(&cli.file, settings);
    commands::dispatch(&ctx, cli.command)
}

fn init_logging(settings: &ArrangeSettings, verbose: u8, quiet: bool) -> Result<(), CliError> {
    init_tracing(&logging_config(settings, verbose, quiet))?;
    Ok(())
}

/// Starts from the configured level; each `-v` raises it one step and
/// `-q` drops it to errors only. Either flag discards a configured filter
/// so the level takes effect.
fn logging_config(settings: &ArrangeSettings, verbose: u8, quiet: bool) -> TracingConfig {
    let mut config = TracingConfig::from_settings(&settings.logging);
    if quiet || verbose > 0 {
        config.filter = None;
    }
    if quiet {
        config = config.with_level(TracingLevel::Error);
    } else {
        for _ in 0..verbose {
            config.level = config.level.more_verbose();
        }
    }
    config
}
