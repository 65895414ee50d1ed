//! Command handler modules for the CLI.

mod flat;
mod tree;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrange_core::config::default_settings_path;
use arrange_core::{ArrangeSettings, NoOpReason, ReconcileReport};
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::cli::Commands;
use crate::error::CliError;
use crate::store::JsonFileStore;

/// Everything a command handler needs
pub struct Context {
    /// Loaded settings
    pub settings: ArrangeSettings,
    /// Items file
    pub store: Arc<JsonFileStore>,
}

impl Context {
    /// Opens the items file at `file` with the given settings.
    pub fn new(file: &Path, settings: ArrangeSettings) -> Self {
        Self {
            settings,
            store: Arc::new(JsonFileStore::new(file)),
        }
    }

    /// Recent-parent preference file kept next to the items file
    pub fn preference_path(&self) -> PathBuf {
        self.store.path().with_extension("parent.toml")
    }
}

/// Loads settings from `config_path`, or from the platform default
/// location when none is given.
pub fn load_settings(config_path: Option<&Path>) -> Result<ArrangeSettings, CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(default_settings_path);
    match path {
        Some(path) => Ok(ArrangeSettings::load(&path)?),
        None => Ok(ArrangeSettings::default()),
    }
}

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    debug!(file = %ctx.store.path().display(), "Dispatching command");
    match command {
        Commands::Flat(subcmd) => flat::cmd_flat(ctx, subcmd),
        Commands::Tree(subcmd) => tree::cmd_tree(ctx, subcmd),
    }
}

fn runtime() -> Result<Runtime, CliError> {
    Ok(Runtime::new()?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Unknown IDs are user errors; self and cycle drops are silently refused.
fn report_no_op(reason: NoOpReason) -> Result<(), CliError> {
    match reason {
        NoOpReason::UnknownDragged(id) | NoOpReason::UnknownTarget(id) => {
            Err(CliError::ItemNotFound(id))
        }
        NoOpReason::SameItem | NoOpReason::WouldCreateCycle => {
            println!("Drop ignored: {reason}");
            Ok(())
        }
    }
}

fn ensure_saved(report: &ReconcileReport) -> Result<(), CliError> {
    if report.refetched > 0 || report.refetch_failed > 0 {
        return Err(CliError::NotSaved(format!(
            "{} write(s) rejected by the items file",
            report.refetched + report.refetch_failed
        )));
    }
    Ok(())
}
