//! Flat list commands.

use std::sync::Arc;

use arrange_core::flat::sort_for_display;
use arrange_core::sequence::append_key;
use arrange_core::{FlatItem, FlatListState, ItemId, OrderStore, ReorderOutcome};

use super::{Context, ensure_saved, print_json, report_no_op, runtime};
use crate::cli::{FlatCommands, OutputFormat};
use crate::error::CliError;

/// Flat command handler
pub fn cmd_flat(ctx: &Context, subcmd: FlatCommands) -> Result<(), CliError> {
    match subcmd {
        FlatCommands::Show { format } => cmd_flat_show(ctx, format),
        FlatCommands::Add { pinned } => cmd_flat_add(ctx, pinned),
        FlatCommands::Move { dragged, target } => cmd_flat_move(ctx, dragged, target),
    }
}

fn cmd_flat_show(ctx: &Context, format: OutputFormat) -> Result<(), CliError> {
    let items = runtime()?.block_on(ctx.store.fetch_flat())?;
    let displayed = sort_for_display(&items, ctx.settings.flat.display);

    match format {
        OutputFormat::Table => print_flat_table(&displayed),
        OutputFormat::Json => print_json(&displayed)?,
    }
    Ok(())
}

fn print_flat_table(items: &[FlatItem]) {
    if items.is_empty() {
        println!("No items.");
        return;
    }

    let keys: Vec<String> = items
        .iter()
        .map(|i| i.key.map_or_else(|| "-".to_string(), |k| k.to_string()))
        .collect();
    let key_width = keys.iter().map(String::len).max().unwrap_or(3).max(3);

    println!("{:<4}  {:<key_width$}  PIN  ID", "POS", "KEY");
    for (pos, (item, key)) in items.iter().zip(&keys).enumerate() {
        let pin = if item.pinned { "*" } else { "" };
        println!("{:<4}  {key:<key_width$}  {pin:<3}  {}", pos + 1, item.id);
    }
}

fn cmd_flat_add(ctx: &Context, pinned: bool) -> Result<(), CliError> {
    runtime()?.block_on(async {
        let items = ctx.store.fetch_flat().await?;
        let mut item = FlatItem::new(Some(append_key(&items)));
        item.pinned = pinned;
        let id = item.id;
        ctx.store.insert_flat(item).await?;
        println!("{id}");
        Ok::<_, CliError>(())
    })
}

fn cmd_flat_move(ctx: &Context, dragged: ItemId, target: ItemId) -> Result<(), CliError> {
    runtime()?.block_on(async {
        let mut state = FlatListState::load(Arc::clone(&ctx.store))
            .await?
            .with_settings(&ctx.settings.flat);

        match state.reorder(dragged, target) {
            ReorderOutcome::Apply(update) => {
                let report = state.settle().await;
                ensure_saved(&report)?;
                print_json(&update)
            }
            ReorderOutcome::NoOp(reason) => report_no_op(reason),
        }
    })
}
