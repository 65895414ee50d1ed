//! Tree commands.

use std::sync::Arc;

use arrange_core::tree::visible_rows;
use arrange_core::{
    DropPosition, FileParentPreference, ItemId, NodeKind, OrderStore, ReorderOutcome, TreeItem,
    TreeNode, TreeState, classify_drop_position,
};
use serde::Serialize;

use super::{Context, ensure_saved, print_json, report_no_op, runtime};
use crate::cli::{OutputFormat, PositionArg, TreeCommands};
use crate::error::CliError;
use crate::store::JsonFileStore;

/// Tree command handler
pub fn cmd_tree(ctx: &Context, subcmd: TreeCommands) -> Result<(), CliError> {
    match subcmd {
        TreeCommands::Show { collapse, format } => cmd_tree_show(ctx, &collapse, format),
        TreeCommands::Add {
            name,
            parent,
            root,
            container,
        } => cmd_tree_add(ctx, name, parent, root, container),
        TreeCommands::Move {
            dragged,
            target,
            position,
            offset,
            height,
        } => cmd_tree_move(ctx, dragged, target, position, offset.zip(height)),
        TreeCommands::Classify {
            target,
            offset,
            height,
        } => cmd_tree_classify(ctx, target, offset, height),
    }
}

async fn load_state(ctx: &Context) -> Result<TreeState<JsonFileStore>, CliError> {
    Ok(TreeState::load(Arc::clone(&ctx.store))
        .await?
        .with_settings(&ctx.settings.tree))
}

/// One visible row in JSON output
#[derive(Serialize)]
struct RowView<'a> {
    id: ItemId,
    name: &'a str,
    kind: NodeKind,
    parent_id: Option<ItemId>,
    order_index: i32,
    depth: usize,
    collapsed: bool,
}

fn cmd_tree_show(
    ctx: &Context,
    collapse: &[ItemId],
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut state = runtime()?.block_on(load_state(ctx))?;
    for id in collapse {
        if state.get(*id).is_none() {
            return Err(CliError::ItemNotFound(*id));
        }
        state.collapse(*id);
    }

    let roots = state.tree();
    let rows = visible_rows(&roots, state.collapsed());

    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No items.");
            }
            for node in rows {
                println!("{}", format_row(node, state.collapsed().contains(&node.item.id)));
            }
        }
        OutputFormat::Json => {
            let views: Vec<RowView<'_>> = rows
                .iter()
                .map(|node| RowView {
                    id: node.item.id,
                    name: &node.item.name,
                    kind: node.item.kind,
                    parent_id: node.item.parent_id,
                    order_index: node.item.order_index,
                    depth: node.depth,
                    collapsed: state.collapsed().contains(&node.item.id),
                })
                .collect();
            print_json(&views)?;
        }
    }
    Ok(())
}

fn format_row(node: &TreeNode, collapsed: bool) -> String {
    let indent = "  ".repeat(node.depth);
    let mut label = node.item.name.clone();
    if node.item.kind.is_container() {
        label.push('/');
    }
    if collapsed && !node.children.is_empty() {
        label.push_str(&format!(" (+{})", node.count() - 1));
    }
    format!("{indent}{label}  [{}]", node.item.id)
}

fn cmd_tree_add(
    ctx: &Context,
    name: String,
    parent: Option<ItemId>,
    root: bool,
    container: bool,
) -> Result<(), CliError> {
    let preferences = FileParentPreference::open(ctx.preference_path())?;

    runtime()?.block_on(async {
        let mut state = load_state(ctx).await?.with_preferences(Box::new(preferences));

        let parent_id = match parent {
            Some(id) if state.get(id).is_none() => return Err(CliError::ItemNotFound(id)),
            Some(id) => Some(id),
            None if root => None,
            None => state.suggest_parent(),
        };

        let item = if container {
            TreeItem::container(name)
        } else {
            TreeItem::new(name)
        };
        let placement = state.insert_new(item.with_parent(parent_id));
        let created = state
            .get(placement.id)
            .cloned()
            .ok_or(CliError::ItemNotFound(placement.id))?;

        ctx.store.insert_tree(created).await?;
        println!("{}", placement.id);
        Ok::<_, CliError>(())
    })
}

fn cmd_tree_move(
    ctx: &Context,
    dragged: ItemId,
    target: ItemId,
    position: Option<PositionArg>,
    pointer: Option<(f64, f64)>,
) -> Result<(), CliError> {
    runtime()?.block_on(async {
        let mut state = load_state(ctx).await?;

        let outcome = match (position, pointer) {
            (Some(position), _) => state.move_item(dragged, target, position.into()),
            (None, Some((offset, height))) => {
                state.move_by_pointer(dragged, target, offset, height, &ctx.settings.drop_zones)
            }
            (None, None) => {
                return Err(CliError::InvalidArgument(
                    "either --position or --offset with --height is required".to_string(),
                ));
            }
        };

        match outcome {
            ReorderOutcome::Apply(plan) => {
                let report = state.settle().await;
                ensure_saved(&report)?;
                print_json(&serde_json::json!({
                    "dragged_id": plan.dragged_id,
                    "new_parent_id": plan.new_parent_id,
                    "position": plan.position,
                    "placements": plan.placements,
                }))
            }
            ReorderOutcome::NoOp(reason) => report_no_op(reason),
        }
    })
}

fn cmd_tree_classify(
    ctx: &Context,
    target: ItemId,
    offset: f64,
    height: f64,
) -> Result<(), CliError> {
    let items = runtime()?.block_on(ctx.store.fetch_tree())?;
    let node = items
        .iter()
        .find(|i| i.id == target)
        .ok_or(CliError::ItemNotFound(target))?;

    let position: DropPosition =
        classify_drop_position(offset, height, node.kind, &ctx.settings.drop_zones);
    println!("{position}");
    Ok(())
}
