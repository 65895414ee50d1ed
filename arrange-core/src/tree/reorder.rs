//! Drop planning for hierarchical trees
//!
//! A tree move is resolved into the full set of placements it causes.
//! Before/after drops renumber the whole destination sibling group
//! densely from zero; inside drops append to the end of the target's
//! children and leave existing ranks untouched.

use tracing::debug;

use super::hierarchy::{is_descendant_in, parent_map, siblings};
use crate::drag_drop::DropPosition;
use crate::models::{ItemId, NoOpReason, ReorderOutcome, TreeItem, TreePlacement};

/// A validated tree move and every placement it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMove {
    /// Node being moved
    pub dragged_id: ItemId,
    /// Parent after the move
    pub new_parent_id: Option<ItemId>,
    /// Requested position relative to the target
    pub position: DropPosition,
    /// New placement for the dragged node and every renumbered sibling
    pub placements: Vec<TreePlacement>,
}

impl TreeMove {
    /// Returns the placement of the dragged node.
    #[must_use]
    pub fn dragged_placement(&self) -> Option<&TreePlacement> {
        self.placements.iter().find(|p| p.id == self.dragged_id)
    }
}

/// Checks whether `dragged_id` may be dropped anywhere on `target_id`.
///
/// Rejects the dragged node itself and any of its descendants. This is the
/// check the drag session runs on every hover before showing an indicator.
#[must_use]
pub fn can_drop_on(items: &[TreeItem], dragged_id: ItemId, target_id: ItemId) -> bool {
    dragged_id != target_id && !is_descendant_in(dragged_id, target_id, &parent_map(items))
}

/// Plans the placements for dropping `dragged_id` relative to `target_id`.
///
/// Nothing is mutated; the caller applies [`TreeMove::placements`] locally
/// and persists them as one batch.
#[must_use]
pub fn plan_drop(
    items: &[TreeItem],
    dragged_id: ItemId,
    target_id: ItemId,
    position: DropPosition,
) -> ReorderOutcome<TreeMove> {
    if dragged_id == target_id {
        return ReorderOutcome::NoOp(NoOpReason::SameItem);
    }
    if !items.iter().any(|i| i.id == dragged_id) {
        return ReorderOutcome::NoOp(NoOpReason::UnknownDragged(dragged_id));
    }
    let Some(target) = items.iter().find(|i| i.id == target_id) else {
        return ReorderOutcome::NoOp(NoOpReason::UnknownTarget(target_id));
    };

    let parents = parent_map(items);
    if is_descendant_in(dragged_id, target_id, &parents) {
        return ReorderOutcome::NoOp(NoOpReason::WouldCreateCycle);
    }

    let new_parent_id = match position {
        DropPosition::Inside => Some(target_id),
        DropPosition::Before | DropPosition::After => target.parent_id,
    };
    if let Some(parent_id) = new_parent_id
        && (parent_id == dragged_id || is_descendant_in(dragged_id, parent_id, &parents))
    {
        return ReorderOutcome::NoOp(NoOpReason::WouldCreateCycle);
    }

    let group = siblings(items, new_parent_id, Some(dragged_id));

    let placements = match position {
        DropPosition::Inside => vec![TreePlacement {
            id: dragged_id,
            parent_id: new_parent_id,
            order_index: rank(group.len()),
        }],
        DropPosition::Before | DropPosition::After => {
            let mut ordered: Vec<ItemId> = group.iter().map(|i| i.id).collect();
            let target_pos = ordered
                .iter()
                .position(|id| *id == target_id)
                .unwrap_or(ordered.len());
            let insert_at = match position {
                DropPosition::After => (target_pos + 1).min(ordered.len()),
                _ => target_pos,
            };
            ordered.insert(insert_at, dragged_id);

            ordered
                .into_iter()
                .enumerate()
                .map(|(idx, id)| TreePlacement {
                    id,
                    parent_id: new_parent_id,
                    order_index: rank(idx),
                })
                .collect()
        }
    };

    debug!(
        dragged_id = %dragged_id,
        target_id = %target_id,
        %position,
        placements = placements.len(),
        "Planned tree move"
    );

    ReorderOutcome::Apply(TreeMove {
        dragged_id,
        new_parent_id,
        position,
        placements,
    })
}

/// Writes placements into the local node list.
///
/// Returns the number of nodes that were found and updated.
pub fn apply_placements(items: &mut [TreeItem], placements: &[TreePlacement]) -> usize {
    let mut applied = 0;
    for placement in placements {
        if let Some(item) = items.iter_mut().find(|i| i.id == placement.id) {
            item.parent_id = placement.parent_id;
            item.order_index = placement.order_index;
            applied += 1;
        }
    }
    applied
}

fn rank(idx: usize) -> i32 {
    i32::try_from(idx).unwrap_or(i32::MAX)
}
