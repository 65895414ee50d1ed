//! Flat list reorder controller
//!
//! Resolves a drop inside a flat list into a single key update. Neighbour
//! lookup always runs against the order the user sees, which may differ
//! from raw key order once pinned items or an external filter are applied.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{FlatItem, ItemId, KeyUpdate, NoOpReason, ReorderOutcome};
use crate::sequence::{self, InsertIntent};

/// How a flat list is sorted for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Key ascending, unkeyed items last
    #[default]
    ByKey,
    /// Pinned items first, each partition by key
    PinnedFirst,
}

/// Returns the items in display order.
#[must_use]
pub fn sort_for_display(items: &[FlatItem], order: DisplayOrder) -> Vec<FlatItem> {
    let mut sorted = items.to_vec();
    match order {
        DisplayOrder::ByKey => sorted.sort_by(FlatItem::cmp_by_key),
        DisplayOrder::PinnedFirst => {
            sorted.sort_by(|a, b| b.pinned.cmp(&a.pinned).then_with(|| a.cmp_by_key(b)));
        }
    }
    sorted
}

/// Computes the new key for `dragged_id` dropped onto `target_id`.
///
/// Moving down the list inserts after the target; moving up inserts
/// before it. The caller applies and persists the returned update.
#[must_use]
pub fn reorder(
    displayed: &[FlatItem],
    dragged_id: ItemId,
    target_id: ItemId,
) -> ReorderOutcome<KeyUpdate> {
    if dragged_id == target_id {
        return ReorderOutcome::NoOp(NoOpReason::SameItem);
    }

    let Some(dragged_idx) = displayed.iter().position(|i| i.id == dragged_id) else {
        return ReorderOutcome::NoOp(NoOpReason::UnknownDragged(dragged_id));
    };
    let Some(target_idx) = displayed.iter().position(|i| i.id == target_id) else {
        return ReorderOutcome::NoOp(NoOpReason::UnknownTarget(target_id));
    };

    let intent = if dragged_idx < target_idx {
        InsertIntent::After
    } else {
        InsertIntent::Before
    };

    // An unpersisted target sits at the end of the list
    let target_key = displayed[target_idx].key.unwrap_or_else(|| {
        displayed
            .iter()
            .filter_map(|i| i.key)
            .reduce(f64::max)
            .unwrap_or(0.0)
    });

    let prev_key = target_idx
        .checked_sub(1)
        .and_then(|idx| displayed.get(idx))
        .and_then(|item| item.key);
    let next_key = displayed.get(target_idx + 1).and_then(|item| item.key);

    let new_key = sequence::allocate(prev_key, target_key, next_key, intent);

    debug!(
        item_id = %dragged_id,
        target_id = %target_id,
        ?intent,
        new_key,
        "Resolved flat reorder"
    );

    ReorderOutcome::Apply(KeyUpdate {
        item_id: dragged_id,
        new_key,
    })
}

/// Returns the displayed neighbours' keys of `item_id`, if any.
#[must_use]
pub fn neighbour_keys(displayed: &[FlatItem], item_id: ItemId) -> (Option<f64>, Option<f64>) {
    let Some(idx) = displayed.iter().position(|i| i.id == item_id) else {
        return (None, None);
    };
    let prev = idx
        .checked_sub(1)
        .and_then(|i| displayed.get(i))
        .and_then(|item| item.key);
    let next = displayed.get(idx + 1).and_then(|item| item.key);
    (prev, next)
}
