//! Fractional order keys for flat lists
//!
//! A flat list is ordered by sparse `f64` keys. Moving one item only
//! rewrites that item's key: it lands halfway between its new neighbours,
//! or one unit past the end of the list.

use crate::models::{FlatItem, ItemId, KeyUpdate};

/// Which side of the target an item is inserted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertIntent {
    /// Insert before the target (moving up)
    Before,
    /// Insert after the target (moving down)
    After,
}

/// Computes the key for an item inserted next to `target_key`.
///
/// `prev_key` and `next_key` are the keys of the target's displayed
/// neighbours. Only the neighbour on the side of `intent` is consulted.
#[must_use]
pub fn allocate(
    prev_key: Option<f64>,
    target_key: f64,
    next_key: Option<f64>,
    intent: InsertIntent,
) -> f64 {
    match intent {
        InsertIntent::After => next_key.map_or(target_key + 1.0, |next| {
            (target_key + next) / 2.0
        }),
        InsertIntent::Before => prev_key.map_or(target_key - 1.0, |prev| {
            (prev + target_key) / 2.0
        }),
    }
}

/// Returns the key for a newly created item appended to the end of a list.
///
/// Items without a key are ignored; an empty list starts at `1.0`.
#[must_use]
pub fn append_key(items: &[FlatItem]) -> f64 {
    items
        .iter()
        .filter_map(|item| item.key)
        .filter(|key| key.is_finite())
        .reduce(f64::max)
        .map_or(1.0, |max| max + 1.0)
}

/// Returns true if two adjacent keys are too close to split again.
///
/// Repeated midpoint insertion at the same boundary halves the gap each
/// time; once it drops below `min_gap` the next midpoint may collapse
/// onto one of its neighbours.
#[must_use]
pub fn has_precision_gap(a: f64, b: f64, min_gap: f64) -> bool {
    let gap = (b - a).abs();
    gap < min_gap || a == (a + b) / 2.0 || b == (a + b) / 2.0
}

/// Assigns evenly spaced integer keys `1.0, 2.0, ...` in the given order.
#[must_use]
pub fn renormalize(ordered: &[ItemId]) -> Vec<KeyUpdate> {
    ordered
        .iter()
        .enumerate()
        .map(|(idx, id)| KeyUpdate {
            item_id: *id,
            new_key: (idx + 1) as f64,
        })
        .collect()
}
