//! Mutation and outcome types produced by the reorder controllers.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A new key for one flat-list item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyUpdate {
    /// Item being moved
    pub item_id: ItemId,
    /// Newly allocated key
    pub new_key: f64,
}

/// New placement for one tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreePlacement {
    /// Node being placed
    pub id: ItemId,
    /// Parent after the move
    pub parent_id: Option<ItemId>,
    /// Rank after the move
    pub order_index: i32,
}

/// Why a drop produced no mutation.
///
/// None of these are errors: the drop is silently suppressed and
/// nothing is sent to persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NoOpReason {
    /// The item was dropped onto itself.
    #[error("item dropped onto itself")]
    SameItem,
    /// The dragged item is not in the collection.
    #[error("dragged item {0} not found")]
    UnknownDragged(ItemId),
    /// The drop target is not in the collection.
    #[error("drop target {0} not found")]
    UnknownTarget(ItemId),
    /// The move would make an item its own descendant.
    #[error("drop would create a cycle in the hierarchy")]
    WouldCreateCycle,
}

/// Result of resolving a drop against the current ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderOutcome<T> {
    /// The drop is valid; apply the mutation.
    Apply(T),
    /// The drop is suppressed.
    NoOp(NoOpReason),
}

impl<T> ReorderOutcome<T> {
    /// Returns true if the drop produced a mutation.
    #[must_use]
    pub const fn is_apply(&self) -> bool {
        matches!(self, Self::Apply(_))
    }

    /// Returns the mutation, if any.
    #[must_use]
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Apply(mutation) => Some(mutation),
            Self::NoOp(_) => None,
        }
    }

    /// Returns the suppression reason, if any.
    #[must_use]
    pub const fn no_op_reason(&self) -> Option<NoOpReason> {
        match self {
            Self::Apply(_) => None,
            Self::NoOp(reason) => Some(*reason),
        }
    }
}
