//! Ordered item models for flat lists and trees.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ItemId;

/// An item in a flat, fractionally keyed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatItem {
    /// Unique identifier
    pub id: ItemId,
    /// Fractional order key; `None` until the item has been persisted
    #[serde(default)]
    pub key: Option<f64>,
    /// Pinned items sort ahead of the rest in `PinnedFirst` display order
    #[serde(default)]
    pub pinned: bool,
    /// Creation timestamp, used as the stable tie-breaker
    pub created_at: DateTime<Utc>,
}

impl FlatItem {
    /// Creates an item with the given key and the current timestamp.
    #[must_use]
    pub fn new(key: Option<f64>) -> Self {
        Self {
            id: ItemId::new(),
            key,
            pinned: false,
            created_at: Utc::now(),
        }
    }

    /// Returns the key used for ordering, with a missing key sorting last.
    #[must_use]
    pub fn effective_key(&self) -> f64 {
        self.key.unwrap_or(f64::INFINITY)
    }

    /// Total order by key, then creation time, then ID.
    #[must_use]
    pub fn cmp_by_key(&self, other: &Self) -> Ordering {
        self.effective_key()
            .total_cmp(&other.effective_key())
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Kind of a tree node.
///
/// Containers can hold children and get a wider "inside" drop band;
/// leaves bias toward before/after reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A folder-like node
    Container,
    /// A plain item
    #[default]
    Leaf,
}

impl NodeKind {
    /// Returns true for containers.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Container)
    }
}

/// A node in a hierarchical tree, ranked by a dense integer within its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    /// Unique identifier
    pub id: ItemId,
    /// Parent node, `None` for root-level items
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    /// Dense rank within the sibling group
    #[serde(default)]
    pub order_index: i32,
    /// Container or leaf
    #[serde(default)]
    pub kind: NodeKind,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Creation timestamp, used as the stable tie-breaker
    pub created_at: DateTime<Utc>,
}

impl TreeItem {
    /// Creates a root-level leaf with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            parent_id: None,
            order_index: 0,
            kind: NodeKind::Leaf,
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Creates a root-level container with the given name.
    #[must_use]
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Container,
            ..Self::new(name)
        }
    }

    /// Sets the parent.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: Option<ItemId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Sets the order index.
    #[must_use]
    pub const fn with_order_index(mut self, order_index: i32) -> Self {
        self.order_index = order_index;
        self
    }

    /// Total order by rank, then creation time, then ID.
    #[must_use]
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.order_index
            .cmp(&other.order_index)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Case-insensitive name order, falling back to rank.
    #[must_use]
    pub fn cmp_name(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.cmp_rank(other))
    }
}
