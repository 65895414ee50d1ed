//! Ancestor walks and sibling-group queries over a flat slice of nodes.
//!
//! The tree is stored as parent references, so nothing here trusts the
//! data to be acyclic: every upward walk is bounded by the node count.

use std::collections::{HashMap, HashSet};

use crate::models::{ItemId, TreeItem};

/// Maps each node to its parent reference.
pub(crate) fn parent_map(items: &[TreeItem]) -> HashMap<ItemId, Option<ItemId>> {
    items.iter().map(|i| (i.id, i.parent_id)).collect()
}

/// Returns the ancestors of `node_id`, nearest first.
///
/// Stops at a root, at a parent reference that does not resolve, or when
/// the walk revisits a node.
#[must_use]
pub fn ancestors(node_id: ItemId, items: &[TreeItem]) -> Vec<ItemId> {
    ancestors_in(node_id, &parent_map(items))
}

pub(crate) fn ancestors_in(
    node_id: ItemId,
    parents: &HashMap<ItemId, Option<ItemId>>,
) -> Vec<ItemId> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([node_id]);
    let mut current = parents.get(&node_id).copied().flatten();

    while let Some(id) = current {
        if !seen.insert(id) || !parents.contains_key(&id) {
            break;
        }
        chain.push(id);
        current = parents.get(&id).copied().flatten();
    }

    chain
}

/// Returns true if `node_id` lies strictly below `candidate_ancestor_id`.
#[must_use]
pub fn is_descendant(
    candidate_ancestor_id: ItemId,
    node_id: ItemId,
    items: &[TreeItem],
) -> bool {
    let parents = parent_map(items);
    is_descendant_in(candidate_ancestor_id, node_id, &parents)
}

pub(crate) fn is_descendant_in(
    candidate_ancestor_id: ItemId,
    node_id: ItemId,
    parents: &HashMap<ItemId, Option<ItemId>>,
) -> bool {
    let mut seen = HashSet::from([node_id]);
    let mut current = parents.get(&node_id).copied().flatten();

    while let Some(id) = current {
        if id == candidate_ancestor_id {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }

    false
}

/// Checks if moving `node_id` under `new_parent_id` would create a cycle.
///
/// A cycle would be created if the new parent is the node itself or one
/// of its descendants.
#[must_use]
pub fn would_create_cycle(
    node_id: ItemId,
    new_parent_id: Option<ItemId>,
    items: &[TreeItem],
) -> bool {
    match new_parent_id {
        None => false,
        Some(parent_id) if parent_id == node_id => true,
        Some(parent_id) => is_descendant(node_id, parent_id, items),
    }
}

/// Validates that the hierarchy is acyclic
///
/// Returns true if no parent chain revisits a node.
#[must_use]
pub fn validate_hierarchy(items: &[TreeItem]) -> bool {
    let parents = parent_map(items);
    for item in items {
        let mut visited = HashSet::new();
        let mut current_id = Some(item.id);

        while let Some(id) = current_id {
            if !visited.insert(id) {
                return false;
            }
            current_id = parents.get(&id).copied().flatten();
        }
    }

    true
}

/// Gets the full path of a node (e.g., "Projects/Backend/API")
#[must_use]
pub fn path_of(node_id: ItemId, items: &[TreeItem]) -> Option<String> {
    let by_id: HashMap<ItemId, &TreeItem> = items.iter().map(|i| (i.id, i)).collect();
    let node = by_id.get(&node_id)?;

    let mut parts: Vec<&str> = ancestors(node_id, items)
        .iter()
        .filter_map(|id| by_id.get(id).map(|i| i.name.as_str()))
        .collect();
    parts.reverse();
    parts.push(node.name.as_str());
    Some(parts.join("/"))
}

/// Returns the sibling group under `parent_id` in rank order, minus `exclude`.
#[must_use]
pub fn siblings<'a>(
    items: &'a [TreeItem],
    parent_id: Option<ItemId>,
    exclude: Option<ItemId>,
) -> Vec<&'a TreeItem> {
    let mut group: Vec<&TreeItem> = items
        .iter()
        .filter(|i| i.parent_id == parent_id && Some(i.id) != exclude)
        .collect();
    group.sort_by(|a, b| a.cmp_rank(b));
    group
}

/// Returns the next available `order_index` under the given parent.
///
/// Computes `max(order_index) + 1` among existing children,
/// or `0` if the parent has none.
#[must_use]
pub fn next_order_index(items: &[TreeItem], parent_id: Option<ItemId>) -> i32 {
    items
        .iter()
        .filter(|i| i.parent_id == parent_id)
        .map(|i| i.order_index)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}
