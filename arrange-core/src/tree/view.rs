//! Tree construction and visibility (read path)
//!
//! Nothing here mutates ranks. Trees are rebuilt from the flat node list
//! on demand and never cached across renders.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::hierarchy::{ancestors_in, parent_map};
use crate::models::{ItemId, TreeItem};

/// How children are sorted within each parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// By `order_index`
    #[default]
    Rank,
    /// By name, case-insensitive
    Name,
}

/// A node with its resolved depth and sorted children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// The underlying item
    pub item: TreeItem,
    /// Zero for roots
    pub depth: usize,
    /// Children in display order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Finds a node by ID in this subtree.
    #[must_use]
    pub fn find(&self, id: ItemId) -> Option<&Self> {
        if self.item.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Counts the nodes in this subtree, including itself.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Builds a forest from parent references.
///
/// Nodes whose parent does not resolve become roots. Nodes caught in a
/// parent cycle are unreachable from any root; they are promoted to roots
/// so they stay visible.
#[must_use]
pub fn build_tree(items: &[TreeItem], order: ChildOrder) -> Vec<TreeNode> {
    let ids: HashSet<ItemId> = items.iter().map(|i| i.id).collect();

    let mut children_of: HashMap<Option<ItemId>, Vec<&TreeItem>> = HashMap::new();
    for item in items {
        let parent = item
            .parent_id
            .filter(|p| *p != item.id && ids.contains(p));
        children_of.entry(parent).or_default().push(item);
    }
    for group in children_of.values_mut() {
        sort_group(group, order);
    }

    let mut visited = HashSet::new();
    let mut roots: Vec<TreeNode> = children_of
        .get(&None)
        .map(|group| group.clone())
        .unwrap_or_default()
        .into_iter()
        .map(|item| build_node(item, 0, &children_of, &mut visited))
        .collect();

    let mut stranded: Vec<&TreeItem> = items.iter().filter(|i| !visited.contains(&i.id)).collect();
    if !stranded.is_empty() {
        warn!(count = stranded.len(), "Promoting nodes caught in a parent cycle to roots");
        sort_group(&mut stranded, order);
        for item in stranded {
            if !visited.contains(&item.id) {
                roots.push(build_node(item, 0, &children_of, &mut visited));
            }
        }
    }

    roots
}

fn sort_group(group: &mut [&TreeItem], order: ChildOrder) {
    match order {
        ChildOrder::Rank => group.sort_by(|a, b| a.cmp_rank(b)),
        ChildOrder::Name => group.sort_by(|a, b| a.cmp_name(b)),
    }
}

fn build_node(
    item: &TreeItem,
    depth: usize,
    children_of: &HashMap<Option<ItemId>, Vec<&TreeItem>>,
    visited: &mut HashSet<ItemId>,
) -> TreeNode {
    visited.insert(item.id);

    let mut children = Vec::new();
    if let Some(group) = children_of.get(&Some(item.id)) {
        for child in group {
            if !visited.contains(&child.id) {
                children.push(build_node(child, depth + 1, children_of, visited));
            }
        }
    }

    TreeNode {
        item: item.clone(),
        depth,
        children,
    }
}

/// Returns true if any ancestor of `id` is collapsed.
///
/// Ancestors are walked live from the node list on every call.
#[must_use]
pub fn is_hidden(id: ItemId, items: &[TreeItem], collapsed: &HashSet<ItemId>) -> bool {
    if collapsed.is_empty() {
        return false;
    }
    ancestors_in(id, &parent_map(items))
        .iter()
        .any(|ancestor| collapsed.contains(ancestor))
}

/// Flattens the forest into visible rows in display order.
///
/// Children of collapsed nodes are skipped; the collapsed node itself
/// stays visible.
#[must_use]
pub fn visible_rows<'a>(
    roots: &'a [TreeNode],
    collapsed: &HashSet<ItemId>,
) -> Vec<&'a TreeNode> {
    fn walk<'a>(node: &'a TreeNode, collapsed: &HashSet<ItemId>, out: &mut Vec<&'a TreeNode>) {
        out.push(node);
        if collapsed.contains(&node.item.id) {
            return;
        }
        for child in &node.children {
            walk(child, collapsed, out);
        }
    }

    let mut rows = Vec::new();
    for root in roots {
        walk(root, collapsed, &mut rows);
    }
    rows
}
