//! Hierarchical reorder controller
//!
//! Trees are stored as `(parent_id, order_index)` pairs. This module
//! provides cycle prevention, drop planning with dense renumbering, and
//! the read path that turns parent references back into a tree.

mod hierarchy;
mod reorder;
mod view;

pub use hierarchy::{
    ancestors, is_descendant, next_order_index, path_of, siblings, validate_hierarchy,
    would_create_cycle,
};
pub use reorder::{TreeMove, apply_placements, can_drop_on, plan_drop};
pub use view::{ChildOrder, TreeNode, build_tree, is_hidden, visible_rows};
