//! Property-based tests for the hierarchical reorder controller
//!
//! Random acyclic forests are generated by letting each node pick its
//! parent among the nodes created before it.

use std::collections::HashSet;

use arrange_core::tree::{
    apply_placements, is_descendant, next_order_index, siblings, validate_hierarchy,
};
use arrange_core::{
    ChildOrder, DropPosition, ItemId, ReorderOutcome, TreeItem, build_tree, plan_drop,
};
use proptest::prelude::*;

type NodeShape = (bool, prop::sample::Index, bool);

fn forest_strategy() -> impl Strategy<Value = Vec<NodeShape>> {
    prop::collection::vec(
        (any::<bool>(), any::<prop::sample::Index>(), any::<bool>()),
        2..16,
    )
}

fn position_strategy() -> impl Strategy<Value = DropPosition> {
    prop_oneof![
        Just(DropPosition::Before),
        Just(DropPosition::After),
        Just(DropPosition::Inside),
    ]
}

fn build_forest(shape: &[NodeShape]) -> Vec<TreeItem> {
    let mut items: Vec<TreeItem> = Vec::with_capacity(shape.len());
    for (i, (is_root, parent_pick, container)) in shape.iter().enumerate() {
        let name = format!("n{i}");
        let mut item = if *container {
            TreeItem::container(name)
        } else {
            TreeItem::new(name)
        };
        if i > 0 && !is_root {
            item.parent_id = Some(items[parent_pick.index(i)].id);
        }
        item.order_index = next_order_index(&items, item.parent_id);
        items.push(item);
    }
    items
}

fn ranks(items: &[TreeItem], parent: Option<ItemId>) -> Vec<i32> {
    siblings(items, parent, None)
        .iter()
        .map(|i| i.order_index)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// Drops on the node itself or any descendant are rejected; every
    /// other drop keeps the hierarchy acyclic
    #[test]
    fn prop_moves_never_create_cycles(
        shape in forest_strategy(),
        dragged in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
        position in position_strategy(),
    ) {
        let mut items = build_forest(&shape);
        let dragged = items[dragged.index(items.len())].id;
        let target = items[target.index(items.len())].id;
        let invalid = dragged == target || is_descendant(dragged, target, &items);

        match plan_drop(&items, dragged, target, position) {
            ReorderOutcome::NoOp(_) => prop_assert!(invalid),
            ReorderOutcome::Apply(plan) => {
                prop_assert!(!invalid, "descendant drop was accepted");
                apply_placements(&mut items, &plan.placements);
                prop_assert!(validate_hierarchy(&items));
            }
        }
    }

    /// Rejected drops leave the structure untouched
    #[test]
    fn prop_rejected_drop_changes_nothing(
        shape in forest_strategy(),
        pick in any::<prop::sample::Index>(),
        position in position_strategy(),
    ) {
        let items = build_forest(&shape);
        let before = items.clone();
        // Find some node with a descendant, if any
        let has_child = |id: ItemId| items.iter().any(|c| c.parent_id == Some(id));
        let Some(parent) = items.iter().find(|i| has_child(i.id)) else {
            return Ok(());
        };
        let descendants: Vec<ItemId> = items
            .iter()
            .filter(|c| is_descendant(parent.id, c.id, &items))
            .map(|c| c.id)
            .collect();
        let target = descendants[pick.index(descendants.len())];

        let outcome = plan_drop(&items, parent.id, target, position);
        prop_assert!(!outcome.is_apply());
        prop_assert_eq!(items, before);
    }

    /// Before/after drops leave the destination group ranked 0..n-1
    #[test]
    fn prop_sibling_drop_is_dense(
        shape in forest_strategy(),
        dragged in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
        after in any::<bool>(),
    ) {
        let mut items = build_forest(&shape);
        let dragged = items[dragged.index(items.len())].id;
        let target = items[target.index(items.len())].id;
        let position = if after { DropPosition::After } else { DropPosition::Before };

        if let ReorderOutcome::Apply(plan) = plan_drop(&items, dragged, target, position) {
            apply_placements(&mut items, &plan.placements);
            let group = ranks(&items, plan.new_parent_id);
            let expected: Vec<i32> = (0..group.len() as i32).collect();
            prop_assert_eq!(group, expected);

            // Dragged sits immediately next to the target
            let order: Vec<ItemId> = siblings(&items, plan.new_parent_id, None)
                .iter()
                .map(|i| i.id)
                .collect();
            let d = order.iter().position(|id| *id == dragged).unwrap();
            let t = order.iter().position(|id| *id == target).unwrap();
            prop_assert_eq!(d, if after { t + 1 } else { t - 1 });
        }
    }

    /// Inside drops append after the target's existing children and leave
    /// their ranks alone
    #[test]
    fn prop_inside_drop_appends(
        shape in forest_strategy(),
        dragged in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
    ) {
        let mut items = build_forest(&shape);
        let dragged = items[dragged.index(items.len())].id;
        let target = items[target.index(items.len())].id;
        let prior: Vec<(ItemId, i32)> = siblings(&items, Some(target), Some(dragged))
            .iter()
            .map(|i| (i.id, i.order_index))
            .collect();

        let outcome = plan_drop(&items, dragged, target, DropPosition::Inside);
        if let ReorderOutcome::Apply(plan) = outcome {
            prop_assert_eq!(plan.placements.len(), 1);
            apply_placements(&mut items, &plan.placements);

            let moved = items.iter().find(|i| i.id == dragged).unwrap();
            prop_assert_eq!(moved.parent_id, Some(target));
            prop_assert_eq!(moved.order_index, prior.len() as i32);
            for (id, rank) in prior {
                let child = items.iter().find(|i| i.id == id).unwrap();
                prop_assert_eq!(child.order_index, rank);
            }
        }
    }

    /// Tree construction never loses or duplicates a node
    #[test]
    fn prop_build_tree_covers_every_node(shape in forest_strategy(), by_name in any::<bool>()) {
        let items = build_forest(&shape);
        let order = if by_name { ChildOrder::Name } else { ChildOrder::Rank };
        let roots = build_tree(&items, order);

        let total: usize = roots.iter().map(arrange_core::TreeNode::count).sum();
        prop_assert_eq!(total, items.len());

        let distinct: HashSet<ItemId> = items.iter().map(|i| i.id).collect();
        for id in &distinct {
            prop_assert!(roots.iter().any(|r| r.find(*id).is_some()));
        }
    }
}
