//! Integration tests for tree moves through the drag machine

use std::sync::Arc;

use arrange_core::tree::{path_of, validate_hierarchy};
use arrange_core::{
    DragEnd, DragMachine, DropPosition, DropZones, ItemId, MemoryParentPreference, MemoryStore,
    NoOpReason, OriginScope, TreeItem, TreeSettings, TreeState,
};

struct Fixture {
    folder: TreeItem,
    a: TreeItem,
    b: TreeItem,
    c: TreeItem,
}

/// F holds [A(0), B(1)]; C is a root after F
fn fixture() -> Fixture {
    let folder = TreeItem::container("F");
    let a = TreeItem::new("A").with_parent(Some(folder.id));
    let b = TreeItem::new("B")
        .with_parent(Some(folder.id))
        .with_order_index(1);
    let c = TreeItem::new("C").with_order_index(1);
    Fixture { folder, a, b, c }
}

impl Fixture {
    fn all(&self) -> Vec<TreeItem> {
        vec![self.folder.clone(), self.a.clone(), self.b.clone(), self.c.clone()]
    }
}

fn state_for(items: Vec<TreeItem>) -> (Arc<MemoryStore>, TreeState<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_items(Vec::new(), items.clone()));
    (Arc::clone(&store), TreeState::new(store, items))
}

fn rank_of(state: &TreeState<MemoryStore>, id: ItemId) -> (Option<ItemId>, i32) {
    let item = state.get(id).unwrap();
    (item.parent_id, item.order_index)
}

#[tokio::test]
async fn test_drop_inside_folder_appends() {
    let f = fixture();
    let (store, mut state) = state_for(f.all());
    let mut machine = DragMachine::new();

    machine.start(f.c.id, OriginScope::Parent(None));
    machine.over(f.folder.id, DropPosition::Inside, &state);
    let end = machine.drop(&mut state);
    assert!(matches!(end, Some(DragEnd::Dropped { applied: true, .. })));

    assert_eq!(rank_of(&state, f.c.id), (Some(f.folder.id), 2));
    assert_eq!(rank_of(&state, f.a.id), (Some(f.folder.id), 0));
    assert_eq!(rank_of(&state, f.b.id), (Some(f.folder.id), 1));

    let report = state.settle().await;
    assert_eq!(report.confirmed, 1);
    assert_eq!(store.tree_write_count(), 1);
    assert_eq!(path_of(f.c.id, state.items()).as_deref(), Some("F/C"));
}

#[tokio::test]
async fn test_drag_before_first_root_renumbers_group() {
    let x = TreeItem::new("X");
    let y = TreeItem::new("Y").with_order_index(1);
    let z = TreeItem::new("Z").with_order_index(2);
    let (store, mut state) = state_for(vec![x.clone(), y.clone(), z.clone()]);

    let plan = state
        .move_item(z.id, x.id, DropPosition::Before)
        .applied()
        .unwrap();
    assert_eq!(plan.placements.len(), 3);

    assert_eq!(rank_of(&state, z.id), (None, 0));
    assert_eq!(rank_of(&state, x.id), (None, 1));
    assert_eq!(rank_of(&state, y.id), (None, 2));

    state.settle().await;
    let stored = store.tree_snapshot().await;
    assert_eq!(stored, state.items());
}

#[tokio::test]
async fn test_folder_into_own_child_is_rejected() {
    let f = fixture();
    let items = vec![f.folder.clone(), f.a.clone(), f.b.clone(), f.c.clone()];
    let (store, mut state) = state_for(items.clone());
    let mut machine = DragMachine::new();

    machine.start(f.folder.id, OriginScope::Parent(None));
    assert!(machine.over(f.a.id, DropPosition::Inside, &state).is_none());
    assert_eq!(machine.drop(&mut state), Some(DragEnd::Cancelled));

    // Bypassing the guard still cannot create the cycle
    assert_eq!(
        state
            .move_item(f.folder.id, f.b.id, DropPosition::Inside)
            .no_op_reason(),
        Some(NoOpReason::WouldCreateCycle)
    );

    state.settle().await;
    assert_eq!(store.tree_write_count(), 0);
    assert_eq!(state.items(), items.as_slice());
    assert!(validate_hierarchy(state.items()));
}

#[tokio::test]
async fn test_rejected_move_snaps_back_to_store() {
    let f = fixture();
    let (store, mut state) = state_for(f.all());
    store.set_reject_writes(true);

    state.move_item(f.a.id, f.c.id, DropPosition::After);
    assert_eq!(rank_of(&state, f.a.id).0, None);

    let report = state.settle().await;
    assert_eq!(report.refetched, 1);
    assert_eq!(rank_of(&state, f.a.id), (Some(f.folder.id), 0));
    assert_eq!(state.items(), store.tree_snapshot().await.as_slice());
}

#[tokio::test]
async fn test_failed_refetch_keeps_optimistic_tree() {
    let f = fixture();
    let (store, mut state) = state_for(f.all());
    store.set_reject_writes(true);
    store.set_fail_fetches(true);

    state.move_item(f.c.id, f.folder.id, DropPosition::Inside);
    let report = state.settle().await;
    assert_eq!(report.refetch_failed, 1);
    assert_eq!(rank_of(&state, f.c.id), (Some(f.folder.id), 2));
}

#[tokio::test]
async fn test_cross_parent_move_leaves_old_group_gapped() {
    let f = fixture();
    let (_store, mut state) = state_for(f.all());

    state.move_item(f.a.id, f.c.id, DropPosition::Before);
    assert_eq!(rank_of(&state, f.a.id), (None, 1));
    assert_eq!(rank_of(&state, f.c.id), (None, 2));
    // Old siblings keep their ranks
    assert_eq!(rank_of(&state, f.b.id), (Some(f.folder.id), 1));

    // A later sibling drop in the old group closes the gap
    let d = state.insert_new(TreeItem::new("D").with_parent(Some(f.folder.id)));
    assert_eq!(d.order_index, 2);
    state.move_item(d.id, f.b.id, DropPosition::Before);
    assert_eq!(rank_of(&state, d.id), (Some(f.folder.id), 0));
    assert_eq!(rank_of(&state, f.b.id), (Some(f.folder.id), 1));
    state.settle().await;
}

#[tokio::test]
async fn test_pointer_classification_drives_position() {
    let f = fixture();
    let (_store, mut state) = state_for(f.all());
    let zones = DropZones::default();

    // Top quarter of a container row is "before"
    let plan = state
        .move_by_pointer(f.c.id, f.folder.id, 2.0, 32.0, &zones)
        .applied()
        .unwrap();
    assert_eq!(plan.position, DropPosition::Before);
    assert_eq!(rank_of(&state, f.c.id), (None, 0));

    // Bottom third of a leaf row is "after"
    let plan = state
        .move_by_pointer(f.c.id, f.a.id, 30.0, 32.0, &zones)
        .applied()
        .unwrap();
    assert_eq!(plan.position, DropPosition::After);
    assert_eq!(rank_of(&state, f.c.id), (Some(f.folder.id), 1));
    assert_eq!(rank_of(&state, f.b.id), (Some(f.folder.id), 2));

    state.settle().await;
}

#[tokio::test]
async fn test_new_items_follow_recent_parent() {
    let f = fixture();
    let store = Arc::new(MemoryStore::new());
    let mut state = TreeState::new(store, vec![f.folder.clone(), f.a.clone(), f.b.clone()])
        .with_preferences(Box::new(MemoryParentPreference::new()))
        .with_settings(&TreeSettings::default());

    assert_eq!(state.suggest_parent(), None);
    state.insert_new(TreeItem::new("note").with_parent(Some(f.folder.id)));

    let parent = state.suggest_parent();
    assert_eq!(parent, Some(f.folder.id));
    let next = state.insert_new(TreeItem::new("next").with_parent(parent));
    assert_eq!(next.order_index, 3);
}

#[tokio::test]
async fn test_collapsed_folder_hides_children_until_refetch_drops_it() {
    let f = fixture();
    let (store, mut state) = state_for(f.all());
    state.collapse(f.folder.id);
    assert_eq!(state.visible_ids(), vec![f.folder.id, f.c.id]);

    // A stale collapsed entry is pruned when the store no longer has the node
    let ghost = ItemId::new();
    state.collapse(ghost);
    store.set_reject_writes(true);
    state.move_item(f.c.id, f.a.id, DropPosition::After);
    state.settle().await;
    assert!(!state.collapsed().contains(&ghost));
    assert!(state.collapsed().contains(&f.folder.id));
}
