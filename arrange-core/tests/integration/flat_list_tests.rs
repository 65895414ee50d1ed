//! Integration tests for flat list reordering through the drag machine

use std::sync::Arc;
use std::time::Duration;

use arrange_core::{
    DragEnd, DragMachine, DropPosition, FlatItem, FlatListState, FlatSettings, MemoryStore,
    NoOpReason, OriginScope, ReorderOutcome,
};

fn seeded(keys: &[f64]) -> (Arc<MemoryStore>, Vec<FlatItem>) {
    let items: Vec<FlatItem> = keys.iter().map(|k| FlatItem::new(Some(*k))).collect();
    let store = Arc::new(MemoryStore::with_items(items.clone(), Vec::new()));
    (store, items)
}

fn displayed_keys(state: &FlatListState<MemoryStore>) -> Vec<f64> {
    state.displayed().iter().filter_map(|i| i.key).collect()
}

#[tokio::test]
async fn test_drag_machine_drives_flat_reorder() {
    let (store, items) = seeded(&[1.0, 2.0, 3.0, 4.0]);
    let mut state = FlatListState::new(Arc::clone(&store), items.clone());
    let mut machine = DragMachine::new();

    machine.start(items[3].id, OriginScope::List);
    machine.over(items[0].id, DropPosition::After, &state);
    let end = machine.drop(&mut state);
    assert!(matches!(end, Some(DragEnd::Dropped { applied: true, .. })));

    // Moving up past the first item lands one unit before it
    assert_eq!(state.get(items[3].id).and_then(|i| i.key), Some(0.0));
    assert!(machine.state().is_idle());

    state.settle().await;
    assert_eq!(store.flat_write_count(), 1);
}

#[tokio::test]
async fn test_scenario_after_first_and_after_last() {
    let (store, items) = seeded(&[1.0, 2.0, 3.0]);
    let extra = FlatItem::new(Some(0.5));
    let mut all = items.clone();
    all.insert(0, extra.clone());
    let mut state = FlatListState::new(Arc::clone(&store), all);

    // Keys [1, 2, 3]: after 1.0 yields 1.5
    let update = state.reorder(extra.id, items[0].id).applied().unwrap();
    assert_eq!(update.new_key, 1.5);

    // After 3.0 (last) yields 4.0
    let update = state.reorder(items[0].id, items[2].id).applied().unwrap();
    assert_eq!(update.new_key, 4.0);

    let report = state.settle().await;
    assert_eq!(report.confirmed, 2);
}

#[tokio::test]
async fn test_self_drop_makes_no_persistence_call() {
    let (store, items) = seeded(&[1.0, 2.0]);
    let mut state = FlatListState::new(Arc::clone(&store), items.clone());
    let mut machine = DragMachine::new();

    machine.start(items[0].id, OriginScope::List);
    assert!(
        machine
            .over(items[0].id, DropPosition::Before, &state)
            .is_none()
    );
    assert_eq!(machine.drop(&mut state), Some(DragEnd::Cancelled));

    assert_eq!(
        state.reorder(items[0].id, items[0].id).no_op_reason(),
        Some(NoOpReason::SameItem)
    );
    assert!(state.settle().await.is_empty());
    assert_eq!(store.flat_write_count(), 0);
    assert_eq!(displayed_keys(&state), vec![1.0, 2.0]);
}

#[tokio::test]
async fn test_cancelled_drag_persists_nothing() {
    let (store, items) = seeded(&[1.0, 2.0, 3.0]);
    let mut state = FlatListState::new(Arc::clone(&store), items.clone());
    let mut machine = DragMachine::new();

    machine.start(items[0].id, OriginScope::List);
    machine.over(items[2].id, DropPosition::After, &state);
    assert_eq!(machine.leave_region(false), Some(DragEnd::Cancelled));
    assert_eq!(machine.drop(&mut state), None);

    assert_eq!(state.in_flight(), 0);
    assert_eq!(store.flat_write_count(), 0);
}

#[tokio::test]
async fn test_rejection_converges_to_store_state() {
    let (store, items) = seeded(&[1.0, 2.0, 3.0]);
    store.set_reject_writes(true);
    let mut state = FlatListState::new(Arc::clone(&store), items.clone());

    state.reorder(items[0].id, items[2].id);
    assert_eq!(displayed_keys(&state), vec![2.0, 3.0, 4.0]);

    let report = state.settle().await;
    assert_eq!(report.refetched, 1);
    assert_eq!(state.items(), store.flat_snapshot().await.as_slice());
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn test_second_drag_during_in_flight_write() {
    let (store, items) = seeded(&[1.0, 2.0, 3.0, 4.0]);
    store.set_latency(Duration::from_millis(20));
    let mut state = FlatListState::new(Arc::clone(&store), items.clone());

    // First move is still in flight when the second starts
    state.reorder(items[0].id, items[1].id);
    assert_eq!(state.in_flight(), 1);
    assert!(state.reconcile().is_empty());

    // The second drop sees the first one's local effect
    let second = state.reorder(items[3].id, items[0].id).applied().unwrap();
    assert_eq!(second.new_key, 2.25);
    assert_eq!(state.in_flight(), 2);

    let report = state.settle().await;
    assert_eq!(report.confirmed, 2);
    assert_eq!(state.in_flight(), 0);

    let order: Vec<_> = state.displayed().iter().map(|i| i.id).collect();
    assert_eq!(order, vec![items[1].id, items[3].id, items[0].id, items[2].id]);

    let mut stored = store.flat_snapshot().await;
    stored.sort_by(FlatItem::cmp_by_key);
    let stored_order: Vec<_> = stored.iter().map(|i| i.id).collect();
    assert_eq!(stored_order, order);
}

#[tokio::test]
async fn test_reconcile_drains_without_waiting() {
    let (store, items) = seeded(&[1.0, 2.0]);
    let mut state = FlatListState::new(Arc::clone(&store), items.clone());

    state.reorder(items[1].id, items[0].id);

    let mut confirmed = 0;
    for _ in 0..200 {
        confirmed += state.reconcile().confirmed;
        if state.in_flight() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(confirmed, 1);
    assert_eq!(state.in_flight(), 0);
}

#[tokio::test]
async fn test_renormalize_can_be_disabled() {
    let (store, items) = seeded(&[1.0, 1.0 + 1e-12, 3.0]);
    let settings = FlatSettings {
        renormalize: false,
        ..FlatSettings::default()
    };
    let mut state = FlatListState::new(Arc::clone(&store), items.clone()).with_settings(&settings);

    state.reorder(items[2].id, items[1].id);
    state.settle().await;

    // Only the dragged item was written
    assert_eq!(store.flat_write_count(), 1);
    let stored = store.flat_snapshot().await;
    assert_eq!(stored[0].key, Some(1.0));
    assert_eq!(stored[1].key, Some(1.0 + 1e-12));
}

#[tokio::test]
async fn test_load_and_unknown_ids() {
    let (store, items) = seeded(&[1.0, 2.0]);
    let mut state = FlatListState::load(Arc::clone(&store)).await.unwrap();
    assert_eq!(state.items().len(), 2);

    let ghost = arrange_core::ItemId::new();
    assert!(matches!(
        state.reorder(ghost, items[0].id),
        ReorderOutcome::NoOp(NoOpReason::UnknownDragged(_))
    ));
    assert!(matches!(
        state.reorder(items[0].id, ghost),
        ReorderOutcome::NoOp(NoOpReason::UnknownTarget(_))
    ));
}
