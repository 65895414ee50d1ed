//! Property-based tests for the drag session state machine
//!
//! Arbitrary event sequences must keep the machine in a coherent state,
//! and every drop or cancel must bring it back to idle.

use arrange_core::session::CompletedDrop;
use arrange_core::{
    DragEnd, DragEvent, DragMachine, DragState, DropGuard, DropHandler, DropPosition, ItemId,
    OriginScope,
};
use proptest::prelude::*;

/// Rejects self drops and a fixed set of "descendants"
struct Controller {
    ids: Vec<ItemId>,
    forbidden: Vec<(usize, usize)>,
    drops: Vec<CompletedDrop>,
}

impl Controller {
    fn index(&self, id: ItemId) -> usize {
        self.ids.iter().position(|i| *i == id).unwrap_or(usize::MAX)
    }
}

impl DropGuard for Controller {
    fn accepts(&self, dragged_id: ItemId, target_id: ItemId) -> bool {
        let pair = (self.index(dragged_id), self.index(target_id));
        dragged_id != target_id && !self.forbidden.contains(&pair)
    }
}

impl DropHandler for Controller {
    fn handle_drop(&mut self, drop: &CompletedDrop) -> bool {
        self.drops.push(*drop);
        true
    }
}

#[derive(Debug, Clone)]
enum Step {
    Start(usize),
    Over(usize, DropPosition),
    LeaveTarget(usize),
    LeaveRegion(bool),
    Drop,
    End,
}

const POOL: usize = 5;

fn step_strategy() -> impl Strategy<Value = Step> {
    let position = prop_oneof![
        Just(DropPosition::Before),
        Just(DropPosition::After),
        Just(DropPosition::Inside),
    ];
    prop_oneof![
        (0..POOL).prop_map(Step::Start),
        ((0..POOL), position).prop_map(|(i, p)| Step::Over(i, p)),
        (0..POOL).prop_map(Step::LeaveTarget),
        any::<bool>().prop_map(Step::LeaveRegion),
        Just(Step::Drop),
        Just(Step::End),
    ]
}

fn to_event(step: &Step, ids: &[ItemId]) -> DragEvent {
    match *step {
        Step::Start(i) => DragEvent::Start {
            dragged_id: ids[i],
            origin_scope: OriginScope::List,
        },
        Step::Over(i, position) => DragEvent::Over {
            target_id: ids[i],
            position,
        },
        Step::LeaveTarget(i) => DragEvent::LeaveTarget { target_id: ids[i] },
        Step::LeaveRegion(related_inside) => DragEvent::LeaveRegion { related_inside },
        Step::Drop => DragEvent::Drop,
        Step::End => DragEvent::End,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The machine never hovers an invalid target and every terminal event
    /// lands in Idle
    #[test]
    fn prop_event_sequences_stay_coherent(
        steps in prop::collection::vec(step_strategy(), 0..40),
        forbidden in prop::collection::vec((0..POOL, 0..POOL), 0..6),
    ) {
        let ids: Vec<ItemId> = (0..POOL).map(|_| ItemId::new()).collect();
        let mut controller = Controller { ids: ids.clone(), forbidden, drops: Vec::new() };
        let mut machine = DragMachine::new();

        for step in &steps {
            let end = machine.handle(to_event(step, &ids), &mut controller);

            if let DragState::HoverTarget(session, target) = machine.state() {
                prop_assert!(controller.accepts(session.dragged_id, target.target_id));
            }

            match step {
                Step::Drop | Step::End => prop_assert!(machine.state().is_idle()),
                Step::LeaveRegion(false) => prop_assert!(machine.state().is_idle()),
                _ => {}
            }

            if let Some(DragEnd::Dropped { drop, .. }) = end {
                prop_assert!(controller.accepts(drop.dragged_id, drop.target_id));
            }
        }
    }

    /// Every handed-off drop corresponds to exactly one Dropped result
    #[test]
    fn prop_drops_are_handed_off_once(
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let ids: Vec<ItemId> = (0..POOL).map(|_| ItemId::new()).collect();
        let mut controller = Controller {
            ids: ids.clone(),
            forbidden: Vec::new(),
            drops: Vec::new(),
        };
        let mut machine = DragMachine::new();
        let mut dropped = 0;

        for step in &steps {
            let end = machine.handle(to_event(step, &ids), &mut controller);
            if let Some(DragEnd::Dropped { .. }) = end {
                dropped += 1;
            }
        }
        prop_assert_eq!(controller.drops.len(), dropped);
    }
}
