//! Drag session state machine
//!
//! Tracks the ephemeral lifecycle of one drag gesture:
//!
//! ```text
//! Idle -> Dragging -> HoverTarget -> { Dropped -> Idle, Cancelled -> Idle }
//! ```
//!
//! The machine owns no items. Validity of a hover target is delegated to a
//! [`DropGuard`] and the completed drop is handed to a [`DropHandler`];
//! both are implemented by the flat and tree optimistic states.

use tracing::debug;

use crate::drag_drop::DropPosition;
use crate::models::{ItemId, TreeItem};
use crate::tree;

/// Where a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginScope {
    /// A flat list
    List,
    /// A tree sibling group under the given parent
    Parent(Option<ItemId>),
}

/// The item being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    /// Dragged item
    pub dragged_id: ItemId,
    /// Scope the drag started in
    pub origin_scope: OriginScope,
}

/// The currently hovered candidate and the classified position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// Hovered item
    pub target_id: ItemId,
    /// Classified drop position
    pub position: DropPosition,
}

/// A drop handed off to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedDrop {
    /// Dragged item
    pub dragged_id: ItemId,
    /// Drop target
    pub target_id: ItemId,
    /// Drop position
    pub position: DropPosition,
}

/// Current phase of the drag lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No drag in progress
    #[default]
    Idle,
    /// Dragging with no valid target under the pointer
    Dragging(DragSession),
    /// Dragging over a valid target
    HoverTarget(DragSession, DropTarget),
}

impl DragState {
    /// Returns the active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) | Self::HoverTarget(session, _) => Some(session),
        }
    }

    /// Returns the hovered target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&DropTarget> {
        match self {
            Self::HoverTarget(_, target) => Some(target),
            _ => None,
        }
    }

    /// Returns true when no drag is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEnd {
    /// A drop was handed to the controller; `applied` is its verdict
    Dropped {
        /// The drop that was handed off
        drop: CompletedDrop,
        /// Whether the controller produced a mutation
        applied: bool,
    },
    /// The drag ended with no drop and no side effects
    Cancelled,
}

/// Decides whether a hovered item may receive the dragged item.
pub trait DropGuard {
    /// Returns true if a drop indicator may be shown for `target_id`.
    fn accepts(&self, dragged_id: ItemId, target_id: ItemId) -> bool;
}

/// Receives completed drops. Every handler is also the guard for its own
/// collection.
pub trait DropHandler: DropGuard {
    /// Applies the drop; returns true if a mutation was produced.
    fn handle_drop(&mut self, drop: &CompletedDrop) -> bool;
}

/// Guard for flat lists: only the dragged item itself is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGuard;

impl DropGuard for FlatGuard {
    fn accepts(&self, dragged_id: ItemId, target_id: ItemId) -> bool {
        dragged_id != target_id
    }
}

/// Guard for trees: rejects the dragged item and all of its descendants.
#[derive(Debug, Clone, Copy)]
pub struct TreeGuard<'a>(pub &'a [TreeItem]);

impl DropGuard for TreeGuard<'_> {
    fn accepts(&self, dragged_id: ItemId, target_id: ItemId) -> bool {
        tree::can_drop_on(self.0, dragged_id, target_id)
    }
}

/// Pointer and lifecycle events fed to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    /// Drag started on an item
    Start {
        /// Dragged item
        dragged_id: ItemId,
        /// Scope it was dragged from
        origin_scope: OriginScope,
    },
    /// Pointer moved over a candidate with a classified position
    Over {
        /// Hovered item
        target_id: ItemId,
        /// Classified position
        position: DropPosition,
    },
    /// Pointer left a candidate row
    LeaveTarget {
        /// Row that was left
        target_id: ItemId,
    },
    /// Pointer left an element of the interactive region
    LeaveRegion {
        /// Whether the element the pointer entered is still inside the root
        related_inside: bool,
    },
    /// Pointer released over the current target
    Drop,
    /// Drag ended without a drop
    End,
}

/// State machine for one interactive region.
#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    /// Creates an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Starts a drag. An unfinished drag is cancelled first.
    pub fn start(&mut self, dragged_id: ItemId, origin_scope: OriginScope) {
        if !self.state.is_idle() {
            self.cancel("restarted");
        }
        debug!(dragged_id = %dragged_id, ?origin_scope, "Drag started");
        self.state = DragState::Dragging(DragSession {
            dragged_id,
            origin_scope,
        });
    }

    /// Re-evaluates the hover target.
    ///
    /// Returns the accepted target, or `None` if the guard rejected it or
    /// no drag is in progress. A rejected candidate clears any previous
    /// target so no indicator promises an invalid move.
    pub fn over(
        &mut self,
        target_id: ItemId,
        position: DropPosition,
        guard: &impl DropGuard,
    ) -> Option<DropTarget> {
        let session = *self.state.session()?;

        if guard.accepts(session.dragged_id, target_id) {
            let target = DropTarget {
                target_id,
                position,
            };
            if self.state.target() != Some(&target) {
                debug!(target_id = %target_id, %position, "Hover target");
            }
            self.state = DragState::HoverTarget(session, target);
            Some(target)
        } else {
            if self.state.target().is_some() {
                debug!(target_id = %target_id, "Hover target rejected");
            }
            self.state = DragState::Dragging(session);
            None
        }
    }

    /// Discards the target if the pointer left its row.
    pub fn leave_target(&mut self, target_id: ItemId) {
        if let DragState::HoverTarget(session, target) = self.state
            && target.target_id == target_id
        {
            self.state = DragState::Dragging(session);
        }
    }

    /// Handles the pointer leaving an element of the interactive region.
    ///
    /// Crossing into a child element keeps the drag alive; leaving the
    /// root cancels it.
    pub fn leave_region(&mut self, related_inside: bool) -> Option<DragEnd> {
        if related_inside || self.state.is_idle() {
            return None;
        }
        self.cancel("left region");
        Some(DragEnd::Cancelled)
    }

    /// Ends the drag without a drop.
    pub fn end(&mut self) -> Option<DragEnd> {
        if self.state.is_idle() {
            return None;
        }
        self.cancel("drag ended");
        Some(DragEnd::Cancelled)
    }

    /// Hands the drop to the controller and returns to idle.
    ///
    /// Dropping with no accepted target is a cancel.
    pub fn drop(&mut self, handler: &mut impl DropHandler) -> Option<DragEnd> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging(session) => {
                debug!(dragged_id = %session.dragged_id, "Drop without target cancelled");
                Some(DragEnd::Cancelled)
            }
            DragState::HoverTarget(session, target) => {
                let drop = CompletedDrop {
                    dragged_id: session.dragged_id,
                    target_id: target.target_id,
                    position: target.position,
                };
                let applied = handler.handle_drop(&drop);
                debug!(
                    dragged_id = %drop.dragged_id,
                    target_id = %drop.target_id,
                    position = %drop.position,
                    applied,
                    "Dropped"
                );
                Some(DragEnd::Dropped { drop, applied })
            }
        }
    }

    /// Dispatches an event to the matching transition.
    ///
    /// The controller both vets hover targets and receives the drop.
    pub fn handle(
        &mut self,
        event: DragEvent,
        controller: &mut impl DropHandler,
    ) -> Option<DragEnd> {
        match event {
            DragEvent::Start {
                dragged_id,
                origin_scope,
            } => {
                self.start(dragged_id, origin_scope);
                None
            }
            DragEvent::Over {
                target_id,
                position,
            } => {
                self.over(target_id, position, &*controller);
                None
            }
            DragEvent::LeaveTarget { target_id } => {
                self.leave_target(target_id);
                None
            }
            DragEvent::LeaveRegion { related_inside } => self.leave_region(related_inside),
            DragEvent::Drop => self.drop(controller),
            DragEvent::End => self.end(),
        }
    }

    fn cancel(&mut self, reason: &str) {
        if let Some(session) = self.state.session() {
            debug!(dragged_id = %session.dragged_id, reason, "Drag cancelled");
        }
        self.state = DragState::Idle;
    }
}
