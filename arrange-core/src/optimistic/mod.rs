//! Optimistic update and reconciliation
//!
//! Mutations are applied to the local collection immediately, then sent to
//! the [`OrderStore`](crate::persistence::OrderStore) on a spawned task so
//! the next drag can start before the store answers. The task reports back
//! over a channel; the owning event loop drains it with `reconcile()` or
//! awaits it with `settle()`. On rejection the task refetches the full
//! authoritative collection, which then replaces local state wholesale.

mod flat;
mod tree;

pub use flat::FlatListState;
pub use tree::TreeState;

use tokio::sync::mpsc;

use crate::error::PersistError;

/// What a spawned persistence task reported back.
#[derive(Debug)]
pub(crate) enum PersistOutcome<T> {
    /// The store accepted the write
    Confirmed,
    /// The store rejected the write; this is its authoritative state
    Refetched(Vec<T>),
    /// The store rejected the write and the refetch failed too
    RefetchFailed(PersistError),
}

/// Tally of outcomes applied by one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Writes the store accepted
    pub confirmed: usize,
    /// Rejections that replaced local state with a refetch
    pub refetched: usize,
    /// Rejections whose refetch also failed
    pub refetch_failed: usize,
}

impl ReconcileReport {
    /// Returns true if nothing was reconciled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.confirmed == 0 && self.refetched == 0 && self.refetch_failed == 0
    }

    pub(crate) fn record<T>(&mut self, outcome: &PersistOutcome<T>) {
        match outcome {
            PersistOutcome::Confirmed => self.confirmed += 1,
            PersistOutcome::Refetched(_) => self.refetched += 1,
            PersistOutcome::RefetchFailed(_) => self.refetch_failed += 1,
        }
    }
}

/// Channel and in-flight counter shared by both topologies.
#[derive(Debug)]
pub(crate) struct Reconciler<T> {
    tx: mpsc::UnboundedSender<PersistOutcome<T>>,
    rx: mpsc::UnboundedReceiver<PersistOutcome<T>>,
    pending: usize,
}

impl<T> Reconciler<T> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, pending: 0 }
    }

    /// Registers a new in-flight write and returns its reply channel.
    pub(crate) fn begin(&mut self) -> mpsc::UnboundedSender<PersistOutcome<T>> {
        self.pending += 1;
        self.tx.clone()
    }

    pub(crate) const fn pending(&self) -> usize {
        self.pending
    }

    /// Takes one finished outcome without waiting.
    pub(crate) fn try_next(&mut self) -> Option<PersistOutcome<T>> {
        let outcome = self.rx.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(outcome)
    }

    /// Waits for the next outcome, or returns `None` if nothing is in flight.
    pub(crate) async fn next(&mut self) -> Option<PersistOutcome<T>> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.rx.recv().await?;
        self.pending = self.pending.saturating_sub(1);
        Some(outcome)
    }
}
