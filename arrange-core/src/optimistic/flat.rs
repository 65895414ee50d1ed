//! Optimistic state for a flat list.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{Instrument, debug, error, info, warn};

use super::{PersistOutcome, ReconcileReport, Reconciler};
use crate::config::FlatSettings;
use crate::error::PersistResult;
use crate::flat::{self, DisplayOrder};
use crate::logging::span_names;
use crate::models::{FlatItem, ItemId, KeyUpdate, ReorderOutcome};
use crate::persistence::OrderStore;
use crate::sequence::{InsertIntent, has_precision_gap, renormalize};
use crate::session::{CompletedDrop, DropGuard, DropHandler};

/// Client-side copy of a flat list with optimistic reorders.
///
/// Must be driven from within a Tokio runtime: persistence runs on
/// spawned tasks.
pub struct FlatListState<S: OrderStore + ?Sized> {
    items: Vec<FlatItem>,
    store: Arc<S>,
    settings: FlatSettings,
    visible: Option<HashSet<ItemId>>,
    reconciler: Reconciler<FlatItem>,
}

impl<S: OrderStore + ?Sized + 'static> FlatListState<S> {
    /// Creates a state over an already loaded collection.
    #[must_use]
    pub fn new(store: Arc<S>, items: Vec<FlatItem>) -> Self {
        Self {
            items,
            store,
            settings: FlatSettings::default(),
            visible: None,
            reconciler: Reconciler::new(),
        }
    }

    /// Loads the collection from the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the initial fetch fails.
    pub async fn load(store: Arc<S>) -> PersistResult<Self> {
        let items = store.fetch_flat().await?;
        Ok(Self::new(store, items))
    }

    /// Applies display and precision settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: &FlatSettings) -> Self {
        self.settings = *settings;
        self
    }

    /// Returns the backing collection in storage order.
    #[must_use]
    pub fn items(&self) -> &[FlatItem] {
        &self.items
    }

    /// Returns the item with the given ID.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&FlatItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Restricts the displayed order to the given IDs (an external filter).
    ///
    /// `None` shows every item.
    pub fn set_visible(&mut self, visible: Option<HashSet<ItemId>>) {
        self.visible = visible;
    }

    /// Changes how the list is sorted for display.
    pub fn set_display_order(&mut self, order: DisplayOrder) {
        self.settings.display = order;
    }

    /// Returns the items as the user currently sees them.
    #[must_use]
    pub fn displayed(&self) -> Vec<FlatItem> {
        let mut displayed = flat::sort_for_display(&self.items, self.settings.display);
        if let Some(visible) = &self.visible {
            displayed.retain(|i| visible.contains(&i.id));
        }
        displayed
    }

    /// Number of persistence calls that have not been reconciled yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.reconciler.pending()
    }

    /// Resolves a drop of `dragged_id` onto `target_id` and applies it.
    pub fn reorder(&mut self, dragged_id: ItemId, target_id: ItemId) -> ReorderOutcome<KeyUpdate> {
        let span = tracing::info_span!(span_names::REORDER_FLAT, item_id = %dragged_id);
        let _guard = span.enter();

        let displayed = self.displayed();
        let outcome = flat::reorder(&displayed, dragged_id, target_id);
        match &outcome {
            ReorderOutcome::Apply(update) => {
                let position = |id: ItemId| displayed.iter().position(|i| i.id == id);
                let intent = if position(dragged_id) < position(target_id) {
                    InsertIntent::After
                } else {
                    InsertIntent::Before
                };
                self.apply_move(*update, Some((target_id, intent)));
            }
            ReorderOutcome::NoOp(reason) => debug!(%reason, "Flat drop suppressed"),
        }
        outcome
    }

    /// Applies a key update locally and persists it in the background.
    ///
    /// If the new key has become indistinguishable from a displayed
    /// neighbour, the whole list is renumbered and persisted as one batch
    /// instead.
    pub fn apply_and_persist(&mut self, update: KeyUpdate) {
        self.apply_move(update, None);
    }

    /// Applies `update`; `anchor` is the drop target and side, used to keep
    /// the dragged item in place if the list has to be renumbered.
    fn apply_move(&mut self, update: KeyUpdate, anchor: Option<(ItemId, InsertIntent)>) {
        let Some(item) = self.items.iter_mut().find(|i| i.id == update.item_id) else {
            warn!(item_id = %update.item_id, "Ignoring key update for unknown item");
            return;
        };
        item.key = Some(update.new_key);
        info!(item_id = %update.item_id, new_key = update.new_key, "Applied flat reorder");

        let batch = if self.settings.renormalize && self.is_crowded(update) {
            let batch = self.renumber(update.item_id, anchor);
            warn!(count = batch.len(), "Key precision exhausted, renumbering list");
            batch
        } else {
            vec![update]
        };

        self.persist(batch);
    }

    /// Applies every finished persistence outcome without waiting.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        while let Some(outcome) = self.reconciler.try_next() {
            report.record(&outcome);
            self.apply_outcome(outcome);
        }
        report
    }

    /// Waits for every in-flight persistence call and applies the outcomes.
    pub async fn settle(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        while let Some(outcome) = self.reconciler.next().await {
            report.record(&outcome);
            self.apply_outcome(outcome);
        }
        report
    }

    /// Replaces local state with the store's current collection.
    ///
    /// # Errors
    ///
    /// Returns the store's error; local state is kept on failure.
    pub async fn refresh(&mut self) -> PersistResult<()> {
        self.items = self.store.fetch_flat().await?;
        Ok(())
    }

    fn is_crowded(&self, update: KeyUpdate) -> bool {
        let (prev, next) = flat::neighbour_keys(&self.displayed(), update.item_id);
        let min_gap = self.settings.min_key_gap;
        prev.is_some_and(|p| has_precision_gap(p, update.new_key, min_gap))
            || next.is_some_and(|n| has_precision_gap(update.new_key, n, min_gap))
    }

    /// Assigns `1.0..n` in display order, hidden items included.
    ///
    /// The moved item's key may tie a neighbour, so it is placed next to
    /// its anchor explicitly rather than by sorting.
    fn renumber(
        &mut self,
        moved_id: ItemId,
        anchor: Option<(ItemId, InsertIntent)>,
    ) -> Vec<KeyUpdate> {
        let mut ordered: Vec<ItemId> = flat::sort_for_display(&self.items, self.settings.display)
            .iter()
            .map(|i| i.id)
            .collect();

        if let Some((target_id, intent)) = anchor
            && let Some(from) = ordered.iter().position(|id| *id == moved_id)
        {
            ordered.remove(from);
            if let Some(at) = ordered.iter().position(|id| *id == target_id) {
                let at = match intent {
                    InsertIntent::Before => at,
                    InsertIntent::After => at + 1,
                };
                ordered.insert(at, moved_id);
            } else {
                ordered.insert(from, moved_id);
            }
        }

        let batch = renormalize(&ordered);
        for update in &batch {
            if let Some(item) = self.items.iter_mut().find(|i| i.id == update.item_id) {
                item.key = Some(update.new_key);
            }
        }
        batch
    }

    fn persist(&mut self, batch: Vec<KeyUpdate>) {
        let tx = self.reconciler.begin();
        let store = Arc::clone(&self.store);
        let span = tracing::info_span!(span_names::PERSIST_FLAT, item_count = batch.len());

        tokio::spawn(
            async move {
                let outcome = match store.reorder_flat(&batch).await {
                    Ok(()) => PersistOutcome::Confirmed,
                    Err(err) => {
                        warn!(error = %err, "Flat reorder rejected, refetching");
                        match store.fetch_flat().await {
                            Ok(items) => PersistOutcome::Refetched(items),
                            Err(err) => PersistOutcome::RefetchFailed(err),
                        }
                    }
                };
                // The state may have been dropped; nothing left to reconcile
                let _ = tx.send(outcome);
            }
            .instrument(span),
        );
    }

    fn apply_outcome(&mut self, outcome: PersistOutcome<FlatItem>) {
        match outcome {
            PersistOutcome::Confirmed => {}
            PersistOutcome::Refetched(items) => {
                debug!(count = items.len(), "Replacing flat list with authoritative state");
                self.items = items;
            }
            PersistOutcome::RefetchFailed(err) => {
                error!(error = %err, "Refetch after rejected reorder failed; keeping local state");
            }
        }
    }
}

impl<S: OrderStore + ?Sized> std::fmt::Debug for FlatListState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatListState")
            .field("items", &self.items.len())
            .field("settings", &self.settings)
            .field("in_flight", &self.reconciler.pending())
            .finish_non_exhaustive()
    }
}

impl<S: OrderStore + ?Sized> DropGuard for FlatListState<S> {
    fn accepts(&self, dragged_id: ItemId, target_id: ItemId) -> bool {
        dragged_id != target_id
    }
}

impl<S: OrderStore + ?Sized + 'static> DropHandler for FlatListState<S> {
    fn handle_drop(&mut self, drop: &CompletedDrop) -> bool {
        self.reorder(drop.dragged_id, drop.target_id).is_apply()
    }
}
