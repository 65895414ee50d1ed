//! Optimistic state for a hierarchical tree.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{Instrument, debug, error, info, warn};

use super::{PersistOutcome, ReconcileReport, Reconciler};
use crate::config::TreeSettings;
use crate::drag_drop::{DropPosition, DropZones, classify_drop_position};
use crate::error::PersistResult;
use crate::logging::span_names;
use crate::models::{ItemId, NoOpReason, ReorderOutcome, TreeItem, TreePlacement};
use crate::persistence::OrderStore;
use crate::preferences::{self, MemoryParentPreference, ParentPreferenceStore};
use crate::session::{CompletedDrop, DropGuard, DropHandler};
use crate::tree::{self, ChildOrder, TreeMove, TreeNode};

/// Client-side copy of a tree with optimistic moves, collapse state and
/// the recently used parent.
pub struct TreeState<S: OrderStore + ?Sized> {
    items: Vec<TreeItem>,
    store: Arc<S>,
    preferences: Box<dyn ParentPreferenceStore>,
    collapsed: HashSet<ItemId>,
    child_order: ChildOrder,
    reconciler: Reconciler<TreeItem>,
}

impl<S: OrderStore + ?Sized + 'static> TreeState<S> {
    /// Creates a state over an already loaded tree.
    #[must_use]
    pub fn new(store: Arc<S>, items: Vec<TreeItem>) -> Self {
        if !tree::validate_hierarchy(&items) {
            warn!(count = items.len(), "Loaded tree contains a parent cycle");
        }
        Self {
            items,
            store,
            preferences: Box::new(MemoryParentPreference::new()),
            collapsed: HashSet::new(),
            child_order: ChildOrder::default(),
            reconciler: Reconciler::new(),
        }
    }

    /// Loads the tree from the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the initial fetch fails.
    pub async fn load(store: Arc<S>) -> PersistResult<Self> {
        let items = store.fetch_tree().await?;
        Ok(Self::new(store, items))
    }

    /// Replaces the parent preference store.
    #[must_use]
    pub fn with_preferences(mut self, preferences: Box<dyn ParentPreferenceStore>) -> Self {
        self.preferences = preferences;
        self
    }

    /// Applies tree settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: &TreeSettings) -> Self {
        self.child_order = settings.child_order;
        self
    }

    /// Returns the node list.
    #[must_use]
    pub fn items(&self) -> &[TreeItem] {
        &self.items
    }

    /// Returns the node with the given ID.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Builds the current forest.
    #[must_use]
    pub fn tree(&self) -> Vec<TreeNode> {
        tree::build_tree(&self.items, self.child_order)
    }

    /// IDs of the rows currently visible, in display order.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<ItemId> {
        let roots = self.tree();
        tree::visible_rows(&roots, &self.collapsed)
            .into_iter()
            .map(|node| node.item.id)
            .collect()
    }

    /// Returns true if an ancestor of `id` is collapsed.
    #[must_use]
    pub fn is_hidden(&self, id: ItemId) -> bool {
        tree::is_hidden(id, &self.items, &self.collapsed)
    }

    /// Collapses a node.
    pub fn collapse(&mut self, id: ItemId) {
        self.collapsed.insert(id);
    }

    /// Expands a node.
    pub fn expand(&mut self, id: ItemId) {
        self.collapsed.remove(&id);
    }

    /// Flips the collapse state of a node; returns true if it is now collapsed.
    pub fn toggle_collapsed(&mut self, id: ItemId) -> bool {
        if self.collapsed.remove(&id) {
            false
        } else {
            self.collapsed.insert(id);
            true
        }
    }

    /// Returns the collapsed node IDs.
    #[must_use]
    pub const fn collapsed(&self) -> &HashSet<ItemId> {
        &self.collapsed
    }

    /// Number of persistence calls that have not been reconciled yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.reconciler.pending()
    }

    /// Plans and applies a move of `dragged_id` relative to `target_id`.
    pub fn move_item(
        &mut self,
        dragged_id: ItemId,
        target_id: ItemId,
        position: DropPosition,
    ) -> ReorderOutcome<TreeMove> {
        let span = tracing::info_span!(span_names::REORDER_TREE, item_id = %dragged_id, %position);
        let _guard = span.enter();

        let outcome = tree::plan_drop(&self.items, dragged_id, target_id, position);
        match &outcome {
            ReorderOutcome::Apply(plan) => {
                info!(
                    new_parent = ?plan.new_parent_id,
                    placements = plan.placements.len(),
                    "Applied tree move"
                );
                self.apply_and_persist(plan.placements.clone());
            }
            ReorderOutcome::NoOp(reason) => debug!(%reason, "Tree drop suppressed"),
        }
        outcome
    }

    /// Classifies a pointer offset against the target row, then moves.
    pub fn move_by_pointer(
        &mut self,
        dragged_id: ItemId,
        target_id: ItemId,
        y_in_row: f64,
        row_height: f64,
        zones: &DropZones,
    ) -> ReorderOutcome<TreeMove> {
        let Some(target) = self.get(target_id) else {
            return ReorderOutcome::NoOp(NoOpReason::UnknownTarget(target_id));
        };
        let position = classify_drop_position(y_in_row, row_height, target.kind, zones);
        self.move_item(dragged_id, target_id, position)
    }

    /// Applies placements locally and persists them as one batch.
    pub fn apply_and_persist(&mut self, placements: Vec<TreePlacement>) {
        if placements.is_empty() {
            return;
        }
        let applied = tree::apply_placements(&mut self.items, &placements);
        if applied < placements.len() {
            warn!(
                applied,
                requested = placements.len(),
                "Some placements referenced unknown nodes"
            );
        }
        self.persist(placements);
    }

    /// Returns the parent new items should default to.
    #[must_use]
    pub fn suggest_parent(&self) -> Option<ItemId> {
        preferences::suggest_parent(self.preferences.as_ref(), &self.items)
    }

    /// Appends a newly created node to the end of its parent's children.
    ///
    /// The node's `order_index` is overwritten. Its parent is recorded as
    /// the recently used parent. Creating the node in the store is the
    /// caller's job.
    pub fn insert_new(&mut self, mut item: TreeItem) -> TreePlacement {
        item.order_index = tree::next_order_index(&self.items, item.parent_id);
        let placement = TreePlacement {
            id: item.id,
            parent_id: item.parent_id,
            order_index: item.order_index,
        };
        debug!(
            item_id = %item.id,
            parent_id = ?item.parent_id,
            order_index = item.order_index,
            "Inserted node"
        );
        self.preferences.record_parent(item.parent_id);
        self.items.push(item);
        placement
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

    /// Replaces local state with the store's current tree.
    ///
    /// # Errors
    ///
    /// Returns the store's error; local state is kept on failure.
    pub async fn refresh(&mut self) -> PersistResult<()> {
        self.items = self.store.fetch_tree().await?;
        Ok(())
    }

    fn persist(&mut self, placements: Vec<TreePlacement>) {
        let tx = self.reconciler.begin();
        let store = Arc::clone(&self.store);
        let span = tracing::info_span!(span_names::PERSIST_TREE, item_count = placements.len());

        tokio::spawn(
            async move {
                let outcome = match store.reorder_tree(&placements).await {
                    Ok(()) => PersistOutcome::Confirmed,
                    Err(err) => {
                        warn!(error = %err, "Tree move rejected, refetching");
                        let refetch = tracing::info_span!(span_names::REFETCH);
                        match store.fetch_tree().instrument(refetch).await {
                            Ok(items) => PersistOutcome::Refetched(items),
                            Err(err) => PersistOutcome::RefetchFailed(err),
                        }
                    }
                };
                let _ = tx.send(outcome);
            }
            .instrument(span),
        );
    }

    fn apply_outcome(&mut self, outcome: PersistOutcome<TreeItem>) {
        match outcome {
            PersistOutcome::Confirmed => {}
            PersistOutcome::Refetched(items) => {
                debug!(count = items.len(), "Replacing tree with authoritative state");
                self.items = items;
                let ids: HashSet<ItemId> = self.items.iter().map(|i| i.id).collect();
                self.collapsed.retain(|id| ids.contains(id));
            }
            PersistOutcome::RefetchFailed(err) => {
                error!(error = %err, "Refetch after rejected move failed; keeping local state");
            }
        }
    }
}

impl<S: OrderStore + ?Sized> std::fmt::Debug for TreeState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeState")
            .field("items", &self.items.len())
            .field("collapsed", &self.collapsed.len())
            .field("child_order", &self.child_order)
            .field("in_flight", &self.reconciler.pending())
            .finish_non_exhaustive()
    }
}

impl<S: OrderStore + ?Sized> DropGuard for TreeState<S> {
    fn accepts(&self, dragged_id: ItemId, target_id: ItemId) -> bool {
        tree::can_drop_on(&self.items, dragged_id, target_id)
    }
}

impl<S: OrderStore + ?Sized + 'static> DropHandler for TreeState<S> {
    fn handle_drop(&mut self, drop: &CompletedDrop) -> bool {
        self.move_item(drop.dragged_id, drop.target_id, drop.position)
            .is_apply()
    }
}
