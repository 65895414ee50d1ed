//! Persistence contract for ordered collections
//!
//! The core never defines how items are stored. It talks to an
//! [`OrderStore`] through four narrow calls and treats every failure as
//! "refetch and replace local state".

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{PersistError, PersistResult};
use crate::models::{FlatItem, KeyUpdate, TreeItem, TreePlacement};
use crate::tree::apply_placements;

/// Authoritative storage for flat lists and trees.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists new keys for one or more flat-list items.
    async fn reorder_flat(&self, updates: &[KeyUpdate]) -> PersistResult<()>;

    /// Persists a batch of tree placements.
    async fn reorder_tree(&self, placements: &[TreePlacement]) -> PersistResult<()>;

    /// Fetches the authoritative flat collection.
    async fn fetch_flat(&self) -> PersistResult<Vec<FlatItem>>;

    /// Fetches the authoritative tree.
    async fn fetch_tree(&self) -> PersistResult<Vec<TreeItem>>;
}

/// In-memory [`OrderStore`] with switchable failures and call counters.
#[derive(Debug, Default)]
pub struct MemoryStore {
    flat: Mutex<Vec<FlatItem>>,
    tree: Mutex<Vec<TreeItem>>,
    reject_writes: AtomicBool,
    fail_fetches: AtomicBool,
    latency_ms: AtomicUsize,
    flat_writes: AtomicUsize,
    tree_writes: AtomicUsize,
    fetches: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with both collections.
    #[must_use]
    pub fn with_items(flat: Vec<FlatItem>, tree: Vec<TreeItem>) -> Self {
        Self {
            flat: Mutex::new(flat),
            tree: Mutex::new(tree),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail with [`PersistError::Rejected`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Makes every subsequent fetch fail with [`PersistError::Unavailable`].
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Delays every call by the given duration.
    pub fn set_latency(&self, latency: Duration) {
        let millis = usize::try_from(latency.as_millis()).unwrap_or(usize::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of accepted or rejected flat writes.
    #[must_use]
    pub fn flat_write_count(&self) -> usize {
        self.flat_writes.load(Ordering::SeqCst)
    }

    /// Number of accepted or rejected tree writes.
    #[must_use]
    pub fn tree_write_count(&self) -> usize {
        self.tree_writes.load(Ordering::SeqCst)
    }

    /// Number of fetch calls of either kind.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns a copy of the stored flat collection.
    pub async fn flat_snapshot(&self) -> Vec<FlatItem> {
        self.flat.lock().await.clone()
    }

    /// Returns a copy of the stored tree.
    pub async fn tree_snapshot(&self) -> Vec<TreeItem> {
        self.tree.lock().await.clone()
    }

    async fn simulate_latency(&self) {
        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis as u64)).await;
        }
    }

    fn check_write(&self) -> PersistResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Rejected("store is rejecting writes".to_string()));
        }
        Ok(())
    }

    fn check_fetch(&self) -> PersistResult<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn reorder_flat(&self, updates: &[KeyUpdate]) -> PersistResult<()> {
        self.simulate_latency().await;
        self.flat_writes.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;

        let mut flat = self.flat.lock().await;
        for update in updates {
            if let Some(item) = flat.iter_mut().find(|i| i.id == update.item_id) {
                item.key = Some(update.new_key);
            }
        }
        Ok(())
    }

    async fn reorder_tree(&self, placements: &[TreePlacement]) -> PersistResult<()> {
        self.simulate_latency().await;
        self.tree_writes.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;

        let mut tree = self.tree.lock().await;
        apply_placements(&mut tree, placements);
        Ok(())
    }

    async fn fetch_flat(&self) -> PersistResult<Vec<FlatItem>> {
        self.simulate_latency().await;
        self.check_fetch()?;
        Ok(self.flat.lock().await.clone())
    }

    async fn fetch_tree(&self) -> PersistResult<Vec<TreeItem>> {
        self.simulate_latency().await;
        self.check_fetch()?;
        Ok(self.tree.lock().await.clone())
    }
}
