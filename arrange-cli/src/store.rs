//! JSON items file implementing [`OrderStore`].
//!
//! The file holds both collections:
//!
//! ```json
//! { "flat": [ ... ], "tree": [ ... ] }
//! ```
//!
//! A missing file reads as two empty collections. Writes are
//! read-modify-write under a process-local lock.

use std::io;
use std::path::{Path, PathBuf};

use arrange_core::tree::apply_placements;
use arrange_core::{
    FlatItem, KeyUpdate, OrderStore, PersistError, PersistResult, TreeItem, TreePlacement,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// On-disk layout of the items file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Flat list items
    #[serde(default)]
    pub flat: Vec<FlatItem>,
    /// Tree nodes
    #[serde(default)]
    pub tree: Vec<TreeItem>,
}

/// [`OrderStore`] backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store for `path`; nothing is read until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the items file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a flat item.
    pub async fn insert_flat(&self, item: FlatItem) -> PersistResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        doc.flat.push(item);
        self.write(&doc).await
    }

    /// Appends a tree node.
    pub async fn insert_tree(&self, item: TreeItem) -> PersistResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        doc.tree.push(item);
        self.write(&doc).await
    }

    async fn read(&self) -> PersistResult<StoreDocument> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                PersistError::Storage(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Items file not found, starting empty");
                Ok(StoreDocument::default())
            }
            Err(e) => Err(PersistError::Unavailable(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write(&self, doc: &StoreDocument) -> PersistResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistError::Storage(format!("{}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| PersistError::Storage(format!("Failed to serialize items: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PersistError::Storage(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl OrderStore for JsonFileStore {
    async fn reorder_flat(&self, updates: &[KeyUpdate]) -> PersistResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;

        for update in updates {
            let item = doc
                .flat
                .iter_mut()
                .find(|i| i.id == update.item_id)
                .ok_or_else(|| {
                    PersistError::Rejected(format!("unknown flat item {}", update.item_id))
                })?;
            item.key = Some(update.new_key);
        }
        self.write(&doc).await
    }

    async fn reorder_tree(&self, placements: &[TreePlacement]) -> PersistResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;

        let applied = apply_placements(&mut doc.tree, placements);
        if applied < placements.len() {
            return Err(PersistError::Rejected(format!(
                "{} of {} placements name unknown nodes",
                placements.len() - applied,
                placements.len()
            )));
        }
        self.write(&doc).await
    }

    async fn fetch_flat(&self) -> PersistResult<Vec<FlatItem>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.flat)
    }

    async fn fetch_tree(&self) -> PersistResult<Vec<TreeItem>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.tree)
    }
}
