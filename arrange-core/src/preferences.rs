//! "Recently used parent" preference
//!
//! New tree items default to the last parent the user placed something
//! under. The preference is injected into [`TreeState`](crate::optimistic::TreeState)
//! so hosts decide where it lives.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{ItemId, TreeItem};

/// Storage for the most recently used parent.
pub trait ParentPreferenceStore: Send {
    /// Returns the last recorded parent, if any.
    fn recent_parent(&self) -> Option<ItemId>;

    /// Records the parent used for the latest creation.
    ///
    /// `None` clears the preference (root level).
    fn record_parent(&mut self, parent_id: Option<ItemId>);
}

/// Process-local preference.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryParentPreference {
    recent: Option<ItemId>,
}

impl MemoryParentPreference {
    /// Creates an empty preference.
    #[must_use]
    pub const fn new() -> Self {
        Self { recent: None }
    }
}

impl ParentPreferenceStore for MemoryParentPreference {
    fn recent_parent(&self) -> Option<ItemId> {
        self.recent
    }

    fn record_parent(&mut self, parent_id: Option<ItemId>) {
        self.recent = parent_id;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recent_parent: Option<ItemId>,
}

/// Preference persisted to a small TOML file.
///
/// Write failures are logged and otherwise ignored; the in-memory value
/// stays current.
#[derive(Debug, Clone)]
pub struct FileParentPreference {
    path: PathBuf,
    recent: Option<ItemId>,
}

impl FileParentPreference {
    /// Opens the preference file, starting empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let recent = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str::<PreferenceFile>(&content)?.recent_parent
        } else {
            None
        };
        Ok(Self { path, recent })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> ConfigResult<()> {
        let content = toml::to_string(&PreferenceFile {
            recent_parent: self.recent,
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl ParentPreferenceStore for FileParentPreference {
    fn recent_parent(&self) -> Option<ItemId> {
        self.recent
    }

    fn record_parent(&mut self, parent_id: Option<ItemId>) {
        self.recent = parent_id;
        if let Err(e) = self.write() {
            error!(path = %self.path.display(), error = %e, "Failed to save parent preference");
        }
    }
}

/// Returns the recorded parent if it still exists and can hold children.
///
/// A stale preference (deleted or converted to a leaf) yields `None`, which
/// means "create at root".
#[must_use]
pub fn suggest_parent(store: &dyn ParentPreferenceStore, items: &[TreeItem]) -> Option<ItemId> {
    let recent = store.recent_parent()?;
    match items.iter().find(|i| i.id == recent) {
        Some(item) if item.kind.is_container() => Some(recent),
        Some(_) => {
            warn!(parent_id = %recent, "Recent parent is no longer a container");
            None
        }
        None => None,
    }
}
