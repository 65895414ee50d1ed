//! Settings sections stored in `arrange.toml`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::drag_drop::DropZones;
use crate::flat::DisplayOrder;
use crate::logging::TracingLevel;
use crate::tree::ChildOrder;

/// Flat list behaviour (`[flat]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatSettings {
    /// How the list is sorted for display
    #[serde(default)]
    pub display: DisplayOrder,
    /// Renumber the whole list when keys get too close (default: true)
    #[serde(default = "default_true")]
    pub renormalize: bool,
    /// Smallest gap between adjacent keys before renumbering kicks in
    #[serde(default = "default_min_key_gap")]
    pub min_key_gap: f64,
}

const fn default_true() -> bool {
    true
}

const fn default_min_key_gap() -> f64 {
    1e-9
}

impl Default for FlatSettings {
    fn default() -> Self {
        Self {
            display: DisplayOrder::default(),
            renormalize: true,
            min_key_gap: default_min_key_gap(),
        }
    }
}

/// Tree behaviour (`[tree]`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSettings {
    /// How children are sorted for display
    #[serde(default)]
    pub child_order: ChildOrder,
}

/// Logging (`[logging]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level for the crate targets
    #[serde(default)]
    pub level: TracingLevel,
    /// Custom `EnvFilter` directive; overrides `level`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Log to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrangeSettings {
    /// Pointer bands for drop classification
    #[serde(default)]
    pub drop_zones: DropZones,
    /// Flat list behaviour
    #[serde(default)]
    pub flat: FlatSettings,
    /// Tree behaviour
    #[serde(default)]
    pub tree: TreeSettings,
    /// Logging
    #[serde(default)]
    pub logging: LoggingSettings,
}
