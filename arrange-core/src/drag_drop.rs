//! Drop-position geometry for tree rows
//!
//! This module turns a pointer position inside a hovered row into a
//! discrete drop intent. It is a pure data model so it can be tested
//! without a rendering environment.

use serde::{Deserialize, Serialize};

use crate::models::NodeKind;

/// Drop position relative to a target item
///
/// Determines where a dragged item will be placed relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    /// Drop before the target item (line indicator above)
    Before,
    /// Drop after the target item (line indicator below)
    After,
    /// Drop into the target item as its last child
    Inside,
}

impl std::fmt::Display for DropPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
            Self::Inside => write!(f, "inside"),
        }
    }
}

/// Fractions of row height that bound the before/after bands.
///
/// Containers get a wider "inside" band because nesting is their primary
/// purpose; leaves bias toward reordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropZones {
    /// Top and bottom band size for containers
    pub container_edge: f64,
    /// Upper bound of the "before" band for leaves
    pub leaf_before: f64,
    /// Lower bound of the "after" band for leaves
    pub leaf_after: f64,
}

impl Default for DropZones {
    fn default() -> Self {
        Self {
            container_edge: 0.25,
            leaf_before: 0.33,
            leaf_after: 0.66,
        }
    }
}

impl DropZones {
    /// Returns the (before, after) thresholds as fractions of row height
    #[must_use]
    pub fn thresholds(&self, kind: NodeKind) -> (f64, f64) {
        match kind {
            NodeKind::Container => (self.container_edge, 1.0 - self.container_edge),
            NodeKind::Leaf => (self.leaf_before, self.leaf_after),
        }
    }

    /// Checks that every band is ordered and lies within the row
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated bound.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..0.5).contains(&self.container_edge) {
            return Err(format!(
                "container_edge must be in [0.0, 0.5), got {}",
                self.container_edge
            ));
        }
        if !(0.0..=1.0).contains(&self.leaf_before) || !(0.0..=1.0).contains(&self.leaf_after) {
            return Err("leaf bands must lie within [0.0, 1.0]".to_string());
        }
        if self.leaf_before > self.leaf_after {
            return Err(format!(
                "leaf_before ({}) must not exceed leaf_after ({})",
                self.leaf_before, self.leaf_after
            ));
        }
        Ok(())
    }
}

/// Classifies the pointer's vertical offset within a row
///
/// The row is divided into three bands:
/// - Top band: Before
/// - Middle band: Inside
/// - Bottom band: After
///
/// # Arguments
/// * `y_in_row` - Y coordinate relative to the top of the row
/// * `row_height` - Height of the hovered row
/// * `kind` - Kind of the hovered node
/// * `zones` - Band configuration
#[must_use]
pub fn classify_drop_position(
    y_in_row: f64,
    row_height: f64,
    kind: NodeKind,
    zones: &DropZones,
) -> DropPosition {
    if !row_height.is_finite() || row_height <= 0.0 {
        return DropPosition::After;
    }

    let (before, after) = zones.thresholds(kind);
    if y_in_row < row_height * before {
        DropPosition::Before
    } else if y_in_row > row_height * after {
        DropPosition::After
    } else {
        DropPosition::Inside
    }
}

/// Calculates the Y position for the drop indicator line
///
/// - For `Before`: at the top of the target row
/// - For `After`: at the bottom of the target row
/// - For `Inside`: no line indicator (the row itself is highlighted)
#[must_use]
pub fn indicator_y(row_index: u32, position: DropPosition, row_height: f64) -> Option<f64> {
    match position {
        DropPosition::Before => Some(f64::from(row_index) * row_height),
        DropPosition::After => Some((f64::from(row_index) + 1.0) * row_height),
        DropPosition::Inside => None,
    }
}

/// Finds the row under a list-relative Y coordinate
///
/// Returns the row index and the offset within that row, or `None` for
/// coordinates above the list or a degenerate row height.
#[must_use]
pub fn row_at(y: f64, row_height: f64) -> Option<(u32, f64)> {
    if y < 0.0 || !y.is_finite() || !row_height.is_finite() || row_height <= 0.0 {
        return None;
    }
    let index = (y / row_height) as u32;
    Some((index, y - f64::from(index) * row_height))
}
