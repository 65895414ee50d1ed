//! Core data structures shared by the flat and hierarchical controllers.

mod id;
mod item;
mod outcome;

pub use id::ItemId;
pub use item::{FlatItem, NodeKind, TreeItem};
pub use outcome::{KeyUpdate, NoOpReason, ReorderOutcome, TreePlacement};
