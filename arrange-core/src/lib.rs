//! `arrange` Core Library
//!
//! Ordering engine for drag-and-drop: fractional keys for flat lists,
//! dense ranks with cycle prevention for trees, a drag session state
//! machine, and an optimistic layer that applies moves immediately and
//! heals from rejected writes by refetching.
//!
//! # Crate Structure
//!
//! - [`models`] - Item IDs, flat and tree items, reorder outcomes
//! - [`sequence`] - Fractional key allocation and renumbering
//! - [`flat`] - Flat list reorder controller
//! - [`drag_drop`] - Pointer band classification and indicator geometry
//! - [`tree`] - Hierarchy checks, drop planning, tree construction
//! - [`session`] - Drag lifecycle state machine
//! - [`optimistic`] - Local apply, background persistence, reconciliation
//! - [`persistence`] - `OrderStore` contract and an in-memory store
//! - [`preferences`] - Recently used parent for new tree items
//! - [`config`] - TOML settings
//! - [`logging`] - Tracing subscriber setup and span names

#![warn(missing_docs)]

pub mod config;
pub mod drag_drop;
pub mod error;
pub mod flat;
pub mod logging;
pub mod models;
pub mod optimistic;
pub mod persistence;
pub mod preferences;
pub mod sequence;
pub mod session;
pub mod tree;

pub use config::{ArrangeSettings, FlatSettings, LoggingSettings, TreeSettings};
pub use drag_drop::{DropPosition, DropZones, classify_drop_position};
pub use error::{ConfigError, ConfigResult, PersistError, PersistResult};
pub use logging::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
pub use models::{
    FlatItem, ItemId, KeyUpdate, NoOpReason, NodeKind, ReorderOutcome, TreeItem, TreePlacement,
};
pub use optimistic::{FlatListState, ReconcileReport, TreeState};
pub use persistence::{MemoryStore, OrderStore};
pub use preferences::{
    FileParentPreference, MemoryParentPreference, ParentPreferenceStore, suggest_parent,
};
pub use session::{
    DragEnd, DragEvent, DragMachine, DragState, DropGuard, DropHandler, FlatGuard, OriginScope,
    TreeGuard,
};
pub use tree::{ChildOrder, TreeMove, TreeNode, build_tree, plan_drop};
