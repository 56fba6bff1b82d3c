//! Column reorder engine for drag-and-drop operations boards
//!
//! Given a snapshot of a board, a dragged card and the place it was dropped,
//! the engine works out the card's new column and a fresh total order for the
//! destination column. It never talks to a store: callers apply the returned
//! [`ReorderPlan`] through their own persistence layer.
//!
//! ## Basic Usage
//!
//! ```rust
//! use opsboard_reorder::{plan_move, ColumnKey, DropTarget, Item, Snapshot};
//!
//! let snapshot = Snapshot::new(
//!     [ColumnKey::from("pending"), ColumnKey::from("done")],
//!     vec![
//!         Item::new("A", "pending", 1),
//!         Item::new("B", "pending", 2),
//!         Item::new("C", "done", 1),
//!     ],
//! );
//!
//! let plan = plan_move(&snapshot, &"A".into(), &DropTarget::item("C")).unwrap();
//! assert_eq!(plan.to_column.as_str(), "done");
//! assert_eq!(plan.target_index, 0);
//! ```
//!
//! ## Ordering
//!
//! - Items in a column sort by order key, ties broken by id
//! - Every move renumbers the destination column as `base + index * unit`
//! - Only items whose stored values change end up in the plan
//! - Dropping a card onto its own position yields an empty plan

mod engine;
mod error;
mod plan;
pub mod types;

pub use engine::{plan_move, ReorderEngine};
pub use error::{ReorderError, Result};
pub use plan::{ItemUpdate, ItemWrite, OrderAssignment, ReorderPlan};

pub use types::{
    ColumnKey, DropTarget, Item, ItemId, KeySpacing, OrderKey, Snapshot, DEFAULT_KEY_BASE,
    DEFAULT_KEY_UNIT,
};
