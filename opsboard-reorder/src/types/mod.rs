//! Core types for the reorder engine

mod ids;
mod item;
mod order_key;
mod snapshot;
mod target;

pub use ids::{ColumnKey, ItemId};
pub use item::Item;
pub use order_key::{KeySpacing, OrderKey, DEFAULT_KEY_BASE, DEFAULT_KEY_UNIT};
pub use snapshot::Snapshot;
pub use target::DropTarget;
