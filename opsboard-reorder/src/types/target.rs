//! Drop targets of a drag gesture

use super::ids::{ColumnKey, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a dragged card was released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DropTarget {
    /// Empty area of a column: append to the end
    Column(ColumnKey),
    /// Another card: take that card's position
    Item(ItemId),
    /// Identifier from the drag surface that may name either; items win
    Unqualified(String),
}

impl DropTarget {
    /// Drop onto a column
    pub fn column(column: impl Into<ColumnKey>) -> Self {
        Self::Column(column.into())
    }

    /// Drop onto another item
    pub fn item(id: impl Into<ItemId>) -> Self {
        Self::Item(id.into())
    }

    /// Drop onto something identified only by a raw id
    pub fn unqualified(id: impl Into<String>) -> Self {
        Self::Unqualified(id.into())
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(column) => write!(f, "column:{column}"),
            Self::Item(id) => write!(f, "item:{id}"),
            Self::Unqualified(id) => f.write_str(id),
        }
    }
}
