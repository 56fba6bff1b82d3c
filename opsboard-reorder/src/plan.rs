//! Reorder plans and the writes they translate into

use crate::error::{ReorderError, Result};
use crate::types::{ColumnKey, Item, ItemId, OrderKey, Snapshot};
use serde::{Deserialize, Serialize};

/// New order key for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub item_id: ItemId,
    pub order_key: OrderKey,
}

/// Fields to change on a stored item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    /// Set only when the item changes column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnKey>,
    pub order_key: OrderKey,
}

impl ItemUpdate {
    /// Apply the update to an item in place
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(column) = &self.column {
            item.column = column.clone();
        }
        item.order_key = self.order_key;
    }
}

/// One persistence write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWrite {
    pub id: ItemId,
    pub update: ItemUpdate,
}

/// Result of planning a drag gesture
///
/// Assignments are listed in the destination column's new display order and
/// hold absolute keys, so applying a plan twice changes nothing the second
/// time. An empty plan means the gesture was a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderPlan {
    /// The dragged item
    pub item_id: ItemId,
    pub from_column: ColumnKey,
    pub to_column: ColumnKey,
    /// Index of the dragged item in the destination column after the move
    pub target_index: usize,
    pub assignments: Vec<OrderAssignment>,
}

impl ReorderPlan {
    pub(crate) fn empty(item: &Item, index: usize) -> Self {
        Self {
            item_id: item.id.clone(),
            from_column: item.column.clone(),
            to_column: item.column.clone(),
            target_index: index,
            assignments: Vec::new(),
        }
    }

    /// True when nothing needs to be written
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn column_changed(&self) -> bool {
        self.from_column != self.to_column
    }

    /// New key of the dragged item, if the plan moves it
    pub fn dragged_key(&self) -> Option<OrderKey> {
        self.assignments
            .iter()
            .find(|a| a.item_id == self.item_id)
            .map(|a| a.order_key)
    }

    /// Writes realizing this plan, one per assignment
    ///
    /// The dragged item's column change rides along with its key so a reader
    /// never observes one without the other.
    pub fn writes(&self) -> Vec<ItemWrite> {
        self.assignments
            .iter()
            .map(|assignment| {
                let column = (assignment.item_id == self.item_id && self.column_changed())
                    .then(|| self.to_column.clone());
                ItemWrite {
                    id: assignment.item_id.clone(),
                    update: ItemUpdate {
                        column,
                        order_key: assignment.order_key,
                    },
                }
            })
            .collect()
    }

    /// Apply the plan to a local snapshot
    pub fn apply_to(&self, snapshot: &mut Snapshot) -> Result<()> {
        for write in self.writes() {
            let item = snapshot
                .item_mut(&write.id)
                .ok_or_else(|| ReorderError::not_found(write.id.as_str()))?;
            write.update.apply_to(item);
        }
        Ok(())
    }
}
