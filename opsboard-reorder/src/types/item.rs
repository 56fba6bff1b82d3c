//! Item type: a card on an operations board

use super::ids::{ColumnKey, ItemId};
use super::order_key::OrderKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task/incident card as seen by the reorder engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Workflow column the card sits in
    pub column: ColumnKey,
    /// Position within the column
    pub order_key: OrderKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Last modification time, owned by the persistence layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a new item
    pub fn new(id: impl Into<ItemId>, column: impl Into<ColumnKey>, order_key: i64) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
            order_key: OrderKey::new(order_key),
            title: None,
            updated_at: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
