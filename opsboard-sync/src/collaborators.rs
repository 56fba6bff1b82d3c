//! Collaborator traits injected into the reorder service

use crate::error::{NotifyError, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsboard_reorder::{ColumnKey, ItemId, ItemUpdate, OrderKey, ReorderPlan, Snapshot};
use serde::{Deserialize, Serialize};

/// Writes item changes to the backing store
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Apply `update` to the stored item `id`
    async fn update_item(&self, id: &ItemId, update: &ItemUpdate) -> Result<(), StoreError>;
}

/// Supplies board snapshots
///
/// Snapshots are expected to be internally consistent but may be stale.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// Receives "item moved" events after a plan was persisted
#[async_trait]
pub trait MoveNotifier: Send + Sync {
    async fn item_moved(&self, event: &MoveEvent) -> Result<(), NotifyError>;
}

/// Payload of an "item moved" notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub item_id: ItemId,
    pub from_column: ColumnKey,
    pub to_column: ColumnKey,
    pub target_index: usize,
    pub order_key: OrderKey,
    pub moved_at: DateTime<Utc>,
}

impl MoveEvent {
    /// Build the event for an applied plan; empty plans move nothing
    pub fn from_plan(plan: &ReorderPlan) -> Option<Self> {
        let order_key = plan.dragged_key()?;
        Some(Self {
            item_id: plan.item_id.clone(),
            from_column: plan.from_column.clone(),
            to_column: plan.to_column.clone(),
            target_index: plan.target_index,
            order_key,
            moved_at: Utc::now(),
        })
    }
}
