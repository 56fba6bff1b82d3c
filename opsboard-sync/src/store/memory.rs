//! In-memory board store

use crate::collaborators::{Persistence, SnapshotSource};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use opsboard_reorder::{ItemId, ItemUpdate, Snapshot};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Board held in memory
///
/// Writes can be made to fail per item, which is how partial plan
/// application is exercised.
#[derive(Debug, Default)]
pub struct MemoryBoard {
    state: RwLock<Snapshot>,
    failing: RwLock<HashSet<ItemId>>,
    writes: AtomicUsize,
}

impl MemoryBoard {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            ..Default::default()
        }
    }

    /// Current contents
    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Make every write to `id` fail until cleared
    pub async fn fail_writes_for(&self, id: impl Into<ItemId>) {
        self.failing.write().await.insert(id.into());
    }

    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Persistence for MemoryBoard {
    async fn update_item(&self, id: &ItemId, update: &ItemUpdate) -> Result<(), StoreError> {
        if self.failing.read().await.contains(id) {
            return Err(StoreError::write_rejected(id.as_str(), "injected failure"));
        }

        let mut state = self.state.write().await;
        let item = state
            .item_mut(id)
            .ok_or_else(|| StoreError::ItemNotFound { id: id.to_string() })?;
        update.apply_to(item);
        item.updated_at = Some(Utc::now());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl SnapshotSource for MemoryBoard {
    async fn fetch_snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_reorder::{ColumnKey, Item, OrderKey};

    fn board() -> MemoryBoard {
        MemoryBoard::new(Snapshot::new(
            vec![ColumnKey::from("pending"), ColumnKey::from("done")],
            vec![Item::new("t1", "pending", 1)],
        ))
    }

    #[tokio::test]
    async fn test_update_stamps_modification_time() {
        let board = board();
        let update = ItemUpdate {
            column: Some("done".into()),
            order_key: OrderKey::new(1024),
        };
        board.update_item(&"t1".into(), &update).await.unwrap();

        let snapshot = board.fetch_snapshot().await.unwrap();
        let item = snapshot.find_item(&"t1".into()).unwrap();
        assert_eq!(item.column, ColumnKey::from("done"));
        assert_eq!(item.order_key, OrderKey::new(1024));
        assert!(item.updated_at.is_some());
        assert_eq!(board.write_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let board = board();
        board.fail_writes_for("t1").await;
        let update = ItemUpdate {
            column: None,
            order_key: OrderKey::new(5),
        };

        let err = board.update_item(&"t1".into(), &update).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteRejected { .. }));
        assert_eq!(board.write_count(), 0);

        board.clear_failures().await;
        board.update_item(&"t1".into(), &update).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let board = board();
        let update = ItemUpdate {
            column: None,
            order_key: OrderKey::new(5),
        };
        let err = board.update_item(&"nope".into(), &update).await.unwrap_err();
        assert!(matches!(err, StoreError::ItemNotFound { .. }));
    }
}
