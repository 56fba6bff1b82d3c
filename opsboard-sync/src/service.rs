//! Reorder service: plans drag gestures and applies them to a store

use crate::collaborators::{MoveEvent, MoveNotifier, Persistence, SnapshotSource};
use crate::config::OpsboardConfig;
use crate::dispatch::{DispatchStats, NotificationDispatcher};
use crate::error::{Result, SyncError, WriteFailure};
use crate::locks::ColumnLocks;
use crate::retry::RetryManager;
use futures::future::join_all;
use opsboard_reorder::{ColumnKey, DropTarget, ItemId, ReorderEngine, ReorderPlan, Snapshot};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub plan: ReorderPlan,
    /// A notification was handed to the dispatcher
    pub notification_queued: bool,
}

/// Applies reorder plans through injected collaborators
///
/// Gestures are serialized per column: a move holds the locks of its source
/// and destination columns while it refetches, plans and writes. Other
/// processes writing to the same store are not coordinated with.
pub struct ReorderService {
    persistence: Arc<dyn Persistence>,
    source: Arc<dyn SnapshotSource>,
    engine: ReorderEngine,
    locks: ColumnLocks,
    dispatcher: Option<NotificationDispatcher>,
    lock_retry_attempts: u32,
}

impl ReorderService {
    /// Create a service with default spacing and no notifications
    pub fn new(persistence: Arc<dyn Persistence>, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            persistence,
            source,
            engine: ReorderEngine::default(),
            locks: ColumnLocks::new(),
            dispatcher: None,
            lock_retry_attempts: 3,
        }
    }

    /// Build a service from loaded configuration
    ///
    /// When `notifier` is given a dispatcher is spawned, so this must run
    /// inside a tokio runtime.
    pub fn from_config(
        config: &OpsboardConfig,
        persistence: Arc<dyn Persistence>,
        source: Arc<dyn SnapshotSource>,
        notifier: Option<Arc<dyn MoveNotifier>>,
    ) -> Result<Self> {
        config.validate()?;
        let mut service = Self::new(persistence, source)
            .with_engine(ReorderEngine::new(config.spacing)?)
            .with_lock_retry_attempts(config.lock_retry_attempts);

        if let Some(notifier) = notifier {
            let retry = RetryManager::with_config(config.notify.retry_config());
            service = service.with_dispatcher(NotificationDispatcher::spawn(notifier, retry));
        }
        Ok(service)
    }

    pub fn with_engine(mut self, engine: ReorderEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: NotificationDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_lock_retry_attempts(mut self, attempts: u32) -> Self {
        self.lock_retry_attempts = attempts.max(1);
        self
    }

    pub fn locks(&self) -> &ColumnLocks {
        &self.locks
    }

    /// Plan a move against a fresh snapshot without writing anything
    pub async fn plan_move(&self, dragged: &ItemId, target: &DropTarget) -> Result<ReorderPlan> {
        let snapshot = self.fetch().await?;
        Ok(self.engine.plan(&snapshot, dragged, target)?)
    }

    /// Plan and apply a move
    #[instrument(skip_all, fields(item = %dragged, target = %target))]
    pub async fn move_item(&self, dragged: &ItemId, target: &DropTarget) -> Result<MoveOutcome> {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let provisional = self.plan_move(dragged, target).await?;
            let columns = affected_columns(&provisional);
            let _guard = self.locks.acquire(columns.clone()).await;

            // Replan under the locks; the provisional snapshot may be stale
            let plan = self.plan_move(dragged, target).await?;
            if affected_columns(&plan) != columns {
                if attempt >= self.lock_retry_attempts {
                    return Err(SyncError::ConcurrentModification {
                        item_id: dragged.clone(),
                        attempts: attempt,
                    });
                }
                debug!(attempt, "affected columns changed while waiting for locks, replanning");
                continue;
            }

            if plan.is_empty() {
                debug!("drop on current position, nothing to write");
                return Ok(MoveOutcome {
                    plan,
                    notification_queued: false,
                });
            }

            self.apply(&plan).await?;
            let notification_queued = self.notify(&plan);

            info!(
                from = %plan.from_column,
                to = %plan.to_column,
                index = plan.target_index,
                writes = plan.assignments.len(),
                "item moved"
            );
            return Ok(MoveOutcome {
                plan,
                notification_queued,
            });
        }
    }

    /// Stop the notification worker, waiting for queued events
    pub async fn shutdown(self) -> Option<DispatchStats> {
        match self.dispatcher {
            Some(dispatcher) => Some(dispatcher.shutdown().await),
            None => None,
        }
    }

    async fn fetch(&self) -> Result<Snapshot> {
        let snapshot = self
            .source
            .fetch_snapshot()
            .await
            .map_err(SyncError::Snapshot)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    async fn apply(&self, plan: &ReorderPlan) -> Result<()> {
        let writes = plan.writes();
        let results = join_all(writes.iter().map(|write| async move {
            let result = self.persistence.update_item(&write.id, &write.update).await;
            (write, result)
        }))
        .await;

        let failures: Vec<WriteFailure> = results
            .into_iter()
            .filter_map(|(write, result)| {
                result.err().map(|error| WriteFailure {
                    item_id: write.id.clone(),
                    message: error.to_string(),
                })
            })
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        let applied = writes.len().saturating_sub(failures.len());
        warn!(
            failed = failures.len(),
            applied, "plan partially applied, refetching board"
        );

        let refreshed = match self.source.fetch_snapshot().await {
            Ok(snapshot) => Some(Box::new(snapshot)),
            Err(error) => {
                warn!(%error, "refetch after failed writes also failed");
                None
            }
        };

        Err(SyncError::PersistenceFailure {
            item_id: plan.item_id.clone(),
            failures,
            applied,
            refreshed,
        })
    }

    fn notify(&self, plan: &ReorderPlan) -> bool {
        let Some(dispatcher) = &self.dispatcher else {
            return false;
        };
        match MoveEvent::from_plan(plan) {
            Some(event) => dispatcher.dispatch(event),
            None => false,
        }
    }
}

fn affected_columns(plan: &ReorderPlan) -> Vec<ColumnKey> {
    let mut columns = vec![plan.from_column.clone(), plan.to_column.clone()];
    columns.sort();
    columns.dedup();
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryBoard;
    use async_trait::async_trait;
    use opsboard_reorder::{Item, ReorderError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports `A` in `in_progress` on every odd fetch until `settle_after`
    /// fetches have been served
    struct ShiftingSource {
        board: Arc<MemoryBoard>,
        fetches: AtomicUsize,
        settle_after: usize,
    }

    impl ShiftingSource {
        fn new(board: Arc<MemoryBoard>, settle_after: usize) -> Self {
            Self {
                board,
                fetches: AtomicUsize::new(0),
                settle_after,
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotSource for ShiftingSource {
        async fn fetch_snapshot(&self) -> std::result::Result<Snapshot, StoreError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut snapshot = self.board.snapshot().await;
            if n < self.settle_after && n % 2 == 1 {
                if let Some(item) = snapshot.item_mut(&"A".into()) {
                    item.column = "in_progress".into();
                }
            }
            Ok(snapshot)
        }
    }

    fn board() -> Arc<MemoryBoard> {
        Arc::new(MemoryBoard::new(Snapshot::new(
            vec![
                ColumnKey::from("pending"),
                ColumnKey::from("in_progress"),
                ColumnKey::from("done"),
            ],
            vec![
                Item::new("A", "pending", 1),
                Item::new("B", "pending", 2),
                Item::new("C", "done", 1),
            ],
        )))
    }

    #[test]
    fn test_affected_columns() {
        let plan = ReorderPlan {
            item_id: "A".into(),
            from_column: "pending".into(),
            to_column: "done".into(),
            target_index: 0,
            assignments: Vec::new(),
        };
        assert_eq!(
            affected_columns(&plan),
            vec![ColumnKey::from("done"), ColumnKey::from("pending")]
        );
    }

    #[tokio::test]
    async fn test_plan_move_does_not_write() {
        let board = board();
        let service = ReorderService::new(board.clone(), board.clone());

        let plan = service
            .plan_move(&"A".into(), &DropTarget::item("C"))
            .await
            .unwrap();
        assert!(!plan.is_empty());
        assert_eq!(board.write_count(), 0);
    }

    #[tokio::test]
    async fn test_noop_move_writes_nothing() {
        let board = board();
        let service = ReorderService::new(board.clone(), board.clone());

        let outcome = service
            .move_item(&"A".into(), &DropTarget::item("A"))
            .await
            .unwrap();
        assert!(outcome.plan.is_empty());
        assert!(!outcome.notification_queued);
        assert_eq!(board.write_count(), 0);
    }

    #[tokio::test]
    async fn test_engine_errors_abort_before_writing() {
        let board = board();
        let service = ReorderService::new(board.clone(), board.clone());

        let err = service
            .move_item(&"ghost".into(), &DropTarget::column("done"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Reorder(_)));
        assert_eq!(board.write_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected_before_writing() {
        let board = Arc::new(MemoryBoard::new(Snapshot::new(
            vec![ColumnKey::from("col1"), ColumnKey::from("col2")],
            vec![
                Item::new("X", "col1", 1),
                Item::new("X", "col2", 5),
                Item::new("A", "col2", 2),
            ],
        )));
        let service = ReorderService::new(board.clone(), board.clone());

        let err = service
            .move_item(&"X".into(), &DropTarget::column("col2"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Reorder(ReorderError::DuplicateItem { ref id }) if id == "X"
        ));
        assert!(!err.is_retryable());
        assert_eq!(board.write_count(), 0);

        let err = service
            .plan_move(&"A".into(), &DropTarget::column("col1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Reorder(ReorderError::DuplicateItem { .. })));
    }

    #[tokio::test]
    async fn test_columns_changing_under_lock_fail_after_attempts() {
        let board = board();
        let source = Arc::new(ShiftingSource::new(board.clone(), usize::MAX));
        let service =
            ReorderService::new(board.clone(), source.clone()).with_lock_retry_attempts(2);

        let err = service
            .move_item(&"A".into(), &DropTarget::column("done"))
            .await
            .unwrap_err();
        match &err {
            SyncError::ConcurrentModification { item_id, attempts } => {
                assert_eq!(item_id, &ItemId::from("A"));
                assert_eq!(*attempts, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());
        assert_eq!(source.fetches(), 4);
        assert_eq!(board.write_count(), 0);
    }

    #[tokio::test]
    async fn test_replans_until_columns_settle() {
        let board = board();
        let source = Arc::new(ShiftingSource::new(board.clone(), 2));
        let service = ReorderService::new(board.clone(), source.clone());

        let outcome = service
            .move_item(&"A".into(), &DropTarget::column("done"))
            .await
            .unwrap();
        assert_eq!(outcome.plan.from_column, ColumnKey::from("pending"));
        assert_eq!(outcome.plan.to_column, ColumnKey::from("done"));
        assert_eq!(source.fetches(), 4);

        let snapshot = board.snapshot().await;
        let moved = snapshot.find_item(&"A".into()).unwrap();
        assert_eq!(moved.column, ColumnKey::from("done"));
        assert_eq!(moved.order_key.value(), 2048);
    }
}
