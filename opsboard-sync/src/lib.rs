//! Applies board reorder plans to a live store
//!
//! The reorder engine in `opsboard-reorder` is pure. This crate is the caller
//! side: it fetches snapshots, serializes gestures per column, writes plans
//! through a [`Persistence`] collaborator and hands "item moved" events to a
//! background [`NotificationDispatcher`].
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use opsboard_reorder::{ColumnKey, DropTarget, Item, Snapshot};
//! use opsboard_sync::{MemoryBoard, ReorderService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let board = Arc::new(MemoryBoard::new(Snapshot::new(
//!     [ColumnKey::from("pending"), ColumnKey::from("done")],
//!     vec![Item::new("t1", "pending", 1024)],
//! )));
//!
//! let service = ReorderService::new(board.clone(), board.clone());
//! let outcome = service
//!     .move_item(&"t1".into(), &DropTarget::column("done"))
//!     .await?;
//! println!("wrote {} items", outcome.plan.assignments.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure handling
//!
//! - Engine errors abort the gesture before any write
//! - A failed write refetches the board and returns
//!   [`SyncError::PersistenceFailure`] with the authoritative snapshot
//! - Notification failures are retried, logged and dropped

mod collaborators;
pub mod config;
mod dispatch;
mod error;
mod locks;
mod notifier;
mod retry;
mod service;
pub mod store;

pub use collaborators::{MoveEvent, MoveNotifier, Persistence, SnapshotSource};
pub use config::{ConfigLoader, NotifyConfig, OpsboardConfig};
pub use dispatch::{DispatchStats, NotificationDispatcher};
pub use error::{ConfigError, NotifyError, Result, StoreError, SyncError, WriteFailure};
pub use locks::{ColumnGuard, ColumnLocks};
pub use notifier::{LogNotifier, WebhookNotifier};
pub use retry::{RetryConfig, RetryManager, Retryable};
pub use service::{MoveOutcome, ReorderService};
pub use store::{BoardFormat, FileBoard, MemoryBoard};
