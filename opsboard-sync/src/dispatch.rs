//! Background delivery of "item moved" notifications
//!
//! Events are queued on an unbounded channel and delivered by a single tokio
//! task. Delivery failures are logged and dropped; they never reach the code
//! that performed the move.

use crate::collaborators::{MoveEvent, MoveNotifier};
use crate::retry::RetryManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Handle to the notification worker
#[derive(Debug)]
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<MoveEvent>,
    worker: JoinHandle<()>,
    counters: Arc<Counters>,
}

impl NotificationDispatcher {
    /// Start the worker task. Must be called inside a tokio runtime.
    pub fn spawn(notifier: Arc<dyn MoveNotifier>, retry: RetryManager) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let worker = tokio::spawn(run(receiver, notifier, retry, Arc::clone(&counters)));

        Self {
            sender,
            worker,
            counters,
        }
    }

    /// Queue an event; returns whether it was accepted
    pub fn dispatch(&self, event: MoveEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                warn!(item = %event.item_id, "notification worker stopped, dropping move event");
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Counters so far
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }

    /// Stop accepting events and wait for queued ones to be handled
    pub async fn shutdown(self) -> DispatchStats {
        let Self {
            sender,
            worker,
            counters,
        } = self;
        drop(sender);

        if let Err(error) = worker.await {
            warn!("notification worker ended abnormally: {}", error);
        }
        counters.snapshot()
    }
}

async fn run(
    mut receiver: mpsc::UnboundedReceiver<MoveEvent>,
    notifier: Arc<dyn MoveNotifier>,
    retry: RetryManager,
    counters: Arc<Counters>,
) {
    while let Some(event) = receiver.recv().await {
        let result = retry
            .retry("item moved notification", || notifier.item_moved(&event))
            .await;

        match result {
            Ok(()) => {
                debug!(item = %event.item_id, to = %event.to_column, "move notification delivered");
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                warn!(item = %event.item_id, %error, "dropping move notification");
                counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    debug!("notification worker drained");
}
