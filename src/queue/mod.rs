//! Durable write queue
//!
//! Accepts write descriptors and guarantees they survive a restart
//! until successfully replayed or explicitly removed. If the SQLite
//! backend cannot be opened, the queue degrades to an in-memory list
//! for the session: durability across restarts is lost, correctness
//! within the session is not.

pub mod operation;
pub mod processor;

pub use operation::Operation;
pub use processor::{DrainReport, ProcessingState, QueueProcessor, SyncStatus};

use crate::database::{create_pool, QueueItem, Repository};
use crate::error::Result;
use chrono::Utc;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

type CountListener = Box<dyn Fn(usize) + Send + Sync>;

/// Handle returned by [`WriteQueue::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

enum Backend {
    Sqlite(Repository),
    Memory(Mutex<Vec<QueueItem>>),
}

/// Durable FIFO multiset of deferred writes.
///
/// Items are never merged or deduplicated: two offline updates to the
/// same field both replay, in insertion order, and last write wins at
/// the remote store.
pub struct WriteQueue {
    backend: Backend,
    pending: AtomicUsize,
    listeners: Mutex<Vec<(u64, CountListener)>>,
    next_listener_id: AtomicU64,
}

impl WriteQueue {
    /// Open the durable queue, degrading to an in-memory backend if the
    /// database cannot be opened.
    pub async fn open(db_path: &Path) -> Self {
        let backend = match create_pool(db_path).await {
            Ok(pool) => Backend::Sqlite(Repository::new(pool)),
            Err(err) => {
                tracing::warn!(
                    "Durable queue storage unavailable, falling back to in-memory queue: {}",
                    err
                );
                Backend::Memory(Mutex::new(Vec::new()))
            }
        };

        let queue = Self::with_backend(backend);

        if let Err(err) = queue.refresh_pending_count().await {
            tracing::warn!("Failed to count pending queue items: {}", err);
        }

        queue
    }

    /// Create a queue with no durable backing. Also used by tests.
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory(Mutex::new(Vec::new())))
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            pending: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Whether writes are durably persisted across restarts
    pub fn is_durable(&self) -> bool {
        matches!(self.backend, Backend::Sqlite(_))
    }

    /// Append an operation to the queue, returning its generated id.
    /// Subscribers are notified synchronously after the record is
    /// committed.
    pub async fn enqueue(&self, op: &Operation) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(op)?;
        let created_at = Utc::now();

        match &self.backend {
            Backend::Sqlite(repo) => {
                repo.enqueue_item(&id, op.kind(), &payload, created_at)
                    .await?;
            }
            Backend::Memory(items) => {
                items
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(QueueItem {
                        id: id.clone(),
                        op: op.kind().to_string(),
                        payload,
                        created_at,
                    });
            }
        }

        let count = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Queued {} ({}), {} pending", id, op.kind(), count);
        self.notify(count);

        Ok(id)
    }

    /// Every unprocessed item, in insertion order
    pub async fn all_items(&self) -> Result<Vec<QueueItem>> {
        match &self.backend {
            Backend::Sqlite(repo) => repo.list_items().await,
            Backend::Memory(items) => Ok(items
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()),
        }
    }

    /// Delete one item by id. Removing an absent id is a no-op and
    /// does not notify.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let removed = match &self.backend {
            Backend::Sqlite(repo) => repo.remove_item(id).await?,
            Backend::Memory(items) => {
                let mut items = items.lock().unwrap_or_else(PoisonError::into_inner);
                let before = items.len();
                items.retain(|item| item.id != id);
                items.len() < before
            }
        };

        if removed {
            let count = self
                .pending
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                    Some(c.saturating_sub(1))
                })
                .unwrap_or(0)
                .saturating_sub(1);
            self.notify(count);
        }

        Ok(())
    }

    /// Recompute the pending count from the backend and notify
    /// subscribers. Used after external changes to the store.
    pub async fn refresh_pending_count(&self) -> Result<usize> {
        let count = match &self.backend {
            Backend::Sqlite(repo) => repo.count_items().await?,
            Backend::Memory(items) => items
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        };

        self.pending.store(count, Ordering::SeqCst);
        self.notify(count);

        Ok(count)
    }

    /// Cached pending count, for UI badges
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Register a listener invoked with the new pending count after
    /// every count-changing mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(listener)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| *id != subscription.0);
    }

    /// Invoke listeners in registration order. A panicking listener is
    /// caught and logged so it cannot abort the mutation it reacts to.
    fn notify(&self, count: usize) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(count))).is_err() {
                tracing::warn!("Queue listener {} panicked", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::Note;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn save_note_op(title: &str) -> Operation {
        Operation::SaveNote {
            user_id: "u1".to_string(),
            note: Note::new(title.to_string(), "body".to_string()),
        }
    }

    #[tokio::test]
    async fn test_enqueue_preserves_fifo_order() {
        let queue = WriteQueue::in_memory();

        let a = queue.enqueue(&save_note_op("a")).await.unwrap();
        let b = queue.enqueue(&save_note_op("b")).await.unwrap();
        let c = queue.enqueue(&save_note_op("c")).await.unwrap();

        let items = queue.all_items().await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str(), c.as_str()]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let queue = WriteQueue::in_memory();

        let id = queue.enqueue(&save_note_op("x")).await.unwrap();
        assert_eq!(queue.pending_count(), 1);

        queue.remove(&id).await.unwrap();
        assert_eq!(queue.pending_count(), 0);

        // Second removal is a no-op and must not underflow the count
        queue.remove(&id).await.unwrap();
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_count_changes() {
        let queue = WriteQueue::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let sub = queue.subscribe(move |count| {
            seen_clone.lock().unwrap().push(count);
        });

        let id = queue.enqueue(&save_note_op("x")).await.unwrap();
        queue.enqueue(&save_note_op("y")).await.unwrap();
        queue.remove(&id).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);

        queue.unsubscribe(sub);
        queue.enqueue(&save_note_op("z")).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_panicking_listener_does_not_abort_mutation() {
        let queue = WriteQueue::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));

        queue.subscribe(|_| panic!("listener bug"));
        let calls_clone = Arc::clone(&calls);
        queue.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        queue.enqueue(&save_note_op("x")).await.unwrap();

        // The mutation committed and later listeners still ran
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_pending_count() {
        let queue = WriteQueue::in_memory();

        queue.enqueue(&save_note_op("x")).await.unwrap();
        queue.enqueue(&save_note_op("y")).await.unwrap();

        let count = queue.refresh_pending_count().await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(queue.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_open_falls_back_to_memory_on_bad_path() {
        // A path that cannot be created forces the in-memory fallback
        let queue = WriteQueue::open(std::path::Path::new("/dev/null/queue.db")).await;

        assert!(!queue.is_durable());

        // Degraded mode is still functionally correct for the session
        let id = queue.enqueue(&save_note_op("x")).await.unwrap();
        assert_eq!(queue.all_items().await.unwrap().len(), 1);
        queue.remove(&id).await.unwrap();
        assert_eq!(queue.pending_count(), 0);
    }
}
