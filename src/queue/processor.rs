//! Queue drain / replay
//!
//! Replays queued items against the remote store in FIFO order,
//! removing each on success and leaving it in place on failure. At
//! most one drain pass runs at a time per status handle.

use super::operation::Operation;
use super::WriteQueue;
use crate::database::QueueItem;
use crate::error::Result;
use crate::remote::{RemoteError, RemoteStore};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Observable state of the drain machinery. Not persisted; a fresh
/// process starts `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Idle,
    Syncing,
    Error,
}

/// Result of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub processed: usize,
    pub failed: usize,
}

type StateListener = Box<dyn Fn(ProcessingState) + Send + Sync>;

/// Shared, injectable processing-state handle with subscriber
/// callbacks. Owned by the composition root rather than living in
/// module-level globals, so parallel test instances cannot interfere.
pub struct SyncStatus {
    state: Mutex<ProcessingState>,
    listeners: Mutex<Vec<(u64, StateListener)>>,
    next_listener_id: AtomicU64,
}

impl SyncStatus {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProcessingState::Idle),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> ProcessingState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener invoked on every state transition
    pub fn subscribe<F>(&self, listener: F) -> u64
    where
        F: Fn(ProcessingState) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, subscription: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| *id != subscription);
    }

    /// Transition to `Syncing` unless a drain is already in flight.
    /// Returns false when the caller must back off.
    fn try_begin_syncing(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == ProcessingState::Syncing {
                return false;
            }
            *state = ProcessingState::Syncing;
        }
        self.notify(ProcessingState::Syncing);
        true
    }

    fn set(&self, next: ProcessingState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
        self.notify(next);
    }

    fn notify(&self, state: ProcessingState) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(state))).is_err() {
                tracing::warn!("Status listener {} panicked", id);
            }
        }
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::new()
    }
}

enum ReplayOutcome {
    Replayed,
    Skipped,
    Failed,
}

/// Drains the durable queue against the remote store
pub struct QueueProcessor {
    queue: Arc<WriteQueue>,
    remote: Arc<dyn RemoteStore>,
    status: Arc<SyncStatus>,
}

impl QueueProcessor {
    pub fn new(
        queue: Arc<WriteQueue>,
        remote: Arc<dyn RemoteStore>,
        status: Arc<SyncStatus>,
    ) -> Self {
        Self {
            queue,
            remote,
            status,
        }
    }

    /// Replay every queued item, sequentially and in insertion order.
    ///
    /// If a drain is already in progress the call is a no-op returning
    /// an empty report. An empty queue returns immediately without
    /// changing the processing state. One failing item never blocks
    /// replay of the items behind it.
    pub async fn process_queue(&self) -> Result<DrainReport> {
        if self.status.current() == ProcessingState::Syncing {
            tracing::debug!("Drain already in progress, skipping");
            return Ok(DrainReport::default());
        }

        let items = self.queue.all_items().await?;
        if items.is_empty() {
            return Ok(DrainReport::default());
        }

        if !self.status.try_begin_syncing() {
            tracing::debug!("Drain already in progress, skipping");
            return Ok(DrainReport::default());
        }

        tracing::info!("Draining write queue: {} items", items.len());

        let result = self.drain(&items).await;

        match &result {
            Ok(report) => {
                tracing::info!(
                    "Drain pass complete: {} replayed, {} failed",
                    report.processed,
                    report.failed
                );
                self.status.set(if report.failed > 0 {
                    ProcessingState::Error
                } else {
                    ProcessingState::Idle
                });
            }
            Err(err) => {
                tracing::warn!("Drain pass aborted: {}", err);
                self.status.set(ProcessingState::Error);
            }
        }

        result
    }

    async fn drain(&self, items: &[QueueItem]) -> Result<DrainReport> {
        let mut report = DrainReport::default();

        // Sequential on purpose: operations for one entity are enqueued
        // in causal order and must apply in that order at the remote
        // store. Each call is fully awaited before the next begins.
        for item in items {
            match self.replay_item(item).await {
                ReplayOutcome::Replayed => {
                    self.queue.remove(&item.id).await?;
                    report.processed += 1;
                }
                ReplayOutcome::Skipped => {}
                ReplayOutcome::Failed => {
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn replay_item(&self, item: &QueueItem) -> ReplayOutcome {
        let op: Operation = match serde_json::from_str(&item.payload) {
            Ok(op) => op,
            Err(err) => {
                if !Operation::is_known_kind(&item.op) {
                    // Row written by a different client version
                    tracing::warn!(
                        "Skipping queue item {} with unrecognized op tag '{}'",
                        item.id,
                        item.op
                    );
                    return ReplayOutcome::Skipped;
                }
                tracing::error!(
                    "Malformed payload for queue item {} ({}): {}",
                    item.id,
                    item.op,
                    err
                );
                return ReplayOutcome::Failed;
            }
        };

        match self.dispatch(&op).await {
            Ok(()) => {
                tracing::debug!("Replayed queue item {} ({})", item.id, item.op);
                ReplayOutcome::Replayed
            }
            Err(err) => {
                tracing::warn!("Replay failed for queue item {} ({}): {}", item.id, item.op, err);
                ReplayOutcome::Failed
            }
        }
    }

    async fn dispatch(&self, op: &Operation) -> std::result::Result<(), RemoteError> {
        match op {
            Operation::SaveNote { user_id, note } => {
                self.remote.save_note(user_id, note).await.map(|_| ())
            }
            Operation::UpdateProfile { user_id, update } => {
                self.remote.update_profile(user_id, update).await
            }
            Operation::SaveDoubt { user_id, doubt } => {
                self.remote.save_doubt(user_id, doubt).await.map(|_| ())
            }
            Operation::CreateSession { user_id, session } => {
                self.remote.create_session(user_id, session).await.map(|_| ())
            }
            Operation::UpdateSession {
                user_id,
                session_id,
                update,
            } => self.remote.update_session(user_id, session_id, update).await,
            Operation::UpdateAnalytics { user_id, update } => {
                self.remote.update_analytics(user_id, update).await
            }
            Operation::SaveReview {
                user_id,
                card_id,
                update,
            } => self.remote.save_review(user_id, card_id, update).await,
        }
    }
}
