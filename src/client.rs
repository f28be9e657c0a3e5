//! Sync client
//!
//! Composition root tying the queue, processor, connectivity flag and
//! remote store together, and giving every domain write the same
//! offline-safe contract: either the write reaches the remote store,
//! or it is durably queued, and the caller is told which happened.
//!
//! Every wrapped write follows one three-way branch:
//! - offline: skip the network entirely, enqueue, return the locally
//!   known id so the optimistic UI update proceeds unchanged;
//! - online but the call fails with a retryable error: enqueue and
//!   return the local id, treating the write as logically successful;
//! - online and the call fails with anything else: propagate the error
//!   unchanged. Semantic failures are never queued — retrying them
//!   later would not help and could mask a real bug.

use crate::connectivity::Connectivity;
use crate::error::Result;
use crate::queue::{DrainReport, Operation, ProcessingState, QueueProcessor, SyncStatus, WriteQueue};
use crate::remote::{
    AnalyticsUpdate, Doubt, Note, ProfileUpdate, RemoteStore, SessionUpdate, TeachingSession,
};
use crate::review::{compute_next_review, CardSchedule, ReviewRating, ReviewUpdate};
use std::path::Path;
use std::sync::Arc;

/// How a wrapped write completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// The write reached the remote store; carries the server result
    Remote(T),
    /// The write was deferred to the durable queue; carries the
    /// locally known fallback value
    Queued(T),
}

impl<T> WriteOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            WriteOutcome::Remote(value) | WriteOutcome::Queued(value) => value,
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, WriteOutcome::Queued(_))
    }
}

/// Offline-aware sync client
pub struct SyncClient {
    queue: Arc<WriteQueue>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Connectivity,
    status: Arc<SyncStatus>,
    processor: QueueProcessor,
}

impl SyncClient {
    /// Open the client with a durable queue at the given path
    pub async fn open(db_path: &Path, remote: Arc<dyn RemoteStore>) -> Self {
        let queue = Arc::new(WriteQueue::open(db_path).await);
        Self::with_queue(queue, remote)
    }

    /// Build the client around an existing queue
    pub fn with_queue(queue: Arc<WriteQueue>, remote: Arc<dyn RemoteStore>) -> Self {
        let status = Arc::new(SyncStatus::new());
        let processor =
            QueueProcessor::new(Arc::clone(&queue), Arc::clone(&remote), Arc::clone(&status));

        Self {
            queue,
            remote,
            connectivity: Connectivity::default(),
            status,
            processor,
        }
    }

    pub fn queue(&self) -> &Arc<WriteQueue> {
        &self.queue
    }

    pub fn status(&self) -> &Arc<SyncStatus> {
        &self.status
    }

    pub fn processing_state(&self) -> ProcessingState {
        self.status.current()
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn set_online(&self, online: bool) -> bool {
        self.connectivity.set_online(online)
    }

    /// Handle a connectivity-restored event: mark the client online
    /// and drain the queue.
    pub async fn handle_online(&self) -> Result<DrainReport> {
        self.connectivity.set_online(true);
        self.process_queue().await
    }

    /// Manually trigger a drain pass
    pub async fn process_queue(&self) -> Result<DrainReport> {
        self.processor.process_queue().await
    }

    async fn enqueue_deferred(&self, op: Operation) -> Result<()> {
        let id = self.queue.enqueue(&op).await?;
        tracing::info!(
            "Saved {} locally ({}), will sync when online",
            op.kind(),
            id
        );
        Ok(())
    }

    /// Save a note, falling back to the queue on connectivity loss
    pub async fn save_note(&self, user_id: &str, note: Note) -> Result<WriteOutcome<String>> {
        if !self.connectivity.is_online() {
            let fallback = note.id.clone();
            self.enqueue_deferred(Operation::SaveNote {
                user_id: user_id.to_string(),
                note,
            })
            .await?;
            return Ok(WriteOutcome::Queued(fallback));
        }

        match self.remote.save_note(user_id, &note).await {
            Ok(id) => Ok(WriteOutcome::Remote(id)),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Note save failed, queuing for replay: {}", err);
                let fallback = note.id.clone();
                self.enqueue_deferred(Operation::SaveNote {
                    user_id: user_id.to_string(),
                    note,
                })
                .await?;
                Ok(WriteOutcome::Queued(fallback))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a partial profile update with offline fallback
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<WriteOutcome<()>> {
        if !self.connectivity.is_online() {
            self.enqueue_deferred(Operation::UpdateProfile {
                user_id: user_id.to_string(),
                update,
            })
            .await?;
            return Ok(WriteOutcome::Queued(()));
        }

        match self.remote.update_profile(user_id, &update).await {
            Ok(()) => Ok(WriteOutcome::Remote(())),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Profile update failed, queuing for replay: {}", err);
                self.enqueue_deferred(Operation::UpdateProfile {
                    user_id: user_id.to_string(),
                    update,
                })
                .await?;
                Ok(WriteOutcome::Queued(()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Submit a doubt with offline fallback
    pub async fn save_doubt(&self, user_id: &str, doubt: Doubt) -> Result<WriteOutcome<String>> {
        if !self.connectivity.is_online() {
            let fallback = doubt.id.clone();
            self.enqueue_deferred(Operation::SaveDoubt {
                user_id: user_id.to_string(),
                doubt,
            })
            .await?;
            return Ok(WriteOutcome::Queued(fallback));
        }

        match self.remote.save_doubt(user_id, &doubt).await {
            Ok(id) => Ok(WriteOutcome::Remote(id)),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Doubt save failed, queuing for replay: {}", err);
                let fallback = doubt.id.clone();
                self.enqueue_deferred(Operation::SaveDoubt {
                    user_id: user_id.to_string(),
                    doubt,
                })
                .await?;
                Ok(WriteOutcome::Queued(fallback))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Create a teaching session with offline fallback
    pub async fn create_session(
        &self,
        user_id: &str,
        session: TeachingSession,
    ) -> Result<WriteOutcome<String>> {
        if !self.connectivity.is_online() {
            let fallback = session.id.clone();
            self.enqueue_deferred(Operation::CreateSession {
                user_id: user_id.to_string(),
                session,
            })
            .await?;
            return Ok(WriteOutcome::Queued(fallback));
        }

        match self.remote.create_session(user_id, &session).await {
            Ok(id) => Ok(WriteOutcome::Remote(id)),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Session create failed, queuing for replay: {}", err);
                let fallback = session.id.clone();
                self.enqueue_deferred(Operation::CreateSession {
                    user_id: user_id.to_string(),
                    session,
                })
                .await?;
                Ok(WriteOutcome::Queued(fallback))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a partial session update with offline fallback
    pub async fn update_session(
        &self,
        user_id: &str,
        session_id: &str,
        update: SessionUpdate,
    ) -> Result<WriteOutcome<()>> {
        if !self.connectivity.is_online() {
            self.enqueue_deferred(Operation::UpdateSession {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                update,
            })
            .await?;
            return Ok(WriteOutcome::Queued(()));
        }

        match self.remote.update_session(user_id, session_id, &update).await {
            Ok(()) => Ok(WriteOutcome::Remote(())),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Session update failed, queuing for replay: {}", err);
                self.enqueue_deferred(Operation::UpdateSession {
                    user_id: user_id.to_string(),
                    session_id: session_id.to_string(),
                    update,
                })
                .await?;
                Ok(WriteOutcome::Queued(()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Append study-analytics increments with offline fallback
    pub async fn update_analytics(
        &self,
        user_id: &str,
        update: AnalyticsUpdate,
    ) -> Result<WriteOutcome<()>> {
        if !self.connectivity.is_online() {
            self.enqueue_deferred(Operation::UpdateAnalytics {
                user_id: user_id.to_string(),
                update,
            })
            .await?;
            return Ok(WriteOutcome::Queued(()));
        }

        match self.remote.update_analytics(user_id, &update).await {
            Ok(()) => Ok(WriteOutcome::Remote(())),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Analytics update failed, queuing for replay: {}", err);
                self.enqueue_deferred(Operation::UpdateAnalytics {
                    user_id: user_id.to_string(),
                    update,
                })
                .await?;
                Ok(WriteOutcome::Queued(()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Rate a flashcard: compute the next review schedule and persist
    /// it with the same offline fallback as any other write. The
    /// computed update is returned in either case so the caller can
    /// apply it optimistically.
    pub async fn record_review(
        &self,
        user_id: &str,
        schedule: &CardSchedule,
        rating: ReviewRating,
    ) -> Result<WriteOutcome<ReviewUpdate>> {
        let update = compute_next_review(schedule, rating);
        let card_id = schedule.card_id.clone();

        if !self.connectivity.is_online() {
            self.enqueue_deferred(Operation::SaveReview {
                user_id: user_id.to_string(),
                card_id,
                update: update.clone(),
            })
            .await?;
            return Ok(WriteOutcome::Queued(update));
        }

        match self.remote.save_review(user_id, &card_id, &update).await {
            Ok(()) => Ok(WriteOutcome::Remote(update)),
            Err(err) if err.is_retryable() => {
                tracing::warn!("Review save failed, queuing for replay: {}", err);
                self.enqueue_deferred(Operation::SaveReview {
                    user_id: user_id.to_string(),
                    card_id,
                    update: update.clone(),
                })
                .await?;
                Ok(WriteOutcome::Queued(update))
            }
            Err(err) => Err(err.into()),
        }
    }
}
