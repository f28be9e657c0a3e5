//! Remote backend collaborator
//!
//! The hosted document store is an opaque dependency: this crate only
//! defines the surface it consumes. Implementations live with the
//! application (HTTP client, hosted SDK); tests use an in-memory mock.

pub mod models;

pub use models::{
    AnalyticsUpdate, Doubt, Note, ProfileUpdate, SessionUpdate, TeachingSession,
};

use crate::review::ReviewUpdate;
use async_trait::async_trait;
use thiserror::Error;

/// Failure taxonomy for remote calls.
///
/// Only `Network` and `Unavailable` are eligible for queue-and-retry;
/// every other variant is a semantic rejection that replaying later
/// would not fix.
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// True for connectivity failures that a later replay could recover
    /// from. Semantic rejections are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::Network(_) | RemoteError::Unavailable(_))
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Surface of the hosted backend consumed by the sync core.
///
/// Save/create calls return the server-assigned id; update calls return
/// nothing. Every call is replayable from a serialized payload.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn save_note(&self, user_id: &str, note: &Note) -> RemoteResult<String>;

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> RemoteResult<()>;

    async fn save_doubt(&self, user_id: &str, doubt: &Doubt) -> RemoteResult<String>;

    async fn create_session(
        &self,
        user_id: &str,
        session: &TeachingSession,
    ) -> RemoteResult<String>;

    async fn update_session(
        &self,
        user_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> RemoteResult<()>;

    async fn update_analytics(&self, user_id: &str, update: &AnalyticsUpdate) -> RemoteResult<()>;

    async fn save_review(
        &self,
        user_id: &str,
        card_id: &str,
        update: &ReviewUpdate,
    ) -> RemoteResult<()>;
}
