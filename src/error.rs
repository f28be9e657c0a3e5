//! Error types for the tutorsync library
//!
//! All errors use thiserror for structured error handling.
//! Remote failures carry their own `RemoteError` taxonomy so callers
//! can distinguish connectivity problems from semantic rejections.

use thiserror::Error;

use crate::remote::RemoteError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Queue item not found: {0}")]
    QueueItemNotFound(String),

    #[error("{0}")]
    Generic(String),
}

impl SyncError {
    /// True when the underlying cause is a connectivity failure that a
    /// later replay could recover from.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Remote(e) if e.is_retryable())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
