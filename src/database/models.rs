//! Database models
//!
//! Rust structs representing durable queue rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One deferred mutation awaiting replay against the remote store.
///
/// Rows are write-once, delete-once: a row is inserted when a write is
/// deferred, deleted when its replay succeeds, and otherwise left
/// untouched. The `op` tag is stored as text so that rows written by a
/// different client version can still be read; unrecognized tags are
/// skipped at drain time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueItem {
    pub id: String,
    /// Operation-kind tag used to dispatch replay
    pub op: String,
    /// JSON-encoded operation, including the acting user id
    pub payload: String,
    /// Enqueue time, for diagnostics only; replay order comes from the
    /// insertion sequence
    pub created_at: DateTime<Utc>,
}
