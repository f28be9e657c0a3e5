//! tutorsync library
//!
//! Offline-first sync core for a tutoring client: a durable write
//! queue with FIFO replay, an offline-aware write wrapper over an
//! opaque remote store, and a spaced-repetition review scheduler.

pub mod client;
pub mod config;
pub mod connectivity;
pub mod database;
pub mod error;
pub mod queue;
pub mod remote;
pub mod review;

pub use client::{SyncClient, WriteOutcome};
pub use connectivity::Connectivity;
pub use error::{Result, SyncError};
pub use queue::{DrainReport, Operation, ProcessingState, WriteQueue};
pub use remote::{RemoteError, RemoteStore};
pub use review::{compute_next_review, CardSchedule, ReviewRating, ReviewUpdate};
