//! Library configuration constants
//!
//! Central location for scheduler constants, resource limits, and
//! validation boundaries used throughout the library.

// ===== Spaced-Repetition Scheduler =====

/// Ease factor assigned to a card that has never been rated
pub const DEFAULT_EASE_FACTOR: f32 = 2.5;

/// Floor for the ease factor. Ratings of "again" and "hard" reduce the
/// ease factor but never push it below this value.
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// Ease factor penalty applied by an "again" rating
pub const AGAIN_EASE_PENALTY: f32 = 0.2;

/// Ease factor penalty applied by a "hard" rating
pub const HARD_EASE_PENALTY: f32 = 0.15;

/// Interval multiplier for a "hard" rating
pub const HARD_INTERVAL_MULTIPLIER: f32 = 1.2;

/// Extra interval multiplier for an "easy" rating, applied on top of
/// the card's ease factor
pub const EASY_INTERVAL_BONUS: f32 = 1.3;

/// Ease factor reward for an "easy" rating (no ceiling)
pub const EASY_EASE_BONUS: f32 = 0.15;

/// Minimum review interval in days. Interval arithmetic rounds up with
/// ceil() and an "again" rating resets to exactly this value.
pub const MIN_INTERVAL_DAYS: i32 = 1;

// ===== Database Limits =====

/// Maximum connections in the application pool
pub const MAX_POOL_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;
