//! Data models for review scheduling

use crate::config::{DEFAULT_EASE_FACTOR, MIN_INTERVAL_DAYS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recall quality reported by the user after seeing a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRating {
    Again,
    Hard,
    Good,
    Easy,
}

/// Current scheduling state for a flashcard.
///
/// Mutated only by applying the scheduler's output; UI code never
/// writes these fields directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSchedule {
    pub card_id: String,
    /// Current interval in days, never below 1
    pub interval_days: i32,
    /// Growth multiplier, floored at 1.3
    pub ease_factor: f32,
    /// Total ratings applied, including failures
    pub repetitions: i32,
    /// When the card is next due
    pub next_review_date: DateTime<Utc>,
    /// The rating most recently applied, if any
    pub last_performance: Option<ReviewRating>,
}

impl CardSchedule {
    pub fn new(card_id: String) -> Self {
        Self {
            card_id,
            interval_days: MIN_INTERVAL_DAYS,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: 0,
            next_review_date: Utc::now(),
            last_performance: None,
        }
    }

    /// Check if the card is due for review
    pub fn is_due(&self) -> bool {
        Utc::now() >= self.next_review_date
    }

    /// Fold a computed update back into the schedule
    pub fn apply(&mut self, update: &ReviewUpdate) {
        self.interval_days = update.interval_days;
        self.ease_factor = update.ease_factor;
        self.repetitions = update.repetitions;
        self.next_review_date = update.next_review_date;
        self.last_performance = Some(update.last_performance);
    }
}

/// Fields persisted after a rating is applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub next_review_date: DateTime<Utc>,
    pub interval_days: i32,
    pub ease_factor: f32,
    pub repetitions: i32,
    pub last_performance: ReviewRating,
}
