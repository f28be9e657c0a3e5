//! Spaced-repetition review scheduling
//!
//! Data models and the pure scheduling function that maps a card's
//! current state plus a recall rating to its next state.

pub mod algorithm;
pub mod models;

pub use algorithm::{compute_next_review, format_interval, preview_intervals};
pub use models::{CardSchedule, ReviewRating, ReviewUpdate};
