//! Review interval calculation
//!
//! SM-2 style scheduling over the four-button rating scale. Pure
//! arithmetic, no I/O; persistence of the result is the caller's job.
//!
//! Interval arithmetic always rounds up, so a computed 1.01 days
//! becomes 2 days. The ease factor is floored at 1.3 on the two
//! penalizing ratings and has no upper bound.

use chrono::{Duration, Utc};

use super::models::{CardSchedule, ReviewRating, ReviewUpdate};
use crate::config::{
    AGAIN_EASE_PENALTY, EASY_EASE_BONUS, EASY_INTERVAL_BONUS, HARD_EASE_PENALTY,
    HARD_INTERVAL_MULTIPLIER, MIN_EASE_FACTOR, MIN_INTERVAL_DAYS,
};

/// Calculate the next scheduling state for a card given a rating.
///
/// The repetition counter increments on every rating, including
/// "again" — it counts reviews performed, not successes.
pub fn compute_next_review(schedule: &CardSchedule, rating: ReviewRating) -> ReviewUpdate {
    let mut interval = schedule.interval_days;
    let mut ease_factor = schedule.ease_factor;

    match rating {
        ReviewRating::Again => {
            interval = MIN_INTERVAL_DAYS;
            ease_factor = (ease_factor - AGAIN_EASE_PENALTY).max(MIN_EASE_FACTOR);
        }
        ReviewRating::Hard => {
            interval = (interval as f32 * HARD_INTERVAL_MULTIPLIER).ceil() as i32;
            ease_factor = (ease_factor - HARD_EASE_PENALTY).max(MIN_EASE_FACTOR);
        }
        ReviewRating::Good => {
            interval = (interval as f32 * ease_factor).ceil() as i32;
        }
        ReviewRating::Easy => {
            interval = (interval as f32 * ease_factor * EASY_INTERVAL_BONUS).ceil() as i32;
            ease_factor += EASY_EASE_BONUS;
        }
    }

    ReviewUpdate {
        next_review_date: Utc::now() + Duration::days(interval as i64),
        interval_days: interval,
        ease_factor,
        repetitions: schedule.repetitions + 1,
        last_performance: rating,
    }
}

/// Calculate the interval each rating would produce, for display on
/// the four review buttons.
pub fn preview_intervals(schedule: &CardSchedule) -> [i32; 4] {
    [
        compute_next_review(schedule, ReviewRating::Again).interval_days,
        compute_next_review(schedule, ReviewRating::Hard).interval_days,
        compute_next_review(schedule, ReviewRating::Good).interval_days,
        compute_next_review(schedule, ReviewRating::Easy).interval_days,
    ]
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i32) -> String {
    if days <= 1 {
        "1d".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_EASE_FACTOR;

    fn schedule(interval_days: i32, ease_factor: f32, repetitions: i32) -> CardSchedule {
        CardSchedule {
            interval_days,
            ease_factor,
            repetitions,
            ..CardSchedule::new("card-1".to_string())
        }
    }

    #[test]
    fn test_again_resets_interval() {
        let result = compute_next_review(&schedule(30, 2.5, 8), ReviewRating::Again);

        assert_eq!(result.interval_days, 1);
        assert!((result.ease_factor - 2.3).abs() < 1e-6);
        assert_eq!(result.last_performance, ReviewRating::Again);
    }

    #[test]
    fn test_hard_grows_interval_slowly() {
        let result = compute_next_review(&schedule(10, 2.5, 3), ReviewRating::Hard);

        // ceil(10 * 1.2) = 12
        assert_eq!(result.interval_days, 12);
        assert!((result.ease_factor - 2.35).abs() < 1e-6);
    }

    #[test]
    fn test_good_multiplies_by_ease_factor() {
        let result = compute_next_review(&schedule(4, 2.5, 5), ReviewRating::Good);

        // ceil(4 * 2.5) = 10, ease factor unchanged
        assert_eq!(result.interval_days, 10);
        assert!((result.ease_factor - 2.5).abs() < 1e-6);
        assert_eq!(result.repetitions, 6);
    }

    #[test]
    fn test_easy_applies_bonus() {
        let result = compute_next_review(&schedule(10, 2.0, 2), ReviewRating::Easy);

        // ceil(10 * 2.0 * 1.3) = 26
        assert_eq!(result.interval_days, 26);
        assert!((result.ease_factor - 2.15).abs() < 1e-6);
    }

    #[test]
    fn test_intervals_round_up() {
        // ceil(1 * 1.2) = 2 — a fractional result always rounds up
        let result = compute_next_review(&schedule(1, 2.5, 0), ReviewRating::Hard);
        assert_eq!(result.interval_days, 2);
    }

    #[test]
    fn test_ease_factor_floor() {
        let mut current = schedule(5, 1.4, 0);

        // Repeated failures must never push the ease factor below 1.3
        for _ in 0..5 {
            let result = compute_next_review(&current, ReviewRating::Again);
            assert!(result.ease_factor >= 1.3);
            current.apply(&result);
        }

        assert!((current.ease_factor - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_no_ease_factor_ceiling() {
        let mut current = schedule(1, DEFAULT_EASE_FACTOR, 0);

        for _ in 0..10 {
            let result = compute_next_review(&current, ReviewRating::Easy);
            current.apply(&result);
        }

        // 2.5 + 10 * 0.15 = 4.0
        assert!((current.ease_factor - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_repetitions_increment_on_every_rating() {
        let base = schedule(4, 2.5, 7);

        for rating in [
            ReviewRating::Again,
            ReviewRating::Hard,
            ReviewRating::Good,
            ReviewRating::Easy,
        ] {
            let result = compute_next_review(&base, rating);
            assert_eq!(result.repetitions, 8);
        }
    }

    #[test]
    fn test_good_and_easy_never_shrink_interval() {
        for interval in 1..=20 {
            let base = schedule(interval, 1.3, 0);

            let good = compute_next_review(&base, ReviewRating::Good);
            assert!(good.interval_days >= interval);

            let easy = compute_next_review(&base, ReviewRating::Easy);
            assert!(easy.interval_days >= interval);
        }
    }

    #[test]
    fn test_next_review_date_matches_interval() {
        let before = Utc::now();
        let result = compute_next_review(&schedule(4, 2.5, 0), ReviewRating::Good);
        let after = Utc::now();

        assert!(result.next_review_date >= before + Duration::days(10));
        assert!(result.next_review_date <= after + Duration::days(10));
    }

    #[test]
    fn test_preview_intervals() {
        let previews = preview_intervals(&schedule(10, 2.5, 3));

        // again=1, hard=ceil(12)=12, good=ceil(25)=25, easy=ceil(32.5)=33
        assert_eq!(previews, [1, 12, 25, 33]);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(730), "2y");
    }
}
