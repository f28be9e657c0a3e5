//! Domain payload models
//!
//! Serde structs carried by wrapped writes and replayed queue items.
//! Partial updates use Option fields; absent fields leave the remote
//! value untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub subject: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            subject: None,
            updated_at: Utc::now(),
        }
    }
}

/// A question submitted by a student for a teacher to answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doubt {
    pub id: String,
    pub question: String,
    pub subject: String,
    pub lesson_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Doubt {
    pub fn new(question: String, subject: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            subject,
            lesson_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A scheduled tutoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingSession {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub scheduled_for: DateTime<Utc>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

impl TeachingSession {
    pub fn new(student_id: String, subject: String, scheduled_for: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            subject,
            scheduled_for,
            duration_minutes: 60,
            notes: None,
        }
    }
}

/// Partial update for an existing session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub duration_minutes: Option<u32>,
}

/// Partial update for a user profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub grade_level: Option<String>,
    pub subjects: Option<Vec<String>>,
}

/// Increments applied to a user's study-analytics aggregate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsUpdate {
    pub lessons_completed: u32,
    pub cards_reviewed: u32,
    pub minutes_studied: u32,
}
