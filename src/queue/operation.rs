//! Replayable operation descriptors
//!
//! The closed set of mutations the queue knows how to replay. The serde
//! tag doubles as the `op` column of the durable row, so a drain pass
//! can recognize (and skip) tags written by a different client version
//! before attempting to deserialize the payload.

use serde::{Deserialize, Serialize};

use crate::remote::{
    AnalyticsUpdate, Doubt, Note, ProfileUpdate, SessionUpdate, TeachingSession,
};
use crate::review::ReviewUpdate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    SaveNote {
        user_id: String,
        note: Note,
    },
    UpdateProfile {
        user_id: String,
        update: ProfileUpdate,
    },
    SaveDoubt {
        user_id: String,
        doubt: Doubt,
    },
    CreateSession {
        user_id: String,
        session: TeachingSession,
    },
    UpdateSession {
        user_id: String,
        session_id: String,
        update: SessionUpdate,
    },
    UpdateAnalytics {
        user_id: String,
        update: AnalyticsUpdate,
    },
    SaveReview {
        user_id: String,
        card_id: String,
        update: ReviewUpdate,
    },
}

impl Operation {
    /// The tag stored in the queue row's `op` column
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::SaveNote { .. } => "save_note",
            Operation::UpdateProfile { .. } => "update_profile",
            Operation::SaveDoubt { .. } => "save_doubt",
            Operation::CreateSession { .. } => "create_session",
            Operation::UpdateSession { .. } => "update_session",
            Operation::UpdateAnalytics { .. } => "update_analytics",
            Operation::SaveReview { .. } => "save_review",
        }
    }

    /// Whether this build recognizes the given op tag
    pub fn is_known_kind(kind: &str) -> bool {
        matches!(
            kind,
            "save_note"
                | "update_profile"
                | "save_doubt"
                | "create_session"
                | "update_session"
                | "update_analytics"
                | "save_review"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_serde_tag() {
        let op = Operation::SaveNote {
            user_id: "u1".to_string(),
            note: Note::new("Title".to_string(), "Body".to_string()),
        };

        let json: serde_json::Value = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], op.kind());
    }

    #[test]
    fn test_round_trip() {
        let op = Operation::UpdateAnalytics {
            user_id: "u1".to_string(),
            update: AnalyticsUpdate {
                cards_reviewed: 12,
                ..Default::default()
            },
        };

        let encoded = serde_json::to_string(&op).unwrap();
        let decoded: Operation = serde_json::from_str(&encoded).unwrap();

        match decoded {
            Operation::UpdateAnalytics { user_id, update } => {
                assert_eq!(user_id, "u1");
                assert_eq!(update.cards_reviewed, 12);
            }
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_fails_to_deserialize() {
        let stale = r#"{"op":"award_badge","user_id":"u1"}"#;
        assert!(serde_json::from_str::<Operation>(stale).is_err());
        assert!(!Operation::is_known_kind("award_badge"));
    }
}
