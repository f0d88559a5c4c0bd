//! Study plan model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stored study plan: a titled list of dated study sessions.
#[derive(Debug, Clone, Serialize)]
pub struct StudyPlan {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub duration: String,
    pub sessions: Vec<StudySession>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a plan that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDraft {
    pub title: String,
    pub duration: String,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}

/// A single study session within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub subject: String,
    pub date: NaiveDate,
    pub goal: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_deserializes_llm_response() {
        let json = r#"{
            "title": "Python Final Exam Review",
            "duration": "4 days",
            "sessions": [
                {"subject": "Python Data Structures", "date": "2025-12-10",
                 "goal": "Review lists, tuples, and dictionaries"},
                {"subject": "Python OOP", "date": "2025-12-11",
                 "goal": "Master classes, inheritance, and polymorphism"}
            ]
        }"#;
        let draft: PlanDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.sessions.len(), 2);
        assert_eq!(draft.sessions[0].date.to_string(), "2025-12-10");
    }

    #[test]
    fn sessions_round_trip_as_json() {
        let sessions = vec![StudySession {
            subject: "Linear Algebra".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            goal: "Eigenvalues".to_string(),
        }];
        let json = serde_json::to_string(&sessions).unwrap();
        let back: Vec<StudySession> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].subject, "Linear Algebra");
    }
}
