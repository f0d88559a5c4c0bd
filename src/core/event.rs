//! Calendar event model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored event, owned by one user. May reference a task it was planned for.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub related_task: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Fields for an event that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub related_task: Option<i64>,
}

/// Partial update for a stored event. `None` fields keep their current
/// value.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub related_task: Option<i64>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.event_type.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.related_task.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    StudySession,
    Class,
    Meeting,
    Exam,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::StudySession => "study_session",
            EventType::Class => "class",
            EventType::Meeting => "meeting",
            EventType::Exam => "exam",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study_session" => Ok(EventType::StudySession),
            "class" => Ok(EventType::Class),
            "meeting" => Ok(EventType::Meeting),
            "exam" => Ok(EventType::Exam),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_wire_spelling() {
        assert_eq!(EventType::StudySession.to_string(), "study_session");
        assert_eq!(
            "study_session".parse::<EventType>(),
            Ok(EventType::StudySession)
        );
    }

    #[test]
    fn draft_deserializes_llm_response() {
        let json = r#"{
            "title": "Math Exam Review",
            "description": "Review calculus chapters 1-3 for exam",
            "event_type": "study_session",
            "start_time": "2025-01-15T10:00:00Z",
            "end_time": "2025-01-15T12:00:00Z"
        }"#;
        let draft: EventDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.event_type, EventType::StudySession);
        assert!(draft.end_time > draft.start_time);
        assert!(draft.related_task.is_none());
    }
}
