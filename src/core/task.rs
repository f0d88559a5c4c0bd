//! Task model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored task, owned by one user.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub task_type: TaskType,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub estimated_duration: i64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub original_command: Option<String>,
}

/// Fields for a task that has not been stored yet.
///
/// Deserializes directly from the LLM's JSON object (the `type` key maps to
/// `task_type`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subject: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub estimated_duration: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub original_command: Option<String>,
}

fn default_duration() -> i64 {
    60
}

/// Partial update for a stored task. `None` fields keep their current
/// value.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_duration: Option<i64>,
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.subject.is_none()
            && self.task_type.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.estimated_duration.is_none()
            && self.tags.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Assignment,
    Study,
    Project,
    Exam,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Assignment => "assignment",
            TaskType::Study => "study",
            TaskType::Project => "project",
            TaskType::Exam => "exam",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assignment" => Ok(TaskType::Assignment),
            "study" => Ok(TaskType::Study),
            "project" => Ok(TaskType::Project),
            "exam" => Ok(TaskType::Exam),
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_spelling() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
    }

    #[test]
    fn draft_deserializes_llm_response() {
        let json = r#"{
            "title": "Complete project proposal",
            "description": "Write and submit the final project proposal",
            "subject": "Computer Science",
            "type": "project",
            "priority": "high",
            "status": "pending",
            "due_date": "2025-01-15T10:00:00Z",
            "estimated_duration": 120,
            "tags": ["urgent", "proposal", "cs"],
            "original_command": "finish the cs proposal by Jan 15"
        }"#;
        let draft: TaskDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.task_type, TaskType::Project);
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.estimated_duration, 120);
        assert_eq!(draft.tags.len(), 3);
    }

    #[test]
    fn draft_defaults_apply() {
        let json = r#"{
            "title": "Read chapter 4",
            "subject": "History",
            "due_date": "2025-02-01T09:00:00Z"
        }"#;
        let draft: TaskDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.task_type, TaskType::Assignment);
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.status, TaskStatus::Pending);
        assert_eq!(draft.estimated_duration, 60);
    }
}
