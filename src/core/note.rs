//! Note model
//!
//! A note holds a raw transcript plus an LLM-generated summary and metadata.
//! Only the summary participates in semantic search: notes without a
//! non-empty summary are never part of the embeddable corpus.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored note, owned by one user.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub explanation: Vec<String>,
    pub subject: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub importance: Importance,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Summary text eligible for embedding, if any.
    pub fn embeddable_summary(&self) -> Option<&str> {
        match self.summary.as_deref() {
            Some(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Fields for a note that has not been stored yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub explanation: Vec<String>,
    pub subject: String,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_categories() -> Vec<String> {
    vec!["General".to_string()]
}

/// Note importance level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Importance::Low),
            "medium" => Ok(Importance::Medium),
            "high" => Ok(Importance::High),
            other => Err(format!("unknown importance: {other}")),
        }
    }
}
