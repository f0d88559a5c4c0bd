//! LLM-backed structured object generation
//!
//! Turns free-text descriptions into task, event, and study plan drafts, and
//! produces note summaries and metadata, via an OpenAI-compatible chat
//! completions endpoint (Groq by default). Responses are requested as JSON
//! objects; stray markdown code fences are stripped before parsing.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::event::EventDraft;
use crate::core::note::Importance;
use crate::core::plan::PlanDraft;
use crate::core::task::TaskDraft;

const DEFAULT_LLM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Summary plus bullet-point explanations generated for a note.
#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    pub summary: String,
    #[serde(default)]
    pub explanation: Vec<String>,
}

/// Tags, categories, keywords, and importance generated from a summary.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub importance: Importance,
}

fn default_categories() -> Vec<String> {
    vec!["General".to_string()]
}

/// Client for the chat completions endpoint.
pub struct LlmClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Build a client from `GROQ_API_KEY` (required) and
    /// `STUDYDESK_LLM_URL` (optional endpoint override).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").context("GROQ_API_KEY is not set")?;
        let url =
            std::env::var("STUDYDESK_LLM_URL").unwrap_or_else(|_| DEFAULT_LLM_URL.to_string());
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            url,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    fn complete(&self, prompt: &str, max_tokens: u32, temperature: f64) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt},
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
            "response_format": {"type": "json_object"},
        });

        tracing::debug!(url = %self.url, "requesting chat completion");

        let response: Value = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .context("LLM request failed")?
            .error_for_status()
            .context("LLM request returned an error status")?
            .json()
            .context("LLM response was not valid JSON")?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .filter(|c| !c.trim().is_empty())
            .context("LLM response contained no content")?;

        Ok(strip_code_fences(content).to_string())
    }

    /// Generate a task draft from a free-text description.
    pub fn generate_task(&self, description: &str) -> Result<TaskDraft> {
        let prompt = format!(
            r#"You are a professional task planner. The user wants to create a task with this description: "{description}"

Return ONLY a valid JSON object with these exact fields:
{{
    "title": "string",
    "description": "string",
    "subject": "string",
    "type": "assignment|study|project|exam",
    "priority": "low|medium|high",
    "status": "pending",
    "due_date": "YYYY-MM-DDTHH:MM:SS.sssZ format",
    "estimated_duration": number (minutes),
    "tags": ["array", "of", "strings"],
    "original_command": "the original task description"
}}

Current date and time: {now}

IMPORTANT: Return ONLY the JSON object, no other text, no markdown formatting, no explanations."#,
            now = Utc::now().format("%Y-%m-%d %H:%M:%S"),
        );

        let content = self.complete(&prompt, 500, 0.2)?;
        let mut value: Value =
            serde_json::from_str(&content).context("LLM returned invalid JSON for task")?;
        // Invalid choice values fall back to defaults rather than failing
        sanitize_choice(&mut value, "type", &["assignment", "study", "project", "exam"]);
        sanitize_choice(&mut value, "priority", &["low", "medium", "high"]);
        sanitize_choice(
            &mut value,
            "status",
            &["pending", "in_progress", "completed", "cancelled"],
        );
        serde_json::from_value(value).context("LLM task response missing required fields")
    }

    /// Generate an event draft from a free-text description. The current
    /// date is injected so "tomorrow" and "next week" resolve sensibly.
    pub fn generate_event(&self, description: &str) -> Result<EventDraft> {
        let today = Utc::now().format("%Y-%m-%d");
        let prompt = format!(
            r#"You are a professional event planner. The user wants to create an event based on this description: "{description}"

Current date and time: {now}
Today's date: {today}

Return ONLY a valid JSON object with these exact fields:
{{
    "title": "string",
    "description": "string",
    "event_type": "study_session|class|meeting|exam",
    "start_time": "YYYY-MM-DDTHH:MM:SS.sssZ format",
    "end_time": "YYYY-MM-DDTHH:MM:SS.sssZ format"
}}

Rules:
- event_type must be one of: study_session, class, meeting, exam
- If the description mentions "today", use today's date ({today})
- If the description mentions "tomorrow", use tomorrow's date
- If the description mentions "next week", use a date within the next 7 days
- If no specific time is mentioned, suggest a realistic time relative to today
- Duration should be realistic (1-2 hours for study sessions, 1 hour for meetings)
- Return ONLY the JSON object, no other text, no markdown formatting, no explanations."#,
            now = Utc::now().format("%Y-%m-%d %H:%M:%S"),
        );

        let content = self.complete(&prompt, 500, 0.2)?;
        let mut value: Value =
            serde_json::from_str(&content).context("LLM returned invalid JSON for event")?;
        sanitize_choice(
            &mut value,
            "event_type",
            &["study_session", "class", "meeting", "exam"],
        );
        serde_json::from_value(value).context("LLM event response missing required fields")
    }

    /// Generate a study plan draft from a free-text description.
    pub fn generate_plan(&self, description: &str) -> Result<PlanDraft> {
        let prompt = format!(
            r#"You are a professional study planner. The user wants to create a comprehensive study plan based on this description: "{description}"

Current date: {today}

Return ONLY a valid JSON object with these exact fields:
{{
    "title": "A concise title for the plan",
    "duration": "A short summary of the plan's length (e.g., 'One Week', 'Five Days')",
    "sessions": [
        {{"subject": "string", "date": "YYYY-MM-DD format", "goal": "string"}}
    ]
}}

Rules:
- Base the plan's dates on the current date, adjusting for "next week" or "tomorrow" mentioned in the description.
- Generate at least two sessions unless the description implies a single task.
- Return ONLY the JSON object, no other text, no markdown formatting, no explanations."#,
            today = Utc::now().format("%Y-%m-%d"),
        );

        let content = self.complete(&prompt, 800, 0.2)?;
        serde_json::from_str(&content).context("LLM returned invalid JSON for study plan")
    }

    /// Summarize note text chunks into a summary plus bullet-point
    /// explanations. At most the first three chunks are used, capped at
    /// 3000 characters.
    pub fn summarize(&self, chunks: &[String]) -> Result<Summary> {
        let taken = chunks.iter().take(3).cloned().collect::<Vec<_>>().join(" ");
        let text = truncate_chars(&taken, 3000);

        let prompt = format!(
            r#"Summarize this text in 2-3 sentences and provide key explanations as bullet points. Return ONLY this JSON format:
{{
    "summary": "summary text",
    "explanation": ["bullet point 1", "bullet point 2", "bullet point 3"]
}}

Text: {text}"#,
        );

        let content = self.complete(&prompt, 500, 0.3)?;
        serde_json::from_str(&content).context("LLM returned invalid JSON for summary")
    }

    /// Generate tags, categories, keywords, and importance from a summary,
    /// capped at 1000 characters.
    pub fn tag_summary(&self, summary: &str) -> Result<NoteMetadata> {
        let summary = truncate_chars(summary, 1000);
        let prompt = format!(
            r#"From this summary: {summary}
Return ONLY this JSON format:
{{
    "tags": ["tag1", "tag2"],
    "categories": ["cat1"],
    "keywords": ["keyword1", "keyword2"],
    "importance": "low|medium|high"
}}"#,
        );

        let content = self.complete(&prompt, 300, 0.2)?;
        let mut value: Value =
            serde_json::from_str(&content).context("LLM returned invalid JSON for metadata")?;
        sanitize_choice(&mut value, "importance", &["low", "medium", "high"]);
        serde_json::from_value(value).context("LLM metadata response malformed")
    }
}

/// Replace an out-of-vocabulary choice field so deserialization falls back
/// to the enum default instead of failing.
fn sanitize_choice(value: &mut Value, key: &str, allowed: &[&str]) {
    if let Some(obj) = value.as_object_mut() {
        let valid = obj
            .get(key)
            .and_then(Value::as_str)
            .map(|s| allowed.contains(&s))
            .unwrap_or(false);
        if !valid {
            obj.remove(key);
        }
    }
}

/// Strip surrounding markdown code fences from an LLM response.
pub fn strip_code_fences(content: &str) -> &str {
    let mut content = content.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Split text into roughly sentence-aligned chunks of at most `chunk_size`
/// characters.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in text.split(". ") {
        if current.len() + sentence.len() < chunk_size {
            current.push_str(sentence);
            current.push_str(". ");
        } else {
            if !current.is_empty() {
                chunks.push(current.trim().to_string());
            }
            current = format!("{sentence}. ");
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}
