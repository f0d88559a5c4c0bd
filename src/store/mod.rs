//! SQLite persistence for notes, tasks, events, and study plans
//!
//! List-valued columns (tags, keywords, plan sessions, ...) are stored as
//! JSON text. Embeddings are never persisted: search recomputes them per
//! call.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::event::{Event, EventDraft, EventType, EventUpdate};
use crate::core::note::{Importance, Note, NoteDraft};
use crate::core::plan::{PlanDraft, StudyPlan, StudySession};
use crate::core::task::{Priority, Task, TaskDraft, TaskStatus, TaskType, TaskUpdate};
use crate::search::NoteCorpus;

/// Store over a single SQLite connection.
pub struct Store {
    conn: Connection,
}

/// Per-user resource counts for the status command.
#[derive(Debug, serde::Serialize)]
pub struct ResourceCounts {
    pub notes: usize,
    pub tasks: usize,
    pub events: usize,
    pub plans: usize,
}

/// Status dashboard figures: open tasks due today and events starting
/// within the next seven days.
#[derive(Debug, serde::Serialize)]
pub struct Dashboard {
    pub tasks_due_today: usize,
    pub upcoming_events: usize,
}

impl Store {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                transcript TEXT,
                summary TEXT,
                explanation TEXT NOT NULL DEFAULT '[]',
                subject TEXT NOT NULL,
                categories TEXT NOT NULL DEFAULT '[]',
                keywords TEXT NOT NULL DEFAULT '[]',
                importance TEXT NOT NULL DEFAULT 'medium',
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                subject TEXT NOT NULL,
                task_type TEXT NOT NULL DEFAULT 'assignment',
                priority TEXT NOT NULL DEFAULT 'medium',
                status TEXT NOT NULL DEFAULT 'pending',
                due_date TEXT NOT NULL,
                estimated_duration INTEGER NOT NULL DEFAULT 60,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                completed_at TEXT,
                original_command TEXT
            );

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                event_type TEXT NOT NULL DEFAULT 'study_session',
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                related_task INTEGER REFERENCES tasks(id),
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS study_plans (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                duration TEXT NOT NULL,
                sessions TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(user_id, status);
            CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id);
            CREATE INDEX IF NOT EXISTS idx_plans_user ON study_plans(user_id);
            "#,
        )?;
        Ok(())
    }

    // ===== Notes =====

    pub fn insert_note(&self, user_id: &str, draft: &NoteDraft) -> Result<Note> {
        let now = now_sql();
        self.conn.execute(
            r#"
            INSERT INTO notes (user_id, title, transcript, summary, explanation, subject,
                               categories, keywords, importance, tags, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
            params![
                user_id,
                draft.title,
                draft.transcript,
                draft.summary,
                to_json(&draft.explanation)?,
                draft.subject,
                to_json(&draft.categories)?,
                to_json(&draft.keywords)?,
                draft.importance.as_str(),
                to_json(&draft.tags)?,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_note(user_id, id)?
            .context("inserted note not found")
    }

    /// All notes owned by `user_id` in creation order. This order is also
    /// the tie-break order for search results with equal scores.
    pub fn notes_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, transcript, summary, explanation, subject,
                    categories, keywords, importance, tags, created_at, updated_at
             FROM notes WHERE user_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![user_id], map_note_row)?;
        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    pub fn get_note(&self, user_id: &str, id: i64) -> Result<Option<Note>> {
        self.conn
            .query_row(
                "SELECT id, user_id, title, transcript, summary, explanation, subject,
                        categories, keywords, importance, tags, created_at, updated_at
                 FROM notes WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                map_note_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn delete_note(&self, user_id: &str, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    // ===== Tasks =====

    pub fn insert_task(&self, user_id: &str, draft: &TaskDraft) -> Result<Task> {
        let now = now_sql();
        self.conn.execute(
            r#"
            INSERT INTO tasks (user_id, title, description, subject, task_type, priority,
                               status, due_date, estimated_duration, tags, created_at,
                               updated_at, original_command)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11, ?12)
            "#,
            params![
                user_id,
                draft.title,
                draft.description,
                draft.subject,
                draft.task_type.as_str(),
                draft.priority.as_str(),
                draft.status.as_str(),
                datetime_sql(&draft.due_date),
                draft.estimated_duration,
                to_json(&draft.tags)?,
                now,
                draft.original_command,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_task(user_id, id)?
            .context("inserted task not found")
    }

    pub fn tasks_for_user(&self, user_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, user_id, title, description, subject, task_type, priority,
                            status, due_date, estimated_duration, tags, created_at,
                            updated_at, completed_at, original_command
                     FROM tasks WHERE user_id = ?1 AND status = ?2 ORDER BY due_date, id",
                )?;
                let rows = stmt.query_map(params![user_id, status.as_str()], map_task_row)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, user_id, title, description, subject, task_type, priority,
                            status, due_date, estimated_duration, tags, created_at,
                            updated_at, completed_at, original_command
                     FROM tasks WHERE user_id = ?1 ORDER BY due_date, id",
                )?;
                let rows = stmt.query_map(params![user_id], map_task_row)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
        }
        Ok(tasks)
    }

    pub fn get_task(&self, user_id: &str, id: i64) -> Result<Option<Task>> {
        self.conn
            .query_row(
                "SELECT id, user_id, title, description, subject, task_type, priority,
                        status, due_date, estimated_duration, tags, created_at,
                        updated_at, completed_at, original_command
                 FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                map_task_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Update a task's status. Completing stamps `completed_at`; any other
    /// status clears it.
    pub fn set_task_status(&self, user_id: &str, id: i64, status: TaskStatus) -> Result<bool> {
        let now = now_sql();
        let completed_at = (status == TaskStatus::Completed).then(|| now.clone());
        let affected = self.conn.execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2, completed_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![status.as_str(), now, completed_at, id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Apply a partial update. Returns the updated task, or `None` when no
    /// task with this id belongs to the user. A status change follows the
    /// same `completed_at` rules as `set_task_status`.
    pub fn update_task(
        &self,
        user_id: &str,
        id: i64,
        update: &TaskUpdate,
    ) -> Result<Option<Task>> {
        let Some(task) = self.get_task(user_id, id)? else {
            return Ok(None);
        };
        let status = update.status.unwrap_or(task.status);
        let completed_at = if status == TaskStatus::Completed {
            task.completed_at
                .map(|dt| datetime_sql(&dt))
                .or_else(|| Some(now_sql()))
        } else {
            None
        };
        self.conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, subject = ?3, task_type = ?4,
                    priority = ?5, status = ?6, due_date = ?7, estimated_duration = ?8,
                    tags = ?9, updated_at = ?10, completed_at = ?11
             WHERE id = ?12 AND user_id = ?13",
            params![
                update.title.as_deref().unwrap_or(&task.title),
                update.description.as_deref().or(task.description.as_deref()),
                update.subject.as_deref().unwrap_or(&task.subject),
                update.task_type.unwrap_or(task.task_type).as_str(),
                update.priority.unwrap_or(task.priority).as_str(),
                status.as_str(),
                datetime_sql(&update.due_date.unwrap_or(task.due_date)),
                update.estimated_duration.unwrap_or(task.estimated_duration),
                to_json(update.tags.as_ref().unwrap_or(&task.tags))?,
                now_sql(),
                completed_at,
                id,
                user_id,
            ],
        )?;
        self.get_task(user_id, id)
    }

    pub fn delete_task(&self, user_id: &str, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    // ===== Events =====

    pub fn insert_event(&self, user_id: &str, draft: &EventDraft) -> Result<Event> {
        self.conn.execute(
            r#"
            INSERT INTO events (user_id, title, description, event_type, start_time,
                                end_time, related_task, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                draft.title,
                draft.description,
                draft.event_type.as_str(),
                datetime_sql(&draft.start_time),
                datetime_sql(&draft.end_time),
                draft.related_task,
                now_sql(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_event(user_id, id)?
            .context("inserted event not found")
    }

    pub fn events_for_user(&self, user_id: &str) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, description, event_type, start_time, end_time,
                    related_task, created_at
             FROM events WHERE user_id = ?1 ORDER BY start_time, id",
        )?;
        let rows = stmt.query_map(params![user_id], map_event_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    pub fn get_event(&self, user_id: &str, id: i64) -> Result<Option<Event>> {
        self.conn
            .query_row(
                "SELECT id, user_id, title, description, event_type, start_time, end_time,
                        related_task, created_at
                 FROM events WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                map_event_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Apply a partial update. Returns the updated event, or `None` when no
    /// event with this id belongs to the user. Time-ordering validation is
    /// the caller's responsibility.
    pub fn update_event(
        &self,
        user_id: &str,
        id: i64,
        update: &EventUpdate,
    ) -> Result<Option<Event>> {
        let Some(event) = self.get_event(user_id, id)? else {
            return Ok(None);
        };
        self.conn.execute(
            "UPDATE events SET title = ?1, description = ?2, event_type = ?3,
                    start_time = ?4, end_time = ?5, related_task = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                update.title.as_deref().unwrap_or(&event.title),
                update.description.as_deref().or(event.description.as_deref()),
                update.event_type.unwrap_or(event.event_type).as_str(),
                datetime_sql(&update.start_time.unwrap_or(event.start_time)),
                datetime_sql(&update.end_time.unwrap_or(event.end_time)),
                update.related_task.or(event.related_task),
                id,
                user_id,
            ],
        )?;
        self.get_event(user_id, id)
    }

    pub fn delete_event(&self, user_id: &str, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM events WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    // ===== Study plans =====

    pub fn insert_plan(&self, user_id: &str, draft: &PlanDraft) -> Result<StudyPlan> {
        let now = now_sql();
        self.conn.execute(
            r#"
            INSERT INTO study_plans (user_id, title, duration, sessions, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                user_id,
                draft.title,
                draft.duration,
                to_json(&draft.sessions)?,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_plan(user_id, id)?
            .context("inserted plan not found")
    }

    pub fn plans_for_user(&self, user_id: &str) -> Result<Vec<StudyPlan>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, duration, sessions, created_at, updated_at
             FROM study_plans WHERE user_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![user_id], map_plan_row)?;
        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?);
        }
        Ok(plans)
    }

    pub fn get_plan(&self, user_id: &str, id: i64) -> Result<Option<StudyPlan>> {
        self.conn
            .query_row(
                "SELECT id, user_id, title, duration, sessions, created_at, updated_at
                 FROM study_plans WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                map_plan_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn delete_plan(&self, user_id: &str, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM study_plans WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    // ===== Status =====

    pub fn counts(&self, user_id: &str) -> Result<ResourceCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE user_id = ?1"),
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };
        Ok(ResourceCounts {
            notes: count("notes")?,
            tasks: count("tasks")?,
            events: count("events")?,
            plans: count("study_plans")?,
        })
    }

    /// Dashboard figures relative to `now`. Completed and cancelled tasks do
    /// not count toward today's due figure.
    pub fn dashboard(&self, user_id: &str, now: DateTime<Utc>) -> Result<Dashboard> {
        let day_start = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
        let day_end = day_start + Duration::days(1);
        let horizon = now + Duration::days(7);

        let tasks_due_today: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND due_date >= ?2 AND due_date < ?3
               AND status NOT IN ('completed', 'cancelled')",
            params![user_id, datetime_sql(&day_start), datetime_sql(&day_end)],
            |row| row.get(0),
        )?;
        let upcoming_events: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM events
             WHERE user_id = ?1 AND start_time >= ?2 AND start_time < ?3",
            params![user_id, datetime_sql(&now), datetime_sql(&horizon)],
            |row| row.get(0),
        )?;

        Ok(Dashboard {
            tasks_due_today: tasks_due_today as usize,
            upcoming_events: upcoming_events as usize,
        })
    }
}

impl NoteCorpus for Store {
    fn notes_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        Store::notes_for_user(self, user_id)
    }
}

// ===== Row mapping =====

fn map_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let explanation: String = row.get(5)?;
    let categories: String = row.get(7)?;
    let keywords: String = row.get(8)?;
    let importance: String = row.get(9)?;
    let tags: String = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    Ok(Note {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        transcript: row.get(3)?,
        summary: row.get(4)?,
        explanation: from_json(&explanation),
        subject: row.get(6)?,
        categories: from_json(&categories),
        keywords: from_json(&keywords),
        importance: importance.parse::<Importance>().unwrap_or_default(),
        tags: from_json(&tags),
        created_at: datetime_from_sql(&created_at),
        updated_at: datetime_from_sql(&updated_at),
    })
}

fn map_task_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let task_type: String = row.get(5)?;
    let priority: String = row.get(6)?;
    let status: String = row.get(7)?;
    let due_date: String = row.get(8)?;
    let tags: String = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    let completed_at: Option<String> = row.get(13)?;
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        subject: row.get(4)?,
        task_type: task_type.parse::<TaskType>().unwrap_or_default(),
        priority: priority.parse::<Priority>().unwrap_or_default(),
        status: status.parse::<TaskStatus>().unwrap_or_default(),
        due_date: datetime_from_sql(&due_date),
        estimated_duration: row.get(9)?,
        tags: from_json(&tags),
        created_at: datetime_from_sql(&created_at),
        updated_at: datetime_from_sql(&updated_at),
        completed_at: completed_at.as_deref().map(datetime_from_sql),
        original_command: row.get(14)?,
    })
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let event_type: String = row.get(4)?;
    let start_time: String = row.get(5)?;
    let end_time: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        event_type: event_type.parse::<EventType>().unwrap_or_default(),
        start_time: datetime_from_sql(&start_time),
        end_time: datetime_from_sql(&end_time),
        related_task: row.get(7)?,
        created_at: datetime_from_sql(&created_at),
    })
}

fn map_plan_row(row: &Row<'_>) -> rusqlite::Result<StudyPlan> {
    let sessions: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    let sessions: Vec<StudySession> = serde_json::from_str(&sessions).unwrap_or_default();
    Ok(StudyPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        duration: row.get(3)?,
        sessions,
        created_at: datetime_from_sql(&created_at),
        updated_at: datetime_from_sql(&updated_at),
    })
}

// ===== SQL value helpers =====

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

fn from_json(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Fixed-width RFC 3339 so lexicographic ORDER BY matches chronological
/// order.
fn now_sql() -> String {
    datetime_sql(&Utc::now())
}

fn datetime_sql(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn datetime_from_sql(s: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(value = s, error = %e, "unparseable stored timestamp");
            DateTime::<Utc>::MIN_UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_draft(title: &str, summary: Option<&str>) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            summary: summary.map(String::from),
            subject: "Math".to_string(),
            tags: vec!["test".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn note_round_trip() -> Result<()> {
        let store = Store::open_in_memory()?;
        let draft = NoteDraft {
            title: "Calculus".to_string(),
            transcript: Some("full lecture text".to_string()),
            summary: Some("Review calculus chapters 1-3".to_string()),
            explanation: vec!["limits".to_string(), "derivatives".to_string()],
            subject: "Math".to_string(),
            categories: vec!["General".to_string()],
            keywords: vec!["calculus".to_string()],
            importance: Importance::High,
            tags: vec!["exam".to_string()],
        };
        let note = store.insert_note("u1", &draft)?;
        assert!(note.id > 0);

        let fetched = store.get_note("u1", note.id)?.unwrap();
        assert_eq!(fetched.title, "Calculus");
        assert_eq!(fetched.explanation.len(), 2);
        assert_eq!(fetched.importance, Importance::High);
        assert_eq!(fetched.summary.as_deref(), Some("Review calculus chapters 1-3"));

        // scoped to the owning user
        assert!(store.get_note("u2", note.id)?.is_none());

        assert!(store.delete_note("u1", note.id)?);
        assert!(store.get_note("u1", note.id)?.is_none());
        Ok(())
    }

    #[test]
    fn notes_for_user_orders_by_creation() -> Result<()> {
        let store = Store::open_in_memory()?;
        let first = store.insert_note("u1", &note_draft("first", Some("a")))?;
        let second = store.insert_note("u1", &note_draft("second", Some("b")))?;
        let third = store.insert_note("u1", &note_draft("third", None))?;
        store.insert_note("u2", &note_draft("other user", Some("c")))?;

        let notes = store.notes_for_user("u1")?;
        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
        // summary-less notes are stored and listed; exclusion is the
        // search engine's job
        assert!(notes[2].summary.is_none());
        Ok(())
    }

    #[test]
    fn task_lifecycle() -> Result<()> {
        let store = Store::open_in_memory()?;
        let draft = TaskDraft {
            title: "Write report".to_string(),
            description: None,
            subject: "CS".to_string(),
            task_type: TaskType::Project,
            priority: Priority::High,
            status: TaskStatus::Pending,
            due_date: Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap(),
            estimated_duration: 90,
            tags: vec![],
            original_command: Some("write the cs report".to_string()),
        };
        let task = store.insert_task("u1", &draft)?;
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        assert_eq!(task.due_date, draft.due_date);

        assert!(store.set_task_status("u1", task.id, TaskStatus::Completed)?);
        let done = store.get_task("u1", task.id)?.unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.completed_at.is_some());

        assert!(store.set_task_status("u1", task.id, TaskStatus::InProgress)?);
        let reopened = store.get_task("u1", task.id)?.unwrap();
        assert!(reopened.completed_at.is_none());

        let pending = store.tasks_for_user("u1", Some(TaskStatus::Pending))?;
        assert!(pending.is_empty());
        let all = store.tasks_for_user("u1", None)?;
        assert_eq!(all.len(), 1);

        assert!(store.delete_task("u1", task.id)?);
        assert!(!store.delete_task("u1", task.id)?);
        Ok(())
    }

    #[test]
    fn task_update_applies_partial_fields() -> Result<()> {
        let store = Store::open_in_memory()?;
        let draft = TaskDraft {
            title: "Draft essay".to_string(),
            description: Some("first pass".to_string()),
            subject: "History".to_string(),
            task_type: TaskType::Assignment,
            priority: Priority::Low,
            status: TaskStatus::Pending,
            due_date: Utc.with_ymd_and_hms(2026, 9, 3, 12, 0, 0).unwrap(),
            estimated_duration: 45,
            tags: vec!["essay".to_string()],
            original_command: None,
        };
        let task = store.insert_task("u1", &draft)?;

        let updated = store
            .update_task(
                "u1",
                task.id,
                &TaskUpdate {
                    priority: Some(Priority::High),
                    due_date: Some(Utc.with_ymd_and_hms(2026, 9, 5, 12, 0, 0).unwrap()),
                    ..Default::default()
                },
            )?
            .unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(
            updated.due_date,
            Utc.with_ymd_and_hms(2026, 9, 5, 12, 0, 0).unwrap()
        );
        // untouched fields survive
        assert_eq!(updated.title, "Draft essay");
        assert_eq!(updated.description.as_deref(), Some("first pass"));
        assert_eq!(updated.tags, vec!["essay".to_string()]);
        assert_eq!(updated.status, TaskStatus::Pending);
        assert!(updated.completed_at.is_none());

        // status changes follow the completed_at rules
        let done = store
            .update_task(
                "u1",
                task.id,
                &TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )?
            .unwrap();
        assert!(done.completed_at.is_some());
        let reopened = store
            .update_task(
                "u1",
                task.id,
                &TaskUpdate {
                    status: Some(TaskStatus::Pending),
                    ..Default::default()
                },
            )?
            .unwrap();
        assert!(reopened.completed_at.is_none());

        // scoped to the owning user
        assert!(store
            .update_task("u2", task.id, &TaskUpdate::default())?
            .is_none());
        assert!(store.update_task("u1", 9999, &TaskUpdate::default())?.is_none());
        Ok(())
    }

    #[test]
    fn event_update_applies_partial_fields() -> Result<()> {
        let store = Store::open_in_memory()?;
        let draft = EventDraft {
            title: "Study group".to_string(),
            description: None,
            event_type: EventType::StudySession,
            start_time: Utc.with_ymd_and_hms(2026, 9, 2, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 9, 2, 12, 0, 0).unwrap(),
            related_task: None,
        };
        let event = store.insert_event("u1", &draft)?;

        let updated = store
            .update_event(
                "u1",
                event.id,
                &EventUpdate {
                    title: Some("Exam review".to_string()),
                    end_time: Some(Utc.with_ymd_and_hms(2026, 9, 2, 13, 0, 0).unwrap()),
                    ..Default::default()
                },
            )?
            .unwrap();
        assert_eq!(updated.title, "Exam review");
        assert_eq!(updated.start_time, draft.start_time);
        assert_eq!(
            updated.end_time,
            Utc.with_ymd_and_hms(2026, 9, 2, 13, 0, 0).unwrap()
        );
        assert_eq!(updated.event_type, EventType::StudySession);

        assert!(store
            .update_event("u1", 9999, &EventUpdate::default())?
            .is_none());
        Ok(())
    }

    #[test]
    fn event_round_trip() -> Result<()> {
        let store = Store::open_in_memory()?;
        let draft = EventDraft {
            title: "Math Exam Review".to_string(),
            description: Some("chapters 1-3".to_string()),
            event_type: EventType::StudySession,
            start_time: Utc.with_ymd_and_hms(2026, 9, 2, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 9, 2, 12, 0, 0).unwrap(),
            related_task: None,
        };
        let event = store.insert_event("u1", &draft)?;
        assert_eq!(event.event_type, EventType::StudySession);
        assert_eq!(event.start_time, draft.start_time);

        let events = store.events_for_user("u1")?;
        assert_eq!(events.len(), 1);

        assert!(store.delete_event("u1", event.id)?);
        assert!(store.events_for_user("u1")?.is_empty());
        Ok(())
    }

    #[test]
    fn plan_round_trip() -> Result<()> {
        let store = Store::open_in_memory()?;
        let draft = PlanDraft {
            title: "Python Final Exam Review".to_string(),
            duration: "4 days".to_string(),
            sessions: vec![StudySession {
                subject: "Python OOP".to_string(),
                date: chrono::NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
                goal: "classes and inheritance".to_string(),
            }],
        };
        let plan = store.insert_plan("u1", &draft)?;
        let fetched = store.get_plan("u1", plan.id)?.unwrap();
        assert_eq!(fetched.sessions.len(), 1);
        assert_eq!(fetched.sessions[0].subject, "Python OOP");

        assert!(store.delete_plan("u1", plan.id)?);
        Ok(())
    }

    #[test]
    fn store_backs_the_search_engine() -> Result<()> {
        use crate::search::{Embedder, SearchEngine, SearchError};

        // keyword-axis embedder: enough to rank related notes above
        // unrelated ones without a real model
        struct KeywordEmbedder;

        impl Embedder for KeywordEmbedder {
            fn encode(&mut self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, SearchError> {
                Ok(texts
                    .iter()
                    .map(|t| {
                        if t.to_lowercase().contains("calculus") {
                            vec![1.0, 0.0, 0.0]
                        } else if t.to_lowercase().contains("budget") {
                            vec![0.0, 1.0, 0.0]
                        } else {
                            vec![0.0, 0.0, 1.0]
                        }
                    })
                    .collect())
            }
        }

        let store = Store::open_in_memory()?;
        store.insert_note("u1", &note_draft("math", Some("Review calculus chapters 1-3")))?;
        store.insert_note(
            "u1",
            &note_draft("work", Some("Team meeting notes about quarterly budget")),
        )?;
        store.insert_note("u1", &note_draft("empty", None))?;

        let mut engine = SearchEngine::new(KeywordEmbedder);
        let results = engine.search(&store, "u1", "calculus exam prep", 0.0)?;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].note.title, "math");
        assert!(results[0].score > results[1].score);

        // unknown user has no corpus
        let results = engine.search(&store, "nobody", "calculus", 0.0)?;
        assert!(results.is_empty());
        Ok(())
    }

    #[test]
    fn dashboard_counts_due_today_and_upcoming() -> Result<()> {
        let store = Store::open_in_memory()?;
        let now = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let task = |due, status| TaskDraft {
            title: "t".to_string(),
            description: None,
            subject: "Math".to_string(),
            task_type: TaskType::Assignment,
            priority: Priority::Medium,
            status,
            due_date: due,
            estimated_duration: 60,
            tags: vec![],
            original_command: None,
        };
        // due today, open: counts
        store.insert_task(
            "u1",
            &task(
                Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
                TaskStatus::Pending,
            ),
        )?;
        // due later this week: not today's figure
        store.insert_task(
            "u1",
            &task(
                Utc.with_ymd_and_hms(2026, 9, 5, 9, 0, 0).unwrap(),
                TaskStatus::Pending,
            ),
        )?;
        // due today but already completed: excluded
        store.insert_task(
            "u1",
            &task(
                Utc.with_ymd_and_hms(2026, 9, 1, 20, 0, 0).unwrap(),
                TaskStatus::Completed,
            ),
        )?;

        let event = |start: DateTime<Utc>| EventDraft {
            title: "e".to_string(),
            description: None,
            event_type: EventType::StudySession,
            start_time: start,
            end_time: start + Duration::hours(1),
            related_task: None,
        };
        // within the next seven days: counts
        store.insert_event(
            "u1",
            &event(Utc.with_ymd_and_hms(2026, 9, 3, 10, 0, 0).unwrap()),
        )?;
        // beyond the horizon: excluded
        store.insert_event(
            "u1",
            &event(Utc.with_ymd_and_hms(2026, 10, 1, 10, 0, 0).unwrap()),
        )?;
        // already started: excluded
        store.insert_event(
            "u1",
            &event(Utc.with_ymd_and_hms(2026, 8, 30, 10, 0, 0).unwrap()),
        )?;

        let dash = store.dashboard("u1", now)?;
        assert_eq!(dash.tasks_due_today, 1);
        assert_eq!(dash.upcoming_events, 1);

        let empty = store.dashboard("u2", now)?;
        assert_eq!(empty.tasks_due_today, 0);
        assert_eq!(empty.upcoming_events, 0);
        Ok(())
    }

    #[test]
    fn unparseable_timestamps_fall_back_to_minimum() {
        assert_eq!(datetime_from_sql("not a date"), DateTime::<Utc>::MIN_UTC);
        assert_eq!(
            datetime_from_sql("2026-08-29T10:00:00.000000Z"),
            Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn counts_are_per_user() -> Result<()> {
        let store = Store::open_in_memory()?;
        store.insert_note("u1", &note_draft("a", Some("x")))?;
        store.insert_note("u1", &note_draft("b", None))?;
        store.insert_note("u2", &note_draft("c", Some("y")))?;

        let counts = store.counts("u1")?;
        assert_eq!(counts.notes, 2);
        assert_eq!(counts.tasks, 0);
        assert_eq!(counts.events, 0);
        assert_eq!(counts.plans, 0);
        Ok(())
    }
}
