//! Task commands: add, list, show, complete, delete

use anyhow::{bail, Result};
use colored::Colorize;

use super::{format_datetime, open_store, parse_datetime_arg};
use crate::core::task::{Priority, Task, TaskDraft, TaskStatus, TaskType, TaskUpdate};
use crate::llm::LlmClient;

/// Arguments for creating a task by hand (without the LLM).
pub struct ManualTask<'a> {
    pub title: &'a str,
    pub subject: &'a str,
    pub due: &'a str,
    pub description: Option<&'a str>,
    pub task_type: TaskType,
    pub priority: Priority,
    pub duration: i64,
    pub tags: Vec<String>,
}

/// Create a task from a free-text description via the LLM.
pub fn add_from_text(user: &str, description: &str, json: bool) -> Result<()> {
    if description.trim().is_empty() {
        bail!("task description cannot be empty");
    }
    let client = LlmClient::from_env()?;
    let mut draft = client.generate_task(description)?;
    if draft.original_command.is_none() {
        draft.original_command = Some(description.to_string());
    }
    insert_and_print(user, &draft, json)
}

/// Create a task from explicit fields.
pub fn add_manual(user: &str, args: ManualTask<'_>, json: bool) -> Result<()> {
    let draft = TaskDraft {
        title: args.title.to_string(),
        description: args.description.map(String::from),
        subject: args.subject.to_string(),
        task_type: args.task_type,
        priority: args.priority,
        status: TaskStatus::Pending,
        due_date: parse_datetime_arg(args.due)?,
        estimated_duration: args.duration,
        tags: args.tags,
        original_command: None,
    };
    insert_and_print(user, &draft, json)
}

fn insert_and_print(user: &str, draft: &TaskDraft, json: bool) -> Result<()> {
    let store = open_store()?;
    let task = store.insert_task(user, draft)?;
    tracing::info!(id = task.id, "task created");

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!(
            "{} Created task {} {} (due {})",
            "✓".green(),
            format!("#{}", task.id).bold(),
            task.title.cyan(),
            format_datetime(&task.due_date)
        );
    }
    Ok(())
}

/// Optional field overrides for `task update`.
#[derive(Default)]
pub struct TaskUpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub subject: Option<&'a str>,
    pub due: Option<&'a str>,
    pub description: Option<&'a str>,
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub duration: Option<i64>,
    pub tags: Option<Vec<String>>,
}

/// Update any subset of a task's fields.
pub fn update(user: &str, id: i64, args: TaskUpdateArgs<'_>, json: bool) -> Result<()> {
    let update = TaskUpdate {
        title: args.title.map(String::from),
        description: args.description.map(String::from),
        subject: args.subject.map(String::from),
        task_type: args.task_type,
        priority: args.priority,
        status: args.status,
        due_date: args.due.map(parse_datetime_arg).transpose()?,
        estimated_duration: args.duration,
        tags: args.tags,
    };
    if update.is_empty() {
        bail!("nothing to update: pass at least one field");
    }

    let store = open_store()?;
    let Some(task) = store.update_task(user, id, &update)? else {
        bail!("task #{id} not found");
    };
    tracing::info!(id = task.id, "task updated");

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!(
            "{} Updated task {} {} (due {}, {})",
            "✓".green(),
            format!("#{}", task.id).bold(),
            task.title.cyan(),
            format_datetime(&task.due_date),
            status_colored(&task)
        );
    }
    Ok(())
}

pub fn list(user: &str, status: Option<TaskStatus>, json: bool) -> Result<()> {
    let store = open_store()?;
    let tasks = store.tasks_for_user(user, status)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("{} No tasks", "→".dimmed());
        return Ok(());
    }

    for task in &tasks {
        println!(
            "{} [{}] {} {} (due {}, {})",
            format!("#{}", task.id).bold(),
            status_colored(task),
            task.title.cyan(),
            format!("[{}]", task.priority).dimmed(),
            format_datetime(&task.due_date),
            task.subject
        );
    }
    Ok(())
}

pub fn show(user: &str, id: i64, json: bool) -> Result<()> {
    let store = open_store()?;
    let Some(task) = store.get_task(user, id)? else {
        bail!("task #{id} not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    println!("{} {}", format!("#{}", task.id).bold(), task.title.cyan());
    println!(
        "  {} | {} | priority: {} | status: {}",
        task.subject, task.task_type, task.priority, task.status
    );
    if let Some(ref description) = task.description {
        println!("  {description}");
    }
    println!(
        "  due: {} | estimated: {} min",
        format_datetime(&task.due_date),
        task.estimated_duration
    );
    if let Some(ref completed) = task.completed_at {
        println!("  completed: {}", format_datetime(completed).green());
    }
    if !task.tags.is_empty() {
        println!("  tags: {}", task.tags.join(", ").dimmed());
    }
    Ok(())
}

pub fn complete(user: &str, id: i64) -> Result<()> {
    let store = open_store()?;
    if !store.set_task_status(user, id, TaskStatus::Completed)? {
        bail!("task #{id} not found");
    }
    println!("{} Completed task #{id}", "✓".green());
    Ok(())
}

pub fn delete(user: &str, id: i64) -> Result<()> {
    let store = open_store()?;
    if !store.delete_task(user, id)? {
        bail!("task #{id} not found");
    }
    println!("{} Deleted task #{id}", "✓".green());
    Ok(())
}

fn status_colored(task: &Task) -> colored::ColoredString {
    match task.status {
        TaskStatus::Pending => task.status.as_str().yellow(),
        TaskStatus::InProgress => task.status.as_str().cyan(),
        TaskStatus::Completed => task.status.as_str().green(),
        TaskStatus::Cancelled => task.status.as_str().dimmed(),
    }
}
