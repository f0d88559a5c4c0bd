//! Event commands: add, list, show, delete

use anyhow::{bail, Result};
use colored::Colorize;

use super::{format_datetime, open_store, parse_datetime_arg};
use crate::core::event::{EventDraft, EventType, EventUpdate};
use crate::llm::LlmClient;

/// Arguments for creating an event by hand (without the LLM).
pub struct ManualEvent<'a> {
    pub title: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub description: Option<&'a str>,
    pub event_type: EventType,
    pub related_task: Option<i64>,
}

/// Create an event from a free-text description via the LLM.
pub fn add_from_text(user: &str, description: &str, json: bool) -> Result<()> {
    if description.trim().is_empty() {
        bail!("event description cannot be empty");
    }
    let client = LlmClient::from_env()?;
    let draft = client.generate_event(description)?;
    insert_and_print(user, &draft, json)
}

/// Create an event from explicit fields.
pub fn add_manual(user: &str, args: ManualEvent<'_>, json: bool) -> Result<()> {
    let start_time = parse_datetime_arg(args.start)?;
    let end_time = parse_datetime_arg(args.end)?;
    if end_time <= start_time {
        bail!("event end time must be after its start time");
    }
    let draft = EventDraft {
        title: args.title.to_string(),
        description: args.description.map(String::from),
        event_type: args.event_type,
        start_time,
        end_time,
        related_task: args.related_task,
    };
    insert_and_print(user, &draft, json)
}

fn insert_and_print(user: &str, draft: &EventDraft, json: bool) -> Result<()> {
    let store = open_store()?;
    if let Some(task_id) = draft.related_task {
        if store.get_task(user, task_id)?.is_none() {
            bail!("related task #{task_id} not found");
        }
    }
    let event = store.insert_event(user, draft)?;
    tracing::info!(id = event.id, "event created");

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!(
            "{} Created event {} {} ({} - {})",
            "✓".green(),
            format!("#{}", event.id).bold(),
            event.title.cyan(),
            format_datetime(&event.start_time),
            format_datetime(&event.end_time)
        );
    }
    Ok(())
}

/// Optional field overrides for `event edit`.
#[derive(Default)]
pub struct EventEditArgs<'a> {
    pub title: Option<&'a str>,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub description: Option<&'a str>,
    pub event_type: Option<EventType>,
    pub related_task: Option<i64>,
}

/// Update any subset of an event's fields. The effective start/end pair is
/// validated after merging with the stored values.
pub fn edit(user: &str, id: i64, args: EventEditArgs<'_>, json: bool) -> Result<()> {
    let update = EventUpdate {
        title: args.title.map(String::from),
        description: args.description.map(String::from),
        event_type: args.event_type,
        start_time: args.start.map(parse_datetime_arg).transpose()?,
        end_time: args.end.map(parse_datetime_arg).transpose()?,
        related_task: args.related_task,
    };
    if update.is_empty() {
        bail!("nothing to update: pass at least one field");
    }

    let store = open_store()?;
    let Some(current) = store.get_event(user, id)? else {
        bail!("event #{id} not found");
    };
    let start = update.start_time.unwrap_or(current.start_time);
    let end = update.end_time.unwrap_or(current.end_time);
    if end <= start {
        bail!("event end time must be after its start time");
    }
    if let Some(task_id) = update.related_task {
        if store.get_task(user, task_id)?.is_none() {
            bail!("related task #{task_id} not found");
        }
    }

    let Some(event) = store.update_event(user, id, &update)? else {
        bail!("event #{id} not found");
    };
    tracing::info!(id = event.id, "event updated");

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!(
            "{} Updated event {} {} ({} - {})",
            "✓".green(),
            format!("#{}", event.id).bold(),
            event.title.cyan(),
            format_datetime(&event.start_time),
            format_datetime(&event.end_time)
        );
    }
    Ok(())
}

pub fn list(user: &str, json: bool) -> Result<()> {
    let store = open_store()?;
    let events = store.events_for_user(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{} No events", "→".dimmed());
        return Ok(());
    }

    for event in &events {
        println!(
            "{} [{}] {} ({} - {})",
            format!("#{}", event.id).bold(),
            event.event_type,
            event.title.cyan(),
            format_datetime(&event.start_time),
            format_datetime(&event.end_time)
        );
    }
    Ok(())
}

pub fn show(user: &str, id: i64, json: bool) -> Result<()> {
    let store = open_store()?;
    let Some(event) = store.get_event(user, id)? else {
        bail!("event #{id} not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
        return Ok(());
    }

    println!("{} {}", format!("#{}", event.id).bold(), event.title.cyan());
    println!("  type: {}", event.event_type);
    if let Some(ref description) = event.description {
        println!("  {description}");
    }
    println!(
        "  {} - {}",
        format_datetime(&event.start_time),
        format_datetime(&event.end_time)
    );
    if let Some(task_id) = event.related_task {
        println!("  related task: #{task_id}");
    }
    Ok(())
}

pub fn delete(user: &str, id: i64) -> Result<()> {
    let store = open_store()?;
    if !store.delete_event(user, id)? {
        bail!("event #{id} not found");
    }
    println!("{} Deleted event #{id}", "✓".green());
    Ok(())
}
