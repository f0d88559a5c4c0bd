//! Note commands: add, list, show, delete

use anyhow::{bail, Result};
use colored::Colorize;

use super::{format_datetime, open_store};
use crate::core::note::{Note, NoteDraft};
use crate::llm::{chunk_text, LlmClient};

const CHUNK_SIZE: usize = 1000;

/// Create a note. With `--summary` the note is stored as given; with
/// `--text` the summary, explanations, and metadata are generated by the
/// LLM from the raw text.
pub fn add(
    user: &str,
    title: &str,
    subject: &str,
    text: Option<&str>,
    summary: Option<&str>,
    tags: Vec<String>,
    json: bool,
) -> Result<()> {
    let draft = match (summary, text) {
        (Some(summary), _) => NoteDraft {
            title: title.to_string(),
            transcript: text.map(String::from),
            summary: Some(summary.to_string()),
            subject: subject.to_string(),
            tags,
            ..Default::default()
        },
        (None, Some(text)) => {
            if text.trim().is_empty() {
                bail!("text content cannot be empty");
            }
            let client = LlmClient::from_env()?;
            let chunks = chunk_text(text, CHUNK_SIZE);
            let generated = client.summarize(&chunks)?;
            let metadata = client.tag_summary(&generated.summary)?;
            let mut merged_tags = metadata.tags;
            merged_tags.extend(tags);
            NoteDraft {
                title: title.to_string(),
                transcript: Some(chunks.join(", ")),
                summary: Some(generated.summary),
                explanation: generated.explanation,
                subject: subject.to_string(),
                categories: metadata.categories,
                keywords: metadata.keywords,
                importance: metadata.importance,
                tags: merged_tags,
            }
        }
        (None, None) => bail!("provide either --summary or --text"),
    };

    let store = open_store()?;
    let note = store.insert_note(user, &draft)?;
    tracing::info!(id = note.id, "note created");

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!(
            "{} Created note {} {}",
            "✓".green(),
            format!("#{}", note.id).bold(),
            note.title.cyan()
        );
        if note.embeddable_summary().is_none() {
            println!(
                "   {}",
                "no summary - this note will not appear in semantic search".yellow()
            );
        }
    }
    Ok(())
}

pub fn list(user: &str, json: bool) -> Result<()> {
    let store = open_store()?;
    let notes = store.notes_for_user(user)?;

    if json {
        let listing: Vec<_> = notes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "id": n.id,
                    "title": n.title,
                    "subject": n.subject,
                    "importance": n.importance,
                    "created_at": n.created_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("{} No notes yet", "→".dimmed());
        return Ok(());
    }

    for note in &notes {
        println!(
            "{} {} [{} | {}] {}",
            format!("#{}", note.id).bold(),
            note.title.cyan(),
            note.subject,
            note.importance,
            format_datetime(&note.created_at).dimmed()
        );
    }
    Ok(())
}

pub fn show(user: &str, id: i64, json: bool) -> Result<()> {
    let store = open_store()?;
    let Some(note) = store.get_note(user, id)? else {
        bail!("note #{id} not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }

    print_note(&note);
    Ok(())
}

pub fn delete(user: &str, id: i64) -> Result<()> {
    let store = open_store()?;
    if !store.delete_note(user, id)? {
        bail!("note #{id} not found");
    }
    println!("{} Deleted note #{id}", "✓".green());
    Ok(())
}

fn print_note(note: &Note) {
    println!("{} {}", format!("#{}", note.id).bold(), note.title.cyan());
    println!("  subject: {} | importance: {}", note.subject, note.importance);
    if let Some(ref summary) = note.summary {
        println!("  {}", summary);
    }
    for bullet in &note.explanation {
        println!("  • {bullet}");
    }
    if !note.tags.is_empty() {
        println!("  tags: {}", note.tags.join(", ").dimmed());
    }
    if !note.keywords.is_empty() {
        println!("  keywords: {}", note.keywords.join(", ").dimmed());
    }
    println!("  created: {}", format_datetime(&note.created_at).dimmed());
}
