//! Semantic search command

use anyhow::{bail, Result};
use colored::Colorize;

use super::open_store;
use crate::core::config::DataPaths;
use crate::search::{SearchEngine, SearchError, SearchResult, TextEncoder};

pub const DEFAULT_THRESHOLD: f32 = 0.2;

/// Run a semantic search over the user's notes.
///
/// Query validation happens here, before the engine is invoked; the engine
/// itself never sees an empty query.
pub fn run(user: &str, query: &str, threshold: f32, limit: Option<usize>, json: bool) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidQuery.into());
    }
    if !(0.0..=1.0).contains(&threshold) {
        bail!("threshold must be between 0 and 1");
    }

    let paths = DataPaths::resolve()?;
    let store = open_store()?;
    let encoder = TextEncoder::load(&paths.model_dir())?;
    let mut engine = SearchEngine::new(encoder);

    let mut results = engine.search(&store, user, query, threshold)?;
    if let Some(limit) = limit {
        results.truncate(limit);
    }

    if json {
        print_json(query, threshold, &results)?;
    } else {
        print_pretty(query, &results);
    }
    Ok(())
}

fn print_json(query: &str, threshold: f32, results: &[SearchResult]) -> Result<()> {
    let body = serde_json::json!({
        "query": query,
        "threshold": threshold,
        "count": results.len(),
        "results": results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.note.id,
                    "title": r.note.title,
                    "subject": r.note.subject,
                    "summary": r.note.summary,
                    "importance": r.note.importance,
                    "similarity": r.score,
                    "created_at": r.note.created_at,
                    "keywords": r.note.keywords,
                    "tags": r.note.tags,
                })
            })
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_pretty(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return;
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        let score_str = format!("{:.2}", result.score);
        let score_colored = if result.score > 0.8 {
            score_str.green()
        } else if result.score > 0.5 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };

        println!(
            "{}. [{}] {}",
            (i + 1).to_string().bold(),
            score_colored,
            result.note.title.cyan()
        );

        if let Some(ref summary) = result.note.summary {
            // char-aware truncation for display
            let display = if summary.chars().count() > 100 {
                format!("{}...", summary.chars().take(100).collect::<String>())
            } else {
                summary.clone()
            };
            println!("   {}", display.dimmed());
        }
        println!("   {} | {}", result.note.subject, result.note.importance);
        println!();
    }
}
