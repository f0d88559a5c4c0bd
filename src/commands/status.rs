//! Status command: per-user resource counts

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use super::open_store;
use crate::core::config::DataPaths;

pub fn run(user: &str, json: bool) -> Result<()> {
    let paths = DataPaths::resolve()?;
    let store = open_store()?;
    let counts = store.counts(user)?;
    let dashboard = store.dashboard(user, Utc::now())?;
    let model_available = paths.model_dir().join("model.onnx").exists();

    if json {
        let body = serde_json::json!({
            "user": user,
            "counts": counts,
            "dashboard": dashboard,
            "semantic_search_available": model_available,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", format!("studydesk status for {user}").bold());
    println!("  notes:       {}", counts.notes);
    println!("  tasks:       {}", counts.tasks);
    println!("  events:      {}", counts.events);
    println!("  study plans: {}", counts.plans);
    println!("  due today:       {}", dashboard.tasks_due_today);
    println!("  upcoming events: {}", dashboard.upcoming_events);
    if model_available {
        println!("  semantic search: {}", "available".green());
    } else {
        println!(
            "  semantic search: {} (model not found at {})",
            "unavailable".yellow(),
            paths.model_dir().display()
        );
    }
    Ok(())
}
