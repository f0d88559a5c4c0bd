//! Study plan commands: create, list, show, delete

use anyhow::{bail, Result};
use colored::Colorize;

use super::{format_datetime, open_store};
use crate::llm::LlmClient;

/// Generate a study plan from a free-text description via the LLM and
/// store it.
pub fn create(user: &str, description: &str, json: bool) -> Result<()> {
    if description.trim().is_empty() {
        bail!("plan description cannot be empty");
    }
    let client = LlmClient::from_env()?;
    let draft = client.generate_plan(description)?;

    let store = open_store()?;
    let plan = store.insert_plan(user, &draft)?;
    tracing::info!(id = plan.id, sessions = plan.sessions.len(), "plan created");

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!(
            "{} Created plan {} {} ({}, {} sessions)",
            "✓".green(),
            format!("#{}", plan.id).bold(),
            plan.title.cyan(),
            plan.duration,
            plan.sessions.len()
        );
    }
    Ok(())
}

pub fn list(user: &str, json: bool) -> Result<()> {
    let store = open_store()?;
    let plans = store.plans_for_user(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    if plans.is_empty() {
        println!("{} No study plans", "→".dimmed());
        return Ok(());
    }

    for plan in &plans {
        println!(
            "{} {} ({}, {} sessions) {}",
            format!("#{}", plan.id).bold(),
            plan.title.cyan(),
            plan.duration,
            plan.sessions.len(),
            format_datetime(&plan.created_at).dimmed()
        );
    }
    Ok(())
}

pub fn show(user: &str, id: i64, json: bool) -> Result<()> {
    let store = open_store()?;
    let Some(plan) = store.get_plan(user, id)? else {
        bail!("study plan #{id} not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        format!("#{}", plan.id).bold(),
        plan.title.cyan(),
        plan.duration
    );
    for session in &plan.sessions {
        println!(
            "  {} {}: {}",
            session.date.to_string().bold(),
            session.subject,
            session.goal.dimmed()
        );
    }
    Ok(())
}

pub fn delete(user: &str, id: i64) -> Result<()> {
    let store = open_store()?;
    if !store.delete_plan(user, id)? {
        bail!("study plan #{id} not found");
    }
    println!("{} Deleted study plan #{id}", "✓".green());
    Ok(())
}
