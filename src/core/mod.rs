//! Core domain model: notes, tasks, events, and study plans.

pub mod config;
pub mod event;
pub mod note;
pub mod plan;
pub mod task;
