//! studydesk library
//!
//! Student productivity backend: notes, tasks, events, and study plans over
//! SQLite, with LLM-backed object generation and semantic note search.
//!
//! # Modules
//!
//! - `core`: domain model and data directory layout
//! - `store`: SQLite persistence (implements the search engine's corpus)
//! - `search`: text encoder, similarity scorer, and note search engine
//! - `llm`: free-text to structured object generation
//! - `commands`: CLI command implementations

pub mod commands;
pub mod core;
pub mod llm;
pub mod search;
pub mod store;

// Re-exports for convenience
pub use core::config::DataPaths;
pub use core::event::Event;
pub use core::note::Note;
pub use core::plan::StudyPlan;
pub use core::task::Task;
pub use search::{NoteCorpus, SearchEngine, SearchError, SearchResult, TextEncoder};
pub use store::Store;
