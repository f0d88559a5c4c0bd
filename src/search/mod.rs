//! Semantic note search
//!
//! Encodes a query and the summaries of a user's notes with a fixed
//! sentence-embedding model, scores by cosine similarity, and ranks.

pub mod encoder;
pub mod engine;
pub mod error;
pub mod similarity;

pub use encoder::{Embedder, TextEncoder, EMBEDDING_DIM};
pub use engine::{NoteCorpus, SearchEngine, SearchResult};
pub use error::SearchError;
