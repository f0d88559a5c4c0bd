//! Search error taxonomy
//!
//! Failures in the search core's dependencies propagate to the caller as a
//! typed error; nothing is caught and suppressed. An empty corpus is not an
//! error and yields an empty result list instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The embedding model or tokenizer could not be loaded. Fatal at
    /// startup, not per-request.
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tokenization or inference failed for a non-empty input.
    #[error("failed to encode text: {0}")]
    Encoding(String),

    /// The note corpus could not be fetched.
    #[error("note corpus unavailable")]
    CorpusUnavailable(#[source] anyhow::Error),

    /// Empty or whitespace-only query, rejected before the engine runs.
    #[error("query must not be empty")]
    InvalidQuery,
}
