//! Note search engine
//!
//! Ranks a user's notes by semantic relevance to a free-text query. The
//! engine owns no state besides the encoder handed to it at construction;
//! notes are borrowed from the corpus for the duration of one call and
//! embeddings are recomputed per call, never persisted.

use std::cmp::Ordering;

use serde::Serialize;

use super::encoder::Embedder;
use super::error::SearchError;
use super::similarity::dot;
use crate::core::note::Note;

/// Source of a user's notes. Implemented by the SQLite store; tests supply
/// in-memory corpora.
pub trait NoteCorpus {
    fn notes_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Note>>;
}

/// One ranked note. Constructed per search call and returned to the caller;
/// the score is the raw cosine similarity of query and summary embeddings,
/// so it lands in [-1, 1] and in practice in [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub note: Note,
    pub score: f32,
}

/// Search engine over a loaded embedding model.
pub struct SearchEngine<E> {
    embedder: E,
}

impl<E: Embedder> SearchEngine<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Rank `user_id`'s notes against `query`, dropping notes that score
    /// below `threshold`.
    ///
    /// Notes without a non-empty summary are excluded before encoding. The
    /// encoder runs exactly twice per call: once for the query and once for
    /// the batch of eligible summaries. An empty corpus short-circuits to an
    /// empty result without invoking the encoder at all.
    ///
    /// Ordering is a stable descending sort by score; ties keep the corpus
    /// fetch order.
    pub fn search(
        &mut self,
        corpus: &dyn NoteCorpus,
        user_id: &str,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let notes = corpus
            .notes_for_user(user_id)
            .map_err(SearchError::CorpusUnavailable)?;
        if notes.is_empty() {
            return Ok(Vec::new());
        }

        let eligible: Vec<Note> = notes
            .into_iter()
            .filter(|n| n.embeddable_summary().is_some())
            .collect();
        if eligible.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            user = user_id,
            eligible = eligible.len(),
            "scoring notes against query"
        );

        let query_embedding = self
            .embedder
            .encode(&[query])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SearchError::Encoding("encoder returned no embedding for query".to_string())
            })?;

        let summaries: Vec<&str> = eligible
            .iter()
            .map(|n| n.embeddable_summary().unwrap_or_default())
            .collect();
        let summary_embeddings = self.embedder.encode(&summaries)?;
        if summary_embeddings.len() != eligible.len() {
            return Err(SearchError::Encoding(format!(
                "encoder returned {} embeddings for {} summaries",
                summary_embeddings.len(),
                eligible.len()
            )));
        }

        let mut results: Vec<SearchResult> = eligible
            .into_iter()
            .zip(summary_embeddings)
            .map(|(note, embedding)| SearchResult {
                score: dot(&query_embedding, &embedding),
                note,
            })
            .filter(|r| r.score >= threshold)
            .collect();

        // sort_by is stable: equal scores keep corpus fetch order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::note::Importance;
    use chrono::Utc;
    use std::collections::HashMap;

    fn note(id: i64, summary: Option<&str>) -> Note {
        Note {
            id,
            user_id: "u1".to_string(),
            title: format!("note-{id}"),
            transcript: None,
            summary: summary.map(String::from),
            explanation: vec![],
            subject: "General".to_string(),
            categories: vec![],
            keywords: vec![],
            importance: Importance::Medium,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct FixedCorpus(Vec<Note>);

    impl NoteCorpus for FixedCorpus {
        fn notes_for_user(&self, _user_id: &str) -> anyhow::Result<Vec<Note>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenCorpus;

    impl NoteCorpus for BrokenCorpus {
        fn notes_for_user(&self, _user_id: &str) -> anyhow::Result<Vec<Note>> {
            anyhow::bail!("storage unreachable")
        }
    }

    /// Substitute encoder mapping known texts to fixed unit vectors, with
    /// call counting for the no-wasted-model-call checks.
    struct FakeEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        calls: usize,
    }

    impl FakeEmbedder {
        fn new(entries: &[(&str, [f32; 3])]) -> Self {
            let vectors = entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.to_vec()))
                .collect();
            Self { vectors, calls: 0 }
        }

        fn call_count(&self) -> usize {
            self.calls
        }
    }

    impl Embedder for FakeEmbedder {
        fn encode(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SearchError> {
            self.calls += 1;
            texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(*t)
                        .cloned()
                        .ok_or_else(|| SearchError::Encoding(format!("no vector for {t:?}")))
                })
                .collect()
        }
    }

    #[test]
    fn empty_corpus_returns_empty_without_encoding() {
        let mut engine = SearchEngine::new(FakeEmbedder::new(&[]));
        let results = engine
            .search(&FixedCorpus(vec![]), "u1", "anything", 0.2)
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(engine.embedder.call_count(), 0);
    }

    #[test]
    fn summaryless_corpus_returns_empty_without_encoding() {
        let corpus = FixedCorpus(vec![note(1, None), note(2, Some("")), note(3, Some("  "))]);
        let mut engine = SearchEngine::new(FakeEmbedder::new(&[]));
        let results = engine.search(&corpus, "u1", "anything", 0.2).unwrap();
        assert!(results.is_empty());
        assert_eq!(engine.embedder.call_count(), 0);
    }

    #[test]
    fn ranks_descending_and_excludes_summaryless_notes() {
        let corpus = FixedCorpus(vec![
            note(1, Some("calculus")),
            note(2, None),
            note(3, Some("budget")),
        ]);
        let embedder = FakeEmbedder::new(&[
            ("calculus exam prep", [1.0, 0.0, 0.0]),
            ("calculus", [0.9, 0.435_889_9, 0.0]),
            ("budget", [0.1, 0.994_987_4, 0.0]),
        ]);
        let mut engine = SearchEngine::new(embedder);
        let results = engine
            .search(&corpus, "u1", "calculus exam prep", 0.0)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].note.id, 1);
        assert_eq!(results[1].note.id, 3);
        assert!(results[0].score > results[1].score);
        // exactly two encoder invocations: query batch + summary batch
        assert_eq!(engine.embedder.call_count(), 2);
    }

    #[test]
    fn threshold_filters_low_scores() {
        let corpus = FixedCorpus(vec![note(1, Some("close")), note(2, Some("far"))]);
        let embedder = FakeEmbedder::new(&[
            ("q", [1.0, 0.0, 0.0]),
            ("close", [0.8, 0.6, 0.0]),
            ("far", [0.1, 0.994_987_4, 0.0]),
        ]);
        let mut engine = SearchEngine::new(embedder);
        let results = engine.search(&corpus, "u1", "q", 0.5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].note.id, 1);
    }

    #[test]
    fn equal_scores_keep_corpus_order() {
        let corpus = FixedCorpus(vec![
            note(1, Some("same")),
            note(2, Some("same")),
            note(3, Some("same")),
        ]);
        let embedder = FakeEmbedder::new(&[
            ("q", [1.0, 0.0, 0.0]),
            ("same", [0.5, 0.866_025_4, 0.0]),
        ]);
        let mut engine = SearchEngine::new(embedder);
        let results = engine.search(&corpus, "u1", "q", 0.0).unwrap();
        let ids: Vec<i64> = results.iter().map(|r| r.note.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn search_is_deterministic() {
        let corpus = FixedCorpus(vec![note(1, Some("a")), note(2, Some("b"))]);
        let make_engine = || {
            SearchEngine::new(FakeEmbedder::new(&[
                ("q", [1.0, 0.0, 0.0]),
                ("a", [0.6, 0.8, 0.0]),
                ("b", [0.8, 0.6, 0.0]),
            ]))
        };
        let first = make_engine().search(&corpus, "u1", "q", 0.0).unwrap();
        let second = make_engine().search(&corpus, "u1", "q", 0.0).unwrap();
        let render = |rs: &[SearchResult]| -> Vec<(i64, f32)> {
            rs.iter().map(|r| (r.note.id, r.score)).collect()
        };
        assert_eq!(render(&first), render(&second));
    }

    #[test]
    fn self_similarity_is_maximal() {
        let corpus = FixedCorpus(vec![
            note(1, Some("review calculus chapters 1-3")),
            note(2, Some("team meeting notes about quarterly budget")),
        ]);
        let embedder = FakeEmbedder::new(&[
            ("review calculus chapters 1-3", [0.8, 0.6, 0.0]),
            (
                "team meeting notes about quarterly budget",
                [0.0, 0.6, 0.8],
            ),
        ]);
        let mut engine = SearchEngine::new(embedder);
        let results = engine
            .search(&corpus, "u1", "review calculus chapters 1-3", 0.0)
            .unwrap();
        assert_eq!(results[0].note.id, 1);
        assert!(results[0].score > 0.99);
    }

    #[test]
    fn corpus_failure_propagates() {
        let mut engine = SearchEngine::new(FakeEmbedder::new(&[]));
        let err = engine.search(&BrokenCorpus, "u1", "q", 0.2).unwrap_err();
        assert!(matches!(err, SearchError::CorpusUnavailable(_)));
        assert_eq!(engine.embedder.call_count(), 0);
    }

    #[test]
    fn encoder_failure_propagates() {
        let corpus = FixedCorpus(vec![note(1, Some("known"))]);
        // embedder knows the summary but not the query
        let embedder = FakeEmbedder::new(&[("known", [1.0, 0.0, 0.0])]);
        let mut engine = SearchEngine::new(embedder);
        let err = engine.search(&corpus, "u1", "unknown", 0.2).unwrap_err();
        assert!(matches!(err, SearchError::Encoding(_)));
    }
}
