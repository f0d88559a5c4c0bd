//! Text encoder
//!
//! Wraps an ONNX export of `all-MiniLM-L6-v2` behind ONNX Runtime. Texts are
//! tokenized as one batch, run through the transformer, mean-pooled over the
//! positions marked valid by the attention mask, and L2-normalized, so the
//! dot product of two embeddings is their cosine similarity.
//!
//! The session and tokenizer are loaded once at startup and reused; there is
//! no module-global model state.

use std::path::Path;

use ndarray::{ArrayView3, Ix3};
use ort::session::{builder::GraphOptimizationLevel, Session};
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use super::error::SearchError;

/// Hidden size of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Inputs longer than this many tokens are truncated on the right.
pub const MAX_SEQ_LENGTH: usize = 256;

/// Maps batches of text to unit-norm embedding vectors.
///
/// Abstracted as a trait so the search engine can be exercised with a
/// substitute encoder in tests.
pub trait Embedder {
    /// One embedding per input, same order as the input. An empty input
    /// slice yields an empty vec without touching the model.
    fn encode(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SearchError>;
}

/// Sentence encoder backed by an ONNX Runtime session.
pub struct TextEncoder {
    session: Session,
    tokenizer: Tokenizer,
}

impl TextEncoder {
    /// Load the model and tokenizer from a directory holding `model.onnx`
    /// and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> Result<Self, SearchError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        tracing::info!(model_dir = %model_dir.display(), "loading embedding model");

        let session = Session::builder()
            .map_err(|e| SearchError::ModelUnavailable(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| SearchError::ModelUnavailable(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                SearchError::ModelUnavailable(format!(
                    "failed to load {}: {e}",
                    model_path.display()
                ))
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            SearchError::ModelUnavailable(format!(
                "failed to load {}: {e}",
                tokenizer_path.display()
            ))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| SearchError::ModelUnavailable(e.to_string()))?;
        tokenizer.with_padding(Some(PaddingParams::default()));

        Ok(Self { session, tokenizer })
    }
}

impl Embedder for TextEncoder {
    fn encode(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SearchError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| SearchError::Encoding(format!("tokenization failed: {e}")))?;

        // Padding pads every encoding to the longest in the batch.
        let batch = encodings.len();
        let seq_len = encodings
            .first()
            .map(|e| e.get_ids().len())
            .unwrap_or_default();
        if seq_len == 0 {
            return Err(SearchError::Encoding(
                "tokenizer produced no tokens".to_string(),
            ));
        }

        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);
        let mut token_type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            input_ids.extend(encoding.get_ids().iter().map(|&id| i64::from(id)));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| i64::from(m)));
            token_type_ids.extend(encoding.get_type_ids().iter().map(|&t| i64::from(t)));
        }

        let shape = vec![batch, seq_len];
        let input_ids =
            ort::value::Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))
                .map_err(|e| SearchError::Encoding(format!("failed to create input_ids: {e}")))?;
        let attention_mask_tensor =
            ort::value::Tensor::from_array((shape.clone(), attention_mask.into_boxed_slice()))
                .map_err(|e| {
                    SearchError::Encoding(format!("failed to create attention_mask: {e}"))
                })?;
        let token_type_ids =
            ort::value::Tensor::from_array((shape, token_type_ids.into_boxed_slice()))
                .map_err(|e| {
                    SearchError::Encoding(format!("failed to create token_type_ids: {e}"))
                })?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids,
            ])
            .map_err(|e| SearchError::Encoding(format!("model inference failed: {e}")))?;

        let hidden = outputs
            .get("last_hidden_state")
            .ok_or_else(|| {
                SearchError::Encoding("model output 'last_hidden_state' not found".to_string())
            })?
            .try_extract_array::<f32>()
            .map_err(|e| SearchError::Encoding(format!("failed to extract output: {e}")))?;
        let hidden = hidden.into_dimensionality::<Ix3>().map_err(|e| {
            SearchError::Encoding(format!("unexpected output shape: {e}"))
        })?;
        ensure_model_dim(hidden.dim().2)?;

        let masks: Vec<&[u32]> = encodings.iter().map(|e| e.get_attention_mask()).collect();
        mean_pool(hidden, &masks)
    }
}

/// A model with a different hidden size would silently produce embeddings
/// that are incomparable across runs; reject it up front.
fn ensure_model_dim(dim: usize) -> Result<(), SearchError> {
    if dim != EMBEDDING_DIM {
        return Err(SearchError::Encoding(format!(
            "model produced {dim}-dim embeddings, expected {EMBEDDING_DIM}"
        )));
    }
    Ok(())
}

/// Mean-pool per-token hidden states over mask-valid positions, then
/// L2-normalize each pooled vector.
fn mean_pool(
    hidden: ArrayView3<'_, f32>,
    masks: &[&[u32]],
) -> Result<Vec<Vec<f32>>, SearchError> {
    let (batch, seq_len, dim) = hidden.dim();
    debug_assert_eq!(batch, masks.len());

    let mut embeddings = Vec::with_capacity(batch);
    for (i, mask) in masks.iter().enumerate() {
        let mut pooled = vec![0.0f32; dim];
        let mut valid = 0usize;
        for (j, &m) in mask.iter().take(seq_len).enumerate() {
            if m == 0 {
                continue;
            }
            valid += 1;
            for (d, slot) in pooled.iter_mut().enumerate() {
                *slot += hidden[[i, j, d]];
            }
        }
        if valid == 0 {
            // special tokens make this unreachable for well-formed text
            return Err(SearchError::Encoding(
                "no valid tokens after tokenization".to_string(),
            ));
        }
        for slot in &mut pooled {
            *slot /= valid as f32;
        }
        l2_normalize(&mut pooled);
        embeddings.push(pooled);
    }

    Ok(embeddings)
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn mean_pool_excludes_padding() {
        // batch=1, seq=3, dim=2; third position is padding
        let hidden = Array3::from_shape_vec(
            (1, 3, 2),
            vec![1.0, 0.0, 3.0, 4.0, 100.0, 100.0],
        )
        .unwrap();
        let mask: &[u32] = &[1, 1, 0];
        let pooled = mean_pool(hidden.view(), &[mask]).unwrap();

        // mean of [1,0] and [3,4] is [2,2]; normalized to unit length
        let expected = [2.0 / 8.0f32.sqrt(), 2.0 / 8.0f32.sqrt()];
        assert!((pooled[0][0] - expected[0]).abs() < 1e-6);
        assert!((pooled[0][1] - expected[1]).abs() < 1e-6);
    }

    #[test]
    fn mean_pool_preserves_batch_order() {
        let hidden = Array3::from_shape_vec(
            (2, 2, 2),
            vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
        )
        .unwrap();
        let mask: &[u32] = &[1, 1];
        let pooled = mean_pool(hidden.view(), &[mask, mask]).unwrap();
        assert!(pooled[0][0] > 0.99 && pooled[0][1].abs() < 1e-6);
        assert!(pooled[1][1] > 0.99 && pooled[1][0].abs() < 1e-6);
    }

    #[test]
    fn mean_pool_output_is_unit_norm() {
        let hidden = Array3::from_shape_vec(
            (1, 2, 3),
            vec![0.3, -1.2, 2.5, 0.7, 0.1, -0.4],
        )
        .unwrap();
        let mask: &[u32] = &[1, 1];
        let pooled = mean_pool(hidden.view(), &[mask]).unwrap();
        let norm = pooled[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mean_pool_rejects_all_masked_input() {
        let hidden = Array3::from_shape_vec((1, 2, 2), vec![1.0; 4]).unwrap();
        let mask: &[u32] = &[0, 0];
        let err = mean_pool(hidden.view(), &[mask]).unwrap_err();
        assert!(matches!(err, SearchError::Encoding(_)));
    }

    #[test]
    fn rejects_unexpected_model_width() {
        assert!(ensure_model_dim(EMBEDDING_DIM).is_ok());
        let err = ensure_model_dim(512).unwrap_err();
        assert!(matches!(err, SearchError::Encoding(_)));
    }

    #[test]
    fn l2_normalize_handles_zero_vector() {
        let mut v = vec![0.0f32; 4];
        l2_normalize(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));
    }
}
