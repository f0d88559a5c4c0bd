//! Similarity scorer
//!
//! Embeddings coming out of the encoder are unit-norm, so cosine similarity
//! reduces to a plain dot product. The scorer does not re-normalize; the
//! encoder is responsible for handing it unit vectors.

/// Dot product of two equal-length vectors.
///
/// Equal to cosine similarity when both inputs are unit-norm. A dimension
/// mismatch is a programming error and panics rather than returning a
/// recoverable result.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "embedding dimension mismatch: {} vs {}",
        a.len(),
        b.len()
    );
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_unit_vectors_score_one() {
        let a = [1.0, 0.0, 0.0];
        assert!((dot(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert!(dot(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_negative_one() {
        let a = [1.0, 0.0, 0.0];
        let b = [-1.0, 0.0, 0.0];
        assert!((dot(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn dimension_mismatch_panics() {
        dot(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
    }
}
