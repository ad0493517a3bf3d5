//! Similarity Ranker: scores every catalog vector against the query vector.

use crate::recommendation::encoder::EncodeError;
use crate::recommendation::index::CatalogIndex;

/// A catalog position with its similarity to the current query.
/// Lives only inside ranking and balancing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub index: usize,
    pub score: f32,
}

/// Cosine similarity in [-1, 1]. Zero-norm or mismatched inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Sorts descending by score. Stable, so ties keep catalog order. NaN
/// sorts above every number rather than breaking the order.
pub fn sort_by_score_desc(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Ranks the whole catalog against an already-encoded query.
pub fn rank(
    query_vector: &[f32],
    index: &CatalogIndex,
) -> Result<Vec<ScoredCandidate>, EncodeError> {
    if query_vector.len() != index.dimension() {
        return Err(EncodeError::DimensionMismatch {
            expected: index.dimension(),
            actual: query_vector.len(),
        });
    }

    let mut ranked: Vec<ScoredCandidate> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(index, vector)| ScoredCandidate {
            index,
            score: cosine_similarity(query_vector, vector),
        })
        .collect();

    sort_by_score_desc(&mut ranked);
    Ok(ranked)
}
