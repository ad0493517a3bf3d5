//! Recall@K over labeled queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::recommendation::engine::{RecommendError, Recommender};

#[derive(Debug, Clone, Deserialize)]
pub struct LabeledQuery {
    pub query: String,
    pub relevant_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRecall {
    pub query: String,
    pub recall: f64,
    pub num_relevant: usize,
    pub num_found: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub k: usize,
    pub mean_recall: f64,
    pub evaluated: usize,
    /// Queries without any relevant url; left out of the mean.
    pub skipped: usize,
    pub results: Vec<QueryRecall>,
}

/// Fraction of `relevant` urls present in the first `k` of `recommended`.
/// Returns 0.0 when nothing is relevant.
pub fn recall_at_k(recommended: &[String], relevant: &[String], k: usize) -> f64 {
    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    if relevant.is_empty() {
        return 0.0;
    }
    let found = recommended
        .iter()
        .take(k)
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&relevant)
        .count();
    found as f64 / relevant.len() as f64
}

/// Runs every labeled query through the recommender and averages Recall@K.
pub async fn evaluate(
    recommender: &Recommender,
    queries: &[LabeledQuery],
    k: usize,
) -> Result<EvaluationReport, RecommendError> {
    let mut results = Vec::with_capacity(queries.len());
    let mut skipped = 0usize;

    for labeled in queries {
        let relevant: HashSet<&str> = labeled.relevant_urls.iter().map(String::as_str).collect();
        if relevant.is_empty() {
            skipped += 1;
            continue;
        }

        let urls: Vec<String> = recommender
            .recommend(&labeled.query, k)
            .await?
            .into_iter()
            .map(|r| r.url)
            .collect();

        let num_found = urls
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .intersection(&relevant)
            .count();

        results.push(QueryRecall {
            query: labeled.query.clone(),
            recall: recall_at_k(&urls, &labeled.relevant_urls, k),
            num_relevant: relevant.len(),
            num_found,
        });
    }

    let mean_recall = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.recall).sum::<f64>() / results.len() as f64
    };

    info!(
        "Evaluated {} queries (skipped {}): mean recall@{} = {:.4}",
        results.len(),
        skipped,
        k,
        mean_recall
    );

    Ok(EvaluationReport {
        k,
        mean_recall,
        evaluated: results.len(),
        skipped,
        results,
    })
}
