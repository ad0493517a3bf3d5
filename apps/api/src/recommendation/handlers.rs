//! Axum route handlers for the Recommendation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::assessment::{Category, SupportFlag};
use crate::recommendation::engine::Recommendation;
use crate::recommendation::evaluation::{evaluate, EvaluationReport, LabeledQuery};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

/// Public shape of one recommendation. The relevance score stays internal.
#[derive(Debug, Serialize)]
pub struct AssessmentRecommendation {
    pub url: String,
    pub name: String,
    pub adaptive_support: SupportFlag,
    pub description: String,
    pub duration: Option<u32>,
    pub remote_support: SupportFlag,
    pub test_type: Vec<Category>,
}

impl From<Recommendation> for AssessmentRecommendation {
    fn from(rec: Recommendation) -> Self {
        Self {
            url: rec.url,
            name: rec.name,
            adaptive_support: rec.adaptive_support,
            description: rec.description,
            duration: rec.duration,
            remote_support: rec.remote_support,
            test_type: rec.test_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<AssessmentRecommendation>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub queries: Vec<LabeledQuery>,
    pub k: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

fn resolve_top_k(requested: Option<usize>, state: &AppState) -> Result<usize, AppError> {
    let top_k = requested.unwrap_or(state.config.default_top_k);
    let max = state.config.max_top_k;
    if top_k == 0 || top_k > max {
        return Err(AppError::Validation(format!(
            "top_k must be between 1 and {max}"
        )));
    }
    Ok(top_k)
}

/// POST /recommend
///
/// Returns the most relevant assessments for a free-text hiring query.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query cannot be empty".to_string()));
    }
    let top_k = resolve_top_k(request.top_k, &state)?;

    let recommendations = state.recommender.recommend(query, top_k).await?;

    let required = state.config.min_results.min(top_k);
    if recommendations.len() < required {
        return Err(AppError::InsufficientResults {
            found: recommendations.len(),
            required,
        });
    }

    info!(
        "Recommended {} assessments (top_k={top_k})",
        recommendations.len()
    );

    Ok(Json(RecommendResponse {
        recommended_assessments: recommendations.into_iter().map(Into::into).collect(),
    }))
}

/// POST /evaluate
///
/// Mean Recall@K of the live recommender over caller-supplied labeled queries.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluationReport>, AppError> {
    if request.queries.is_empty() {
        return Err(AppError::Validation("queries cannot be empty".to_string()));
    }
    if request.queries.iter().any(|q| q.query.trim().is_empty()) {
        return Err(AppError::Validation("Query cannot be empty".to_string()));
    }
    let k = resolve_top_k(request.k, &state)?;

    let report = evaluate(&state.recommender, &request.queries, k).await?;
    Ok(Json(report))
}
