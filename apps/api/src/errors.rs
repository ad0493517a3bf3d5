use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::recommendation::engine::RecommendError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Only {found} recommendations available, {required} required")]
    InsufficientResults { found: usize, required: usize },

    #[error("Recommendation error: {0}")]
    Recommendation(#[from] RecommendError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InsufficientResults { found, required } => {
                tracing::error!("Insufficient recommendations: {found} of {required}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INSUFFICIENT_RESULTS",
                    format!("Unable to generate the minimum {required} recommendations"),
                )
            }
            AppError::Recommendation(e) => {
                tracing::error!("Recommendation error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RECOMMENDATION_ERROR",
                    "Recommendations could not be computed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
