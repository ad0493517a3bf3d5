use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports liveness plus the size of the loaded catalog and the active backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "catalog_size": state.recommender.catalog_size(),
        "encoder": state.recommender.encoder_name(),
        "enricher": state.recommender.enricher_name()
    }))
}
