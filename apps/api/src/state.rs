use std::sync::Arc;

use crate::config::Config;
use crate::recommendation::engine::Recommender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the immutable catalog index built at startup.
    pub recommender: Arc<Recommender>,
    pub config: Config,
}
