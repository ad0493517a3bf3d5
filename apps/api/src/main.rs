mod config;
mod errors;
mod llm_client;
mod models;
mod recommendation;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::recommendation::catalog::load_catalog;
use crate::recommendation::encoder::create_encoder;
use crate::recommendation::engine::Recommender;
use crate::recommendation::enrichment::LlmQueryEnricher;
use crate::recommendation::index::CatalogIndex;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Assessment Recommendation API v{}", env!("CARGO_PKG_VERSION"));

    // Catalog + embedding index, built once and shared read-only
    let records = load_catalog(config.catalog_path.as_deref());
    let encoder = create_encoder(config.embedding_backend, config.embedding_dimension);
    let index = CatalogIndex::build(records, encoder.as_ref())
        .context("Failed to build the embedding index")?;

    let mut recommender = Recommender::new(Arc::new(index), encoder);

    // Optional LLM query enrichment
    if let Some(api_key) = config.anthropic_api_key.clone() {
        let llm = LlmClient::new(api_key).context("Failed to build the LLM client")?;
        recommender = recommender.with_enricher(Arc::new(LlmQueryEnricher(llm)));
        info!("LLM query enrichment enabled (model: {})", llm_client::MODEL);
    }

    info!(
        "Recommender ready: {} assessments, encoder {}, enricher {}",
        recommender.catalog_size(),
        recommender.encoder_name(),
        recommender.enricher_name()
    );

    let state = AppState {
        recommender: Arc::new(recommender),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
