//! Recommender: query in, balanced recommendations out.
//!
//! Flow: enrich (optional) → encode once → rank whole catalog → extract
//! requirements from the raw query → balance → project to `Recommendation`.
//! Everything after enrichment is CPU-bound and runs on the blocking pool.
//! The index is an immutable `Arc` snapshot; concurrent calls share it
//! without coordination.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

use crate::models::assessment::{AssessmentRecord, Category, SupportFlag};
use crate::recommendation::balancer::balance;
use crate::recommendation::encoder::{EncodeError, TextEncoder};
use crate::recommendation::enrichment::{NoopEnricher, QueryEnricher};
use crate::recommendation::index::CatalogIndex;
use crate::recommendation::ranking::{rank, ScoredCandidate};
use crate::recommendation::requirements::extract_requirements;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("query encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    #[error("recommendation worker failed: {0}")]
    Worker(#[from] JoinError),
}

/// One recommended assessment as handed to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub name: String,
    pub url: String,
    pub description: String,
    /// Always a list, even for single-category records.
    pub test_type: Vec<Category>,
    pub adaptive_support: SupportFlag,
    pub remote_support: SupportFlag,
    pub duration: Option<u32>,
    pub relevance_score: f32,
}

impl Recommendation {
    fn from_record(record: &AssessmentRecord, score: f32) -> Self {
        Self {
            name: record.name.clone(),
            url: record.url.clone(),
            description: record.description.clone(),
            test_type: vec![record.category],
            adaptive_support: record.adaptive_support,
            remote_support: record.remote_support,
            duration: record.duration,
            relevance_score: score,
        }
    }
}

#[derive(Clone)]
pub struct Recommender {
    index: Arc<CatalogIndex>,
    encoder: Arc<dyn TextEncoder>,
    enricher: Arc<dyn QueryEnricher>,
}

impl Recommender {
    pub fn new(index: Arc<CatalogIndex>, encoder: Arc<dyn TextEncoder>) -> Self {
        Self {
            index,
            encoder,
            enricher: Arc::new(NoopEnricher),
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn QueryEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn catalog_size(&self) -> usize {
        self.index.len()
    }

    pub fn encoder_name(&self) -> &'static str {
        self.encoder.name()
    }

    pub fn enricher_name(&self) -> &'static str {
        self.enricher.name()
    }

    /// Returns `min(top_k, catalog size)` recommendations ordered by
    /// descending relevance.
    pub async fn recommend(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let ranking_text = self.enricher.enrich(query).await;

        let engine = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            engine.recommend_ranked_by(&query, &ranking_text, top_k)
        })
        .await?
    }

    /// Synchronous core: `ranking_text` drives similarity, `query` drives
    /// category requirements.
    pub fn recommend_ranked_by(
        &self,
        query: &str,
        ranking_text: &str,
        top_k: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vector = self.encoder.encode(ranking_text)?;
        let ranked = rank(&query_vector, &self.index)?;
        let requirements = extract_requirements(query);

        debug!(
            "Query requirements: categories={:?} technical={:?} behavioral={:?}",
            requirements.needed_categories,
            requirements.technical_skills,
            requirements.behavioral_skills
        );

        let picks = balance(&ranked, &requirements, self.index.records(), top_k);
        Ok(self.project(&picks))
    }

    fn project(&self, picks: &[ScoredCandidate]) -> Vec<Recommendation> {
        let records = self.index.records();
        picks
            .iter()
            .map(|c| Recommendation::from_record(&records[c.index], c.score))
            .collect()
    }
}
