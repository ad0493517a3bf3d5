//! Query Enricher: optional rewrite of the query text used for similarity ranking.
//!
//! `NoopEnricher` is the default. `LlmQueryEnricher` is wired in by `main`
//! when an LLM API key is configured. Keyword requirements are always
//! extracted from the caller's original query; only ranking sees the
//! enriched text.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::recommendation::prompts::{QUERY_EXPANSION_PROMPT_TEMPLATE, QUERY_EXPANSION_SYSTEM};

/// Carried by the recommender as `Arc<dyn QueryEnricher>`.
#[async_trait]
pub trait QueryEnricher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the text to rank with. Implementations must fall back to the
    /// original query rather than fail.
    async fn enrich(&self, query: &str) -> String;
}

/// Passes the query through untouched.
pub struct NoopEnricher;

#[async_trait]
impl QueryEnricher for NoopEnricher {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn enrich(&self, query: &str) -> String {
        query.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ExpandedQuery {
    expanded_query: String,
}

/// Appends LLM-suggested search terms to the query.
pub struct LlmQueryEnricher(pub LlmClient);

impl LlmQueryEnricher {
    async fn expand(&self, query: &str) -> Result<String, LlmError> {
        let prompt = QUERY_EXPANSION_PROMPT_TEMPLATE.replace("{query}", query);
        let expanded: ExpandedQuery = self.0.call_json(&prompt, QUERY_EXPANSION_SYSTEM).await?;
        Ok(expanded.expanded_query)
    }
}

#[async_trait]
impl QueryEnricher for LlmQueryEnricher {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn enrich(&self, query: &str) -> String {
        match self.expand(query).await {
            Ok(expanded) => combine(query, &expanded),
            Err(e) => {
                warn!("Query enrichment failed, ranking with the original query: {e}");
                query.to_string()
            }
        }
    }
}

/// Original query first so its terms are never lost.
fn combine(query: &str, expanded: &str) -> String {
    let expanded = expanded.trim();
    if expanded.is_empty() {
        return query.to_string();
    }
    debug!("Enriched query: {expanded}");
    format!("{query} {expanded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_returns_query_unchanged() {
        let enricher = NoopEnricher;
        assert_eq!(enricher.enrich("Java developer").await, "Java developer");
        assert_eq!(enricher.name(), "none");
    }

    #[test]
    fn test_combine_keeps_original_first() {
        assert_eq!(
            combine("Java developer", "java spring oop"),
            "Java developer java spring oop"
        );
    }

    #[test]
    fn test_combine_ignores_blank_expansion() {
        assert_eq!(combine("Java developer", "   "), "Java developer");
    }

    #[test]
    fn test_expanded_query_deserializes() {
        let parsed: ExpandedQuery =
            serde_json::from_str(r#"{"expanded_query": "sql database analyst"}"#).unwrap();
        assert_eq!(parsed.expanded_query, "sql database analyst");
    }

    #[test]
    fn test_prompt_template_has_query_placeholder() {
        assert!(QUERY_EXPANSION_PROMPT_TEMPLATE.contains("{query}"));
    }
}
