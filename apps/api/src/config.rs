use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::recommendation::encoder::EncoderBackend;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog JSON. `None` → built-in sample assessments.
    pub catalog_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EncoderBackend,
    pub embedding_dimension: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub min_results: usize,
    /// Enables the LLM query enricher when set.
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            catalog_path: optional_env("CATALOG_PATH").map(PathBuf::from),
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            embedding_backend: embedding_backend(optional_env("EMBEDDING_BACKEND"))?,
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", 384)?,
            default_top_k: parse_env("DEFAULT_TOP_K", 10)?,
            max_top_k: parse_env("MAX_TOP_K", 50)?,
            min_results: parse_env("MIN_RESULTS", 5)?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.embedding_dimension == 0 {
            return Err(anyhow!("EMBEDDING_DIMENSION must be greater than 0"));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(anyhow!(
                "DEFAULT_TOP_K must be between 1 and MAX_TOP_K ({})",
                self.max_top_k
            ));
        }
        Ok(())
    }
}

/// The pretrained model unless explicitly overridden.
fn embedding_backend(raw: Option<String>) -> Result<EncoderBackend> {
    match raw {
        Some(raw) => raw
            .parse::<EncoderBackend>()
            .map_err(|e| anyhow!(e))
            .context("EMBEDDING_BACKEND is invalid"),
        None => Ok(EncoderBackend::FastEmbed),
    }
}

/// Unset and blank are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
