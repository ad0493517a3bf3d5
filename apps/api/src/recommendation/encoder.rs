//! Text Encoder: maps text into a fixed-dimension vector space.
//!
//! `FastEmbedEncoder` (default feature `fastembed`) runs the pretrained
//! all-MiniLM-L6-v2 sentence model locally. `HashingEncoder` is the fallback
//! when the model cannot be loaded: feature hashing over words, word bigrams
//! and character trigrams, keyed SipHash so vectors are stable across builds.

use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use siphasher::sip::SipHasher13;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoder backend failed: {0}")]
    Backend(String),

    #[error("encoder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A frozen, deterministic sentence encoder.
///
/// Carried as `Arc<dyn TextEncoder>` by the index builder and the recommender.
pub trait TextEncoder: Send + Sync {
    /// Backend label, reported by the health endpoint.
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError>;

    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError> {
        let mut vectors = self.encode_batch(&[text.to_string()])?;
        if vectors.len() != 1 {
            return Err(EncodeError::CountMismatch {
                expected: 1,
                actual: vectors.len(),
            });
        }
        Ok(vectors.remove(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderBackend {
    Hash,
    FastEmbed,
}

impl FromStr for EncoderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hash" => Ok(EncoderBackend::Hash),
            "fastembed" => Ok(EncoderBackend::FastEmbed),
            other => Err(format!("unknown embedding backend '{other}' (expected hash or fastembed)")),
        }
    }
}

/// Builds the configured encoder. A fastembed backend that cannot start falls
/// back to the hashing encoder.
pub fn create_encoder(backend: EncoderBackend, dimension: usize) -> Arc<dyn TextEncoder> {
    match backend {
        EncoderBackend::Hash => Arc::new(HashingEncoder::new(dimension)),
        EncoderBackend::FastEmbed => match fastembed_encoder() {
            Ok(encoder) => encoder,
            Err(e) => {
                warn!("fastembed encoder unavailable ({e}); using hashing encoder");
                Arc::new(HashingEncoder::new(dimension))
            }
        },
    }
}

#[cfg(feature = "fastembed")]
fn fastembed_encoder() -> Result<Arc<dyn TextEncoder>, EncodeError> {
    Ok(Arc::new(FastEmbedEncoder::new()?))
}

#[cfg(not(feature = "fastembed"))]
fn fastembed_encoder() -> Result<Arc<dyn TextEncoder>, EncodeError> {
    Err(EncodeError::Backend(
        "built without the `fastembed` feature".to_string(),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// HashingEncoder
// ────────────────────────────────────────────────────────────────────────────

// Changing these keys changes every vector.
const HASH_SEED_K0: u64 = 0x5a17_c0de_0b5e_55ed;
const HASH_SEED_K1: u64 = 0x0dd5_eed5_f00d_cafe;

const WORD_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;
const TRIGRAM_WEIGHT: f32 = 0.25;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "for", "from", "i", "in", "is", "it",
    "of", "on", "or", "our", "that", "the", "this", "to", "we", "who", "with",
];

/// Signed feature hashing into an L2-normalised vector.
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_feature(feature: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for (feature, weight) in weighted_features(text) {
            let h = Self::hash_feature(&feature);
            let idx = (h % self.dimension as u64) as usize;
            // top bit picks the sign so collisions tend to cancel out
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl TextEncoder for HashingEncoder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Lower-cased word tokens. `+` and `#` stay attached so "c++" and "c#" survive.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

fn weighted_features(text: &str) -> Vec<(String, f32)> {
    let tokens = tokenize(text);
    let mut features = Vec::with_capacity(tokens.len() * 6);

    for token in &tokens {
        features.push((format!("w:{token}"), WORD_WEIGHT));

        let padded: Vec<char> = format!("<{token}>").chars().collect();
        for gram in padded.windows(3) {
            features.push((format!("c:{}", gram.iter().collect::<String>()), TRIGRAM_WEIGHT));
        }
    }

    for pair in tokens.windows(2) {
        features.push((format!("b:{} {}", pair[0], pair[1]), BIGRAM_WEIGHT));
    }

    features
}

// ────────────────────────────────────────────────────────────────────────────
// FastEmbedEncoder
// ────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "fastembed")]
pub use self::pretrained::FastEmbedEncoder;

#[cfg(feature = "fastembed")]
mod pretrained {
    use std::sync::Mutex;

    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use tracing::info;

    use super::{EncodeError, TextEncoder};

    /// all-MiniLM-L6-v2 output size.
    const MINILM_DIMENSION: usize = 384;

    /// Local ONNX sentence encoder. The session is not shareable, so calls are
    /// serialised behind a mutex.
    pub struct FastEmbedEncoder {
        model: Mutex<TextEmbedding>,
    }

    impl FastEmbedEncoder {
        pub fn new() -> Result<Self, EncodeError> {
            let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);
            let model = TextEmbedding::try_new(options).map_err(|e| {
                EncodeError::Backend(format!("failed to initialise fastembed model: {e}"))
            })?;
            info!("fastembed encoder ready (all-MiniLM-L6-v2)");
            Ok(Self {
                model: Mutex::new(model),
            })
        }
    }

    impl TextEncoder for FastEmbedEncoder {
        fn name(&self) -> &'static str {
            "fastembed"
        }

        fn dimension(&self) -> usize {
            MINILM_DIMENSION
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
            let mut model = self
                .model
                .lock()
                .map_err(|_| EncodeError::Backend("fastembed model lock poisoned".to_string()))?;
            model
                .embed(texts.to_vec(), None)
                .map_err(|e| EncodeError::Backend(format!("fastembed embedding failed: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::ranking::cosine_similarity;

    fn encode(encoder: &HashingEncoder, text: &str) -> Vec<f32> {
        encoder.encode(text).unwrap()
    }

    #[test]
    fn test_vectors_have_configured_dimension_and_unit_norm() {
        let encoder = HashingEncoder::new(384);
        let v = encode(&encoder, "Java developer with SQL experience");
        assert_eq!(v.len(), 384);

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "L2 norm should be 1.0, got {norm}");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = HashingEncoder::new(128);
        let b = HashingEncoder::new(128);
        assert_eq!(
            encode(&a, "Teamwork and collaboration"),
            encode(&b, "Teamwork and collaboration")
        );
    }

    #[test]
    fn test_related_text_scores_higher_than_unrelated() {
        let encoder = HashingEncoder::new(384);
        let query = encode(&encoder, "python programmer");
        let python = encode(&encoder, "Python Programming Assessment python programming");
        let teamwork = encode(&encoder, "Teamwork Assessment measures collaboration in teams");

        let related = cosine_similarity(&query, &python);
        let unrelated = cosine_similarity(&query, &teamwork);
        assert!(
            related > unrelated,
            "related {related} should beat unrelated {unrelated}"
        );
    }

    #[test]
    fn test_word_variants_share_trigrams() {
        let encoder = HashingEncoder::new(384);
        let a = encode(&encoder, "collaborate");
        let b = encode(&encoder, "collaboration");
        let c = encode(&encoder, "python");
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
        assert!(cosine_similarity(&a, &b) > 0.1);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let encoder = HashingEncoder::new(16);
        let v = encode(&encoder, "   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_tokenize_keeps_language_symbols_and_drops_stopwords() {
        assert_eq!(tokenize("The C++ and C# developer"), vec!["c++", "c#", "developer"]);
    }

    #[test]
    fn test_batch_preserves_order_and_count() {
        let encoder = HashingEncoder::new(64);
        let texts = vec!["java".to_string(), "sql".to_string(), "java".to_string()];
        let vectors = encoder.encode_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vectors[2]);
        assert_ne!(vectors[0], vectors[1]);
    }

    #[test]
    fn test_zero_dimension_is_clamped() {
        assert_eq!(HashingEncoder::new(0).dimension(), 1);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("hash".parse::<EncoderBackend>(), Ok(EncoderBackend::Hash));
        assert_eq!(
            " FastEmbed ".parse::<EncoderBackend>(),
            Ok(EncoderBackend::FastEmbed)
        );
        assert!("bert".parse::<EncoderBackend>().is_err());
    }

    #[cfg(not(feature = "fastembed"))]
    #[test]
    fn test_fastembed_without_feature_falls_back_to_hash() {
        let encoder = create_encoder(EncoderBackend::FastEmbed, 32);
        assert_eq!(encoder.name(), "hash");
        assert_eq!(encoder.dimension(), 32);
    }
}
