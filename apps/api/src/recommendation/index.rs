//! Embedding Index: catalog records paired 1:1 with their vectors.
//!
//! Built once at startup and never mutated; shared across requests via `Arc`.

use std::time::Instant;

use tracing::info;

use crate::models::assessment::AssessmentRecord;
use crate::recommendation::encoder::{EncodeError, TextEncoder};

#[derive(Debug)]
pub struct CatalogIndex {
    records: Vec<AssessmentRecord>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl CatalogIndex {
    /// Encodes every record's document text. Fails if the encoder hands back
    /// the wrong number of vectors or a vector of the wrong size.
    pub fn build(
        records: Vec<AssessmentRecord>,
        encoder: &dyn TextEncoder,
    ) -> Result<Self, EncodeError> {
        let started = Instant::now();
        let texts: Vec<String> = records.iter().map(AssessmentRecord::document_text).collect();
        let vectors = encoder.encode_batch(&texts)?;

        if vectors.len() != records.len() {
            return Err(EncodeError::CountMismatch {
                expected: records.len(),
                actual: vectors.len(),
            });
        }

        let dimension = encoder.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(EncodeError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        info!(
            "Embedding index built: {} records, dimension {}, encoder {}, {}ms",
            records.len(),
            dimension,
            encoder.name(),
            started.elapsed().as_millis()
        );

        Ok(Self {
            records,
            vectors,
            dimension,
        })
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn from_parts(records: Vec<AssessmentRecord>, vectors: Vec<Vec<f32>>) -> Self {
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        Self {
            records,
            vectors,
            dimension,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::assessment::{Category, SupportFlag};
    use crate::recommendation::encoder::HashingEncoder;

    pub(crate) fn record(name: &str, category: Category) -> AssessmentRecord {
        AssessmentRecord {
            name: name.to_string(),
            url: format!("https://example.com/{}", name.to_lowercase().replace(' ', "-")),
            description: format!("{name} description"),
            category,
            skills: vec![],
            adaptive_support: SupportFlag::No,
            remote_support: SupportFlag::Yes,
            duration: None,
        }
    }

    pub(crate) fn records(n: usize) -> Vec<AssessmentRecord> {
        (0..n)
            .map(|i| record(&format!("Assessment {i}"), Category::Other))
            .collect()
    }

    /// Returns a fixed number of vectors regardless of input.
    struct ShortEncoder;

    impl TextEncoder for ShortEncoder {
        fn name(&self) -> &'static str {
            "short"
        }

        fn dimension(&self) -> usize {
            4
        }

        fn encode_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
            Ok(vec![vec![1.0, 0.0, 0.0, 0.0]])
        }
    }

    /// Declares one dimension and returns another.
    struct LyingEncoder;

    impl TextEncoder for LyingEncoder {
        fn name(&self) -> &'static str {
            "lying"
        }

        fn dimension(&self) -> usize {
            8
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
            Ok(texts.iter().map(|_| vec![0.5; 4]).collect())
        }
    }

    #[test]
    fn test_build_keeps_record_order_and_one_vector_each() {
        let records = vec![
            record("Java Test", Category::Knowledge),
            record("Team Test", Category::Personality),
        ];
        let index = CatalogIndex::build(records.clone(), &HashingEncoder::new(64)).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.records(), records.as_slice());
        assert_eq!(index.vectors().len(), 2);
        assert!(index.vectors().iter().all(|v| v.len() == 64));
        assert_eq!(index.dimension(), 64);
    }

    #[test]
    fn test_build_encodes_document_text() {
        let mut java = record("Java Test", Category::Knowledge);
        java.skills = vec!["java".to_string()];
        let encoder = HashingEncoder::new(64);
        let index = CatalogIndex::build(vec![java.clone()], &encoder).unwrap();

        assert_eq!(index.vectors()[0], encoder.encode(&java.document_text()).unwrap());
    }

    #[test]
    fn test_build_rejects_vector_count_mismatch() {
        let result = CatalogIndex::build(records(3), &ShortEncoder);
        assert!(matches!(
            result,
            Err(EncodeError::CountMismatch {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_build_rejects_dimension_mismatch() {
        let result = CatalogIndex::build(records(2), &LyingEncoder);
        assert!(matches!(
            result,
            Err(EncodeError::DimensionMismatch {
                expected: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_empty_catalog_builds_empty_index() {
        let index = CatalogIndex::build(vec![], &HashingEncoder::new(16)).unwrap();
        assert!(index.is_empty());
    }
}
