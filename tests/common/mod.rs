//! Shared helpers for integration tests.
//!
//! Tests never touch a real embedding model. `StubProvider` returns a
//! registered 768-dimensional vector whenever its marker appears in the
//! enriched text, so distances between stored records are exact and
//! chosen by the test.

use jobmatch::RecordAttributes;
use jobmatch::embedding::EmbeddingProvider;
use jobmatch::vector::{VECTOR_DIMENSION_768, VectorDimension, VectorError};

/// Deterministic provider keyed by text markers.
pub struct StubProvider {
    rules: Vec<(String, Vec<f32>)>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Return `vector` (padded to 768 dims) for any text containing
    /// `marker`. Earlier rules win.
    pub fn stub(mut self, marker: &str, vector: Vec<f32>) -> Self {
        self.rules.push((marker.to_string(), pad(vector)));
        self
    }
}

impl EmbeddingProvider for StubProvider {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        texts
            .iter()
            .map(|text| {
                self.rules
                    .iter()
                    .find(|(marker, _)| text.contains(marker))
                    .map(|(_, vector)| vector.clone())
                    .ok_or_else(|| {
                        VectorError::EmbeddingFailed(format!(
                            "No stub registered for text: {}",
                            &text[..text.len().min(60)]
                        ))
                    })
            })
            .collect()
    }

    fn dimension(&self) -> VectorDimension {
        VectorDimension::dimension_768()
    }
}

/// Pad a short vector with zeros to the full 768 dimensions.
pub fn pad(mut vector: Vec<f32>) -> Vec<f32> {
    vector.resize(VECTOR_DIMENSION_768, 0.0);
    vector
}

/// Attribute builder with a neutral body.
pub fn attrs(seniority: &str, skills: &[&str], industry: &str) -> RecordAttributes {
    RecordAttributes::new(
        seniority,
        skills.iter().map(|s| s.to_string()).collect(),
        industry,
        "Neutral description.",
    )
}
