//! Embedding generation for records.
//!
//! The matching engine talks to an [`EmbeddingProvider`] trait object, so
//! the model backend stays swappable and tests can run without model
//! downloads. The production implementation wraps fastembed with the
//! GTE-base model, which produces the 768-dimensional vectors the stores
//! are built around.

mod text;

pub use text::{posting_embedding_text, profile_embedding_text};

use crate::config::Settings;
use crate::vector::{VECTOR_DIMENSION_768, VectorDimension, VectorError};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

/// Trait for generating embeddings from text.
///
/// Implementations must be thread-safe and should handle batches
/// efficiently.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts.
    ///
    /// Returns one embedding per input text, in input order, or an error.
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError>;

    /// Get the dimension of embeddings produced by this provider.
    #[must_use]
    fn dimension(&self) -> VectorDimension;
}

/// Resolve a configured model name to a fastembed model.
///
/// Only 768-dimensional models are accepted; the store layout assumes
/// that width everywhere.
pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, VectorError> {
    match name {
        "GTEBaseENV15" => Ok(EmbeddingModel::GTEBaseENV15),
        "BGEBaseENV15" => Ok(EmbeddingModel::BGEBaseENV15),
        "NomicEmbedTextV15" => Ok(EmbeddingModel::NomicEmbedTextV15),
        "MultilingualE5Base" => Ok(EmbeddingModel::MultilingualE5Base),
        other => Err(VectorError::ModelInit(format!(
            "Unknown embedding model '{other}'. Supported models: GTEBaseENV15, BGEBaseENV15, NomicEmbedTextV15, MultilingualE5Base"
        ))),
    }
}

/// FastEmbed implementation using the configured 768-dimensional model.
///
/// The default model is GTE-base, which balances quality and speed for
/// short prose like enriched profiles and postings.
pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: VectorDimension,
}

impl FastEmbedProvider {
    /// Create a provider from settings, downloading the model on first use.
    ///
    /// # Errors
    /// Returns an error if the model name is unknown or the model fails
    /// to initialize or download.
    pub fn new(settings: &Settings) -> Result<Self, VectorError> {
        Self::init(settings, false)
    }

    /// Create a provider with progress display during model download.
    ///
    /// # Errors
    /// Returns an error if the model name is unknown or the model fails
    /// to initialize or download.
    pub fn new_with_progress(settings: &Settings) -> Result<Self, VectorError> {
        Self::init(settings, true)
    }

    fn init(settings: &Settings, show_progress: bool) -> Result<Self, VectorError> {
        let model_name = settings.embedding.model.clone();
        let model = parse_embedding_model(&model_name)?;

        let embedding = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(settings.embedding.cache_dir.clone())
                .with_show_download_progress(show_progress),
        )
        .map_err(|e| {
            VectorError::ModelInit(format!(
                "Failed to initialize embedding model '{model_name}': {e}. Ensure you have internet connection for first-time model download"
            ))
        })?;

        Ok(Self {
            model: Mutex::new(embedding),
            model_name,
            dimension: VectorDimension::dimension_768(),
        })
    }

    /// The configured model name, as it appears in settings.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // fastembed expects Vec<String> for the embed method
        let text_strings: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();

        let embeddings = self
            .model
            .lock()
            .map_err(|_| {
                VectorError::EmbeddingFailed(
                    "Failed to acquire embedding model lock - model may be poisoned".to_string(),
                )
            })?
            .embed(text_strings, None)
            .map_err(|e| {
                VectorError::EmbeddingFailed(format!("Failed to generate embeddings: {e}"))
            })?;

        for embedding in &embeddings {
            if embedding.len() != VECTOR_DIMENSION_768 {
                return Err(VectorError::DimensionMismatch {
                    expected: VECTOR_DIMENSION_768,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}

/// Mock provider for testing.
///
/// Returns stubbed vectors when a registered marker appears in the input
/// text, and a fixed normalized vector otherwise, so tests control
/// distances exactly without touching a real model.
#[cfg(test)]
pub struct MockEmbeddingProvider {
    dimension: VectorDimension,
    rules: Vec<(String, Vec<f32>)>,
}

#[cfg(test)]
impl MockEmbeddingProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimension(VectorDimension::dimension_768())
    }

    /// Create a provider with a custom dimension for testing.
    #[must_use]
    pub fn with_dimension(dimension: VectorDimension) -> Self {
        Self {
            dimension,
            rules: Vec::new(),
        }
    }

    /// Register a vector to return for any text containing `marker`.
    ///
    /// Earlier rules win when multiple markers match.
    #[must_use]
    pub fn stub(mut self, marker: impl Into<String>, vector: Vec<f32>) -> Self {
        self.rules.push((marker.into(), vector));
        self
    }
}

#[cfg(test)]
impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        let dim = self.dimension.get();
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            if let Some((_, vector)) = self.rules.iter().find(|(marker, _)| text.contains(marker)) {
                embeddings.push(vector.clone());
                continue;
            }

            let mut embedding = vec![0.1; dim];
            let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            for val in &mut embedding {
                *val /= magnitude;
            }
            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}
