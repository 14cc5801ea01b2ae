//! Error types for the matching system
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use crate::store::StoreError;
use crate::vector::VectorError;
use thiserror::Error;

/// Main error type for matching operations
#[derive(Error, Debug)]
pub enum MatchError {
    /// Embedding and vector store errors
    #[error(transparent)]
    Vector(#[from] VectorError),

    /// Record store and snapshot errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl MatchError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::Vector(e) => vector_status_code(e),
            Self::Store(StoreError::Vector(e)) => vector_status_code(e),
            Self::Store(StoreError::StorageError { .. }) => "STORAGE_ERROR",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Vector(VectorError::ModelInit(_)) => vec![
                "Check your internet connection, the model downloads on first use",
                "Verify the model name in .jobmatch/settings.toml is supported",
            ],
            Self::Vector(VectorError::EmbeddingFailed(_)) => vec![
                "Try the operation again, transient model failures do recover",
                "If the problem persists, delete the model cache and re-download",
            ],
            Self::Vector(VectorError::DimensionMismatch { .. }) => vec![
                "The store and the embedding model disagree on vector width",
                "Clear the store or switch back to the model it was built with",
            ],
            Self::Store(_) => vec![
                "Check disk space and permissions in the data directory",
                "Run 'jobmatch demo --persist' to rebuild the snapshot from scratch",
            ],
            Self::ConfigError { .. } => vec![
                "Run 'jobmatch init' to create a fresh config file",
                "Check .jobmatch/settings.toml for syntax errors",
            ],
            _ => vec![],
        }
    }
}

fn vector_status_code(error: &VectorError) -> &'static str {
    match error {
        VectorError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
        VectorError::InvalidDimension { .. } => "INVALID_DIMENSION",
        VectorError::InvalidComponent { .. } => "INVALID_COMPONENT",
        VectorError::ModelInit(_) => "MODEL_INIT_ERROR",
        VectorError::EmbeddingFailed(_) => "EMBEDDING_FAILED",
        VectorError::Storage(_) => "STORAGE_ERROR",
        VectorError::InvalidFormat(_) => "INVALID_FORMAT",
        VectorError::VersionMismatch { .. } => "VERSION_MISMATCH",
    }
}

/// Result type alias for matching operations
pub type MatchResult<T> = Result<T, MatchError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, MatchError>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> Result<T, MatchError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, MatchError> {
        self.map_err(|e| MatchError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, MatchError> {
        self.map_err(|e| {
            MatchError::General(format!("Error processing '{}': {}", path.display(), e))
        })
    }
}
