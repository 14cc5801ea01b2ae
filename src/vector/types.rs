//! Type-safe wrappers and core types for vector search functionality.
//!
//! This module provides newtypes and error types following the project's
//! strict type safety guidelines. All types implement necessary traits
//! for ergonomic usage while preventing primitive obsession.

use thiserror::Error;

/// Standard vector dimension for text embeddings (GTE-base model).
pub const VECTOR_DIMENSION_768: usize = 768;

/// Type-safe wrapper for vector dimensions.
///
/// Ensures compile-time or runtime validation of vector dimensions
/// to prevent dimension mismatches during operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension` with validation.
    ///
    /// Returns an error if the dimension is zero.
    pub fn new(dim: usize) -> Result<Self, VectorError> {
        if dim == 0 {
            return Err(VectorError::InvalidDimension {
                dimension: 0,
                reason: "Vector dimension cannot be zero",
            });
        }
        Ok(Self(dim))
    }

    /// Creates the standard 768-dimensional vector dimension.
    #[must_use]
    pub const fn dimension_768() -> Self {
        Self(VECTOR_DIMENSION_768)
    }

    /// Returns the underlying dimension value.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Validates that a vector has the expected dimension and contains
    /// no NaN components.
    ///
    /// Every vector entering a store or query passes through here, so a
    /// bad vector is rejected before it can desynchronize the stores.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.0 {
            return Err(VectorError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        for (index, value) in vector.iter().enumerate() {
            if value.is_nan() {
                return Err(VectorError::InvalidComponent {
                    index,
                    reason: "Vector component cannot be NaN",
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur during vector operations.
///
/// All error messages include actionable suggestions for resolution.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure all vectors use the same embedding model"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector dimension: {dimension}\nReason: {reason}")]
    InvalidDimension {
        dimension: usize,
        reason: &'static str,
    },

    #[error("Invalid vector component at index {index}\nReason: {reason}")]
    InvalidComponent { index: usize, reason: &'static str },

    #[error(
        "Embedding model is not initialized: {0}\nSuggestion: Ensure you have internet connection for first-time model download"
    )]
    ModelInit(String),

    #[error(
        "Embedding generation failed: {0}\nSuggestion: Verify the embedding model is properly initialized"
    )]
    EmbeddingFailed(String),

    #[error("Storage error: {0}\nSuggestion: Check disk space and file permissions")]
    Storage(#[from] std::io::Error),

    #[error(
        "Invalid storage format: {0}\nSuggestion: Check that vector data is valid and not corrupted"
    )]
    InvalidFormat(String),

    #[error(
        "Invalid storage version: expected {expected}, got {actual}\nSuggestion: Migrate the storage format or use a compatible version"
    )]
    VersionMismatch { expected: u32, actual: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_dimension() {
        let dim = VectorDimension::new(768).unwrap();
        assert_eq!(dim.get(), 768);

        let standard = VectorDimension::dimension_768();
        assert_eq!(standard.get(), 768);

        // Invalid dimension
        assert!(VectorDimension::new(0).is_err());

        // Validation
        let vec = vec![0.1; 768];
        assert!(dim.validate_vector(&vec).is_ok());

        let wrong_vec = vec![0.1; 100];
        assert!(dim.validate_vector(&wrong_vec).is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let dim = VectorDimension::new(4).unwrap();

        let mut vec = vec![0.1, 0.2, 0.3, 0.4];
        assert!(dim.validate_vector(&vec).is_ok());

        vec[2] = f32::NAN;
        match dim.validate_vector(&vec) {
            Err(VectorError::InvalidComponent { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected InvalidComponent, got {other:?}"),
        }
    }

    #[test]
    fn test_dimension_mismatch_reports_sizes() {
        let dim = VectorDimension::new(768).unwrap();
        match dim.validate_vector(&[0.0; 10]) {
            Err(VectorError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 768);
                assert_eq!(actual, 10);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }
}
