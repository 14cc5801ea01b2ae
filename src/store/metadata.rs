//! Metadata tracking for store snapshots.
//!
//! Tracks the embedding model, dimension, and partition counts so a
//! snapshot written by one configuration is not silently loaded by an
//! incompatible one.

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Metadata for snapshot persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Name of the embedding model used
    pub model_name: String,

    /// Dimension of embeddings
    pub dimension: usize,

    /// Number of profile records stored
    pub profile_count: usize,

    /// Number of posting records stored
    pub posting_count: usize,

    /// Unix timestamp when created
    pub created_at: u64,

    /// Unix timestamp when last updated
    pub updated_at: u64,

    /// Version of the metadata format
    pub version: u32,
}

impl StoreMetadata {
    /// Current metadata version
    pub(crate) const CURRENT_VERSION: u32 = 1;

    /// Create new metadata with current timestamp
    pub fn new(
        model_name: String,
        dimension: usize,
        profile_count: usize,
        posting_count: usize,
    ) -> Self {
        let now = unix_timestamp();
        Self {
            model_name,
            dimension,
            profile_count,
            posting_count,
            created_at: now,
            updated_at: now,
            version: Self::CURRENT_VERSION,
        }
    }

    /// Update the metadata with new counts and timestamp
    pub fn update(&mut self, profile_count: usize, posting_count: usize) {
        self.profile_count = profile_count;
        self.posting_count = posting_count;
        self.updated_at = unix_timestamp();
    }

    /// Save metadata to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let metadata_path = path.join("metadata.json");

        let json = serde_json::to_string_pretty(self).map_err(|e| StoreError::StorageError {
            message: format!("Failed to serialize metadata: {e}"),
            suggestion: "This is likely a bug in the code".to_string(),
        })?;

        std::fs::write(&metadata_path, json).map_err(|e| StoreError::StorageError {
            message: format!("Failed to write metadata: {e}"),
            suggestion: "Check disk space and file permissions".to_string(),
        })?;

        Ok(())
    }

    /// Load metadata from a JSON file
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let metadata_path = path.join("metadata.json");

        let json = std::fs::read_to_string(&metadata_path).map_err(|e| StoreError::StorageError {
            message: format!("Failed to read metadata: {e}"),
            suggestion: "Check if snapshot data exists at the specified path".to_string(),
        })?;

        let metadata: Self = serde_json::from_str(&json).map_err(|e| StoreError::StorageError {
            message: format!("Failed to parse metadata: {e}"),
            suggestion: "The metadata file may be corrupted. Try rebuilding the snapshot."
                .to_string(),
        })?;

        // Check version compatibility
        if metadata.version > Self::CURRENT_VERSION {
            return Err(StoreError::StorageError {
                message: format!(
                    "Metadata version {} is newer than supported version {}",
                    metadata.version,
                    Self::CURRENT_VERSION
                ),
                suggestion: "Update the code to support the newer metadata format".to_string(),
            });
        }

        Ok(metadata)
    }

    /// Check if metadata file exists
    pub fn exists(path: &Path) -> bool {
        path.join("metadata.json").exists()
    }
}
