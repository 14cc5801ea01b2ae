//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - operation completed, results found (or no results is acceptable)
//! - `1`: General error - unspecified failure
//! - `2`: Blocking error - critical failure that should halt automation
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::MatchError;
use crate::store::StoreError;
use crate::vector::VectorError;

/// Standard exit codes for CLI operations.
///
/// These codes follow Unix conventions where 0 indicates success,
/// and non-zero values indicate various error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Critical error that should halt automation (code 2)
    BlockingError = 2,

    /// Entity not found but command executed successfully (code 3)
    NotFound = 3,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Snapshot corruption detected (code 7)
    SnapshotCorrupted = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code for a match query based on result presence.
    ///
    /// Returns `Success` if any hit was found, `NotFound` for an empty
    /// result list.
    pub fn from_match_results<T>(results: &[T]) -> Self {
        if results.is_empty() {
            ExitCode::NotFound
        } else {
            ExitCode::Success
        }
    }

    /// Convert a `MatchError` to the appropriate exit code.
    ///
    /// Maps specific error types to semantic exit codes that scripts
    /// can use to determine appropriate recovery actions.
    pub fn from_error(error: &MatchError) -> Self {
        match error {
            MatchError::Vector(e) => Self::from_vector_error(e),
            MatchError::Store(StoreError::Vector(e)) => Self::from_vector_error(e),
            MatchError::Store(StoreError::StorageError { .. }) => ExitCode::IoError,
            MatchError::ConfigError { .. } => ExitCode::ConfigError,
            MatchError::General(_) => ExitCode::GeneralError,
        }
    }

    fn from_vector_error(error: &VectorError) -> Self {
        match error {
            // A store whose vectors disagree with its records should halt
            // automation rather than produce wrong matches
            VectorError::InvalidFormat(_) | VectorError::VersionMismatch { .. } => {
                ExitCode::SnapshotCorrupted
            }
            VectorError::Storage(_) => ExitCode::IoError,
            VectorError::ModelInit(_) => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::BlockingError => "Blocking error - automation should halt",
            ExitCode::NotFound => "Not found",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::SnapshotCorrupted => "Snapshot corrupted",
        }
    }
}
