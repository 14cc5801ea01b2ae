/// The main library module for jobmatch
// Debug macro for consistent debug output
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        if $crate::config::is_global_debug_enabled() {
            eprintln!("DEBUG: {}", format!($($arg)*));
        }
    };
}

pub mod config;
pub mod display;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod io;
pub mod record;
pub mod store;
pub mod types;
pub mod vector;

// Explicit exports for better API clarity
pub use config::Settings;
pub use embedding::{EmbeddingProvider, FastEmbedProvider};
pub use engine::{DEFAULT_MATCH_LIMIT, DEFAULT_SKILL_BOOST, MatchEngine, MatchHit};
pub use error::{MatchError, MatchResult};
pub use record::{Record, RecordAttributes};
pub use store::{EntityStore, MatchStore, StoreError, StoreMetadata};
pub use types::{EntityKind, RecordId, UpsertOutcome};
pub use vector::{VECTOR_DIMENSION_768, VectorDimension, VectorError, VectorIndex};
