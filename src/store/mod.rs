//! Record storage and the shared dual-store context.
//!
//! [`EntityStore`] holds the records of one kind, keyed by natural key
//! for upserts and by [`RecordId`](crate::types::RecordId) for resolution.
//! [`MatchStore`] pairs each entity store with its vector index behind a
//! per-kind lock and is the only way to mutate either.

mod context;
mod entity;
mod metadata;

pub use context::{KindState, MatchStore, StoreError};
pub use entity::EntityStore;
pub use metadata::StoreMetadata;
