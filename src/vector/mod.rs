//! Vector storage and exact nearest-neighbor search.
//!
//! Each entity kind owns one [`VectorIndex`] partition holding its
//! embeddings in memory, with [`MmapVectorStorage`] providing the on-disk
//! segment format for snapshots. Queries are exact brute-force scans under
//! squared Euclidean distance; partitions are small enough that no
//! approximate index structure is warranted.

mod index;
mod storage;
mod types;

// Re-export core types for public API
pub use index::{Neighbor, VectorIndex};
pub use storage::{MmapVectorStorage, vector_from_bytes, vector_to_bytes};
pub use types::{VECTOR_DIMENSION_768, VectorDimension, VectorError};
