//! Brute-force exact nearest-neighbor index over one entity partition.
//!
//! Every query scans all stored vectors and computes squared Euclidean
//! distance. Partitions hold at most a few thousand entries, so the exact
//! scan stays well under a millisecond and needs no approximate index
//! structure.

use crate::types::RecordId;
use crate::vector::{VectorDimension, VectorError};
use std::collections::BTreeMap;

/// One query result: a stored record and its squared Euclidean distance
/// from the query vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: RecordId,
    pub distance: f32,
}

/// In-memory vector index for a single entity kind.
///
/// Entries are keyed by record ID in a `BTreeMap` so iteration order is
/// deterministic and equal-distance results tie-break by ascending ID.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: BTreeMap<RecordId, Vec<f32>>,
    dimension: VectorDimension,
}

impl VectorIndex {
    /// Creates an empty index for vectors of the given dimension.
    #[must_use]
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            entries: BTreeMap::new(),
            dimension,
        }
    }

    /// Inserts or replaces the vector stored under `id`.
    ///
    /// The vector is validated before the entry is touched, so a rejected
    /// vector leaves the previous entry intact.
    pub fn replace(&mut self, id: RecordId, vector: Vec<f32>) -> Result<(), VectorError> {
        self.dimension.validate_vector(&vector)?;
        self.entries.insert(id, vector);
        Ok(())
    }

    /// Removes the entry for `id`, if present.
    pub fn remove(&mut self, id: RecordId) -> Option<Vec<f32>> {
        self.entries.remove(&id)
    }

    /// Returns the `k` nearest stored vectors to `query`, closest first.
    ///
    /// Distances are squared Euclidean. Results are ordered by ascending
    /// distance with ties broken by ascending record ID; fewer than `k`
    /// entries returns all of them.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorError> {
        self.dimension.validate_vector(query)?;

        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<Neighbor> = self
            .entries
            .iter()
            .map(|(id, vector)| Neighbor {
                id: *id,
                distance: squared_euclidean(query, vector),
            })
            .collect();

        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        candidates.truncate(k);

        Ok(candidates)
    }

    /// Removes every entry from the index.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the stored vector for `id`, if present.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&[f32]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Returns the number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the vector dimension.
    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Iterates over all entries in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &[f32])> {
        self.entries.iter().map(|(id, v)| (*id, v.as_slice()))
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
