//! Shared store context for the matching engine.
//!
//! `MatchStore` owns one record partition and one vector partition per
//! entity kind, each pair behind a single `RwLock`. Every mutation goes
//! through the pair's write guard, so the 1:1 mapping between records and
//! vectors holds at every instant a reader can observe.

use crate::config::Settings;
use crate::record::{Record, RecordAttributes};
use crate::store::entity::EntityStore;
use crate::store::metadata::StoreMetadata;
use crate::types::{EntityKind, RecordId, UpsertOutcome};
use crate::vector::{MmapVectorStorage, VectorDimension, VectorError, VectorIndex};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

const PROFILE_SEGMENT: &str = "profiles.vec";
const POSTING_SEGMENT: &str = "postings.vec";
const RECORDS_FILE: &str = "records.json";

/// Errors from store-level operations, mostly snapshot I/O.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {message}\nSuggestion: {suggestion}")]
    StorageError { message: String, suggestion: String },

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),
}

/// One kind's record partition and vector partition.
///
/// The two are locked and mutated together; holding a read guard over a
/// `KindState` is what makes a query's view of "record plus its vector"
/// a consistent snapshot.
#[derive(Debug)]
pub struct KindState {
    pub entities: EntityStore,
    pub vectors: VectorIndex,
}

impl KindState {
    fn new(kind: EntityKind, dimension: VectorDimension) -> Self {
        Self {
            entities: EntityStore::new(kind),
            vectors: VectorIndex::new(dimension),
        }
    }
}

/// The shared dual-store context.
///
/// Constructed once at startup and handed to the engine as an explicit
/// dependency; there is no ambient global store.
pub struct MatchStore {
    profiles: RwLock<KindState>,
    postings: RwLock<KindState>,
    dimension: VectorDimension,
    settings: Arc<Settings>,
}

impl MatchStore {
    /// Creates an empty store with default settings.
    #[must_use]
    pub fn new(dimension: VectorDimension) -> Self {
        Self::with_settings(dimension, Arc::new(Settings::default()))
    }

    /// Creates an empty store carrying the given settings.
    #[must_use]
    pub fn with_settings(dimension: VectorDimension, settings: Arc<Settings>) -> Self {
        Self {
            profiles: RwLock::new(KindState::new(EntityKind::Profile, dimension)),
            postings: RwLock::new(KindState::new(EntityKind::Posting, dimension)),
            dimension,
            settings,
        }
    }

    fn partition(&self, kind: EntityKind) -> &RwLock<KindState> {
        match kind {
            EntityKind::Profile => &self.profiles,
            EntityKind::Posting => &self.postings,
        }
    }

    /// Takes a read guard over one kind's partition pair.
    ///
    /// Queries resolve records and scan vectors under this single guard,
    /// so a concurrent commit or clear is observed entirely or not at all.
    pub fn read(&self, kind: EntityKind) -> RwLockReadGuard<'_, KindState> {
        self.partition(kind).read()
    }

    /// Applies one upsert to both partitions under a single write guard.
    ///
    /// The vector is validated before either store is touched, so a
    /// rejected vector leaves no trace. Concurrent commits to the same
    /// natural key resolve in guard-acquisition order, last write wins.
    pub fn commit(
        &self,
        kind: EntityKind,
        natural_key: &str,
        attributes: RecordAttributes,
        embedding: Vec<f32>,
    ) -> Result<UpsertOutcome, VectorError> {
        self.dimension.validate_vector(&embedding)?;

        let mut state = self.partition(kind).write();
        let outcome = state
            .entities
            .upsert(natural_key, attributes, embedding.clone());
        // Validated above against the same dimension, so this cannot fail
        // between the two writes.
        state.vectors.replace(outcome.record_id(), embedding)?;

        debug!(
            kind = %kind,
            id = outcome.record_id().value(),
            created = outcome.was_created(),
            "committed {natural_key}"
        );
        Ok(outcome)
    }

    /// Empties both partitions of `kind` under one write guard.
    ///
    /// Readers see either the full pre-clear state or the empty state,
    /// never a half-cleared pair. ID counters are not reset.
    pub fn clear(&self, kind: EntityKind) {
        let mut state = self.partition(kind).write();
        state.entities.clear();
        state.vectors.clear();
        debug!(kind = %kind, "partition cleared");
    }

    /// Number of records currently stored for `kind`.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.read(kind).entities.len()
    }

    /// Vector dimension all partitions enforce.
    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Checks whether `dir` holds a previously saved snapshot.
    #[must_use]
    pub fn snapshot_exists(dir: &Path) -> bool {
        StoreMetadata::exists(dir)
    }

    /// Writes a full snapshot of both kinds to `dir`.
    ///
    /// Layout: one vector segment per kind, a JSON sidecar with records
    /// and ID counters, and metadata describing the embedding model.
    pub fn save(&self, dir: &Path) -> Result<(), StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::StorageError {
            message: format!("Failed to create snapshot directory: {e}"),
            suggestion: "Check disk space and file permissions".to_string(),
        })?;

        let profiles = self.profiles.read();
        let postings = self.postings.read();

        Self::save_segment(&profiles, &dir.join(PROFILE_SEGMENT), self.dimension)?;
        Self::save_segment(&postings, &dir.join(POSTING_SEGMENT), self.dimension)?;

        let records = RecordsFile {
            profiles: PartitionRecords {
                next_id: profiles.entities.next_record_id(),
                records: profiles.entities.iter().cloned().collect(),
            },
            postings: PartitionRecords {
                next_id: postings.entities.next_record_id(),
                records: postings.entities.iter().cloned().collect(),
            },
        };
        let json = serde_json::to_string_pretty(&records).map_err(|e| StoreError::StorageError {
            message: format!("Failed to serialize records: {e}"),
            suggestion: "This is likely a bug in the code".to_string(),
        })?;
        std::fs::write(dir.join(RECORDS_FILE), json).map_err(|e| StoreError::StorageError {
            message: format!("Failed to write records: {e}"),
            suggestion: "Check disk space and file permissions".to_string(),
        })?;

        let metadata = StoreMetadata::new(
            self.settings.embedding.model.clone(),
            self.dimension.get(),
            profiles.entities.len(),
            postings.entities.len(),
        );
        metadata.save(dir)?;

        info!(
            profiles = profiles.entities.len(),
            postings = postings.entities.len(),
            "snapshot saved to {}",
            dir.display()
        );
        Ok(())
    }

    /// Loads a snapshot written by [`save`](Self::save).
    ///
    /// Each record's embedding is re-attached from the vector segments;
    /// any disagreement between the sidecar and a segment fails the load,
    /// so a loaded store always starts consistent.
    pub fn load(dir: &Path, settings: Arc<Settings>) -> Result<Self, StoreError> {
        let metadata = StoreMetadata::load(dir)?;
        let dimension = VectorDimension::new(metadata.dimension)?;

        let json =
            std::fs::read_to_string(dir.join(RECORDS_FILE)).map_err(|e| StoreError::StorageError {
                message: format!("Failed to read records: {e}"),
                suggestion: "Check if snapshot data exists at the specified path".to_string(),
            })?;
        let records: RecordsFile =
            serde_json::from_str(&json).map_err(|e| StoreError::StorageError {
                message: format!("Failed to parse records: {e}"),
                suggestion: "The records file may be corrupted. Try rebuilding the snapshot."
                    .to_string(),
            })?;

        let profiles = Self::load_partition(
            EntityKind::Profile,
            records.profiles,
            &dir.join(PROFILE_SEGMENT),
            dimension,
        )?;
        let postings = Self::load_partition(
            EntityKind::Posting,
            records.postings,
            &dir.join(POSTING_SEGMENT),
            dimension,
        )?;

        info!(
            profiles = profiles.entities.len(),
            postings = postings.entities.len(),
            "snapshot loaded from {}",
            dir.display()
        );

        Ok(Self {
            profiles: RwLock::new(profiles),
            postings: RwLock::new(postings),
            dimension,
            settings,
        })
    }

    fn save_segment(
        state: &KindState,
        path: &Path,
        dimension: VectorDimension,
    ) -> Result<(), StoreError> {
        let vectors: Vec<(RecordId, &[f32])> = state.vectors.iter().collect();
        let mut storage = MmapVectorStorage::create(path, dimension);
        storage.write_all(&vectors)?;
        Ok(())
    }

    fn load_partition(
        kind: EntityKind,
        partition: PartitionRecords,
        segment_path: &Path,
        dimension: VectorDimension,
    ) -> Result<KindState, StoreError> {
        let mut storage = MmapVectorStorage::open(segment_path)?;
        let mut by_id: HashMap<RecordId, Vec<f32>> = storage.read_all()?.into_iter().collect();

        let mut records = Vec::with_capacity(partition.records.len());
        for mut record in partition.records {
            let embedding =
                by_id
                    .remove(&record.id)
                    .ok_or_else(|| StoreError::StorageError {
                        message: format!(
                            "Snapshot has no vector for {kind} record {} ({})",
                            record.id.value(),
                            record.natural_key
                        ),
                        suggestion: "The snapshot is inconsistent. Rebuild it from source data."
                            .to_string(),
                    })?;
            record.embedding = embedding;
            records.push(record);
        }

        if let Some((id, _)) = by_id.into_iter().next() {
            return Err(StoreError::StorageError {
                message: format!(
                    "Snapshot has a vector for unknown {kind} record {}",
                    id.value()
                ),
                suggestion: "The snapshot is inconsistent. Rebuild it from source data."
                    .to_string(),
            });
        }

        let mut vectors = VectorIndex::new(dimension);
        for record in &records {
            vectors.replace(record.id, record.embedding.clone())?;
        }

        Ok(KindState {
            entities: EntityStore::restore(kind, partition.next_id, records),
            vectors,
        })
    }
}

impl std::fmt::Debug for MatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchStore")
            .field("profiles", &self.count(EntityKind::Profile))
            .field("postings", &self.count(EntityKind::Posting))
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct RecordsFile {
    profiles: PartitionRecords,
    postings: PartitionRecords,
}

#[derive(Serialize, Deserialize)]
struct PartitionRecords {
    next_id: u32,
    records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_store() -> MatchStore {
        MatchStore::new(VectorDimension::new(4).unwrap())
    }

    fn attrs(skills: &[&str]) -> RecordAttributes {
        RecordAttributes::new(
            "Senior",
            skills.iter().map(|s| s.to_string()).collect(),
            "Tech",
            "body",
        )
    }

    /// Every record must have exactly its own vector in the index.
    fn assert_consistent(store: &MatchStore, kind: EntityKind) {
        let state = store.read(kind);
        assert_eq!(state.entities.len(), state.vectors.len());
        for record in state.entities.iter() {
            let vector = state
                .vectors
                .get(record.id)
                .unwrap_or_else(|| panic!("no vector for record {}", record.id.value()));
            assert_eq!(vector, record.embedding.as_slice());
        }
    }

    #[test]
    fn test_commit_keeps_partitions_in_lockstep() {
        let store = small_store();

        let outcome = store
            .commit(
                EntityKind::Profile,
                "Alice",
                attrs(&["Rust"]),
                vec![1.0, 0.0, 0.0, 0.0],
            )
            .unwrap();
        assert!(outcome.was_created());

        store
            .commit(
                EntityKind::Profile,
                "Alice",
                attrs(&["Rust", "Go"]),
                vec![0.0, 1.0, 0.0, 0.0],
            )
            .unwrap();

        assert_eq!(store.count(EntityKind::Profile), 1);
        assert_consistent(&store, EntityKind::Profile);

        let state = store.read(EntityKind::Profile);
        let record = state.entities.lookup("Alice").unwrap();
        assert_eq!(record.embedding, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_commit_rejects_bad_vector_without_trace() {
        let store = small_store();

        let result = store.commit(
            EntityKind::Profile,
            "Alice",
            attrs(&[]),
            vec![1.0, 0.0], // wrong dimension
        );
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));

        let nan = store.commit(
            EntityKind::Profile,
            "Alice",
            attrs(&[]),
            vec![1.0, f32::NAN, 0.0, 0.0],
        );
        assert!(nan.is_err());

        assert_eq!(store.count(EntityKind::Profile), 0);
        assert!(store.read(EntityKind::Profile).vectors.is_empty());
    }

    #[test]
    fn test_clear_is_kind_scoped() {
        let store = small_store();
        store
            .commit(EntityKind::Profile, "Alice", attrs(&[]), vec![1.0; 4])
            .unwrap();
        store
            .commit(EntityKind::Posting, "Backend Engineer", attrs(&[]), vec![2.0; 4])
            .unwrap();

        store.clear(EntityKind::Profile);

        assert_eq!(store.count(EntityKind::Profile), 0);
        assert_eq!(store.count(EntityKind::Posting), 1);
        assert_consistent(&store, EntityKind::Profile);
        assert_consistent(&store, EntityKind::Posting);

        // IDs keep counting past the cleared partition
        let outcome = store
            .commit(EntityKind::Profile, "Bob", attrs(&[]), vec![3.0; 4])
            .unwrap();
        assert_eq!(outcome.record_id().value(), 2);
    }

    #[test]
    fn test_concurrent_commits_stay_consistent() {
        use std::thread;

        let store = Arc::new(small_store());

        let mut handles = Vec::new();
        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..25 {
                    let key = format!("person-{t}-{i}");
                    store
                        .commit(
                            EntityKind::Profile,
                            &key,
                            attrs(&["Rust"]),
                            vec![t as f32, i as f32, 0.0, 0.0],
                        )
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count(EntityKind::Profile), 100);
        assert_consistent(&store, EntityKind::Profile);

        // All IDs are distinct
        let state = store.read(EntityKind::Profile);
        let mut ids: Vec<u32> = state.entities.iter().map(|r| r.id.value()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = small_store();

        store
            .commit(
                EntityKind::Profile,
                "Alice",
                attrs(&["Rust", "SQL"]),
                vec![-0.0, 0.5, -1.25, 3.0e-7],
            )
            .unwrap();
        store
            .commit(EntityKind::Posting, "Backend Engineer", attrs(&["Rust"]), vec![0.25; 4])
            .unwrap();

        store.save(temp_dir.path()).unwrap();
        assert!(MatchStore::snapshot_exists(temp_dir.path()));

        let loaded =
            MatchStore::load(temp_dir.path(), Arc::new(Settings::default())).unwrap();
        assert_eq!(loaded.count(EntityKind::Profile), 1);
        assert_eq!(loaded.count(EntityKind::Posting), 1);
        assert_consistent(&loaded, EntityKind::Profile);
        assert_consistent(&loaded, EntityKind::Posting);

        {
            let state = loaded.read(EntityKind::Profile);
            let record = state.entities.lookup("Alice").unwrap();
            assert_eq!(record.attributes.skills, vec!["Rust", "SQL"]);
            // Embeddings survive bit-exactly, including the sign of -0.0
            assert_eq!(record.embedding[0].to_bits(), (-0.0f32).to_bits());
            assert_eq!(record.embedding, vec![-0.0, 0.5, -1.25, 3.0e-7]);
        }

        // ID allocation resumes past persisted IDs
        let outcome = loaded
            .commit(EntityKind::Profile, "Bob", attrs(&[]), vec![1.0; 4])
            .unwrap();
        assert_eq!(outcome.record_id().value(), 2);
    }

    #[test]
    fn test_load_rejects_missing_vector() {
        let temp_dir = TempDir::new().unwrap();
        let store = small_store();
        store
            .commit(EntityKind::Profile, "Alice", attrs(&[]), vec![1.0; 4])
            .unwrap();
        store.save(temp_dir.path()).unwrap();

        // Truncate the profile segment to just its header: record 1 loses
        // its vector
        let segment = temp_dir.path().join(PROFILE_SEGMENT);
        let bytes = std::fs::read(&segment).unwrap();
        let mut header = bytes[..16].to_vec();
        header[12..16].copy_from_slice(&0u32.to_le_bytes());
        std::fs::write(&segment, header).unwrap();

        let result = MatchStore::load(temp_dir.path(), Arc::new(Settings::default()));
        match result {
            Err(StoreError::StorageError { message, .. }) => {
                assert!(message.contains("no vector"));
            }
            other => panic!("expected StorageError, got {:?}", other.err()),
        }
    }
}
