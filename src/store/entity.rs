//! Attribute store for one entity partition.

use crate::record::{Record, RecordAttributes};
use crate::types::{EntityKind, RecordCounter, RecordId, UpsertOutcome};
use std::collections::HashMap;

/// Keyed record store for a single entity kind.
///
/// Records are owned by surrogate ID with a secondary index on natural
/// key. The store has no interior locking; the owning
/// [`MatchStore`](crate::store::MatchStore) serializes access so that this
/// partition and its vector partition mutate as one unit.
#[derive(Debug, Clone)]
pub struct EntityStore {
    kind: EntityKind,
    records: HashMap<RecordId, Record>,
    by_key: HashMap<String, RecordId>,
    counter: RecordCounter,
}

impl EntityStore {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            records: HashMap::new(),
            by_key: HashMap::new(),
            counter: RecordCounter::new(),
        }
    }

    /// Rebuilds a partition from snapshot records.
    ///
    /// The counter resumes at `next_id` or past the highest restored ID,
    /// whichever is larger, so restored IDs are never handed out again.
    pub(crate) fn restore(kind: EntityKind, next_id: u32, records: Vec<Record>) -> Self {
        let mut store = Self::new(kind);

        let mut highest = 0;
        for record in records {
            highest = highest.max(record.id.value());
            store.by_key.insert(record.natural_key.clone(), record.id);
            store.records.insert(record.id, record);
        }

        store.counter = RecordCounter::from_value(next_id.max(highest + 1).max(1));
        store
    }

    /// Inserts a record under `natural_key`, or replaces the existing one.
    ///
    /// The natural key is the sole upsert identity: a present key keeps its
    /// surrogate ID and has attributes and embedding replaced wholesale; an
    /// absent key allocates the next ID. There is no partial-field merge.
    pub fn upsert(
        &mut self,
        natural_key: &str,
        attributes: RecordAttributes,
        embedding: Vec<f32>,
    ) -> UpsertOutcome {
        if let Some(&id) = self.by_key.get(natural_key) {
            let record = Record::new(id, self.kind, natural_key, attributes, embedding);
            self.records.insert(id, record);
            UpsertOutcome::Updated(id)
        } else {
            let id = self.counter.next_id();
            let record = Record::new(id, self.kind, natural_key, attributes, embedding);
            self.by_key.insert(natural_key.to_string(), id);
            self.records.insert(id, record);
            UpsertOutcome::Created(id)
        }
    }

    /// Finds a record by exact natural key. No normalization, trimming,
    /// or case folding is applied.
    #[must_use]
    pub fn lookup(&self, natural_key: &str) -> Option<&Record> {
        self.by_key
            .get(natural_key)
            .and_then(|id| self.records.get(id))
    }

    /// Maps a surrogate ID back to its record.
    #[must_use]
    pub fn resolve(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Removes every record from the partition.
    ///
    /// The ID counter is left untouched: surrogate IDs are never reused
    /// while the process lives, even across a clear.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_key.clear();
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// The next surrogate ID the counter would hand out. Persisted with
    /// snapshots so allocation continues after a reload.
    pub(crate) fn next_record_id(&self) -> u32 {
        self.counter.current_count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(seniority: &str, skills: &[&str]) -> RecordAttributes {
        RecordAttributes::new(
            seniority,
            skills.iter().map(|s| s.to_string()).collect(),
            "Tech",
            "body text",
        )
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let mut store = EntityStore::new(EntityKind::Profile);

        let first = store.upsert("Alice", attrs("Senior", &["Rust"]), vec![1.0]);
        assert!(first.was_created());

        let second = store.upsert("Alice", attrs("Staff", &["Rust", "Go"]), vec![2.0]);
        assert!(!second.was_created());
        assert_eq!(first.record_id(), second.record_id());
        assert_eq!(store.len(), 1);

        // Whole-record replacement: only the second call's data survives
        let record = store.lookup("Alice").unwrap();
        assert_eq!(record.attributes.seniority, "Staff");
        assert_eq!(record.attributes.skills, vec!["Rust", "Go"]);
        assert_eq!(record.embedding, vec![2.0]);
    }

    #[test]
    fn test_distinct_keys_get_distinct_ids() {
        let mut store = EntityStore::new(EntityKind::Posting);

        let a = store.upsert("Backend Engineer", attrs("Senior", &[]), vec![]);
        let b = store.upsert("Frontend Engineer", attrs("Junior", &[]), vec![]);

        assert_ne!(a.record_id(), b.record_id());
        assert_eq!(a.record_id().value(), 1);
        assert_eq!(b.record_id().value(), 2);
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let mut store = EntityStore::new(EntityKind::Profile);
        store.upsert("Alice Johnson", attrs("Senior", &[]), vec![]);

        assert!(store.lookup("Alice Johnson").is_some());
        assert!(store.lookup("alice johnson").is_none());
        assert!(store.lookup("Alice Johnson ").is_none());
        assert!(store.lookup("Alice").is_none());
    }

    #[test]
    fn test_resolve() {
        let mut store = EntityStore::new(EntityKind::Profile);
        let outcome = store.upsert("Alice", attrs("Senior", &[]), vec![]);

        let record = store.resolve(outcome.record_id()).unwrap();
        assert_eq!(record.natural_key, "Alice");

        assert!(store.resolve(RecordId(999)).is_none());
    }

    #[test]
    fn test_clear_keeps_counter_monotonic() {
        let mut store = EntityStore::new(EntityKind::Profile);
        store.upsert("Alice", attrs("Senior", &[]), vec![]);
        store.upsert("Bob", attrs("Junior", &[]), vec![]);

        store.clear();
        assert!(store.is_empty());
        assert!(store.lookup("Alice").is_none());

        // New records continue past the cleared IDs
        let outcome = store.upsert("Carol", attrs("Mid-level", &[]), vec![]);
        assert_eq!(outcome.record_id().value(), 3);
    }

    #[test]
    fn test_restore_resumes_counter() {
        let mut original = EntityStore::new(EntityKind::Profile);
        original.upsert("Alice", attrs("Senior", &[]), vec![]);
        original.upsert("Bob", attrs("Junior", &[]), vec![]);

        let records: Vec<Record> = original.iter().cloned().collect();
        let mut restored = EntityStore::restore(EntityKind::Profile, original.next_record_id(), records);

        assert_eq!(restored.len(), 2);
        assert!(restored.lookup("Alice").is_some());

        let outcome = restored.upsert("Carol", attrs("Mid-level", &[]), vec![]);
        assert_eq!(outcome.record_id().value(), 3);
    }
}
