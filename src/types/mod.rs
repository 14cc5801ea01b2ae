mod record_counter;

pub use record_counter::RecordCounter;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Type-safe wrapper for record IDs.
///
/// Surrogate IDs are assigned by [`RecordCounter`] starting at 1 and are
/// never reused within a process lifetime, so zero is reserved as an
/// invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl RecordId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Convert to the underlying u32 value
    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// Converts to little-endian bytes for storage.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Creates from little-endian bytes.
    ///
    /// Returns `None` if the bytes represent zero.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        Self::new(u32::from_le_bytes(bytes))
    }
}

/// The two kinds of entities the matcher stores.
///
/// Each kind owns its own record partition and its own vector partition;
/// the two are never mixed in one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Profile,
    Posting,
}

impl EntityKind {
    /// The opposite kind, i.e. the partition queried when matching.
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            EntityKind::Profile => EntityKind::Posting,
            EntityKind::Posting => EntityKind::Profile,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Profile => "profile",
            EntityKind::Posting => "posting",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile" | "profiles" => Ok(EntityKind::Profile),
            "posting" | "postings" => Ok(EntityKind::Posting),
            _ => Err("Unknown entity kind"),
        }
    }
}

/// Result of an upsert operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A record was newly created under this natural key
    Created(RecordId),
    /// An existing record with the same natural key was replaced.
    ///
    /// Natural keys are the sole upsert identity, so two distinct
    /// real-world entities sharing a key silently overwrite each other.
    /// Callers that care can detect it here.
    Updated(RecordId),
}

impl UpsertOutcome {
    pub fn record_id(&self) -> RecordId {
        match self {
            UpsertOutcome::Created(id) => *id,
            UpsertOutcome::Updated(id) => *id,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_creation() {
        assert!(RecordId::new(0).is_none());

        let id = RecordId::new(42).unwrap();
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_record_id_serialization() {
        let id = RecordId::new(12345).unwrap();
        let bytes = id.to_bytes();
        let deserialized = RecordId::from_bytes(bytes).unwrap();
        assert_eq!(id, deserialized);

        assert!(RecordId::from_bytes([0, 0, 0, 0]).is_none());
    }

    #[test]
    fn test_entity_kind_other() {
        assert_eq!(EntityKind::Profile.other(), EntityKind::Posting);
        assert_eq!(EntityKind::Posting.other(), EntityKind::Profile);
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("profile".parse::<EntityKind>(), Ok(EntityKind::Profile));
        assert_eq!("postings".parse::<EntityKind>(), Ok(EntityKind::Posting));
        assert!("resume".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_upsert_outcome() {
        let id = RecordId::new(7).unwrap();
        let created = UpsertOutcome::Created(id);
        let updated = UpsertOutcome::Updated(id);

        assert!(created.was_created());
        assert!(!updated.was_created());
        assert_eq!(created.record_id(), updated.record_id());
    }

    #[test]
    fn test_id_equality_and_hash() {
        let id1 = RecordId::new(42).unwrap();
        let id2 = RecordId::new(42).unwrap();
        let id3 = RecordId::new(43).unwrap();

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);

        // Test that they can be used in HashMaps
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(id1);
        assert!(set.contains(&id2));
        assert!(!set.contains(&id3));
    }
}
