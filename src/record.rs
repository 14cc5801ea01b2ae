//! Record types stored by the entity store.

use crate::types::{EntityKind, RecordId};
use serde::{Deserialize, Serialize};

/// Scalar attributes of a record. All fields are replaced wholesale on
/// every upsert; there is no partial-field merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttributes {
    /// Seniority label, e.g. "Senior" or "Mid-level"
    pub seniority: String,

    /// Ordered skill tokens. For profiles these are the skills the person
    /// has; for postings they are the required skills.
    pub skills: Vec<String>,

    /// Industry tag
    pub industry: String,

    /// Free raw text: resume text for profiles, description for postings
    pub body: String,
}

impl RecordAttributes {
    pub fn new(
        seniority: impl Into<String>,
        skills: Vec<String>,
        industry: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            seniority: seniority.into(),
            skills,
            industry: industry.into(),
            body: body.into(),
        }
    }

    /// The skill tokens joined with `", "`, the form the overlap
    /// heuristic matches against.
    #[must_use]
    pub fn joined_skills(&self) -> String {
        self.skills.join(", ")
    }
}

/// A stored entity: one profile or one posting.
///
/// The surrogate `id` is assigned on first insert and never changes; the
/// `natural_key` is the sole identity used for upsert matching. Everything
/// else is replaced on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub kind: EntityKind,
    pub natural_key: String,
    pub attributes: RecordAttributes,

    /// Current embedding of the record's enriched text. Persisted through
    /// the vector segment file, not the JSON sidecar.
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl Record {
    pub fn new(
        id: RecordId,
        kind: EntityKind,
        natural_key: impl Into<String>,
        attributes: RecordAttributes,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id,
            kind,
            natural_key: natural_key.into(),
            attributes,
            embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_attributes() -> RecordAttributes {
        RecordAttributes::new(
            "Senior",
            vec!["Rust".to_string(), "SQL".to_string()],
            "Tech",
            "Systems engineer with storage background",
        )
    }

    #[test]
    fn test_joined_skills() {
        let attrs = RecordAttributes::new(
            "Senior",
            vec!["React".to_string(), "Node.js".to_string(), "AWS".to_string()],
            "Tech",
            "text",
        );
        assert_eq!(attrs.joined_skills(), "React, Node.js, AWS");

        let empty = RecordAttributes::new("Junior", Vec::new(), "Tech", "text");
        assert_eq!(empty.joined_skills(), "");
    }

    #[test]
    fn test_record_json_skips_embedding() {
        let record = Record::new(
            RecordId(3),
            EntityKind::Profile,
            "Jane Doe",
            test_attributes(),
            vec![0.5; 8],
        );

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("embedding"));

        let restored: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, record.id);
        assert_eq!(restored.natural_key, record.natural_key);
        assert!(restored.embedding.is_empty());
    }
}
