//! The matching engine: embedding-backed upserts and similarity queries.
//!
//! Upserts run in two phases. Embedding happens first with no locks held,
//! so slow model calls from different callers interleave freely. The
//! finished embedding then commits to both stores in one locked step, and
//! concurrent writers to the same key resolve by commit order.
//!
//! The two query directions score differently on purpose. Profiles ranked
//! for a posting carry the raw converted distance, which can exceed the
//! [0, 1] range. Postings ranked for a profile clamp the base score, add
//! a per-skill overlap boost, cap at 1.0, and re-sort. Callers comparing
//! the two directions should expect different scales.

use crate::config::Settings;
use crate::debug_print;
use crate::embedding::{EmbeddingProvider, posting_embedding_text, profile_embedding_text};
use crate::error::{MatchError, MatchResult};
use crate::record::RecordAttributes;
use crate::store::MatchStore;
use crate::types::{EntityKind, UpsertOutcome};
use crate::vector::VectorError;
use std::sync::Arc;

/// Boost added per overlapping skill when ranking postings for a profile.
pub const DEFAULT_SKILL_BOOST: f32 = 0.05;

/// Default number of matches returned by the find operations.
pub const DEFAULT_MATCH_LIMIT: usize = 3;

/// One ranked match from a find operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchHit {
    /// Natural key of the matched record.
    pub natural_key: String,
    /// Similarity score. See the module docs for the per-direction scale.
    pub similarity: f32,
}

/// Embedding-backed matching over a shared [`MatchStore`].
pub struct MatchEngine {
    store: Arc<MatchStore>,
    provider: Arc<dyn EmbeddingProvider>,
    skill_boost: f32,
}

impl MatchEngine {
    /// Creates an engine with the default skill boost.
    ///
    /// # Errors
    /// Returns an error if the provider's dimension does not match the
    /// store's.
    pub fn new(store: Arc<MatchStore>, provider: Arc<dyn EmbeddingProvider>) -> MatchResult<Self> {
        Self::build(store, provider, DEFAULT_SKILL_BOOST)
    }

    /// Creates an engine configured from settings.
    ///
    /// # Errors
    /// Returns an error if the provider's dimension does not match the
    /// store's.
    pub fn with_settings(
        store: Arc<MatchStore>,
        provider: Arc<dyn EmbeddingProvider>,
        settings: &Settings,
    ) -> MatchResult<Self> {
        Self::build(store, provider, settings.matching.skill_boost)
    }

    fn build(
        store: Arc<MatchStore>,
        provider: Arc<dyn EmbeddingProvider>,
        skill_boost: f32,
    ) -> MatchResult<Self> {
        if store.dimension() != provider.dimension() {
            return Err(MatchError::Vector(VectorError::DimensionMismatch {
                expected: store.dimension().get(),
                actual: provider.dimension().get(),
            }));
        }
        Ok(Self {
            store,
            provider,
            skill_boost,
        })
    }

    /// Inserts or replaces the profile stored under `natural_key`.
    ///
    /// An existing record with the same key is overwritten wholesale and
    /// keeps its ID; the returned outcome says which of the two happened.
    pub fn upsert_profile(
        &self,
        natural_key: &str,
        attributes: RecordAttributes,
    ) -> MatchResult<UpsertOutcome> {
        let text = profile_embedding_text(natural_key, &attributes);
        debug_print!("Embedding profile '{}' ({} chars)", natural_key, text.len());
        let embedding = self.embed_one(&text)?;
        let outcome = self
            .store
            .commit(EntityKind::Profile, natural_key, attributes, embedding)?;
        Ok(outcome)
    }

    /// Inserts or replaces the posting stored under `natural_key`.
    ///
    /// Same contract as [`upsert_profile`](Self::upsert_profile), for the
    /// posting partition.
    pub fn upsert_posting(
        &self,
        natural_key: &str,
        attributes: RecordAttributes,
    ) -> MatchResult<UpsertOutcome> {
        let text = posting_embedding_text(natural_key, &attributes);
        debug_print!("Embedding posting '{}' ({} chars)", natural_key, text.len());
        let embedding = self.embed_one(&text)?;
        let outcome = self
            .store
            .commit(EntityKind::Posting, natural_key, attributes, embedding)?;
        Ok(outcome)
    }

    /// Finds the profiles nearest to the posting stored under
    /// `posting_key`.
    ///
    /// Results come back in ascending distance order with similarity
    /// `1 - distance`, unclamped. An unknown key yields an empty list,
    /// not an error.
    pub fn find_matching_profiles(
        &self,
        posting_key: &str,
        limit: usize,
    ) -> MatchResult<Vec<MatchHit>> {
        // Clone the query vector and release the posting guard before
        // touching the profile partition; holding one guard at a time
        // keeps opposite-direction queries deadlock-free.
        let embedding = {
            let postings = self.store.read(EntityKind::Posting);
            match postings.entities.lookup(posting_key) {
                Some(record) => record.embedding.clone(),
                None => return Ok(Vec::new()),
            }
        };

        let profiles = self.store.read(EntityKind::Profile);
        let neighbors = profiles.vectors.query(&embedding, limit)?;

        let hits = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                profiles.entities.resolve(neighbor.id).map(|record| MatchHit {
                    natural_key: record.natural_key.clone(),
                    similarity: 1.0 - neighbor.distance,
                })
            })
            .collect();
        Ok(hits)
    }

    /// Finds the postings best suited to the profile stored under
    /// `profile_key`.
    ///
    /// The base score is `1 - distance` clamped to [0, 1]. Each profile
    /// skill that appears as a substring of the posting's joined skill
    /// list adds the configured boost, the total caps at 1.0, and results
    /// re-sort by final score descending. An unknown key yields an empty
    /// list, not an error.
    pub fn find_matching_postings(
        &self,
        profile_key: &str,
        limit: usize,
    ) -> MatchResult<Vec<MatchHit>> {
        let (embedding, profile_skills) = {
            let profiles = self.store.read(EntityKind::Profile);
            match profiles.entities.lookup(profile_key) {
                Some(record) => (record.embedding.clone(), record.attributes.joined_skills()),
                None => return Ok(Vec::new()),
            }
        };

        let postings = self.store.read(EntityKind::Posting);
        let neighbors = postings.vectors.query(&embedding, limit)?;

        let mut hits: Vec<MatchHit> = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                postings.entities.resolve(neighbor.id).map(|record| {
                    let base = (1.0 - neighbor.distance).clamp(0.0, 1.0);
                    let overlap =
                        skill_overlap(&profile_skills, &record.attributes.joined_skills());
                    let similarity = (base + overlap as f32 * self.skill_boost).min(1.0);
                    MatchHit {
                        natural_key: record.natural_key.clone(),
                        similarity,
                    }
                })
            })
            .collect();

        // Stable sort: equal scores keep their ascending-distance order
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Ok(hits)
    }

    /// Removes every profile and its vector.
    pub fn clear_profiles(&self) {
        self.store.clear(EntityKind::Profile);
    }

    /// Removes every posting and its vector.
    pub fn clear_postings(&self) {
        self.store.clear(EntityKind::Posting);
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        let mut embeddings = self.provider.generate_embeddings(&[text])?;
        embeddings.pop().ok_or_else(|| {
            VectorError::EmbeddingFailed("Model returned no embedding for input text".to_string())
        })
    }
}

/// Counts profile skill tokens that appear in a posting's joined skills.
///
/// Both sides are ", "-joined strings and the test is plain substring
/// containment, so "Java" counts against "JavaScript". Splitting an
/// empty profile skill list yields one empty token, which every posting
/// contains.
fn skill_overlap(profile_skills: &str, posting_skills: &str) -> usize {
    profile_skills
        .split(", ")
        .filter(|skill| posting_skills.contains(skill))
        .count()
}
