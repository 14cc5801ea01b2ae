//! Type-safe counter for generating unique record IDs.
//!
//! This module provides a type-safe wrapper around record ID generation,
//! following the project's strict type safety guidelines to prevent
//! primitive obsession and ensure correct usage.

use std::num::NonZeroU32;

/// Type-safe counter for generating unique record IDs.
///
/// This type ensures that:
/// - Record IDs start at 1 (never 0)
/// - IDs are generated sequentially and never reused, even after a
///   partition is cleared
/// - The counter cannot be misused as a regular integer
#[derive(Debug, Clone)]
pub struct RecordCounter {
    next_id: NonZeroU32,
}

impl RecordCounter {
    /// Creates a new counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: NonZeroU32::new(1).expect("1 is non-zero"),
        }
    }

    /// Generates the next record ID and increments the counter.
    ///
    /// # Panics
    /// Panics if the counter would overflow (after 4 billion records).
    /// This is a theoretical limit that won't be reached in practice.
    pub fn next_id(&mut self) -> super::RecordId {
        let current = self.next_id;

        // Increment for next call
        // Safe: we start at 1 and won't realistically overflow
        self.next_id = NonZeroU32::new(
            current
                .get()
                .checked_add(1)
                .expect("Record counter overflow - partition has more than 4 billion records"),
        )
        .expect("Incremented value is non-zero");

        super::RecordId(current.get())
    }

    /// Returns the current count of IDs handed out.
    #[must_use]
    pub fn current_count(&self) -> u32 {
        self.next_id.get() - 1
    }

    /// Creates a counter that resumes after a specific value.
    ///
    /// Used when loading a snapshot so that new IDs continue past the
    /// highest persisted one.
    ///
    /// # Panics
    /// Panics if `start_from` is 0.
    pub fn from_value(start_from: u32) -> Self {
        Self {
            next_id: NonZeroU32::new(start_from).expect("Counter value must be non-zero"),
        }
    }
}

impl Default for RecordCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counter_starts_at_one() {
        let mut counter = RecordCounter::new();
        let first_id = counter.next_id();
        assert_eq!(first_id.0, 1);
    }

    #[test]
    fn test_record_counter_increments() {
        let mut counter = RecordCounter::new();
        let id1 = counter.next_id();
        let id2 = counter.next_id();
        let id3 = counter.next_id();

        assert_eq!(id1.0, 1);
        assert_eq!(id2.0, 2);
        assert_eq!(id3.0, 3);
    }

    #[test]
    fn test_current_count() {
        let mut counter = RecordCounter::new();
        assert_eq!(counter.current_count(), 0);

        counter.next_id();
        assert_eq!(counter.current_count(), 1);

        counter.next_id();
        counter.next_id();
        assert_eq!(counter.current_count(), 3);
    }

    #[test]
    fn test_from_value_resumes() {
        let mut counter = RecordCounter::from_value(8);
        assert_eq!(counter.next_id().0, 8);
        assert_eq!(counter.next_id().0, 9);
    }

    #[test]
    fn test_default_impl() {
        let counter = RecordCounter::default();
        assert_eq!(counter.current_count(), 0);
    }
}
