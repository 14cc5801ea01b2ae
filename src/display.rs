//! Table formatting and terminal styling for CLI output.

use crate::engine::MatchHit;
use comfy_table::{
    Attribute, Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

/// Check if color output should be disabled.
pub fn should_disable_colors() -> bool {
    std::env::var("NO_COLOR").is_ok() || !console::Term::stdout().is_term()
}

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        // Apply rounded corners
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Human-readable rating tier for a similarity score.
///
/// Thresholds mirror the demo output: scores at or above 0.9 read as a
/// perfect match, and anything under 0.4 reads as no match at all. Scores
/// from the profile direction can sit outside [0, 1]; they fall into the
/// outer tiers naturally.
pub fn rating_label(similarity: f32) -> &'static str {
    if similarity >= 0.9 {
        "⭐⭐⭐ PERFECT MATCH"
    } else if similarity >= 0.75 {
        "⭐⭐ EXCELLENT MATCH"
    } else if similarity >= 0.6 {
        "⭐ GOOD MATCH"
    } else if similarity >= 0.5 {
        "🔹 POSSIBLE MATCH"
    } else if similarity >= 0.4 {
        "🔸 WEAK MATCH"
    } else {
        "❌ NO MATCH"
    }
}

/// Render ranked match hits as a table with percentages and rating tiers.
pub fn match_results_table(hits: &[MatchHit]) -> String {
    let mut builder =
        TableBuilder::new().set_headers(vec!["#", "Match", "Similarity", "Rating"]);

    for (index, hit) in hits.iter().enumerate() {
        builder = builder.add_row(vec![
            (index + 1).to_string(),
            hit.natural_key.clone(),
            format!("{:.2}%", hit.similarity * 100.0),
            rating_label(hit.similarity).to_string(),
        ]);
    }

    builder.build()
}

/// Render store counts for the status line after seeding or clearing.
pub fn counts_table(profiles: usize, postings: usize) -> String {
    TableBuilder::new()
        .set_headers(vec!["Partition", "Records"])
        .add_row(vec!["profiles".to_string(), profiles.to_string()])
        .add_row(vec!["postings".to_string(), postings.to_string()])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_tiers() {
        assert_eq!(rating_label(0.95), "⭐⭐⭐ PERFECT MATCH");
        assert_eq!(rating_label(0.9), "⭐⭐⭐ PERFECT MATCH");
        assert_eq!(rating_label(0.8), "⭐⭐ EXCELLENT MATCH");
        assert_eq!(rating_label(0.65), "⭐ GOOD MATCH");
        assert_eq!(rating_label(0.55), "🔹 POSSIBLE MATCH");
        assert_eq!(rating_label(0.45), "🔸 WEAK MATCH");
        assert_eq!(rating_label(0.1), "❌ NO MATCH");
        // Unclamped profile-direction scores fall into the outer tiers
        assert_eq!(rating_label(-2.0), "❌ NO MATCH");
        assert_eq!(rating_label(1.4), "⭐⭐⭐ PERFECT MATCH");
    }

    #[test]
    fn test_match_results_table_contains_rows() {
        let hits = vec![
            MatchHit {
                natural_key: "job-201".to_string(),
                similarity: 0.91,
            },
            MatchHit {
                natural_key: "job-204".to_string(),
                similarity: 0.42,
            },
        ];

        let table = match_results_table(&hits);
        assert!(table.contains("job-201"));
        assert!(table.contains("91.00%"));
        assert!(table.contains("PERFECT MATCH"));
        assert!(table.contains("job-204"));
        assert!(table.contains("WEAK MATCH"));
    }
}
