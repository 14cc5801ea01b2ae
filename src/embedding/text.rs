//! Deterministic text construction for embedding input.
//!
//! Records are not embedded from their raw body alone. Each kind has a
//! fixed enrichment template that folds the structured attributes into
//! prose, so semantically similar records land near each other even when
//! their free text differs. The same attributes always produce the same
//! text, byte for byte.

use crate::record::RecordAttributes;

/// How many skills the templates highlight in their bullet sections.
const HIGHLIGHTED_SKILLS: usize = 3;

fn top_skills(attributes: &RecordAttributes) -> Vec<&str> {
    attributes
        .skills
        .iter()
        .take(HIGHLIGHTED_SKILLS)
        .map(String::as_str)
        .collect()
}

/// Builds the embedding input for a profile.
///
/// The template front-loads the candidate's level, skills, and industry,
/// then appends the raw resume body.
#[must_use]
pub fn profile_embedding_text(natural_key: &str, attributes: &RecordAttributes) -> String {
    let skills = attributes.joined_skills();
    let top = top_skills(attributes);
    format!(
        "\n  Candidate Profile: {name}\n  Experience Level: {seniority}\n  Core Skills: {skills}\n  Industry Experience: {industry}\n\n  Summary:\n  This candidate is a {seniority} professional specializing in {skills}.\n  They have a strong background in {industry}, with expertise in {skills}.\n\n  \u{2705} Key Qualifications:\n  - {bullets}\n  - Experience working in {industry} industry environments.\n  \n  \u{1f3af} Ideal Job Fit:\n  Positions requiring {alternatives}, with a focus on {industry}.\n\n  Resume Content:\n  {body}\n",
        name = natural_key,
        seniority = attributes.seniority,
        skills = skills,
        industry = attributes.industry,
        bullets = top.join("\n  - "),
        alternatives = top.join(" or "),
        body = attributes.body,
    )
}

/// Builds the embedding input for a posting.
///
/// The result is the title, a space, then the enriched description. The
/// raw posting body is deliberately absent: titles and structured
/// attributes carry the signal for postings.
#[must_use]
pub fn posting_embedding_text(natural_key: &str, attributes: &RecordAttributes) -> String {
    let skills = attributes.joined_skills();
    let primary = top_skills(attributes);
    let description = format!(
        "\n  JOB LISTING - {title}\n  Experience Level: {seniority}\n  Industry: {industry}\n\n  Role Overview:\n  This role is ideal for a {seniority} candidate with experience in {primary}.\n  The ideal candidate should have a strong background in {industry}.\n\n  \u{2705} Required Expertise:\n  - {bullets}\n  - Background in {industry} projects.\n\n  \u{1f3af} Best-Fit Candidates:\n  Professionals experienced in {skills}, ideally within {industry}.\n\n  Job Responsibilities:\n  - Utilize {primary} for day-to-day tasks.\n  - Work closely with cross-functional teams in the {industry} space.\n\n  KEYWORDS: {title}, {industry}, {skills}, {seniority}\n",
        title = natural_key,
        seniority = attributes.seniority,
        industry = attributes.industry,
        primary = primary.join(", "),
        bullets = primary.join("\n  - "),
        skills = skills,
    );
    format!("{natural_key} {description}")
}
