//! View Pipeline: pure derivation of the displayed roster.
//!
//! Deterministic and side-effect free: filter by recommendation, narrow by a
//! case-insensitive search term over name/email/skills, then stable-sort.
//! Re-run on every store or parameter change; output borrows from the input
//! slice, so nothing is copied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::{CandidateRecord, Recommendation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationFilter {
    All,
    Select,
    Reject,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    OverallScore,
    SkillsScore,
    ExperienceScore,
    EducationScore,
    ExperienceYears,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Ephemeral query describing the desired derived view. Owned by the caller
/// and passed in on every re-derivation.
#[derive(Debug, Clone)]
pub struct ViewParams {
    pub filter: RecommendationFilter,
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            filter: RecommendationFilter::All,
            search_term: String::new(),
            sort_key: SortKey::OverallScore,
            sort_direction: SortDirection::Desc,
        }
    }
}

/// Derives the displayed, ordered subset of `records` for `params`.
/// An empty input yields an empty view.
pub fn derive_view<'a>(
    records: &'a [CandidateRecord],
    params: &ViewParams,
) -> Vec<&'a CandidateRecord> {
    let term = params.search_term.trim().to_lowercase();

    let mut view: Vec<&CandidateRecord> = records
        .iter()
        .filter(|c| matches_filter(c, params.filter))
        .filter(|c| term.is_empty() || matches_search(c, &term))
        .collect();

    // Vec::sort_by is stable, so ties keep their pre-sort relative order.
    view.sort_by(|a, b| {
        let ordering = match params.sort_key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            key => numeric_key(a, key).total_cmp(&numeric_key(b, key)),
        };
        match params.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    view
}

/// Ids of the derived view, in display order. Feeds select-all.
pub fn visible_ids(view: &[&CandidateRecord]) -> Vec<Uuid> {
    view.iter().map(|c| c.id).collect()
}

fn matches_filter(candidate: &CandidateRecord, filter: RecommendationFilter) -> bool {
    match filter {
        RecommendationFilter::All => true,
        RecommendationFilter::Select => candidate.recommendation == Recommendation::Select,
        RecommendationFilter::Reject => candidate.recommendation == Recommendation::Reject,
        RecommendationFilter::Processing => candidate.recommendation == Recommendation::Processing,
    }
}

fn matches_search(candidate: &CandidateRecord, term_lower: &str) -> bool {
    candidate.name.to_lowercase().contains(term_lower)
        || candidate.email.to_lowercase().contains(term_lower)
        || candidate
            .skills
            .iter()
            .any(|s| s.to_lowercase().contains(term_lower))
}

fn numeric_key(candidate: &CandidateRecord, key: SortKey) -> f64 {
    match key {
        SortKey::OverallScore => candidate.overall_score,
        SortKey::SkillsScore => candidate.skills_score,
        SortKey::ExperienceScore => candidate.experience_score,
        SortKey::EducationScore => candidate.education_score,
        SortKey::ExperienceYears => candidate.experience_years,
        SortKey::Name => 0.0,
    }
}
