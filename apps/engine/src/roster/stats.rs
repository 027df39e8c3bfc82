//! Roster summary statistics for the analytics surface.

use serde::Serialize;

use crate::models::candidate::{CandidateRecord, Recommendation};

/// Aggregates over the full (unfiltered) roster.
#[derive(Debug, Clone, Serialize)]
pub struct RosterStats {
    pub total: usize,
    pub selected: usize,
    pub rejected: usize,
    pub processing: usize,
    pub avg_overall_score: f64,
    pub avg_skills_score: f64,
    pub avg_experience_score: f64,
    pub avg_education_score: f64,
    /// Overall-score histogram: 0–20, 21–40, 41–60, 61–80, 81–100.
    pub score_distribution: [usize; 5],
}

impl RosterStats {
    pub fn from_records(records: &[CandidateRecord]) -> Self {
        let count = |r: Recommendation| records.iter().filter(|c| c.recommendation == r).count();
        let avg = |f: fn(&CandidateRecord) -> f64| {
            if records.is_empty() {
                0.0
            } else {
                records.iter().map(f).sum::<f64>() / records.len() as f64
            }
        };

        let mut score_distribution = [0usize; 5];
        for c in records {
            let bucket = match c.overall_score {
                s if s <= 20.0 => 0,
                s if s <= 40.0 => 1,
                s if s <= 60.0 => 2,
                s if s <= 80.0 => 3,
                _ => 4,
            };
            score_distribution[bucket] += 1;
        }

        Self {
            total: records.len(),
            selected: count(Recommendation::Select),
            rejected: count(Recommendation::Reject),
            processing: count(Recommendation::Processing),
            avg_overall_score: avg(|c| c.overall_score),
            avg_skills_score: avg(|c| c.skills_score),
            avg_experience_score: avg(|c| c.experience_score),
            avg_education_score: avg(|c| c.education_score),
            score_distribution,
        }
    }
}
