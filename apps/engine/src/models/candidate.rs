use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The scorer's verdict on a candidate.
/// Closed enum: the backend only ever emits these four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Select,
    Reject,
    Processing,
    Pending,
}

/// One scored applicant, as returned by the remote scoring service.
///
/// `overall_score` is a function of the three sub-scores but is trusted
/// verbatim; the engine never recomputes it. Records are never deleted by
/// the engine; the only local mutation is tag append via the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub reason: String,
    pub resume_text: Option<String>,
    pub tags: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_wire_format_is_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Recommendation::Select).unwrap(),
            "\"SELECT\""
        );
        assert_eq!(
            serde_json::from_str::<Recommendation>("\"PROCESSING\"").unwrap(),
            Recommendation::Processing
        );
    }

    #[test]
    fn test_candidate_round_trips_backend_json() {
        let json = r#"{
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": null,
            "skills": ["Rust", "Mathematics"],
            "experience_years": 7.0,
            "skills_score": 92.0,
            "experience_score": 80.0,
            "education_score": 95.0,
            "overall_score": 89.0,
            "recommendation": "SELECT",
            "reason": "Strong systems background",
            "resume_text": null,
            "tags": [],
            "uploaded_at": "2025-05-01T12:00:00Z"
        }"#;
        let record: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.recommendation, Recommendation::Select);
        assert_eq!(record.skills.len(), 2);
    }
}
