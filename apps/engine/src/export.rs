//! CSV export of candidate records.
//!
//! Pure, stateless serialization with a fixed byte-level contract: every
//! field quoted, embedded quotes doubled, skills joined with `"; "`, rows
//! joined with `\n`.

use bytes::Bytes;

use crate::models::candidate::CandidateRecord;

const HEADERS: [&str; 12] = [
    "Name",
    "Email",
    "Phone",
    "Skills",
    "Experience Years",
    "Skills Score",
    "Experience Score",
    "Education Score",
    "Overall Score",
    "Recommendation",
    "Reason",
    "Uploaded At",
];

pub fn export_csv(records: &[CandidateRecord]) -> Bytes {
    let mut rows: Vec<String> = Vec::with_capacity(records.len() + 1);
    rows.push(csv_row(HEADERS.iter().map(|h| h.to_string())));

    for c in records {
        let recommendation =
            serde_json::to_value(c.recommendation).map_or_else(|_| String::new(), |v| {
                v.as_str().unwrap_or_default().to_string()
            });
        rows.push(csv_row(
            [
                c.name.clone(),
                c.email.clone(),
                c.phone.clone().unwrap_or_default(),
                c.skills.join("; "),
                c.experience_years.to_string(),
                c.skills_score.to_string(),
                c.experience_score.to_string(),
                c.education_score.to_string(),
                c.overall_score.to_string(),
                recommendation,
                c.reason.clone(),
                c.uploaded_at.to_rfc3339(),
            ]
            .into_iter(),
        ));
    }

    Bytes::from(rows.join("\n"))
}

fn csv_row(cells: impl Iterator<Item = String>) -> String {
    cells
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
