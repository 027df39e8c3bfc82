use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::file::FileMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadKind {
    Single,
    Bulk,
}

/// Lifecycle: `Idle → Uploading → Analyzing → {Succeeded, Failed}`.
/// `Idle` is pre-submission: files staged but nothing sent yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Analyzing,
    Succeeded,
    Failed,
}

/// One tracked upload-and-analyze request.
///
/// `progress_percent` is a liveness estimate: monotonic non-decreasing while
/// in flight, capped at 90 until the remote response actually arrives, 100
/// exactly when `Succeeded`, 0 when `Idle` or `Failed`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadJob {
    pub job_id: Uuid,
    pub kind: UploadKind,
    pub files: Vec<FileMeta>,
    pub job_description: Option<String>,
    pub status: UploadStatus,
    pub progress_percent: u8,
    /// Human-readable, display only.
    pub status_message: String,
}

impl UploadJob {
    pub fn is_in_flight(&self) -> bool {
        matches!(self.status, UploadStatus::Uploading | UploadStatus::Analyzing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, UploadStatus::Succeeded | UploadStatus::Failed)
    }
}
