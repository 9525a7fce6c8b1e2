//! Label-detection results and the document persisted next to each upload.

use serde::{Deserialize, Serialize};

/// Status text attached to every submitted video job.
pub const VIDEO_JOB_STARTED: &str =
    "Video analysis started. Check the SNS notification for results.";

/// Coarse media class derived from the content type.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Unknown,
}

impl FileType {
    /// Classify by MIME prefix: `image/*`, `video/*`, anything else.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            FileType::Image
        } else if content_type.starts_with("video/") {
            FileType::Video
        } else {
            FileType::Unknown
        }
    }
}

/// A detected label with its confidence score (0–100).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LabelRecord {
    pub name: String,
    pub confidence: f64,
}

/// Placeholder entry recorded when a video is handed to the async job API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VideoJobStatus {
    #[serde(rename = "JobId")]
    pub job_id: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl VideoJobStatus {
    pub fn started(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: VIDEO_JOB_STARTED.to_string(),
        }
    }
}

/// One slot of the `labels` array.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum LabelEntry {
    Detected(LabelRecord),
    VideoJob(VideoJobStatus),
}

/// Document written to `labels_{uuid}_{name}.json` after every upload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub file_url: String,
    pub labels: Vec<LabelEntry>,
    pub file_type: FileType,
}
