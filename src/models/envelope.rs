//! Request and response shapes shared by both functions.
//!
//! Every function returns a [`LambdaResponse`]: an integer status code plus a
//! body that is itself a JSON-encoded string.

use crate::models::analysis::{FileType, LabelEntry};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Inbound upload event. Both fields are optional at the wire level so a
/// missing field becomes a 400 instead of a deserialization fault.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UploadRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_content: Option<String>,
}

/// `{ statusCode, body }` envelope returned by both functions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LambdaResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl LambdaResponse {
    /// Encode `body` as JSON text inside the envelope.
    pub fn new(status: StatusCode, body: &impl Serialize) -> Self {
        let body = serde_json::to_string(body)
            .unwrap_or_else(|err| json!({ "error": err.to_string() }).to_string());
        Self {
            status_code: status.as_u16(),
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Decode the inner body back into JSON.
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Plain `{ "message": .. }` body.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageBody {
    pub message: String,
}

/// Which step of a per-file read failed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorKind {
    Storage,
    Decode,
    Parse,
}

/// Content slot of a reader entry. A failed read stays visible inline as
/// `{ "error", "kind" }` instead of aborting the batch.
///
/// Reading a body back always yields `Parsed`: any JSON document is a valid
/// label document, including one shaped like a failure slot.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AssetContent {
    Parsed(Value),
    Failed { error: String, kind: FetchErrorKind },
}

/// One entry of the reader response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JsonAssetSummary {
    pub file_key: String,
    pub content: AssetContent,
    pub last_modified: String,
}

/// Reader success body.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReaderBody {
    pub message: String,
    pub json_files: Vec<JsonAssetSummary>,
}

/// Uploader success body.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadSummary {
    pub message: String,
    pub file_key: String,
    pub labels_file_key: String,
    pub file_url: String,
    pub labels: Vec<LabelEntry>,
    pub file_type: FileType,
}
