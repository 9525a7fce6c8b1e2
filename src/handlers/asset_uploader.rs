//! Upload function: decode an inbound file, store it under a fresh key, run
//! label detection and persist the resulting document next to it.
//!
//! Steps run strictly in order and the first failure ends the request. Objects
//! written before the failure are left in place.

use crate::{
    errors::AppError,
    models::{
        analysis::{AnalysisResult, FileType, LabelEntry, VideoJobStatus},
        envelope::{LambdaResponse, UploadRequest, UploadSummary},
    },
    services::{
        recognition_service::{
            LabelDetector, MAX_IMAGE_LABELS, NotificationTarget, RecognitionError,
            VIDEO_MIN_CONFIDENCE,
        },
        storage_service::{ObjectStore, StorageError, public_object_url},
    },
};
use axum::http::StatusCode;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

pub const MISSING_INPUT_MESSAGE: &str = "Missing 'file_name' or 'file_content' in request";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded and analyzed successfully.";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const LABELS_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Missing 'file_name' or 'file_content' in request")]
    MissingInput,
    #[error("invalid base64 file content: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    #[error("failed to encode analysis result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingInput => AppError::bad_request(err.to_string()),
            other => AppError::internal(other.to_string()),
        }
    }
}

/// Map a file name to its MIME type by extension, falling back to
/// `application/octet-stream`.
pub fn resolve_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Decode standard base64, ignoring ASCII whitespace so line-wrapped
/// (MIME-style) payloads are accepted.
pub fn decode_file_content(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    general_purpose::STANDARD.decode(compact)
}

/// `{uuid}_{name}` key for the raw upload.
pub fn storage_key(file_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), file_name)
}

/// `labels_{uuid}_{name}.json` key for the label document.
pub fn labels_key(file_name: &str) -> String {
    format!("labels_{}_{}.json", Uuid::new_v4(), file_name)
}

#[derive(Clone)]
pub struct AssetUploader {
    store: Arc<dyn ObjectStore>,
    detector: Arc<dyn LabelDetector>,
    notify: NotificationTarget,
}

impl AssetUploader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        detector: Arc<dyn LabelDetector>,
        notify: NotificationTarget,
    ) -> Self {
        Self {
            store,
            detector,
            notify,
        }
    }

    /// Start the async video label job for an already stored object.
    pub async fn submit_video_analysis(&self, key: &str) -> Result<String, RecognitionError> {
        let job_id = self
            .detector
            .start_video_label_detection(key, VIDEO_MIN_CONFIDENCE, &self.notify)
            .await?;
        info!("started video label job {} for {}", job_id, key);
        Ok(job_id)
    }

    /// Build the response for a raw invocation payload. A payload that is not
    /// an upload request object answers 400 like any other bad input.
    pub async fn handle_event(&self, event: Value) -> LambdaResponse {
        match serde_json::from_value::<UploadRequest>(event) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                error!("rejecting malformed upload event: {}", err);
                AppError::bad_request(format!("Invalid upload request: {}", err))
                    .into_lambda_response()
            }
        }
    }

    /// Build the response for one upload request.
    pub async fn handle(&self, request: UploadRequest) -> LambdaResponse {
        match self.process(request).await {
            Ok(summary) => LambdaResponse::new(StatusCode::OK, &summary),
            Err(err) => {
                error!("upload failed: {}", err);
                AppError::from(err).into_lambda_response()
            }
        }
    }

    async fn process(&self, request: UploadRequest) -> Result<UploadSummary, UploadError> {
        let (file_name, encoded) = match (request.file_name, request.file_content) {
            (Some(name), Some(content)) if !name.is_empty() && !content.is_empty() => {
                (name, content)
            }
            _ => return Err(UploadError::MissingInput),
        };

        let payload = decode_file_content(&encoded)?;

        let file_key = storage_key(&file_name);
        let content_type = resolve_content_type(&file_name);
        self.store
            .put_object(&file_key, Bytes::from(payload), &content_type)
            .await?;
        info!("stored {} as {}", file_key, content_type);

        let file_url = public_object_url(self.store.bucket(), &file_key);
        let file_type = FileType::from_content_type(&content_type);

        let labels = match file_type {
            FileType::Image => self.label_image(&file_key).await?,
            FileType::Video => {
                let job_id = self.submit_video_analysis(&file_key).await?;
                vec![LabelEntry::VideoJob(VideoJobStatus::started(job_id))]
            }
            FileType::Unknown => Vec::new(),
        };

        let document = AnalysisResult {
            file_url: file_url.clone(),
            labels: labels.clone(),
            file_type,
        };
        let labels_file_key = labels_key(&file_name);
        self.store
            .put_object(
                &labels_file_key,
                Bytes::from(serde_json::to_vec(&document)?),
                LABELS_CONTENT_TYPE,
            )
            .await?;
        info!("persisted {} labels to {}", labels.len(), labels_file_key);

        Ok(UploadSummary {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            file_key,
            labels_file_key,
            file_url,
            labels,
            file_type,
        })
    }

    /// Top labels by confidence, capped at [`MAX_IMAGE_LABELS`].
    async fn label_image(&self, key: &str) -> Result<Vec<LabelEntry>, UploadError> {
        let mut detected = self
            .detector
            .detect_image_labels(key, MAX_IMAGE_LABELS)
            .await?;
        detected.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Ok(detected
            .into_iter()
            .take(MAX_IMAGE_LABELS)
            .map(|mut label| {
                label.confidence = label.confidence.clamp(0.0, 100.0);
                LabelEntry::Detected(label)
            })
            .collect())
    }
}
