//! Label detection seam backed by Rekognition.
//!
//! Images are labelled synchronously; videos are handed to an async job that
//! reports completion through an SNS topic, outside this process.

use crate::models::analysis::LabelRecord;
use async_trait::async_trait;
use aws_sdk_rekognition::{
    Client as RekognitionClient,
    error::DisplayErrorContext,
    types::{Image, NotificationChannel, S3Object, Video},
};
use thiserror::Error;
use tracing::debug;

/// Upper bound on labels requested for a single image.
pub const MAX_IMAGE_LABELS: usize = 10;

/// Minimum confidence passed to video label jobs.
pub const VIDEO_MIN_CONFIDENCE: f32 = 50.0;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("label detection failed for `{key}`: {message}")]
    DetectLabels { key: String, message: String },
    #[error("failed to start video label detection for `{key}`: {message}")]
    StartLabelDetection { key: String, message: String },
    #[error("video label detection for `{key}` returned no job id")]
    MissingJobId { key: String },
    #[error("invalid notification channel: {0}")]
    InvalidChannel(String),
}

pub type RecognitionResult<T> = Result<T, RecognitionError>;

/// Where an async video job signals completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub topic_arn: String,
    pub role_arn: String,
}

#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detect labels on a stored image, returning at most `max_labels`.
    async fn detect_image_labels(
        &self,
        key: &str,
        max_labels: usize,
    ) -> RecognitionResult<Vec<LabelRecord>>;

    /// Start an async label job on a stored video and return its job id.
    async fn start_video_label_detection(
        &self,
        key: &str,
        min_confidence: f32,
        notify: &NotificationTarget,
    ) -> RecognitionResult<String>;
}

/// Rekognition-backed [`LabelDetector`] reading objects from one bucket.
#[derive(Clone)]
pub struct RekognitionDetector {
    client: RekognitionClient,
    bucket: String,
}

impl RekognitionDetector {
    pub fn new(client: RekognitionClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn s3_object(&self, key: &str) -> S3Object {
        S3Object::builder().bucket(&self.bucket).name(key).build()
    }
}

#[async_trait]
impl LabelDetector for RekognitionDetector {
    async fn detect_image_labels(
        &self,
        key: &str,
        max_labels: usize,
    ) -> RecognitionResult<Vec<LabelRecord>> {
        debug!("detect_labels s3://{}/{} (max {})", self.bucket, key, max_labels);
        let output = self
            .client
            .detect_labels()
            .image(Image::builder().s3_object(self.s3_object(key)).build())
            .max_labels(i32::try_from(max_labels).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(|err| RecognitionError::DetectLabels {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let labels = output
            .labels()
            .iter()
            .filter_map(|label| {
                Some(LabelRecord {
                    name: label.name()?.to_string(),
                    confidence: f64::from(label.confidence().unwrap_or_default()),
                })
            })
            .collect();

        Ok(labels)
    }

    async fn start_video_label_detection(
        &self,
        key: &str,
        min_confidence: f32,
        notify: &NotificationTarget,
    ) -> RecognitionResult<String> {
        let channel = NotificationChannel::builder()
            .sns_topic_arn(&notify.topic_arn)
            .role_arn(&notify.role_arn)
            .build()
            .map_err(|err| RecognitionError::InvalidChannel(err.to_string()))?;

        debug!(
            "start_label_detection s3://{}/{} (min confidence {}, topic {})",
            self.bucket, key, min_confidence, notify.topic_arn
        );
        let output = self
            .client
            .start_label_detection()
            .video(Video::builder().s3_object(self.s3_object(key)).build())
            .min_confidence(min_confidence)
            .notification_channel(channel)
            .send()
            .await
            .map_err(|err| RecognitionError::StartLabelDetection {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        output
            .job_id()
            .map(str::to_string)
            .ok_or_else(|| RecognitionError::MissingJobId {
                key: key.to_string(),
            })
    }
}
