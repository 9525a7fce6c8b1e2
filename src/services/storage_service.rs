//! src/services/storage_service.rs
//!
//! Object storage seam. Handlers only ever see [`ObjectStore`]; the
//! production implementation talks to S3 and keeps no state besides the
//! client handle and bucket name.

use crate::models::object::ObjectSummary;
use async_trait::async_trait;
use aws_sdk_s3::{Client as S3Client, error::DisplayErrorContext, primitives::ByteStream};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to list bucket `{bucket}`: {message}")]
    List { bucket: String, message: String },
    #[error("failed to fetch object `{key}`: {message}")]
    Get { key: String, message: String },
    #[error("failed to read body of object `{key}`: {message}")]
    Body { key: String, message: String },
    #[error("failed to store object `{key}`: {message}")]
    Put { key: String, message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The three bucket operations the functions need:
/// - put an object with a content type
/// - get an object's payload
/// - list the bucket (first page only)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store writes to.
    fn bucket(&self) -> &str;

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()>;

    async fn get_object(&self, key: &str) -> StorageResult<Bytes>;

    /// List objects in the bucket. Returns whatever the provider puts on its
    /// default first page; no continuation is followed.
    async fn list_objects(&self) -> StorageResult<Vec<ObjectSummary>>;
}

/// Public URL under which an uploaded object is served.
pub fn public_object_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}

/// S3-backed [`ObjectStore`].
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
        debug!(
            "put s3://{}/{} ({} bytes, {})",
            self.bucket,
            key,
            body.len(),
            content_type
        );
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StorageError::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        debug!("get s3://{}/{}", self.bucket, key);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StorageError::Get {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let data = output.body.collect().await.map_err(|err| StorageError::Body {
            key: key.to_string(),
            message: err.to_string(),
        })?;

        Ok(data.into_bytes())
    }

    async fn list_objects(&self) -> StorageResult<Vec<ObjectSummary>> {
        debug!("list s3://{}", self.bucket);
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|err| StorageError::List {
                bucket: self.bucket.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let summaries = output
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_string();
                let last_modified = obj
                    .last_modified()
                    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos()))
                    .unwrap_or_default();
                Some(ObjectSummary { key, last_modified })
            })
            .collect();

        Ok(summaries)
    }
}
