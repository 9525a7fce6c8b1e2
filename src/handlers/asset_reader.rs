//! Gallery reader: lists the label documents in the bucket and returns each
//! one parsed, with its formatted modification time.
//!
//! A document that cannot be fetched or parsed is reported inline in its own
//! slot; only a failed listing fails the whole request.

use crate::{
    errors::AppError,
    models::{
        envelope::{
            AssetContent, FetchErrorKind, JsonAssetSummary, LambdaResponse, MessageBody,
            ReaderBody,
        },
        object::ObjectSummary,
    },
    services::storage_service::{ObjectStore, StorageError, StorageResult},
};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::{str::Utf8Error, sync::Arc};
use thiserror::Error;
use tracing::{error, info, warn};

pub const NO_FILES_MESSAGE: &str = "No JSON files found in the bucket.";
pub const READ_SUCCESS_MESSAGE: &str = "JSON files content retrieved successfully.";

/// Why a single document could not be returned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("object `{key}` is not valid UTF-8: {source}")]
    Decode {
        key: String,
        #[source]
        source: Utf8Error,
    },
    #[error("object `{key}` is not valid JSON: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Storage(_) => FetchErrorKind::Storage,
            FetchError::Decode { .. } => FetchErrorKind::Decode,
            FetchError::Parse { .. } => FetchErrorKind::Parse,
        }
    }
}

impl From<FetchError> for AssetContent {
    fn from(err: FetchError) -> Self {
        AssetContent::Failed {
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS.mmm`, milliseconds truncated.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    format!(
        "{}.{:03}",
        ts.format("%Y-%m-%d %H:%M:%S"),
        ts.timestamp_subsec_millis().min(999)
    )
}

#[derive(Clone)]
pub struct AssetReader {
    store: Arc<dyn ObjectStore>,
}

impl AssetReader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Keys ending in `.json` from a single listing call, with timestamps.
    pub async fn list_json_objects(&self) -> StorageResult<Vec<ObjectSummary>> {
        let objects = self.store.list_objects().await?;
        Ok(objects.into_iter().filter(ObjectSummary::is_json).collect())
    }

    /// Fetch one object and parse it as UTF-8 JSON.
    pub async fn fetch_json(&self, key: &str) -> Result<Value, FetchError> {
        let bytes = self.store.get_object(key).await?;
        let text = std::str::from_utf8(&bytes).map_err(|source| FetchError::Decode {
            key: key.to_string(),
            source,
        })?;
        serde_json::from_str(text).map_err(|source| FetchError::Parse {
            key: key.to_string(),
            source,
        })
    }

    /// Build the response for one gallery request.
    pub async fn handle(&self) -> LambdaResponse {
        match self.collect().await {
            Ok(files) if files.is_empty() => {
                info!("no JSON files in bucket {}", self.store.bucket());
                LambdaResponse::new(
                    StatusCode::NOT_FOUND,
                    &MessageBody {
                        message: NO_FILES_MESSAGE.to_string(),
                    },
                )
            }
            Ok(json_files) => {
                info!("returning {} JSON files", json_files.len());
                LambdaResponse::new(
                    StatusCode::OK,
                    &ReaderBody {
                        message: READ_SUCCESS_MESSAGE.to_string(),
                        json_files,
                    },
                )
            }
            Err(err) => {
                error!("gallery read failed: {}", err);
                err.into_lambda_response()
            }
        }
    }

    async fn collect(&self) -> Result<Vec<JsonAssetSummary>, AppError> {
        let objects = self.list_json_objects().await?;

        let mut json_files = Vec::with_capacity(objects.len());
        for obj in objects {
            let content = match self.fetch_json(&obj.key).await {
                Ok(value) => AssetContent::Parsed(value),
                Err(err) => {
                    warn!("could not read {}: {}", obj.key, err);
                    err.into()
                }
            };
            json_files.push(JsonAssetSummary {
                last_modified: format_timestamp(&obj.last_modified),
                file_key: obj.key,
                content,
            });
        }

        Ok(json_files)
    }
}
