//! HTTP handlers for the local gateway.
//!
//! Each route forwards to the same function the Lambda runtime invokes and
//! returns its `{ statusCode, body }` envelope as the JSON body, with the HTTP
//! status mirroring `statusCode`.

use crate::{
    errors::AppError,
    handlers::{asset_reader::AssetReader, asset_uploader::AssetUploader},
    models::envelope::{LambdaResponse, UploadRequest},
    services::storage_service::ObjectStore,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Shared state handed to every gateway route.
#[derive(Clone)]
pub struct GatewayState {
    pub reader: Arc<AssetReader>,
    pub uploader: Arc<AssetUploader>,
    pub store: Arc<dyn ObjectStore>,
}

/// `GET /assets` — every label document in the bucket.
pub async fn list_assets(State(state): State<GatewayState>) -> Response {
    envelope_response(state.reader.handle().await)
}

/// `POST /assets` — upload one base64-encoded file.
pub async fn upload_asset(
    State(state): State<GatewayState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => envelope_response(state.uploader.handle(request).await),
        Err(rejection) => AppError::bad_request(rejection.body_text()).into_response(),
    }
}

fn envelope_response(envelope: LambdaResponse) -> Response {
    (envelope.status(), Json(envelope)).into_response()
}
