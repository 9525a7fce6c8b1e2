//! Routes for the local gateway.
//!
//! ## Structure
//! - `GET  /healthz` — liveness
//! - `GET  /readyz`  — bucket reachability
//! - `GET  /assets`  — gallery reader
//! - `POST /assets`  — upload + label detection
//!
//! Uploads arrive base64-encoded inside JSON, so the body limit is raised to
//! the gateway payload ceiling.

use crate::handlers::{
    gateway_handlers::{GatewayState, list_assets, upload_asset},
    health_handlers::{healthz, readyz},
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};

/// Largest request body accepted on `POST /assets`.
pub const MAX_UPLOAD_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the gateway router. State is attached by the caller.
pub fn routes() -> Router<GatewayState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/assets", get(list_assets).post(upload_asset))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}
