use crate::models::envelope::LambdaResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A request-level failure: the status code to answer with and the message
/// that ends up in the `{ "error": .. }` body.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Render as the `{ statusCode, body }` envelope.
    pub fn into_lambda_response(self) -> LambdaResponse {
        LambdaResponse::new(self.status, &json!({ "error": self.message }))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self.into_lambda_response())).into_response()
    }
}

impl From<crate::services::storage_service::StorageError> for AppError {
    fn from(err: crate::services::storage_service::StorageError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_carries_message_under_error_key() {
        let resp = AppError::bad_request("missing field").into_lambda_response();
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.body_json().unwrap(), json!({ "error": "missing field" }));
    }
}
