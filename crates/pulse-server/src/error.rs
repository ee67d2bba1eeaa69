//! HTTP mapping for application errors.
//!
//! Every failing endpoint answers with a status ≥ 400 and a body of the
//! shape `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use pulse_core::PulseError;

/// Wrapper turning a [`PulseError`] into an HTTP response.
pub struct ApiError(PulseError);

impl From<PulseError> for ApiError {
    fn from(err: PulseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PulseError::NotFound { .. } => StatusCode::NOT_FOUND,
            PulseError::RunInProgress => StatusCode::CONFLICT,
            PulseError::Analysis(_) => StatusCode::BAD_GATEWAY,
            err if err.is_rejection() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
