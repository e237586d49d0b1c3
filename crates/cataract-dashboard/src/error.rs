//! HTTP error responses

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cataract_core::Error;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by API handlers
///
/// Rendered as `{"error": {"message": ..., "type": ...}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain error from loading, encoding or inference
    #[error(transparent)]
    Core(#[from] Error),
    /// Malformed request body or query string
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                Error::ArtifactUnavailable(_) | Error::Dataset(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                Error::EncodingMismatch { .. } | Error::InvalidInput(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                Error::SchemaMismatch(_)
                | Error::InferenceFailure(_)
                | Error::Config(_)
                | Error::Io(_)
                | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request_error",
            ApiError::Core(err) => err.kind(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = self.to_string();

        if status.is_server_error() {
            error!("{} ({}): {}", status, kind, message);
        } else {
            warn!("{} ({}): {}", status, kind, message);
        }

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
