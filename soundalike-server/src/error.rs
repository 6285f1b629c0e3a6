//! Error types for soundalike-server
//!
//! Translates the shared error taxonomy into HTTP responses. Best-effort
//! provider degradation never reaches this layer; only malformed input,
//! load-bearing upstream failures, and internal faults do.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Load-bearing upstream provider failure (502)
    #[error("Upstream provider failure: {0}")]
    UpstreamFailure(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<soundalike_common::Error> for ApiError {
    fn from(err: soundalike_common::Error) -> Self {
        use soundalike_common::Error;
        match err {
            Error::InvalidTrackReference(_) => ApiError::BadRequest(err.to_string()),
            Error::SeedLookup(_) | Error::SimilarityLookup(_) => {
                ApiError::UpstreamFailure(err.to_string())
            }
            Error::Config(_) | Error::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::UpstreamFailure(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
