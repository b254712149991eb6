//! API error types and their JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reelcache_omdb::OmdbError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum covering all error cases.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    /// OMDb rejected the request with its own status.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    // 500 Internal Server Error
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // 502 Bad Gateway
    #[error("{0}")]
    BadGateway(String),

    // 503 Service Unavailable
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Upstream { .. } => "upstream_error",
            Self::Internal(_) => "internal_error",
            Self::BadGateway(_) => "bad_gateway",
            Self::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            error!(error = %self, code = code, "Server error occurred");
        } else {
            debug!(error = %self, code = code, "Request rejected");
        }

        let message = match &self {
            // Don't expose internal error details in release builds
            ApiError::Internal(err) if cfg!(debug_assertions) => format!("{}: {}", self, err),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<OmdbError> for ApiError {
    fn from(err: OmdbError) -> Self {
        match err {
            OmdbError::NotFound(message) => ApiError::NotFound(message),
            OmdbError::Api { status, message } => ApiError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            err @ OmdbError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            err @ OmdbError::InvalidResponse(_) => ApiError::BadGateway(err.to_string()),
            err @ OmdbError::ClientBuild(_) => ApiError::Internal(err.into()),
        }
    }
}
