//! Request-time error types and their JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Not Found - {path}")]
    NotFound { path: String },

    /// Upstream unreachable, reset, or returned an unreadable response.
    /// The message never contains the upstream URL.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Upstream(_) => "bad_gateway",
            Self::UpstreamTimeout => "gateway_timeout",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::UpstreamTimeout;
        }
        let reason = if e.is_connect() {
            "connection failed"
        } else if e.is_body() || e.is_decode() {
            "invalid response body"
        } else {
            "request error"
        };
        Self::Upstream(reason.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
