//! HTTP error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::{AudioErrorKind, GatewayError};

/// Longest upstream body excerpt carried in an error message.
const BODY_EXCERPT: usize = 500;

/// An error rendered as `{"error": {"type", "message"}, "upstream"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Machine-readable error type.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Upstream involved, if any.
    pub upstream: Option<String>,
}

impl ApiError {
    /// Creates an error without an upstream.
    pub fn new(status: StatusCode, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            kind: kind.into(),
            message: message.into(),
            upstream: None,
        }
    }

    /// 400 `invalid_request`.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    fn with_upstream(mut self, upstream: String) -> Self {
        self.upstream = Some(upstream);
        self
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let message = error.to_string();
        match error {
            GatewayError::Configuration { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", message)
            }
            GatewayError::AudioProcessing { kind, message } => {
                let status = if kind == AudioErrorKind::TooLarge {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                Self::new(status, kind.as_str(), message)
            }
            GatewayError::UpstreamUnreachable { upstream, message } => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_unreachable", message)
                    .with_upstream(upstream)
            }
            GatewayError::UpstreamTimeout { upstream, message } => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", message)
                    .with_upstream(upstream)
            }
            GatewayError::UpstreamStatus {
                upstream,
                status,
                body,
            } => {
                let excerpt: String = body.chars().take(BODY_EXCERPT).collect();
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    format!("Upstream returned HTTP {}: {}", status, excerpt),
                )
                .with_upstream(upstream)
            }
            GatewayError::InvalidRequest { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_invalid_response", message)
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        let status = error.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(status, AudioErrorKind::TooLarge.as_str(), error.body_text())
        } else {
            Self::new(status, "invalid_multipart", error.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {"type": self.kind, "message": self.message},
            "upstream": self.upstream,
        });
        (self.status, Json(body)).into_response()
    }
}
