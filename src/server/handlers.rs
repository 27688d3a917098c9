//! Route handlers.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::error::ApiError;
use super::AppState;
use crate::transport::HttpResponse;

/// Upstream headers that must not be copied onto the downstream response.
const HOP_HEADERS: &[&str] = &[
    "connection",
    "content-length",
    "content-encoding",
    "keep-alive",
    "transfer-encoding",
];

/// Response of `POST /v1/transcribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    /// Transcribed text.
    pub transcript: String,
}

/// Response of `POST /v1/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Upstream answer to the instruction.
    pub result: String,
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({"ok": true, "version": env!("CARGO_PKG_VERSION")}))
}

pub(super) async fn chat_completions(
    State(state): State<Arc<AppState>>,
    raw: Bytes,
) -> Result<Response, ApiError> {
    let value: Value = serde_json::from_slice(&raw).map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            format!("Invalid JSON in request body: {}", e),
        )
    })?;
    if !value.is_object() {
        return Err(ApiError::invalid_request("Request body must be a JSON object"));
    }

    let upstream = state.gateway.forward_chat_raw(&value, raw).await?;
    Ok(passthrough(upstream))
}

pub(super) async fn models(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let upstream = state.gateway.forward_models_raw().await?;
    Ok(passthrough(upstream))
}

pub(super) async fn transcribe(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let audio = form.file.ok_or_else(|| ApiError::invalid_request("Missing 'file' field"))?;

    let transcript = state.gateway.transcribe(audio, None).await?;
    Ok(Json(TranscribeResponse { transcript }))
}

pub(super) async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let audio = form.file.ok_or_else(|| ApiError::invalid_request("Missing 'file' field"))?;
    let instruction = form
        .instruction
        .filter(|instruction| !instruction.trim().is_empty())
        .ok_or_else(|| ApiError::invalid_request("Missing 'instruction' field"))?;

    let result = state.gateway.analyze(audio, &instruction, None).await?;
    Ok(Json(AnalyzeResponse { result }))
}

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Bytes>,
    instruction: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => form.file = Some(field.bytes().await?),
                Some("instruction") => form.instruction = Some(field.text().await?),
                other => warn!(field = ?other, "Ignoring unknown multipart field"),
            }
        }
        Ok(form)
    }
}

/// Copies an upstream response onto the wire unchanged.
fn passthrough(upstream: HttpResponse) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = (status, Body::from(upstream.body)).into_response();

    let headers = response.headers_mut();
    for (name, value) in &upstream.headers {
        if HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    response
}
