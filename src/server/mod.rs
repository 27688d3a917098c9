//! HTTP gateway.
//!
//! Exposes the operations over an OpenAI-compatible HTTP surface:
//!
//! - `GET /health`
//! - `POST /v1/chat/completions` (routed, forwarded verbatim)
//! - `GET /v1/models` (forwarded verbatim)
//! - `POST /v1/transcribe` (multipart `file`)
//! - `POST /v1/analyze` (multipart `file` and `instruction`)

mod error;
mod handlers;
mod middleware;

pub use error::ApiError;
pub use handlers::{AnalyzeResponse, TranscribeResponse};
pub use middleware::{new_request_id, REQUEST_ID_HEADER};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::operations::Gateway;

/// Headroom above the audio ceiling for multipart framing and JSON/base64.
const BODY_OVERHEAD: usize = 1024 * 1024;

/// Shared state for all handlers.
#[derive(Debug)]
pub struct AppState {
    /// Operations entry point.
    pub gateway: Gateway,
}

/// Builds the router.
///
/// `allowed_origins` enables CORS for those origins; an empty list leaves
/// CORS off.
pub fn build_app(gateway: Gateway, allowed_origins: &[String]) -> Router {
    let max_upload = gateway.config().audio_max_upload_bytes();
    let state = Arc::new(AppState { gateway });

    // Base64 inflates audio by 4/3 inside chat payloads.
    let chat_limit = max_upload.saturating_add(max_upload / 3).saturating_add(BODY_OVERHEAD);
    let upload_limit = max_upload.saturating_add(BODY_OVERHEAD);

    let audio_routes = Router::new()
        .route("/v1/transcribe", post(handlers::transcribe))
        .route("/v1/analyze", post(handlers::analyze))
        .layer(DefaultBodyLimit::max(upload_limit));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .route("/v1/models", get(handlers::models))
        .layer(DefaultBodyLimit::max(chat_limit));

    let mut app = Router::new()
        .merge(api_routes)
        .merge(audio_routes)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .with_state(state);

    if let Some(cors) = create_cors_layer(allowed_origins) {
        app = app.layer(cors);
    }
    app
}

fn create_cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
            .max_age(Duration::from_secs(3600)),
    )
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "Inference gateway listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Splits a comma-separated origin list.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
