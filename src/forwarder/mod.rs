//! Forwarding of requests to an upstream.
//!
//! The forwarder makes exactly one HTTP call per invocation and returns the
//! upstream response verbatim. It does not look at the status code or the
//! body; that is left to the caller.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, instrument};

use crate::config::GatewayConfig;
use crate::errors::{GatewayError, GatewayResult};
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};

/// Upstream route suffixes the gateway forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamPath {
    /// `POST /v1/chat/completions`
    ChatCompletions,
    /// `GET /v1/models`
    Models,
}

impl UpstreamPath {
    /// Returns the path suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamPath::ChatCompletions => "/v1/chat/completions",
            UpstreamPath::Models => "/v1/models",
        }
    }

    /// Joins the path onto a base URL.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.as_str())
    }
}

/// Issues upstream calls through an [`HttpTransport`].
#[derive(Clone)]
pub struct Forwarder {
    transport: Arc<dyn HttpTransport>,
}

impl Forwarder {
    /// Creates a forwarder backed by a pooled reqwest client.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let transport = ReqwestTransport::new(config).map_err(|e| {
            GatewayError::configuration(format!("Failed to build HTTP client: {}", e))
        })?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Creates a forwarder over an existing transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Sends one request to `base_url` + `path`.
    ///
    /// `body` is sent as JSON for [`UpstreamPath::ChatCompletions`] and
    /// ignored for [`UpstreamPath::Models`]. Any status code is a success
    /// at this layer.
    #[instrument(skip(self, body), fields(upstream = %base_url, path = path.as_str()))]
    pub async fn forward(
        &self,
        base_url: &str,
        path: UpstreamPath,
        body: Option<Bytes>,
    ) -> GatewayResult<HttpResponse> {
        let url = path.url(base_url);
        let request = match path {
            UpstreamPath::ChatCompletions => {
                HttpRequest::post(&url).with_json(body.unwrap_or_default())
            }
            UpstreamPath::Models => HttpRequest::get(&url),
        };

        debug!(url = %url, "Forwarding request upstream");

        match self.transport.send(request).await {
            Ok(response) => {
                debug!(status = response.status, bytes = response.body.len(), "Upstream responded");
                Ok(response)
            }
            Err(e) => {
                error!(url = %url, error = %e, "Upstream request failed");
                Err(map_transport_error(base_url, e))
            }
        }
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder").finish_non_exhaustive()
    }
}

fn map_transport_error(base_url: &str, error: TransportError) -> GatewayError {
    let upstream = base_url.to_string();
    match error {
        TransportError::Timeout { .. } => GatewayError::UpstreamTimeout {
            upstream,
            message: error.to_string(),
        },
        TransportError::Connect { .. } | TransportError::Other { .. } => {
            GatewayError::UpstreamUnreachable {
                upstream,
                message: error.to_string(),
            }
        }
    }
}
