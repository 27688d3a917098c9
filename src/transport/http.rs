//! HTTP transport implementation.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

use super::TransportError;
use crate::config::GatewayConfig;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a new GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Creates a new POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a JSON request body and its content type.
    pub fn with_json(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        self
    }

    /// Sets a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the `content-type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP transport trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// HTTP transport implementation using reqwest.
///
/// Holds one pooled client; both timeout budgets are fixed at construction.
pub struct ReqwestTransport {
    client: Client,
    connect_timeout: Duration,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport with the budgets from `config`.
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        Self::with_timeouts(config.connect_timeout(), config.timeout())
    }

    /// Creates a transport with explicit budgets.
    pub fn with_timeouts(connect_timeout: Duration, timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::Other {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            connect_timeout,
            timeout,
        })
    }

    fn map_error(&self, e: &reqwest::Error) -> TransportError {
        // A connect-phase timeout reports both is_timeout and is_connect.
        if e.is_timeout() {
            TransportError::Timeout {
                timeout: if e.is_connect() {
                    self.connect_timeout
                } else {
                    self.timeout
                },
                message: e.to_string(),
            }
        } else if e.is_connect() {
            TransportError::Connect {
                message: e.to_string(),
            }
        } else {
            TransportError::Other {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_ascii_lowercase(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        // The total budget also covers reading the body.
        let body = response.bytes().await.map_err(|e| self.map_error(&e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
