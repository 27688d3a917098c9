//! Mock implementations for testing.
//!
//! Provides a scripted [`HttpTransport`] so the forwarder and operations can
//! be exercised without a network.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Mock HTTP transport for testing.
///
/// Responses are served in the order they were queued. Once the queue is
/// empty the default response is used, or a 500 if none was set.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<MockResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request body.
    pub body: Option<Bytes>,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    /// Parses the recorded body as JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// Creates a JSON response.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::raw(status, "application/json", value.to_string())
    }

    /// Creates a response with an arbitrary body.
    pub fn raw(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json(&self, status: u16, value: serde_json::Value) {
        self.queue(MockResponse::json(status, &value));
    }

    /// Queues a response with an arbitrary body.
    pub fn queue_raw(&self, status: u16, content_type: &str, body: impl Into<Bytes>) {
        self.queue(MockResponse::raw(status, content_type, body));
    }

    /// Queues a transport failure.
    pub fn queue_error(&self, error: TransportError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_response(&self) -> Result<MockResponse, TransportError> {
        if let Some(next) = lock(&self.responses).pop_front() {
            return next;
        }
        Ok(lock(&self.default_response).clone().unwrap_or_else(|| {
            MockResponse::json(
                500,
                &serde_json::json!({"error": {"message": "No mock response configured"}}),
            )
        }))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(RecordedRequest {
            method: request.method,
            url: request.url,
            body: request.body,
            headers: request.headers,
        });

        let response = self.next_response()?;
        Ok(HttpResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}
