//! HTTP transport layer for the gateway.
//!
//! Provides the transport abstraction used by the forwarder and a reqwest
//! implementation with connect and total timeouts.

mod http;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("Connection error: {message}")]
    Connect {
        /// Error message.
        message: String,
    },

    /// The connect or total budget was exceeded.
    #[error("Timeout after {timeout:?}: {message}")]
    Timeout {
        /// Budget that was exceeded.
        timeout: Duration,
        /// Error message.
        message: String,
    },

    /// Any other transport failure (reset mid-body, protocol error).
    #[error("Transport error: {message}")]
    Other {
        /// Error message.
        message: String,
    },
}
