//! Observability module for the gateway.
//!
//! Provides `tracing-subscriber` setup for the binary. Request spans for the
//! HTTP surface live in the server's middleware.

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
