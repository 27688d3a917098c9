//! Inference Gateway
//!
//! Forwards OpenAI-compatible chat requests to one or more upstream inference
//! backends. Upstream selection is structural: in `audio_text` mode, requests
//! whose messages carry an audio content part go to the audio backend and all
//! others to the text backend. Audio can be normalized to canonical WAV with
//! ffmpeg before it is embedded in a request.
//!
//! # Features
//!
//! - **Routing**: `single` or `audio_text`, decided on content part types only
//! - **Audio**: size ceiling, ffmpeg transcoding, scoped scratch files
//! - **Forwarding**: connect and total timeouts, typed errors, no retries
//! - **Operations**: transcribe, analyze, chat and list_models
//! - **HTTP gateway**: axum server exposing the same operations
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use inference_gateway::{Gateway, GatewayConfig, RoutingMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::builder()
//!         .routing_mode(RoutingMode::AudioText)
//!         .text_base_url("http://127.0.0.1:11434")
//!         .audio_base_url("http://127.0.0.1:8080")
//!         .audio_preprocess(true)
//!         .build()?;
//!
//!     let gateway = Gateway::new(config)?;
//!     let audio = tokio::fs::read("meeting.m4a").await?;
//!     let transcript = gateway.transcribe(audio.into(), None).await?;
//!     println!("{}", transcript);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audio;
pub mod config;
pub mod errors;
pub mod forwarder;
pub mod observability;
pub mod operations;
pub mod routing;
pub mod server;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use config::{Backend, GatewayConfig, GatewayConfigBuilder, RoutingMode};
pub use errors::{AudioErrorKind, ErrorKind, GatewayError, GatewayResult};
pub use operations::{analyze, chat, list_models, transcribe, Gateway};
pub use routing::{select_upstream, select_upstream_value};

// Type re-exports
pub use types::chat::{
    ChatRequestBody, Content, ContentPart, InputAudio, JsonObject, Message, PartKind, Role,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
