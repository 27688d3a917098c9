//! Integration tests using WireMock
//!
//! Upstreams are WireMock servers; the gateway talks to them over real
//! sockets through the reqwest transport.

mod forwarding;
mod scenarios;
mod server;

use std::time::Duration;

use inference_gateway::{GatewayConfig, RoutingMode};
use wiremock::{MockServer, ResponseTemplate};

/// Starts a mock upstream.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Helper to create success response templates
pub fn success_response(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// A chat completion whose first choice says `content`.
pub fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
    })
}

/// Single-mode configuration pointing at `base_url`.
pub fn single_config(base_url: &str) -> GatewayConfig {
    GatewayConfig::builder()
        .text_base_url(base_url)
        .timeout(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

/// audio_text configuration over two upstreams.
pub fn audio_text_config(text: &str, audio: &str) -> GatewayConfig {
    GatewayConfig::builder()
        .routing_mode(RoutingMode::AudioText)
        .text_base_url(text)
        .audio_base_url(audio)
        .timeout(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

/// A base URL on which nothing is listening.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
