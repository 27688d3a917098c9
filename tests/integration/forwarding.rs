//! Forwarder behavior against live sockets.

use std::time::Duration;

use bytes::Bytes;
use inference_gateway::forwarder::{Forwarder, UpstreamPath};
use inference_gateway::{ErrorKind, GatewayConfig, GatewayError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::*;

#[tokio::test]
async fn test_forward_returns_response_verbatim() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({"messages": []})))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw("<html>upstream exploded</html>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = single_config(&mock_server.uri());
    let forwarder = Forwarder::new(&config).unwrap();
    let response = forwarder
        .forward(
            &mock_server.uri(),
            UpstreamPath::ChatCompletions,
            Some(Bytes::from_static(br#"{"messages":[]}"#)),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(&response.body[..], b"<html>upstream exploded</html>");
    assert_eq!(response.content_type(), Some("text/html"));
}

#[tokio::test]
async fn test_forward_unreachable_carries_url() {
    let base_url = closed_port_url();
    let config = single_config(&base_url);
    let forwarder = Forwarder::new(&config).unwrap();

    let err = forwarder
        .forward(&base_url, UpstreamPath::Models, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnreachable);
    assert_eq!(err.upstream(), Some(base_url.as_str()));
}

#[tokio::test]
async fn test_forward_timeout_carries_url() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(success_response(json!({"data": []})).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let config = GatewayConfig::builder()
        .text_base_url(mock_server.uri())
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let forwarder = Forwarder::new(&config).unwrap();

    let err = forwarder
        .forward(&mock_server.uri(), UpstreamPath::Models, None)
        .await
        .unwrap_err();

    match err {
        GatewayError::UpstreamTimeout { upstream, .. } => assert_eq!(upstream, mock_server.uri()),
        other => panic!("expected timeout, got {:?}", other),
    }
}
