//! HTTP gateway tests.

use std::net::SocketAddr;

use inference_gateway::server::build_app;
use inference_gateway::{Gateway, GatewayConfig};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use super::*;

/// Serves the gateway on an ephemeral port.
async fn spawn_gateway(config: GatewayConfig) -> SocketAddr {
    let app = build_app(Gateway::new(config).unwrap(), &[]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn audio_form() -> Form {
    Form::new().part("file", Part::bytes(b"RIFFdata".to_vec()).file_name("clip.wav"))
}

#[tokio::test]
async fn test_health() {
    let addr = spawn_gateway(single_config(&closed_port_url())).await;

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    let request_id = response.headers()["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(request_id.len(), 12);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let addr = spawn_gateway(single_config(&closed_port_url())).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/health", addr))
        .header("x-request-id", "trace-abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_chat_passthrough_keeps_status_and_body() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_raw("slow down", "text/plain; charset=utf-8")
                .insert_header("retry-after", "7"),
        )
        .mount(&mock_server)
        .await;
    let addr = spawn_gateway(single_config(&mock_server.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/v1/chat/completions", addr))
        .json(&json!({"model": "m", "messages": [{"role": "user", "content": "hi"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    assert_eq!(response.headers()["retry-after"], "7");
    assert_eq!(response.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(response.text().await.unwrap(), "slow down");

    let forwarded: Value = mock_server.received_requests().await.unwrap()[0].body_json().unwrap();
    assert_eq!(forwarded["model"], json!("m"));
}

#[tokio::test]
async fn test_chat_rejects_bad_bodies() {
    let addr = spawn_gateway(single_config(&closed_port_url())).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/v1/chat/completions", addr);

    let response = client.post(&url).body("{not json").send().await.unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("invalid_json"));

    let response = client.post(&url).json(&json!([1, 2])).send().await.unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("invalid_request"));
}

#[tokio::test]
async fn test_chat_forwards_any_object_shape() {
    let text_server = setup_mock_server().await;
    let audio_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(completion("from text")))
        .expect(3)
        .mount(&text_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(completion("from audio")))
        .expect(1)
        .mount(&audio_server)
        .await;
    let addr = spawn_gateway(audio_text_config(&text_server.uri(), &audio_server.uri())).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/v1/chat/completions", addr);

    for body in [
        json!({"model": "m", "prompt": "x"}),
        json!({"messages": [{"role": "user", "content": ["hello"]}]}),
        json!({"messages": [{"content": {"type": "input_audio"}}]}),
    ] {
        let response = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(response.status(), 200);
        let reply: Value = response.json().await.unwrap();
        assert_eq!(reply["choices"][0]["message"]["content"], json!("from text"));
    }

    let response = client
        .post(&url)
        .json(&json!({"messages": [{"content": [{"type": 5}, {"type": "input_audio"}]}]}))
        .send()
        .await
        .unwrap();
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["choices"][0]["message"]["content"], json!("from audio"));

    let forwarded: Value = text_server.received_requests().await.unwrap()[0].body_json().unwrap();
    assert_eq!(forwarded, json!({"model": "m", "prompt": "x"}));
}

#[tokio::test]
async fn test_chat_unreachable_is_502() {
    let upstream = closed_port_url();
    let addr = spawn_gateway(single_config(&upstream)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/v1/chat/completions", addr))
        .json(&json!({"messages": [{"role": "user", "content": "hi"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("upstream_unreachable"));
    assert_eq!(body["upstream"], json!(upstream));
}

#[tokio::test]
async fn test_models_passthrough() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 page not found"))
        .mount(&mock_server)
        .await;
    let addr = spawn_gateway(single_config(&mock_server.uri())).await;

    let response = reqwest::get(format!("http://{}/v1/models", addr)).await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "404 page not found");
}

#[tokio::test]
async fn test_transcribe_endpoint() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(completion("the quick brown fox")))
        .expect(1)
        .mount(&mock_server)
        .await;
    let addr = spawn_gateway(single_config(&mock_server.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/v1/transcribe", addr))
        .multipart(audio_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"transcript": "the quick brown fox"}));
}

#[tokio::test]
async fn test_analyze_endpoint() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(completion("a dog barking")))
        .mount(&mock_server)
        .await;
    let addr = spawn_gateway(single_config(&mock_server.uri())).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/v1/analyze", addr);

    let response = client
        .post(&url)
        .multipart(audio_form().text("instruction", "Describe the sounds."))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"result": "a dog barking"}));

    let forwarded: Value = mock_server.received_requests().await.unwrap()[0].body_json().unwrap();
    assert_eq!(forwarded["messages"][0]["content"], json!("Describe the sounds."));

    let response = client.post(&url).multipart(audio_form()).send().await.unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("invalid_request"));
}

#[tokio::test]
async fn test_transcribe_too_large_is_413() {
    let config = GatewayConfig::builder()
        .text_base_url(closed_port_url())
        .max_upload_bytes(4)
        .build()
        .unwrap();
    let addr = spawn_gateway(config).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/v1/transcribe", addr))
        .multipart(audio_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("audio_too_large"));
}

#[tokio::test]
async fn test_upstream_status_on_transcribe_is_502() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&mock_server)
        .await;
    let addr = spawn_gateway(single_config(&mock_server.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/v1/transcribe", addr))
        .multipart(audio_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("upstream_error"));
    assert_eq!(body["upstream"], json!(mock_server.uri()));
}
