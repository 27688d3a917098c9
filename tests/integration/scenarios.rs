//! End-to-end operation scenarios.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use inference_gateway::{
    analyze, chat, list_models, transcribe, ErrorKind, Gateway, GatewayError, JsonObject, Message,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::*;

#[tokio::test]
async fn test_transcribe_single_mode() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(json!({"choices": [{"message": {"content": "hello world"}}]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wav = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    let config = single_config(&mock_server.uri());
    let text = transcribe(Bytes::from(wav.clone()), &config, None).await.unwrap();
    assert_eq!(text, "hello world");

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["messages"][0]["role"], json!("system"));
    assert_eq!(
        body["messages"][1]["content"][0],
        json!({"type": "input_audio", "input_audio": {"data": STANDARD.encode(&wav), "format": "wav"}})
    );
}

#[tokio::test]
async fn test_chat_returns_upstream_object_unmodified() {
    let mock_server = setup_mock_server().await;
    let upstream = completion("hi there");
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(success_response(upstream.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut extra = JsonObject::new();
    extra.insert("model".to_string(), json!("llama3"));
    let config = single_config(&mock_server.uri());
    let result = chat(vec![Message::user("hi")], &config, extra).await.unwrap();

    assert_eq!(Value::Object(result), upstream);
}

#[tokio::test]
async fn test_analyze_non_json_is_invalid_request() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Service temporarily overloaded"))
        .mount(&mock_server)
        .await;

    let config = single_config(&mock_server.uri());
    let err = analyze(Bytes::from_static(b"audio"), "summarize", &config, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_list_models_404_is_upstream_error() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 page not found"))
        .mount(&mock_server)
        .await;

    let config = single_config(&mock_server.uri());
    let err = list_models(&config).await.unwrap_err();

    assert!(err.is_upstream());
    match err {
        GatewayError::UpstreamStatus { status, upstream, .. } => {
            assert_eq!(status, 404);
            assert_eq!(upstream, mock_server.uri());
        }
        other => panic!("expected upstream status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_audio_text_splits_traffic() {
    let text_server = setup_mock_server().await;
    let audio_server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(completion("from text")))
        .expect(1)
        .mount(&text_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(success_response(completion("from audio")))
        .expect(2)
        .mount(&audio_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(success_response(json!({"object": "list", "data": [{"id": "llama3"}]})))
        .expect(1)
        .mount(&text_server)
        .await;

    let gateway =
        Gateway::new(audio_text_config(&text_server.uri(), &audio_server.uri())).unwrap();

    let text_reply = gateway
        .chat(vec![Message::user("summarize the audio")], JsonObject::new())
        .await
        .unwrap();
    assert_eq!(text_reply["choices"][0]["message"]["content"], json!("from text"));

    let audio_messages: Vec<Message> = serde_json::from_value(json!([
        {"role": "user", "content": [
            {"type": "text", "text": "what is said?"},
            {"type": "input_audio", "input_audio": {"data": "AAAA", "format": "wav"}}
        ]}
    ]))
    .unwrap();
    let audio_reply = gateway.chat(audio_messages, JsonObject::new()).await.unwrap();
    assert_eq!(audio_reply["choices"][0]["message"]["content"], json!("from audio"));

    let transcript = gateway.transcribe(Bytes::from_static(b"wav"), Some("Transcribe verbatim.")).await.unwrap();
    assert_eq!(transcript, "from audio");

    let models = gateway.list_models().await.unwrap();
    assert_eq!(models["data"][0]["id"], json!("llama3"));
}

#[tokio::test]
async fn test_transcribe_unreachable_audio_upstream() {
    let text_server = setup_mock_server().await;
    let audio_url = closed_port_url();
    let config = audio_text_config(&text_server.uri(), &audio_url);

    let err = transcribe(Bytes::from_static(b"wav"), &config, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnreachable);
    assert_eq!(err.upstream(), Some(audio_url.as_str()));
}
