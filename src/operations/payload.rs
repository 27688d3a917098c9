//! Request payload construction and response extraction.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::warn;

use crate::errors::{GatewayError, GatewayResult};
use crate::transport::HttpResponse;
use crate::types::{ChatRequestBody, ContentPart, InputAudio, JsonObject, Message};

/// Builds a single-turn payload: a system message, then one audio part.
pub fn audio_payload(system_prompt: &str, wav: &[u8]) -> ChatRequestBody {
    let audio = ContentPart::input_audio(InputAudio::wav(STANDARD.encode(wav)));
    ChatRequestBody::new(vec![
        Message::system(system_prompt),
        Message::user(vec![audio]),
    ])
}

/// Joins an analysis prefix and instruction into one system prompt.
pub fn analyze_prompt(prefix: &str, instruction: &str) -> String {
    if prefix.is_empty() {
        instruction.to_string()
    } else {
        format!("{}\n{}", prefix, instruction)
    }
}

/// Builds a chat payload from caller messages and extra parameters.
///
/// A `messages` key in `extra` is dropped so the caller's messages win.
pub fn chat_payload(messages: Vec<Message>, mut extra: JsonObject) -> ChatRequestBody {
    if extra.remove("messages").is_some() {
        warn!("Ignoring 'messages' passed as an extra parameter");
    }
    let mut body = ChatRequestBody::new(messages);
    body.extra = extra;
    body
}

/// Serializes a payload for the forwarder.
pub fn encode(body: &ChatRequestBody) -> GatewayResult<bytes::Bytes> {
    serde_json::to_vec(body)
        .map(bytes::Bytes::from)
        .map_err(|e| GatewayError::invalid_request(format!("Failed to encode request: {}", e)))
}

/// Turns a non-2xx response into [`GatewayError::UpstreamStatus`].
pub fn ensure_success(upstream: &str, response: &HttpResponse) -> GatewayResult<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(GatewayError::UpstreamStatus {
        upstream: upstream.to_string(),
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

/// Decodes a successful response as a JSON object.
pub fn json_object(upstream: &str, response: &HttpResponse) -> GatewayResult<JsonObject> {
    ensure_success(upstream, response)?;
    match decode(response)? {
        Value::Object(object) => Ok(object),
        other => Err(GatewayError::invalid_request(format!(
            "Upstream returned JSON {} instead of an object",
            json_type(&other)
        ))),
    }
}

/// Extracts `choices[0].message.content` from a successful response.
pub fn message_content(upstream: &str, response: &HttpResponse) -> GatewayResult<String> {
    ensure_success(upstream, response)?;
    let value = decode(response)?;
    match value.pointer("/choices/0/message/content") {
        Some(Value::String(content)) => Ok(content.clone()),
        Some(other) => Err(GatewayError::invalid_request(format!(
            "choices[0].message.content is {}, expected a string",
            json_type(other)
        ))),
        None => Err(GatewayError::invalid_request(
            "Upstream response has no choices[0].message.content",
        )),
    }
}

fn decode(response: &HttpResponse) -> GatewayResult<Value> {
    response.json().map_err(|e| {
        GatewayError::invalid_request(format!("Upstream returned a non-JSON body: {}", e))
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
