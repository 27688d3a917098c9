//! Upstream selection.
//!
//! The router decides which base URL receives a request. The decision looks
//! only at the configured [`RoutingMode`] and the `type` discriminator of
//! content parts; no text inside a message is ever read.

use serde_json::Value;

use crate::config::{Backend, GatewayConfig, RoutingMode};
use crate::errors::{GatewayError, GatewayResult};
use crate::types::{ChatRequestBody, PartKind};

/// Returns true if any message carries a part whose discriminator is audio.
pub fn has_audio_content(body: &ChatRequestBody) -> bool {
    body.messages
        .iter()
        .flat_map(|message| message.parts())
        .any(|part| part.is_audio())
}

/// Same check on an untyped request body.
///
/// Any shape is accepted: a missing or non-array `messages`, non-object
/// messages, string or object content and non-object parts all count as
/// "no audio".
pub fn has_audio_value(body: &Value) -> bool {
    let Some(messages) = body.get("messages").and_then(Value::as_array) else {
        return false;
    };
    messages
        .iter()
        .filter_map(|message| message.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("type").and_then(Value::as_str))
        .any(|kind| PartKind::from(kind.to_string()).is_audio())
}

/// Selects the upstream base URL for a chat request.
///
/// In single mode the body is not inspected. In audio_text mode, requests
/// with audio parts go to the audio upstream and all others to text.
pub fn select_upstream<'a>(
    body: &ChatRequestBody,
    config: &'a GatewayConfig,
) -> GatewayResult<&'a str> {
    route(config, || has_audio_content(body))
}

/// [`select_upstream`] for a raw JSON body that is forwarded as-is.
pub fn select_upstream_value<'a>(
    body: &Value,
    config: &'a GatewayConfig,
) -> GatewayResult<&'a str> {
    route(config, || has_audio_value(body))
}

fn route(config: &GatewayConfig, has_audio: impl FnOnce() -> bool) -> GatewayResult<&str> {
    match config.routing_mode() {
        RoutingMode::Single => single_upstream(config),
        RoutingMode::AudioText => {
            if has_audio() {
                backend_url(config, Backend::Audio)
            } else {
                backend_url(config, Backend::Text)
            }
        }
    }
}

/// Upstream for payloads that are audio by construction.
///
/// Targets the audio upstream whenever one is configured, in either mode.
pub fn audio_upstream(config: &GatewayConfig) -> GatewayResult<&str> {
    match config.audio_base_url() {
        Some(url) => Ok(url),
        None => match config.routing_mode() {
            RoutingMode::Single => single_upstream(config),
            RoutingMode::AudioText => backend_url(config, Backend::Audio),
        },
    }
}

/// Upstream that answers model listings.
pub fn models_upstream(config: &GatewayConfig) -> GatewayResult<&str> {
    match config.routing_mode() {
        RoutingMode::Single => single_upstream(config),
        RoutingMode::AudioText => backend_url(config, config.models_backend()),
    }
}

fn single_upstream(config: &GatewayConfig) -> GatewayResult<&str> {
    config.effective_base_url().ok_or_else(|| {
        GatewayError::configuration(
            "Either default_base_url or text_base_url must be set when routing_mode=single",
        )
    })
}

fn backend_url(config: &GatewayConfig, backend: Backend) -> GatewayResult<&str> {
    let (url, name) = match backend {
        Backend::Text => (config.text_base_url(), "text_base_url"),
        Backend::Audio => (config.audio_base_url(), "audio_base_url"),
    };
    url.ok_or_else(|| {
        GatewayError::configuration(format!(
            "{} is required when routing_mode=audio_text",
            name
        ))
    })
}
