//! Public operations: transcribe, analyze, chat and list_models.
//!
//! Each operation is a linear pipeline over the lower layers:
//! normalize, build the payload, route, forward, then extract the result.
//! Nothing is kept between calls apart from the pooled HTTP client.

mod payload;

pub use payload::{analyze_prompt, audio_payload, chat_payload};

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::audio::AudioNormalizer;
use crate::config::GatewayConfig;
use crate::errors::GatewayResult;
use crate::forwarder::{Forwarder, UpstreamPath};
use crate::routing::{audio_upstream, models_upstream, select_upstream, select_upstream_value};
use crate::transport::{HttpResponse, HttpTransport};
use crate::types::{JsonObject, Message};

/// Entry point for gateway operations.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    forwarder: Forwarder,
    normalizer: AudioNormalizer,
}

impl Gateway {
    /// Creates a gateway with a pooled reqwest transport.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let forwarder = Forwarder::new(&config)?;
        Ok(Self::build(config, forwarder))
    }

    /// Creates a gateway over a custom transport.
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::build(config, Forwarder::with_transport(transport))
    }

    fn build(config: GatewayConfig, forwarder: Forwarder) -> Self {
        let normalizer = AudioNormalizer::new(&config);
        Self {
            config: Arc::new(config),
            forwarder,
            normalizer,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Transcribes audio.
    ///
    /// Uses the configured transcription prompt unless `system_prompt` is
    /// given.
    #[instrument(skip(self, audio, system_prompt), fields(bytes = audio.len()))]
    pub async fn transcribe(&self, audio: Bytes, system_prompt: Option<&str>) -> GatewayResult<String> {
        let prompt = system_prompt.unwrap_or_else(|| self.config.transcribe_system_prompt());
        self.complete_audio(audio, prompt).await
    }

    /// Runs a free-form instruction against audio.
    ///
    /// The instruction is passed through verbatim. `system_prompt_prefix`
    /// overrides the configured prefix.
    #[instrument(skip(self, audio, instruction, system_prompt_prefix), fields(bytes = audio.len()))]
    pub async fn analyze(
        &self,
        audio: Bytes,
        instruction: &str,
        system_prompt_prefix: Option<&str>,
    ) -> GatewayResult<String> {
        let prefix =
            system_prompt_prefix.unwrap_or_else(|| self.config.analyze_system_prompt_prefix());
        let prompt = analyze_prompt(prefix, instruction);
        self.complete_audio(audio, &prompt).await
    }

    /// Sends a chat completion and returns the full response object.
    ///
    /// `extra` is merged into the top level of the request; no system prompt
    /// is added.
    #[instrument(skip_all, fields(messages = messages.len()))]
    pub async fn chat(&self, messages: Vec<Message>, extra: JsonObject) -> GatewayResult<JsonObject> {
        let body = chat_payload(messages, extra);
        let upstream = select_upstream(&body, &self.config)?;
        let response = self
            .forwarder
            .forward(upstream, UpstreamPath::ChatCompletions, Some(payload::encode(&body)?))
            .await?;
        payload::json_object(upstream, &response)
    }

    /// Lists models from the models backend.
    ///
    /// A non-2xx answer is an error, never an empty list.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> GatewayResult<JsonObject> {
        let upstream = models_upstream(&self.config)?;
        let response = self
            .forwarder
            .forward(upstream, UpstreamPath::Models, None)
            .await?;
        payload::json_object(upstream, &response)
    }

    /// Routes `body` and forwards `raw` unchanged.
    ///
    /// The upstream response is returned whatever its status.
    pub async fn forward_chat_raw(&self, body: &Value, raw: Bytes) -> GatewayResult<HttpResponse> {
        let upstream = select_upstream_value(body, &self.config)?;
        self.forwarder
            .forward(upstream, UpstreamPath::ChatCompletions, Some(raw))
            .await
    }

    /// Forwards a model listing and returns the upstream response unchanged.
    pub async fn forward_models_raw(&self) -> GatewayResult<HttpResponse> {
        let upstream = models_upstream(&self.config)?;
        self.forwarder.forward(upstream, UpstreamPath::Models, None).await
    }

    async fn complete_audio(&self, audio: Bytes, system_prompt: &str) -> GatewayResult<String> {
        let upstream = audio_upstream(&self.config)?;
        let wav = self.normalizer.normalize(audio).await?;
        let body = audio_payload(system_prompt, &wav);
        debug!(upstream = %upstream, wav_bytes = wav.len(), "Sending audio request");

        let response = self
            .forwarder
            .forward(upstream, UpstreamPath::ChatCompletions, Some(payload::encode(&body)?))
            .await?;
        payload::message_content(upstream, &response)
    }
}

/// Transcribes audio with a one-off [`Gateway`].
pub async fn transcribe(
    audio: Bytes,
    config: &GatewayConfig,
    system_prompt: Option<&str>,
) -> GatewayResult<String> {
    Gateway::new(config.clone())?.transcribe(audio, system_prompt).await
}

/// Analyzes audio with a one-off [`Gateway`].
pub async fn analyze(
    audio: Bytes,
    instruction: &str,
    config: &GatewayConfig,
    system_prompt_prefix: Option<&str>,
) -> GatewayResult<String> {
    Gateway::new(config.clone())?
        .analyze(audio, instruction, system_prompt_prefix)
        .await
}

/// Sends a chat completion with a one-off [`Gateway`].
pub async fn chat(
    messages: Vec<Message>,
    config: &GatewayConfig,
    extra: JsonObject,
) -> GatewayResult<JsonObject> {
    Gateway::new(config.clone())?.chat(messages, extra).await
}

/// Lists models with a one-off [`Gateway`].
pub async fn list_models(config: &GatewayConfig) -> GatewayResult<JsonObject> {
    Gateway::new(config.clone())?.list_models().await
}
