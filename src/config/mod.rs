//! Configuration module for the inference gateway.
//!
//! [`GatewayConfig`] is validated once, when it is built, and is read-only
//! afterwards. It is passed explicitly to every component; there is no
//! process-wide configuration state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::{GatewayError, GatewayResult};

/// Default total request timeout (300 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time budget for one transcoder run (60 seconds).
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum audio upload size in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20_000_000;

/// Default target sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Default target channel count (mono).
pub const DEFAULT_CHANNELS: u16 = 1;

/// Default EBU R128 loudness filter.
pub const DEFAULT_LOUDNORM_FILTER: &str = "loudnorm=I=-16:TP=-1.5:LRA=11";

/// Default transcoder binary, resolved through `PATH`.
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

/// Default system prompt for transcription.
pub const DEFAULT_TRANSCRIBE_PROMPT: &str = "You are a helpful assistant that transcribes audio. \
     Listen carefully and provide an accurate transcription.";

/// How requests are spread across upstreams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMode {
    /// All traffic goes to one upstream.
    #[default]
    Single,
    /// Audio-bearing requests go to the audio upstream, the rest to text.
    AudioText,
}

impl RoutingMode {
    /// Returns the configuration spelling of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingMode::Single => "single",
            RoutingMode::AudioText => "audio_text",
        }
    }
}

impl FromStr for RoutingMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(RoutingMode::Single),
            "audio_text" => Ok(RoutingMode::AudioText),
            other => Err(GatewayError::configuration(format!(
                "routing_mode must be 'single' or 'audio_text', got '{}'",
                other
            ))),
        }
    }
}

/// A configured upstream role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// The text upstream.
    #[default]
    Text,
    /// The audio upstream.
    Audio,
}

impl FromStr for Backend {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Backend::Text),
            "audio" => Ok(Backend::Audio),
            other => Err(GatewayError::configuration(format!(
                "backend must be 'text' or 'audio', got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the inference gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    text_base_url: Option<String>,
    audio_base_url: Option<String>,
    default_base_url: Option<String>,
    routing_mode: RoutingMode,
    models_backend: Backend,
    timeout: Duration,
    connect_timeout: Duration,
    audio_preprocess_enabled: bool,
    audio_max_upload_bytes: usize,
    audio_target_sample_rate: u32,
    audio_target_channels: u16,
    audio_loudnorm: bool,
    audio_loudnorm_filter: String,
    ffmpeg_bin: PathBuf,
    transcode_timeout: Duration,
    scratch_dir: Option<PathBuf>,
    transcribe_system_prompt: String,
    analyze_system_prompt_prefix: String,
}

impl GatewayConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TEXT_BASE_URL`, `AUDIO_BASE_URL`, `DEFAULT_BASE_URL`: upstream URLs
    /// - `ROUTING_MODE`: `single` or `audio_text`
    /// - `MODELS_BACKEND`: `text` or `audio`
    /// - `UPSTREAM_TIMEOUT_S`, `UPSTREAM_CONNECT_TIMEOUT_S`: seconds (float)
    /// - `AUDIO_PREPROCESS_ENABLED`, `AUDIO_LOUDNORM`: boolean flags
    /// - `AUDIO_MAX_UPLOAD_BYTES`, `AUDIO_TARGET_SR`, `AUDIO_TARGET_CHANNELS`
    /// - `AUDIO_LOUDNORM_FILTER`, `FFMPEG_BIN`, `AUDIO_TRANSCODE_TIMEOUT_S`,
    ///   `AUDIO_SCRATCH_DIR`
    /// - `TRANSCRIBE_SYSTEM_PROMPT`, `ANALYZE_SYSTEM_PROMPT_PREFIX`
    ///
    /// Audio preprocessing defaults to enabled when loaded this way.
    pub fn from_env() -> GatewayResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// Uses the same variable names as [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut builder = GatewayConfigBuilder::new().audio_preprocess(true);

        if let Some(url) = get("TEXT_BASE_URL") {
            builder = builder.text_base_url(url);
        }
        if let Some(url) = get("AUDIO_BASE_URL") {
            builder = builder.audio_base_url(url);
        }
        if let Some(url) = get("DEFAULT_BASE_URL") {
            builder = builder.default_base_url(url);
        }
        if let Some(mode) = get("ROUTING_MODE") {
            builder = builder.routing_mode(mode.parse()?);
        }
        if let Some(backend) = get("MODELS_BACKEND") {
            builder = builder.models_backend(backend.parse()?);
        }
        if let Some(secs) = get("UPSTREAM_TIMEOUT_S") {
            builder = builder.timeout(parse_secs("UPSTREAM_TIMEOUT_S", &secs)?);
        }
        if let Some(secs) = get("UPSTREAM_CONNECT_TIMEOUT_S") {
            builder = builder.connect_timeout(parse_secs("UPSTREAM_CONNECT_TIMEOUT_S", &secs)?);
        }
        if let Some(flag) = get("AUDIO_PREPROCESS_ENABLED") {
            builder = builder.audio_preprocess(parse_bool("AUDIO_PREPROCESS_ENABLED", &flag)?);
        }
        if let Some(bytes) = get("AUDIO_MAX_UPLOAD_BYTES") {
            builder = builder.max_upload_bytes(parse_value("AUDIO_MAX_UPLOAD_BYTES", &bytes)?);
        }
        if let Some(rate) = get("AUDIO_TARGET_SR") {
            builder = builder.target_sample_rate(parse_value("AUDIO_TARGET_SR", &rate)?);
        }
        if let Some(channels) = get("AUDIO_TARGET_CHANNELS") {
            builder = builder.target_channels(parse_value("AUDIO_TARGET_CHANNELS", &channels)?);
        }
        if let Some(flag) = get("AUDIO_LOUDNORM") {
            builder = builder.loudnorm(parse_bool("AUDIO_LOUDNORM", &flag)?);
        }
        if let Some(filter) = get("AUDIO_LOUDNORM_FILTER") {
            builder = builder.loudnorm_filter(filter);
        }
        if let Some(bin) = get("FFMPEG_BIN") {
            builder = builder.ffmpeg_bin(bin);
        }
        if let Some(secs) = get("AUDIO_TRANSCODE_TIMEOUT_S") {
            builder = builder.transcode_timeout(parse_secs("AUDIO_TRANSCODE_TIMEOUT_S", &secs)?);
        }
        if let Some(dir) = get("AUDIO_SCRATCH_DIR") {
            builder = builder.scratch_dir(dir);
        }
        if let Some(prompt) = get("TRANSCRIBE_SYSTEM_PROMPT") {
            builder = builder.transcribe_system_prompt(prompt);
        }
        // An empty prefix is meaningful, so read it without the emptiness filter.
        if let Some(prefix) = lookup("ANALYZE_SYSTEM_PROMPT_PREFIX") {
            builder = builder.analyze_system_prompt_prefix(prefix);
        }

        builder.build()
    }

    /// Base URL of the text upstream.
    pub fn text_base_url(&self) -> Option<&str> {
        self.text_base_url.as_deref()
    }

    /// Base URL of the audio upstream.
    pub fn audio_base_url(&self) -> Option<&str> {
        self.audio_base_url.as_deref()
    }

    /// Explicit default upstream for single mode.
    pub fn default_base_url(&self) -> Option<&str> {
        self.default_base_url.as_deref()
    }

    /// Upstream used in single mode: the default URL, else the text URL.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.default_base_url().or_else(|| self.text_base_url())
    }

    /// Routing mode.
    pub fn routing_mode(&self) -> RoutingMode {
        self.routing_mode
    }

    /// Backend that answers model listings in audio_text mode.
    pub fn models_backend(&self) -> Backend {
        self.models_backend
    }

    /// Total request budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connect-phase budget.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Whether audio is run through the transcoder before forwarding.
    pub fn audio_preprocess_enabled(&self) -> bool {
        self.audio_preprocess_enabled
    }

    /// Maximum accepted audio size in bytes.
    pub fn audio_max_upload_bytes(&self) -> usize {
        self.audio_max_upload_bytes
    }

    /// Target sample rate in Hz.
    pub fn audio_target_sample_rate(&self) -> u32 {
        self.audio_target_sample_rate
    }

    /// Target channel count.
    pub fn audio_target_channels(&self) -> u16 {
        self.audio_target_channels
    }

    /// Whether loudness normalization is applied.
    pub fn audio_loudnorm(&self) -> bool {
        self.audio_loudnorm
    }

    /// Loudness filter expression passed to the transcoder.
    pub fn audio_loudnorm_filter(&self) -> &str {
        &self.audio_loudnorm_filter
    }

    /// Transcoder binary.
    pub fn ffmpeg_bin(&self) -> &Path {
        &self.ffmpeg_bin
    }

    /// Time budget for one transcoder run.
    pub fn transcode_timeout(&self) -> Duration {
        self.transcode_timeout
    }

    /// Root for per-call scratch directories; `None` means the OS temp dir.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// Default system prompt for transcription.
    pub fn transcribe_system_prompt(&self) -> &str {
        &self.transcribe_system_prompt
    }

    /// Default prefix for analysis system prompts.
    pub fn analyze_system_prompt_prefix(&self) -> &str {
        &self.analyze_system_prompt_prefix
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("routing_mode", &self.routing_mode)
            .field("text_base_url", &self.text_base_url)
            .field("audio_base_url", &self.audio_base_url)
            .field("default_base_url", &self.default_base_url)
            .field("models_backend", &self.models_backend)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("audio_preprocess_enabled", &self.audio_preprocess_enabled)
            .field("audio_max_upload_bytes", &self.audio_max_upload_bytes)
            .field("ffmpeg_bin", &self.ffmpeg_bin)
            .finish_non_exhaustive()
    }
}

/// Builder for `GatewayConfig`.
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    text_base_url: Option<String>,
    audio_base_url: Option<String>,
    default_base_url: Option<String>,
    routing_mode: RoutingMode,
    models_backend: Backend,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    audio_preprocess_enabled: bool,
    audio_max_upload_bytes: Option<usize>,
    audio_target_sample_rate: Option<u32>,
    audio_target_channels: Option<u16>,
    audio_loudnorm: Option<bool>,
    audio_loudnorm_filter: Option<String>,
    ffmpeg_bin: Option<PathBuf>,
    transcode_timeout: Option<Duration>,
    scratch_dir: Option<PathBuf>,
    transcribe_system_prompt: Option<String>,
    analyze_system_prompt_prefix: Option<String>,
}

impl GatewayConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text upstream URL.
    pub fn text_base_url(mut self, url: impl Into<String>) -> Self {
        self.text_base_url = Some(url.into());
        self
    }

    /// Sets the audio upstream URL.
    pub fn audio_base_url(mut self, url: impl Into<String>) -> Self {
        self.audio_base_url = Some(url.into());
        self
    }

    /// Sets the default upstream URL used in single mode.
    pub fn default_base_url(mut self, url: impl Into<String>) -> Self {
        self.default_base_url = Some(url.into());
        self
    }

    /// Sets the routing mode.
    pub fn routing_mode(mut self, mode: RoutingMode) -> Self {
        self.routing_mode = mode;
        self
    }

    /// Sets the backend that answers model listings in audio_text mode.
    pub fn models_backend(mut self, backend: Backend) -> Self {
        self.models_backend = backend;
        self
    }

    /// Sets the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Enables or disables transcoder preprocessing.
    pub fn audio_preprocess(mut self, enabled: bool) -> Self {
        self.audio_preprocess_enabled = enabled;
        self
    }

    /// Sets the maximum audio size in bytes.
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.audio_max_upload_bytes = Some(bytes);
        self
    }

    /// Sets the target sample rate.
    pub fn target_sample_rate(mut self, hz: u32) -> Self {
        self.audio_target_sample_rate = Some(hz);
        self
    }

    /// Sets the target channel count.
    pub fn target_channels(mut self, channels: u16) -> Self {
        self.audio_target_channels = Some(channels);
        self
    }

    /// Enables or disables loudness normalization.
    pub fn loudnorm(mut self, enabled: bool) -> Self {
        self.audio_loudnorm = Some(enabled);
        self
    }

    /// Sets the loudness filter expression.
    pub fn loudnorm_filter(mut self, filter: impl Into<String>) -> Self {
        self.audio_loudnorm_filter = Some(filter.into());
        self
    }

    /// Sets the transcoder binary.
    pub fn ffmpeg_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.ffmpeg_bin = Some(bin.into());
        self
    }

    /// Sets the transcoder time budget.
    pub fn transcode_timeout(mut self, timeout: Duration) -> Self {
        self.transcode_timeout = Some(timeout);
        self
    }

    /// Sets the root directory for scratch files.
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Sets the default transcription system prompt.
    pub fn transcribe_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.transcribe_system_prompt = Some(prompt.into());
        self
    }

    /// Sets the default analysis system prompt prefix.
    pub fn analyze_system_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.analyze_system_prompt_prefix = Some(prefix.into());
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> GatewayResult<GatewayConfig> {
        let text_base_url = validate_url("text_base_url", self.text_base_url)?;
        let audio_base_url = validate_url("audio_base_url", self.audio_base_url)?;
        let default_base_url = validate_url("default_base_url", self.default_base_url)?;

        match self.routing_mode {
            RoutingMode::Single => {
                if default_base_url.is_none() && text_base_url.is_none() {
                    return Err(GatewayError::configuration(
                        "Either default_base_url or text_base_url must be set when routing_mode=single",
                    ));
                }
            }
            RoutingMode::AudioText => {
                if text_base_url.is_none() {
                    return Err(GatewayError::configuration(
                        "text_base_url is required when routing_mode=audio_text",
                    ));
                }
                if audio_base_url.is_none() {
                    return Err(GatewayError::configuration(
                        "audio_base_url is required when routing_mode=audio_text",
                    ));
                }
            }
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let transcode_timeout = self.transcode_timeout.unwrap_or(DEFAULT_TRANSCODE_TIMEOUT);
        for (name, value) in [
            ("timeout", timeout),
            ("connect_timeout", connect_timeout),
            ("transcode_timeout", transcode_timeout),
        ] {
            if value.is_zero() {
                return Err(GatewayError::configuration(format!(
                    "{} must be positive",
                    name
                )));
            }
        }

        let audio_max_upload_bytes = self.audio_max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if audio_max_upload_bytes == 0 {
            return Err(GatewayError::configuration(
                "audio_max_upload_bytes must be positive",
            ));
        }

        let audio_target_sample_rate = self.audio_target_sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        if audio_target_sample_rate == 0 {
            return Err(GatewayError::configuration(
                "audio_target_sample_rate must be positive",
            ));
        }

        let audio_target_channels = self.audio_target_channels.unwrap_or(DEFAULT_CHANNELS);
        if audio_target_channels == 0 {
            return Err(GatewayError::configuration(
                "audio_target_channels must be positive",
            ));
        }

        let audio_loudnorm = self.audio_loudnorm.unwrap_or(true);
        let audio_loudnorm_filter = self
            .audio_loudnorm_filter
            .unwrap_or_else(|| DEFAULT_LOUDNORM_FILTER.to_string());
        if audio_loudnorm && audio_loudnorm_filter.trim().is_empty() {
            return Err(GatewayError::configuration(
                "audio_loudnorm_filter cannot be empty when loudness normalization is enabled",
            ));
        }

        let ffmpeg_bin = self
            .ffmpeg_bin
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FFMPEG_BIN));
        if ffmpeg_bin.as_os_str().is_empty() {
            return Err(GatewayError::configuration("ffmpeg_bin cannot be empty"));
        }

        Ok(GatewayConfig {
            text_base_url,
            audio_base_url,
            default_base_url,
            routing_mode: self.routing_mode,
            models_backend: self.models_backend,
            timeout,
            connect_timeout,
            audio_preprocess_enabled: self.audio_preprocess_enabled,
            audio_max_upload_bytes,
            audio_target_sample_rate,
            audio_target_channels,
            audio_loudnorm,
            audio_loudnorm_filter,
            ffmpeg_bin,
            transcode_timeout,
            scratch_dir: self.scratch_dir,
            transcribe_system_prompt: self
                .transcribe_system_prompt
                .unwrap_or_else(|| DEFAULT_TRANSCRIBE_PROMPT.to_string()),
            analyze_system_prompt_prefix: self.analyze_system_prompt_prefix.unwrap_or_default(),
        })
    }
}

/// Validates an optional upstream URL; empty means unset.
fn validate_url(name: &str, value: Option<String>) -> GatewayResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed = Url::parse(trimmed).map_err(|e| {
        GatewayError::configuration(format!("{} is not a valid URL ({}): {}", name, e, trimmed))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GatewayError::configuration(format!(
            "{} must use http or https scheme, got {}",
            name, trimmed
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(GatewayError::configuration(format!(
            "{} must have a valid host, got {}",
            name, trimmed
        )));
    }

    Ok(Some(trimmed.trim_end_matches('/').to_string()))
}

fn parse_bool(name: &str, value: &str) -> GatewayResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(GatewayError::configuration(format!(
            "{} must be one of 0, 1, true, false, yes, no; got '{}'",
            name, value
        ))),
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> GatewayResult<T> {
    value.trim().parse().map_err(|_| {
        GatewayError::configuration(format!("{} has an invalid value: '{}'", name, value))
    })
}

fn parse_secs(name: &str, value: &str) -> GatewayResult<Duration> {
    let secs: f64 = parse_value(name, value)?;
    Duration::try_from_secs_f64(secs).map_err(|_| {
        GatewayError::configuration(format!("{} must be a non-negative number of seconds", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::errors::ErrorKind;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = GatewayConfig::builder()
            .text_base_url("http://127.0.0.1:11434")
            .build()
            .unwrap();

        assert_eq!(config.routing_mode(), RoutingMode::Single);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
        assert!(!config.audio_preprocess_enabled());
        assert_eq!(config.audio_max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.audio_target_sample_rate(), 16_000);
        assert_eq!(config.audio_target_channels(), 1);
        assert!(config.audio_loudnorm());
        assert_eq!(config.ffmpeg_bin(), Path::new("ffmpeg"));
        assert_eq!(config.analyze_system_prompt_prefix(), "");
        assert_eq!(config.effective_base_url(), Some("http://127.0.0.1:11434"));
    }

    #[test]
    fn test_single_mode_requires_a_url() {
        let err = GatewayConfig::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_single_mode_prefers_default_url() {
        let config = GatewayConfig::builder()
            .text_base_url("http://text:8080")
            .default_base_url("http://default:8080/")
            .build()
            .unwrap();
        assert_eq!(config.effective_base_url(), Some("http://default:8080"));
    }

    #[test]
    fn test_audio_text_requires_both_urls() {
        let missing_audio = GatewayConfig::builder()
            .routing_mode(RoutingMode::AudioText)
            .text_base_url("http://text:8080")
            .build();
        assert!(missing_audio.is_err());

        let missing_text = GatewayConfig::builder()
            .routing_mode(RoutingMode::AudioText)
            .audio_base_url("http://audio:8080")
            .build();
        assert!(missing_text.is_err());

        let ok = GatewayConfig::builder()
            .routing_mode(RoutingMode::AudioText)
            .text_base_url("http://text:8080")
            .audio_base_url("http://audio:8080")
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_empty_url_is_unset() {
        let result = GatewayConfig::builder().text_base_url("   ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_url_without_scheme_is_rejected() {
        let result = GatewayConfig::builder().text_base_url("localhost:8080").build();
        assert!(result.is_err());

        let result = GatewayConfig::builder().text_base_url("ftp://host/").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = GatewayConfig::builder()
            .text_base_url("http://text:8080")
            .connect_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_parses_all_fields() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("TEXT_BASE_URL", "http://text:11434"),
            ("AUDIO_BASE_URL", "https://audio:8080/"),
            ("ROUTING_MODE", "audio_text"),
            ("MODELS_BACKEND", "audio"),
            ("UPSTREAM_TIMEOUT_S", "12.5"),
            ("UPSTREAM_CONNECT_TIMEOUT_S", "2"),
            ("AUDIO_PREPROCESS_ENABLED", "no"),
            ("AUDIO_MAX_UPLOAD_BYTES", "1000"),
            ("AUDIO_TARGET_SR", "22050"),
            ("AUDIO_TARGET_CHANNELS", "2"),
            ("AUDIO_LOUDNORM", "FALSE"),
            ("FFMPEG_BIN", "/opt/ffmpeg/bin/ffmpeg"),
            ("ANALYZE_SYSTEM_PROMPT_PREFIX", "Be brief."),
        ]))
        .unwrap();

        assert_eq!(config.routing_mode(), RoutingMode::AudioText);
        assert_eq!(config.models_backend(), Backend::Audio);
        assert_eq!(config.audio_base_url(), Some("https://audio:8080"));
        assert_eq!(config.timeout(), Duration::from_millis(12_500));
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
        assert!(!config.audio_preprocess_enabled());
        assert_eq!(config.audio_max_upload_bytes(), 1000);
        assert_eq!(config.audio_target_sample_rate(), 22_050);
        assert_eq!(config.audio_target_channels(), 2);
        assert!(!config.audio_loudnorm());
        assert_eq!(config.ffmpeg_bin(), Path::new("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.analyze_system_prompt_prefix(), "Be brief.");
    }

    #[test]
    fn test_from_lookup_enables_preprocessing_by_default() {
        let config =
            GatewayConfig::from_lookup(lookup(&[("TEXT_BASE_URL", "http://text:8080")])).unwrap();
        assert!(config.audio_preprocess_enabled());
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        for (name, value) in [
            ("ROUTING_MODE", "round_robin"),
            ("AUDIO_LOUDNORM", "maybe"),
            ("AUDIO_TARGET_SR", "fast"),
            ("UPSTREAM_TIMEOUT_S", "-1"),
        ] {
            let result = GatewayConfig::from_lookup(lookup(&[
                ("TEXT_BASE_URL", "http://text:8080"),
                (name, value),
            ]));
            assert!(result.is_err(), "{} = {} should be rejected", name, value);
        }
    }

    #[test]
    fn test_config_debug_omits_prompts() {
        let config = GatewayConfig::builder()
            .text_base_url("http://text:8080")
            .transcribe_system_prompt("secret house prompt")
            .build()
            .unwrap();

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("http://text:8080"));
        assert!(!debug_str.contains("secret house prompt"));
    }
}
