//! Audio normalization.
//!
//! Converts arbitrary audio bytes into canonical WAV (fixed sample rate and
//! channel count, optional loudness normalization) by running an external
//! transcoder. Every call works in its own scratch directory, which is removed
//! when the call ends, including when the calling future is dropped.

mod transcoder;

pub use transcoder::{build_args, resolve_binary, TranscodeSettings};

use std::path::PathBuf;

use bytes::Bytes;
use tracing::{debug, instrument};

use crate::config::GatewayConfig;
use crate::errors::{AudioErrorKind, GatewayError, GatewayResult};

/// Prefix of per-call scratch directories.
const SCRATCH_PREFIX: &str = "gateway_audio_";

/// Normalizes audio for embedding in an upstream request.
#[derive(Debug, Clone)]
pub struct AudioNormalizer {
    enabled: bool,
    max_upload_bytes: usize,
    scratch_dir: Option<PathBuf>,
    settings: TranscodeSettings,
}

impl AudioNormalizer {
    /// Creates a normalizer from the configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            enabled: config.audio_preprocess_enabled(),
            max_upload_bytes: config.audio_max_upload_bytes(),
            scratch_dir: config.scratch_dir().map(PathBuf::from),
            settings: TranscodeSettings::from_config(config),
        }
    }

    /// Normalizes `audio`.
    ///
    /// Oversized input is rejected before anything else happens. With
    /// preprocessing disabled the input is returned unchanged, so callers
    /// cannot assume a WAV container in that mode.
    #[instrument(skip(self, audio), fields(bytes = audio.len(), enabled = self.enabled))]
    pub async fn normalize(&self, audio: Bytes) -> GatewayResult<Bytes> {
        if audio.len() > self.max_upload_bytes {
            return Err(GatewayError::audio(
                AudioErrorKind::TooLarge,
                format!(
                    "Audio is {} bytes, limit is {} bytes",
                    audio.len(),
                    self.max_upload_bytes
                ),
            ));
        }

        if !self.enabled {
            return Ok(audio);
        }

        // Fail before touching the filesystem when the binary is absent.
        if resolve_binary(&self.settings.bin).is_none() {
            return Err(GatewayError::audio(
                AudioErrorKind::BinaryMissing,
                format!(
                    "Transcoder binary not found: {}. Install ffmpeg or set FFMPEG_BIN",
                    self.settings.bin.display()
                ),
            ));
        }

        let scratch = self.scratch()?;
        let input = scratch.path().join("input");
        let output = scratch.path().join("output.wav");

        tokio::fs::write(&input, &audio).await.map_err(|e| {
            GatewayError::audio(AudioErrorKind::Io, format!("Failed to write scratch input: {}", e))
        })?;

        transcoder::run(&self.settings, &input, &output).await?;

        let wav = tokio::fs::read(&output).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GatewayError::audio(
                    AudioErrorKind::TranscodeFailed,
                    "Transcoder exited successfully but produced no output",
                )
            } else {
                GatewayError::audio(AudioErrorKind::Io, format!("Failed to read output: {}", e))
            }
        })?;

        debug!(input_bytes = audio.len(), output_bytes = wav.len(), "Audio normalized");
        Ok(Bytes::from(wav))
    }

    fn scratch(&self) -> GatewayResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let created = match &self.scratch_dir {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|e| {
            GatewayError::audio(AudioErrorKind::Io, format!("Failed to create scratch directory: {}", e))
        })
    }
}

/// Normalizes `audio` with the settings in `config`.
pub async fn normalize(audio: Bytes, config: &GatewayConfig) -> GatewayResult<Bytes> {
    AudioNormalizer::new(config).normalize(audio).await
}
