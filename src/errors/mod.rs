//! Error types for the inference gateway.
//!
//! Every failure the routing-and-forwarding pipeline can produce is one
//! variant of [`GatewayError`]. Errors are created where the underlying
//! failure happens and propagate to the caller unchanged: nothing is retried
//! and nothing is downgraded to a default value.

use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required routing target is missing or invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Audio normalization failed.
    #[error("Audio processing error ({}): {message}", kind.as_str())]
    AudioProcessing {
        /// What went wrong.
        kind: AudioErrorKind,
        /// Diagnostic text, including transcoder stderr where available.
        message: String,
    },

    /// The upstream could not be reached.
    #[error("Upstream unreachable ({upstream}): {message}")]
    UpstreamUnreachable {
        /// Base URL of the upstream.
        upstream: String,
        /// Error message.
        message: String,
    },

    /// The upstream did not answer within the configured budget.
    #[error("Upstream timeout ({upstream}): {message}")]
    UpstreamTimeout {
        /// Base URL of the upstream.
        upstream: String,
        /// Error message.
        message: String,
    },

    /// The upstream answered with a non-success status code.
    #[error("Upstream error ({upstream}): HTTP {status}")]
    UpstreamStatus {
        /// Base URL of the upstream.
        upstream: String,
        /// HTTP status code returned by the upstream.
        status: u16,
        /// Raw response body, lossily decoded.
        body: String,
    },

    /// The upstream answered, but not with the expected structure.
    #[error("Invalid upstream response: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },
}

/// Discriminant of a [`GatewayError`], for callers that match on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`GatewayError::Configuration`].
    Configuration,
    /// See [`GatewayError::AudioProcessing`].
    AudioProcessing,
    /// See [`GatewayError::UpstreamUnreachable`].
    UpstreamUnreachable,
    /// See [`GatewayError::UpstreamTimeout`].
    UpstreamTimeout,
    /// See [`GatewayError::UpstreamStatus`].
    UpstreamStatus,
    /// See [`GatewayError::InvalidRequest`].
    InvalidRequest,
}

/// Reason an audio normalization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioErrorKind {
    /// Input exceeded the configured upload ceiling.
    TooLarge,
    /// The transcoder binary could not be found.
    BinaryMissing,
    /// The transcoder exited non-zero or produced no output.
    TranscodeFailed,
    /// The transcoder ran past its time budget.
    Timeout,
    /// Scratch file handling failed.
    Io,
}

impl AudioErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioErrorKind::TooLarge => "audio_too_large",
            AudioErrorKind::BinaryMissing => "ffmpeg_not_found",
            AudioErrorKind::TranscodeFailed => "invalid_audio",
            AudioErrorKind::Timeout => "audio_timeout",
            AudioErrorKind::Io => "audio_io_error",
        }
    }
}

impl GatewayError {
    /// Returns the discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Configuration { .. } => ErrorKind::Configuration,
            GatewayError::AudioProcessing { .. } => ErrorKind::AudioProcessing,
            GatewayError::UpstreamUnreachable { .. } => ErrorKind::UpstreamUnreachable,
            GatewayError::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            GatewayError::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            GatewayError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }

    /// Returns true for any failure attributable to an upstream.
    pub fn is_upstream(&self) -> bool {
        self.upstream().is_some()
    }

    /// Returns the upstream base URL involved, if any.
    pub fn upstream(&self) -> Option<&str> {
        match self {
            GatewayError::UpstreamUnreachable { upstream, .. }
            | GatewayError::UpstreamTimeout { upstream, .. }
            | GatewayError::UpstreamStatus { upstream, .. } => Some(upstream),
            _ => None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        GatewayError::Configuration {
            message: message.into(),
        }
    }

    /// Creates an audio processing error.
    pub fn audio(kind: AudioErrorKind, message: impl Into<String>) -> Self {
        GatewayError::AudioProcessing {
            kind,
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        GatewayError::InvalidRequest {
            message: message.into(),
        }
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
