//! Logging configuration.
//!
//! Structured logging via `tracing`. The library only emits events; the
//! binary decides where they go by calling [`LoggingConfig::init`] once.

use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The minimum log level to capture
    pub level: LogLevel,
    /// The output format for log messages
    pub format: LogFormat,
    /// Whether to include the module target in log output
    pub include_target: bool,
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging (least verbose)
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        Level::from(level).into()
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (for development)
    Pretty,
    /// JSON format (for structured logging in production)
    Json,
    /// Compact format (for space-constrained environments)
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include the module target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Initialize logging with this configuration.
    ///
    /// `RUST_LOG` directives are honored on top of the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if the logging system has already been initialized.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error>> {
        let filter = EnvFilter::from_default_env().add_directive(LevelFilter::from(self.level).into());

        match self.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().with_ansi(true).with_target(self.include_target))
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_target(self.include_target))
                    .try_init()?;
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact().with_target(self.include_target))
                    .try_init()?;
            }
        }

        Ok(())
    }
}
