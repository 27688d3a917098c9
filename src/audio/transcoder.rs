//! External transcoder invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error};

use crate::config::GatewayConfig;
use crate::errors::{AudioErrorKind, GatewayError, GatewayResult};

/// Maximum number of stderr characters carried in an error.
const STDERR_LIMIT: usize = 500;

/// Settings for one transcoder run, taken from the configuration.
#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    /// Transcoder binary (bare name resolved through `PATH`, or a path).
    pub bin: PathBuf,
    /// Target sample rate in Hz.
    pub sample_rate: u32,
    /// Target channel count.
    pub channels: u16,
    /// Loudness filter, when normalization is enabled.
    pub loudnorm_filter: Option<String>,
    /// Time budget for the run.
    pub timeout: Duration,
}

impl TranscodeSettings {
    /// Extracts transcoder settings from the configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            bin: config.ffmpeg_bin().to_path_buf(),
            sample_rate: config.audio_target_sample_rate(),
            channels: config.audio_target_channels(),
            loudnorm_filter: config
                .audio_loudnorm()
                .then(|| config.audio_loudnorm_filter().to_string()),
            timeout: config.transcode_timeout(),
        }
    }
}

/// Builds the transcoder argument list.
///
/// Every element is a separate argument; nothing is passed through a shell.
pub fn build_args(settings: &TranscodeSettings, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-i".into(),
        input.into(),
        "-ac".into(),
        settings.channels.to_string().into(),
        "-ar".into(),
        settings.sample_rate.to_string().into(),
    ];
    if let Some(filter) = &settings.loudnorm_filter {
        args.push("-af".into());
        args.push(filter.into());
    }
    args.push("-f".into());
    args.push("wav".into());
    args.push(output.into());
    args
}

/// Resolves the transcoder binary without running it.
///
/// A bare name is looked up in `PATH`; anything containing a path separator
/// is checked as-is. Files without execute permission are not candidates.
pub fn resolve_binary(bin: &Path) -> Option<PathBuf> {
    if bin.components().count() > 1 || bin.is_absolute() {
        return with_extensions(bin).into_iter().find(|p| is_executable(p));
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| with_extensions(&dir.join(bin)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Spellings of `path` to try. On Windows a name without an extension is
/// tried with each entry of `PATHEXT`.
#[cfg(windows)]
fn with_extensions(path: &Path) -> Vec<PathBuf> {
    if path.extension().is_some() {
        return vec![path.to_path_buf()];
    }
    let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    let mut candidates = vec![path.to_path_buf()];
    candidates.extend(
        exts.split(';')
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                let mut name = path.as_os_str().to_os_string();
                name.push(ext);
                PathBuf::from(name)
            }),
    );
    candidates
}

#[cfg(not(windows))]
fn with_extensions(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

/// Runs the transcoder from `input` to `output`.
///
/// The child is killed if this future is dropped before it exits.
pub async fn run(settings: &TranscodeSettings, input: &Path, output: &Path) -> GatewayResult<()> {
    let bin = resolve_binary(&settings.bin).ok_or_else(|| {
        GatewayError::audio(
            AudioErrorKind::BinaryMissing,
            format!(
                "Transcoder binary not found: {}. Install ffmpeg or set FFMPEG_BIN",
                settings.bin.display()
            ),
        )
    })?;
    let args = build_args(settings, input, output);
    debug!(bin = %bin.display(), args = ?args, "Running transcoder");

    let child = Command::new(&bin)
        .args(&args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output_result = match tokio::time::timeout(settings.timeout, child).await {
        Ok(result) => result,
        Err(_) => {
            error!(timeout = ?settings.timeout, "Transcoder timed out");
            return Err(GatewayError::audio(
                AudioErrorKind::Timeout,
                format!("Transcoder did not finish within {:?}", settings.timeout),
            ));
        }
    };

    let finished = output_result.map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            AudioErrorKind::BinaryMissing
        } else {
            AudioErrorKind::Io
        };
        GatewayError::audio(kind, format!("Failed to run {}: {}", bin.display(), e))
    })?;

    if !finished.status.success() {
        let stderr = truncate(&String::from_utf8_lossy(&finished.stderr), STDERR_LIMIT);
        error!(status = ?finished.status.code(), stderr = %stderr, "Transcoder failed");
        return Err(GatewayError::audio(
            AudioErrorKind::TranscodeFailed,
            format!("Transcoder exited with {}: {}", finished.status, stderr),
        ));
    }

    Ok(())
}

fn truncate(text: &str, limit: usize) -> String {
    text.trim().chars().take(limit).collect()
}
