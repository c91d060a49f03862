use crate::utils::error::{GptApiError, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static FILE_LOGGER_CONFIGURED: AtomicBool = AtomicBool::new(false);

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gptapi=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gptapi=info"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// Installs a global subscriber appending to `log_file`, one JSON object per
/// line when `json` is set.
///
/// Only the first successful call does any work. Later calls return
/// `Ok(false)` without touching the file system, as does a call made after
/// some other global subscriber was installed.
pub fn init_file_logger(log_file: &str, log_level: &str, json: bool) -> Result<bool> {
    if FILE_LOGGER_CONFIGURED.load(Ordering::Acquire) {
        return Ok(false);
    }

    let path = Path::new(log_file);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_new(level_directive(log_level)?).map_err(|e| {
        GptApiError::InvalidConfigValue {
            field: "logging.log_level".to_string(),
            value: log_level.to_string(),
            reason: e.to_string(),
        }
    })?;

    let writer = Mutex::new(file);
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .is_ok()
    };
    FILE_LOGGER_CONFIGURED.store(true, Ordering::Release);

    Ok(installed)
}

/// Maps a profile log level (case-insensitive, `WARNING` and `CRITICAL`
/// accepted) to a tracing directive.
pub fn level_directive(log_level: &str) -> Result<&'static str> {
    match log_level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" | "critical" => Ok("error"),
        _ => Err(GptApiError::InvalidConfigValue {
            field: "logging.log_level".to_string(),
            value: log_level.to_string(),
            reason: "Expected one of TRACE, DEBUG, INFO, WARNING, ERROR, CRITICAL".to_string(),
        }),
    }
}
