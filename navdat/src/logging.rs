//! Logging setup for applications embedding navdat.
//!
//! The library itself only emits `tracing` events. Callers that want them
//! printed install a subscriber with [`init_logging`]:
//!
//! - stderr output, always
//! - a plain-text log file when `[logging] directory` is configured (cleared
//!   at startup)
//! - filtering from `RUST_LOG`, falling back to `[logging] level`

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, DEFAULT_LOG_LEVEL};

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global `tracing` subscriber described by `settings`.
///
/// # Errors
///
/// Fails if the log directory or file cannot be created, or if a global
/// subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, io::Error> {
    let (file_layer, file_guard) = match &settings.directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            fs::write(dir.join(&settings.file_name), "")?;

            let appender = tracing_appender::rolling::never(dir, &settings.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(&settings.level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// `RUST_LOG` when set and valid, else `level`, else `info`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Where [`init_logging`] writes its log file, if anywhere.
pub fn log_file_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .directory
        .as_ref()
        .map(|dir| dir.join(&settings.file_name))
}
