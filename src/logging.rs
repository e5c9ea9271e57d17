//! Process-wide logging setup.
//!
//! Installs one `tracing` subscriber with two sinks: a console layer and a
//! non-blocking rotating file layer. Call [`init`] once at startup and keep the
//! returned [`LogGuard`] alive for the lifetime of the process; dropping it flushes
//! buffered file output.

use crate::error::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix.
pub const LOG_FILE_PREFIX: &str = "telegram";
/// Log file name suffix.
pub const LOG_FILE_SUFFIX: &str = "log";
/// Rotated files kept on disk, current one included.
pub const MAX_LOG_FILES: usize = 4;

/// Keeps the background file writer alive.
#[derive(Debug)]
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Initializes logging with console and rotating file output under `log_dir`.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
///
/// # Errors
///
/// Returns [`Error::LoggingInit`] if the log directory cannot be created or a
/// global subscriber is already installed.
pub fn init(log_dir: &Path) -> Result<LogGuard> {
    std::fs::create_dir_all(log_dir).map_err(|e| Error::LoggingInit {
        message: format!("cannot create {}: {e}", log_dir.display()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| Error::LoggingInit {
            message: e.to_string(),
        })?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| Error::LoggingInit {
            message: e.to_string(),
        })?;

    Ok(LogGuard { _file: guard })
}
