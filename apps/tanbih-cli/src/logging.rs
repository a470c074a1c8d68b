//! Tracing setup for the command line
//!
//! Logs go to stderr by default; `--log-file` switches to an append-only
//! file behind a non-blocking writer.

use std::fs::OpenOptions;
use std::path::Path;

use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Error types for logging setup
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    FileOpen(String),

    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Environment variable consulted for filter directives
const FILTER_ENV: &str = "TANBIH_LOG";

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize terminal logging on stderr
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init(verbose: bool) -> Result<()> {
    let filter = env_filter(if verbose { "debug" } else { "info" });
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

/// Open `log_file` for appending behind a non-blocking writer
fn file_writer(log_file: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| LoggingError::FileOpen(e.to_string()))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Initialize structured logging with file output.
///
/// The returned guard flushes buffered lines when dropped; keep it alive
/// for the life of the process.
///
/// # Errors
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed
pub fn init_file_logging(log_file: &Path, level: &str, json_format: bool) -> Result<WorkerGuard> {
    let filter = env_filter(level);
    let (writer, guard) = file_writer(log_file)?;
    let timer = ChronoLocal::new("%Y-%m-%dT%H:%M:%S%.3f".to_owned());

    let registry = tracing_subscriber::registry().with(filter);
    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(timer)
            .with_target(true)
            .with_current_span(true);
        registry
            .with(json_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(writer)
            .with_timer(timer)
            .with_target(true)
            .with_ansi(false);
        registry
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
    }

    info!("File logging initialized: {}", log_file.display());
    Ok(guard)
}
