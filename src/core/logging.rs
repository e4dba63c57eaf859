//! Logging setup.
//!
//! All output goes through `tracing`. Events from the `log` crate are
//! forwarded with `tracing-log`. A daily rolling JSON file in
//! `<data_dir>/logs` always receives events; the console layer is only
//! installed when the terminal is not owned by the TUI.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "engagement-wizard.log";
const DEFAULT_FILTER: &str = "info";

/// Where log files are written for a given data directory.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn file_writer(data_dir: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let dir = log_dir(data_dir);
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("Failed to create logs directory {}: {}", dir.display(), e);
    }
    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    tracing_appender::non_blocking(file_appender)
}

/// Set the global subscriber and redirect `log` macros to `tracing`.
fn install<S>(subscriber: S)
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global tracing subscriber: {}", e);
        return;
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }
}

/// Initialize logging with a file layer and a stderr layer.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered logs are flushed on shutdown.
pub fn init(data_dir: &Path) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(data_dir);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .compact()
        .with_filter(env_filter());

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer);
    install(subscriber);

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir(data_dir).join(LOG_FILE_PREFIX)
    );
    guard
}

/// Initialize logging for TUI mode.
///
/// Identical to [`init()`] but without the console layer, which would
/// corrupt the screen while ratatui is in raw/alternate-screen mode.
pub fn init_tui(data_dir: &Path) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(data_dir);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter());

    install(tracing_subscriber::registry().with(file_layer));

    guard
}
