//! Logging Infrastructure
//!
//! `RUST_LOG` takes precedence over the configured level. Output goes to
//! stdout, or to a daily rolling file when a log directory is given.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger with default settings
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON lines and file output
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let log_dir = log_dir.filter(|dir| Path::new(dir).is_dir());

    let installed = match (log_dir, json) {
        (Some(dir), true) => subscriber
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, "venue-server"))
            .try_init(),
        (Some(dir), false) => subscriber
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, "venue-server"))
            .try_init(),
        (None, true) => subscriber.json().try_init(),
        (None, false) => subscriber.try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
