// Rust guideline compliant 2026-02-09

//! Diagnostic logging setup.
//!
//! The rendered job log goes to stdout; diagnostics go to stderr or a file so
//! the two never interleave.

use anyhow::{bail, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;

/// Installs the global tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - One of `error`, `warn`, `info`, `debug`
/// * `log_file` - Optional file to append logs to instead of stderr
///
/// # Returns
///
/// A guard that must be held until exit when logging to a file.
///
/// # Errors
///
/// Returns an error if the level is unknown or the log file cannot be opened.
pub fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = parse_log_level(log_level)?;

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        let subscriber = fmt()
            .with_max_level(level)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
        return Ok(Some(guard));
    }

    let subscriber = fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(None)
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        other => bail!("Invalid log level: {}", other),
    }
}
