//! Logging setup for the `janken` binary.
//!
//! Every run writes a full log to a session file under the platform cache
//! directory. Warnings and errors are mirrored to stderr so stdout stays clean
//! for reports.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held until
/// the program exits.
pub fn setup_logging() -> Result<WorkerGuard> {
    let session_id = format!(
        "session_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    );

    let session_log_dir = log_dir().join(&session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!(
            "Failed to create log directory: {}",
            session_log_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "janken.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/janken.log", session_log_dir.display());

    Ok(guard)
}

/// Platform-specific log directory
///
/// - macOS: `~/Library/Caches/janken/logs`
/// - Linux: `~/.cache/janken/logs` (or `$XDG_CACHE_HOME/janken/logs`)
/// - Windows: `%LOCALAPPDATA%\janken\logs`
/// - Fallback: `/tmp/janken/logs`
fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "janken")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/janken"))
        .join("logs")
}
