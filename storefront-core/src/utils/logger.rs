//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production
//! environments:
//! - Console output (pretty in development, JSON in production)
//! - Optional daily rotating application logs
//! - Cleanup of rotated files older than 14 days

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

/// Retention window for rotated application logs
const LOG_RETENTION_DAYS: i64 = 14;

/// Clean up rotated application log files older than [`LOG_RETENTION_DAYS`].
///
/// Call this periodically (e.g., daily) to maintain log size.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    use chrono::{Local, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(LOG_RETENTION_DAYS);

    if !log_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            // Match app.YYYY-MM-DD pattern produced by the daily appender
            if let Some(date_part) = name.strip_prefix("app.")
                && let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                && let Some(midnight) = naive_date.and_hms_opt(0, 0, 0)
                && let Some(local_datetime) = Local.from_local_datetime(&midnight).single()
                && local_datetime < cutoff
            {
                fs::remove_file(&path)?;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(())
}

/// Initialize console-only logging (development default)
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}

/// Initialize the logging system with an optional daily rotating file layer.
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - Whether to use JSON output (true for production)
/// * `log_dir` - Optional directory for file logging
///
/// Returns the appender guard; keep it alive for the lifetime of the process
/// or buffered log lines are lost on shutdown.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let mut guard = None;

    let file_layer = if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        fs::create_dir_all(log_dir)?;

        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "app");
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);

        Some(fmt::layer().json().with_target(true).with_writer(writer))
    } else {
        None
    };

    if json_format {
        registry
            .with(fmt::layer().json().with_target(true).boxed())
            .with(file_layer)
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).boxed())
            .with(file_layer)
            .try_init()?;
    }

    Ok(guard)
}
