use std::path::Path;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("Failed to create log directory: {0}")]
    CreateDir(#[from] std::io::Error),
    #[error("Failed to create log file appender: {0}")]
    Appender(String),
    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Installs the global subscriber: console output plus a daily-rolling file
/// `<log_dir>/<app_name>.<date>.log`. `RUST_LOG` overrides `base_level`.
pub fn setup_logging(
    app_name: &str,
    base_level: &str,
    log_dir: impl AsRef<Path>,
) -> Result<(), LogSetupError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .map_err(|e| LogSetupError::InvalidFilter {
            filter: base_level.to_string(),
            reason: e.to_string(),
        })?;

    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)
        .map_err(|e| LogSetupError::Appender(e.to_string()))?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("common-log-{}-{}", name, std::process::id()))
    }

    #[test]
    fn invalid_filter_is_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = setup_logging("test", "foo=notalevel", scratch_dir("filter")).unwrap_err();
        assert!(matches!(err, LogSetupError::InvalidFilter { .. }));
    }

    #[test]
    fn second_setup_is_rejected() {
        let dir = scratch_dir("twice");
        setup_logging("test", "info", &dir).unwrap();
        tracing::info!("logging ready");
        let err = setup_logging("test", "info", &dir).unwrap_err();
        assert!(matches!(err, LogSetupError::AlreadyInitialized));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
