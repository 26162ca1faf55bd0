use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging system with JSON formatting and environment-based filtering
///
/// - Uses `RUST_LOG` for filtering (defaults to "info" if not set)
/// - Writes flattened JSON events to stderr, keeping stdout for the dashboard
/// - With `log_file`, writes through a non-blocking file appender instead; keep
///   the returned guard alive until exit so buffered lines get flushed
pub fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // If tokio-console is enabled, DO NOT install the normal subscriber
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        console_subscriber::init();
        return Ok(None);
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}
