//! Logging infrastructure for FlightMap.
//!
//! Structured logging to stderr, optionally mirrored to a log file:
//! - stderr keeps stdout free for command output
//! - the log file is cleared at the start of every session
//! - verbosity is configurable via the RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when RUST_LOG is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Returns true when a log file is being written.
    pub fn has_file(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Initialize the global subscriber.
///
/// # Arguments
///
/// * `log_dir` - Directory for the log file; `None` logs to stderr only
/// * `log_file` - Log filename (e.g., "flightmap.log")
///
/// # Errors
///
/// Returns an error if the log directory cannot be created, the log file
/// cannot be cleared, or a global subscriber is already installed.
pub fn init_logging(log_dir: Option<&Path>, log_file: &str) -> Result<LoggingGuard, io::Error> {
    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let writer = prepare_log_file(dir, log_file)?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(writer);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard { file_guard })
}

/// Creates `dir`, truncates the log file and returns its appender.
fn prepare_log_file(
    dir: &Path,
    log_file: &str,
) -> Result<tracing_appender::rolling::RollingFileAppender, io::Error> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(log_file), "")?;
    Ok(tracing_appender::rolling::never(dir, log_file))
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    "flightmap.log"
}
