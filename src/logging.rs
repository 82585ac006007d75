//! Tracing subscriber setup for the command-line driver.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::SweepError;

/// Default filter directive for a given level, scoped to this crate.
pub fn default_filter(level: &str) -> String {
    format!("shell_sweep={level},warn")
}

/// Initialize logging to stderr, or to `log_file` (appending) when given.
///
/// The `RUST_LOG` environment variable takes precedence over `level`.
///
/// # Errors
///
/// Returns `SweepError::Io` if the log file cannot be opened.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<(), SweepError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));
    let registry = tracing_subscriber::registry().with(env_filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| SweepError::io(path, e))?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .init();
            tracing::info!(log_path = %path.display(), "logging initialized");
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .init();
        }
    }
    Ok(())
}
