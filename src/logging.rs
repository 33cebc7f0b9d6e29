//! Tracing subscriber setup.
//!
//! Console output goes to stderr (plain or JSON) so command output on stdout
//! stays machine-readable. With `logging.dir` set, a daily-rolling file is
//! written through a non-blocking appender; the returned [`WorkerGuard`] must
//! be held until exit or buffered lines are lost. `RUST_LOG` takes precedence
//! over `logging.level`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingConfig;

pub const LOG_FILE_PREFIX: &str = "plagcheck.log";

/// `RUST_LOG` if set and valid, else `level`.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid logging.level '{}'", level)),
    }
}

/// Daily-rolling non-blocking writer under `dir`, creating the directory.
pub fn file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let appender = rolling::daily(dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(&config.level)?;

    let console = if config.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
