//! Logging setup built on `tracing`.
//!
//! The compositor logs to stderr (stdout may belong to the startup command's
//! terminal) and, optionally, to a daily-rolling file. `RUST_LOG` takes
//! precedence over the configured level when it is set.

use crate::config::LoggingConfig;
use crate::error::LoggingError;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the non-blocking file writer alive; dropping it flushes the file.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Installs a plain stderr subscriber at `info` (or `RUST_LOG`).
///
/// Meant for the window before the configuration has been loaded, and for
/// tests. Does nothing if a subscriber is already installed.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn parse_level(level: &str) -> Result<Level, LoggingError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(LoggingError::InitializationFailure(format!(
            "Invalid log level in config: {}",
            other
        ))),
    }
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn create_stderr_layer(format: &str) -> BoxedLayer {
    match format {
        "json" => fmt::layer().json().with_writer(std::io::stderr).with_ansi(false).boxed(),
        _ => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .boxed(),
    }
}

fn create_file_layer(log_path: &Path, format: &str) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|e| {
        LoggingError::InitializationFailure(format!(
            "Cannot create log directory {}: {}",
            directory.display(),
            e
        ))
    })?;
    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("nimbus.log"));

    let appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = match format {
        "json" => fmt::layer().json().with_writer(writer).with_ansi(false).boxed(),
        _ => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
    };
    Ok((layer, guard))
}

/// Installs the global subscriber described by `config`.
///
/// With `is_reload` set, failing to replace an already installed subscriber
/// is reported on stderr instead of being returned as an error.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), LoggingError> {
    let level = parse_level(&config.level)?;
    let format = config.format.to_lowercase();

    let mut layers: Vec<BoxedLayer> = vec![create_stderr_layer(&format).with_filter(filter_for(level)).boxed()];

    let mut file_guard = None;
    if let Some(path) = &config.file_path {
        let (layer, guard) = create_file_layer(path, &format)?;
        layers.push(layer.with_filter(filter_for(level)).boxed());
        file_guard = Some(guard);
    }

    let result = Registry::default().with(layers).try_init();

    // Replacing the slot drops (and flushes) any previous file writer.
    *LOG_WORKER_GUARD.lock() = file_guard;

    match result {
        Ok(()) => Ok(()),
        Err(e) if is_reload => {
            eprintln!("[INFO] Logging re-initialization attempted, previous subscriber kept: {}", e);
            Ok(())
        }
        Err(e) => Err(LoggingError::InitializationFailure(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))),
    }
}
