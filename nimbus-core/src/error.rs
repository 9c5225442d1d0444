//! Error types for the Nimbus compositor core.
//!
//! The main error type is [`NimbusError`], which wraps the more specific
//! [`ConfigError`], [`LoggingError`], [`RegistryError`] and startup failures
//! reported by the toolkit.
//!
//! Contract violations by the toolkit (a popup without a parent, for
//! instance) are not represented here: they abort with a panic.

use crate::NativeHandle;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = NimbusError> = std::result::Result<T, E>;

/// Top-level error for compositor startup and configuration.
#[derive(Debug, Error)]
pub enum NimbusError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors that occur while installing the global tracing subscriber.
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// A required toolkit component could not be brought up. Unrecoverable.
    #[error("Startup failed while {stage}: {source}")]
    Startup {
        stage: StartupStage,
        #[source]
        source: ToolkitError,
    },

    /// A global object could not be subscribed to during setup.
    #[error("Registry Error: {0}")]
    Registry(#[from] RegistryError),

    /// The startup command could not be spawned.
    #[error("Failed to launch startup command `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// General I/O errors not covered by other variants.
    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),
}

/// The startup step that failed, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    CreatingSocket,
    StartingBackend,
}

impl std::fmt::Display for StartupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupStage::CreatingSocket => f.write_str("creating the display socket"),
            StartupStage::StartingBackend => f.write_str("starting the backend"),
        }
    }
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed values are out of range or unknown.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// The XDG configuration directory could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),
}

/// Rejected registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The handle's destroy signal has already been observed.
    #[error("handle {0} has already been destroyed")]
    HandleRetired(NativeHandle),

    /// The registry was shut down together with its display.
    #[error("event registry has been shut down")]
    ShutDown,
}

/// Failures reported by the foreign toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolkitError {
    #[error("socket: {0}")]
    Socket(String),

    #[error("backend: {0}")]
    Backend(String),

    #[error("renderer: {0}")]
    Renderer(String),

    #[error("allocator: {0}")]
    Allocator(String),
}
