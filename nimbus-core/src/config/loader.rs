//! Locating, parsing and validating the configuration file.
//!
//! `ConfigLoader::load()` reads `config.toml` from `$XDG_CONFIG_HOME/nimbus`.
//! A missing or empty file yields the default configuration; any other read
//! failure, a TOML error or a failed validation is returned as
//! [`ConfigError`].

use super::types::CompositorConfig;
use crate::error::ConfigError;
use directories_next::BaseDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "nimbus";
const CONFIG_FILE: &str = "config.toml";

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the user configuration, falling back to defaults when there is
    /// no configuration file.
    pub fn load() -> Result<CompositorConfig, ConfigError> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// `$XDG_CONFIG_HOME/nimbus/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| ConfigError::DirectoryUnavailable {
                dir_type: "Config Base".to_string(),
            })
    }

    /// Loads and validates the configuration at `path`. A missing file is
    /// not an error.
    pub fn load_from_path(path: &Path) -> Result<CompositorConfig, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loading configuration");
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                let mut config = CompositorConfig::default();
                Self::validate_config(&mut config)?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<CompositorConfig, ConfigError> {
        let mut config: CompositorConfig = if content.trim().is_empty() {
            CompositorConfig::default()
        } else {
            toml::from_str(content)?
        };
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Normalizes names to lowercase and rejects out-of-range values.
    ///
    /// Relative log file paths are resolved against the user's local data
    /// directory (`$XDG_DATA_HOME/nimbus`).
    fn validate_config(config: &mut CompositorConfig) -> Result<(), ConfigError> {
        let level = config.logging.level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                )))
            }
        }

        let format = config.logging.format.to_lowercase();
        match format.as_str() {
            "text" | "json" => config.logging.format = format,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                )))
            }
        }

        if let Some(path) = &config.logging.file_path {
            if path.is_relative() {
                let base = BaseDirs::new()
                    .map(|dirs| dirs.data_local_dir().join(APP_DIR))
                    .ok_or_else(|| ConfigError::DirectoryUnavailable {
                        dir_type: "Data Base".to_string(),
                    })?;
                config.logging.file_path = Some(base.join(path));
            }
        }

        if config.keyboard.repeat_rate <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid keyboard repeat_rate: {}. Must be positive.",
                config.keyboard.repeat_rate
            )));
        }
        if config.keyboard.repeat_delay < 0 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid keyboard repeat_delay: {}. Must not be negative.",
                config.keyboard.repeat_delay
            )));
        }

        config.bindings.modifier = config.bindings.modifier.to_lowercase();
        config.bindings.resolve()?;

        if config.cursor.size == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid cursor size: 0. Must be positive.".to_string(),
            ));
        }
        if config.cursor.default_image.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Cursor default_image must not be empty.".to_string(),
            ));
        }

        if let Some(command) = &config.startup_command {
            if command.trim().is_empty() {
                config.startup_command = None;
            }
        }

        Ok(())
    }
}
