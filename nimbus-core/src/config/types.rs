//! Configuration data structures.
//!
//! All sections reject unknown fields and fall back to the values in
//! [`super::defaults`] for anything left out of the file.

use super::defaults;
use crate::error::ConfigError;
use crate::input::bindings::{Action, KeyBindings};
use crate::keysym::Keysym;
use crate::toolkit::Modifiers;
use serde::Deserialize;
use std::path::PathBuf;

/// Settings for the logging subsystem.
///
/// ```
/// use nimbus_core::config::LoggingConfig;
///
/// let config: LoggingConfig = toml::from_str("level = \"debug\"").unwrap();
/// assert_eq!(config.level, "debug");
/// assert_eq!(config.format, "text");
/// assert_eq!(config.file_path, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Log file; written through a daily-rolling appender when set.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Repeat settings handed to every attached keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyboardConfig {
    /// Repeats per second. Must be positive.
    #[serde(default = "defaults::default_repeat_rate")]
    pub repeat_rate: i32,
    /// Delay before repeating starts, in milliseconds.
    #[serde(default = "defaults::default_repeat_delay")]
    pub repeat_delay: i32,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        defaults::default_keyboard_config()
    }
}

/// Compositor key bindings, as keysym names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingsConfig {
    /// Accelerator modifier: "alt", "ctrl", "shift" or "logo".
    #[serde(default = "defaults::default_binding_modifier")]
    pub modifier: String,
    #[serde(default = "defaults::default_terminate_key")]
    pub terminate: String,
    #[serde(default = "defaults::default_cycle_focus_key")]
    pub cycle_focus: String,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        defaults::default_bindings_config()
    }
}

impl BindingsConfig {
    /// Parses the modifier name. Case-insensitive.
    pub fn modifier_flag(&self) -> Result<Modifiers, ConfigError> {
        match self.modifier.to_lowercase().as_str() {
            "alt" => Ok(Modifiers::ALT),
            "ctrl" | "control" => Ok(Modifiers::CTRL),
            "shift" => Ok(Modifiers::SHIFT),
            "logo" | "super" => Ok(Modifiers::LOGO),
            other => Err(ConfigError::ValidationError(format!(
                "Invalid binding modifier: '{}'. Must be one of alt, ctrl, shift, logo.",
                other
            ))),
        }
    }

    /// Resolves the names into a binding table.
    pub fn resolve(&self) -> Result<KeyBindings, ConfigError> {
        let modifier = self.modifier_flag()?;
        let keysym = |field: &str, name: &str| {
            Keysym::from_name(name).ok_or_else(|| {
                ConfigError::ValidationError(format!("Unknown keysym '{}' for binding '{}'", name, field))
            })
        };
        let terminate = keysym("terminate", &self.terminate)?;
        let cycle_focus = keysym("cycle_focus", &self.cycle_focus)?;
        if terminate == cycle_focus {
            return Err(ConfigError::ValidationError(format!(
                "Bindings 'terminate' and 'cycle_focus' both use '{}'",
                self.terminate
            )));
        }

        let mut bindings = KeyBindings::new(modifier);
        bindings.bind(terminate, Action::Terminate);
        bindings.bind(cycle_focus, Action::CycleFocus);
        Ok(bindings)
    }
}

/// Cursor appearance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CursorConfig {
    /// XCursor theme; `None` lets the toolkit pick its default.
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default = "defaults::default_cursor_size")]
    pub size: u32,
    /// Image shown when the pointer is not over any window.
    #[serde(default = "defaults::default_cursor_image")]
    pub default_image: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        defaults::default_cursor_config()
    }
}

/// Root configuration structure.
///
/// ```
/// use nimbus_core::config::CompositorConfig;
///
/// let config: CompositorConfig = toml::from_str(r#"
/// startup_command = "foot"
///
/// [bindings]
/// modifier = "logo"
/// "#).unwrap();
/// assert_eq!(config.bindings.modifier, "logo");
/// assert_eq!(config.bindings.terminate, "Escape");
/// assert_eq!(config.startup_command.as_deref(), Some("foot"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositorConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_keyboard_config")]
    pub keyboard: KeyboardConfig,
    #[serde(default = "defaults::default_bindings_config")]
    pub bindings: BindingsConfig,
    #[serde(default = "defaults::default_cursor_config")]
    pub cursor: CursorConfig,
    /// Shell command run once the display socket is ready.
    #[serde(default)]
    pub startup_command: Option<String>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            keyboard: defaults::default_keyboard_config(),
            bindings: defaults::default_bindings_config(),
            cursor: defaults::default_cursor_config(),
            startup_command: None,
        }
    }
}
