//! Default configuration values.
//!
//! These functions back the `#[serde(default = "...")]` attributes in
//! [`super::types`], so a missing field or section always falls back to the
//! same value as [`Default::default`].

use super::types::{BindingsConfig, CursorConfig, KeyboardConfig, LoggingConfig};
use std::path::PathBuf;

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// `"info"`.
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// `"text"`.
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_keyboard_config() -> KeyboardConfig {
    KeyboardConfig {
        repeat_rate: default_repeat_rate(),
        repeat_delay: default_repeat_delay(),
    }
}

/// 25 repeats per second.
pub(super) fn default_repeat_rate() -> i32 {
    25
}

/// 600 ms before repeat kicks in.
pub(super) fn default_repeat_delay() -> i32 {
    600
}

pub(super) fn default_bindings_config() -> BindingsConfig {
    BindingsConfig {
        modifier: default_binding_modifier(),
        terminate: default_terminate_key(),
        cycle_focus: default_cycle_focus_key(),
    }
}

pub(super) fn default_binding_modifier() -> String {
    "alt".to_string()
}

pub(super) fn default_terminate_key() -> String {
    "Escape".to_string()
}

pub(super) fn default_cycle_focus_key() -> String {
    "F1".to_string()
}

pub(super) fn default_cursor_config() -> CursorConfig {
    CursorConfig {
        theme: None,
        size: default_cursor_size(),
        default_image: default_cursor_image(),
    }
}

pub(super) fn default_cursor_size() -> u32 {
    24
}

pub(super) fn default_cursor_image() -> String {
    "default".to_string()
}
