//! Compositor configuration.
//!
//! - [`types`]: the schema ([`CompositorConfig`] and its sections).
//! - [`defaults`]: serde default values.
//! - [`loader`]: [`ConfigLoader`], which finds, parses and validates
//!   `config.toml`.
//!
//! ```rust,ignore
//! use nimbus_core::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?;
//! nimbus_core::logging::init_logging(&config.logging, false)?;
//! ```

mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BindingsConfig, CompositorConfig, CursorConfig, KeyboardConfig, LoggingConfig};
