//! Nimbus compositor core.
//!
//! The interactive heart of a minimal Wayland compositor. Everything that
//! touches pixels, GPUs, the wire protocol or keymap compilation lives in a
//! foreign toolkit behind the [`toolkit::Toolkit`] trait; this crate tracks
//! outputs, input devices and windows, and turns raw input into focus
//! changes, interactive move/resize and forwarded client input.
//!
//! # Structure
//!
//! - [`registry`]: [`registry::EventRegistry`], the lifecycle-safe fan-out of
//!   native signals. Every listener on a toolkit object is released no later
//!   than the object's destroy signal.
//! - [`window`]: window records and the focus stack.
//! - [`interaction`]: the pass-through/move/resize grab state machine.
//! - [`input`]: key bindings and keyboard/pointer routing.
//! - [`server`]: [`server::Server`], which owns all of the above and is the
//!   state every callback receives.
//! - [`config`], [`logging`], [`error`], [`launch`]: the surrounding
//!   configuration, tracing setup, error types and command-line handling.
//!
//! # Example
//!
//! ```rust,ignore
//! use nimbus_core::{config::CompositorConfig, server::Server};
//!
//! let mut server = Server::new(toolkit, CompositorConfig::default())?;
//! let socket = server.start()?;
//! server.run(&mut event_source);
//! server.shutdown();
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod input;
pub mod interaction;
pub mod keysym;
pub mod launch;
pub mod logging;
mod output;
pub mod registry;
pub mod server;
mod shell;
pub mod toolkit;
pub mod window;

pub use error::{NimbusError, Result};
pub use events::Event;
pub use handle::{NativeHandle, Signal};
pub use registry::EventRegistry;
pub use server::Server;
