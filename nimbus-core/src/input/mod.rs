//! Input routing.
//!
//! Keyboard events are checked against the compositor bindings first and
//! forwarded to the focused client otherwise. Pointer events either drive the
//! active grab or are forwarded to the surface under the cursor.
//!
//! - [`bindings`]: the binding table.
//! - `devices`: attaching keyboards and pointers, seat capabilities.
//! - `keyboard`: key and modifier routing, keyboard focus.
//! - `pointer`: motion, buttons, axis and frames.

pub mod bindings;
mod devices;
mod keyboard;
mod pointer;
