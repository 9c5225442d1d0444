//! Opaque identities for objects owned by the foreign toolkit.
//!
//! A [`NativeHandle`] is never dereferenced by this crate. It only compares by
//! identity and is handed back to the toolkit when the compositor wants
//! something done to the object it names.

use std::fmt;

/// Identity of a toolkit-owned object (output, input device, surface, ...).
///
/// The binding layer derives the value from the native object's address and
/// must never hand out the same value for two different objects, even after
/// the first one has been freed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Wraps a raw identity value produced by the binding layer.
    pub const fn from_raw(raw: u64) -> Self {
        NativeHandle(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One category of event a native object can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The object is about to be freed by the toolkit.
    Destroy,

    // Backend
    NewOutput,
    NewInput,

    // Output
    Frame,
    RequestState,

    // xdg-shell
    NewToplevel,
    NewPopup,

    // xdg surface / toplevel
    Map,
    Unmap,
    Commit,
    RequestMove,
    RequestResize,

    // Cursor (aggregated pointer devices)
    Motion,
    MotionAbsolute,
    Button,
    Axis,
    PointerFrame,

    // Keyboard
    Key,
    Modifiers,

    // Seat
    RequestSetCursor,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::Destroy => "destroy",
            Signal::NewOutput => "new-output",
            Signal::NewInput => "new-input",
            Signal::Frame => "frame",
            Signal::RequestState => "request-state",
            Signal::NewToplevel => "new-toplevel",
            Signal::NewPopup => "new-popup",
            Signal::Map => "map",
            Signal::Unmap => "unmap",
            Signal::Commit => "commit",
            Signal::RequestMove => "request-move",
            Signal::RequestResize => "request-resize",
            Signal::Motion => "motion",
            Signal::MotionAbsolute => "motion-absolute",
            Signal::Button => "button",
            Signal::Axis => "axis",
            Signal::PointerFrame => "pointer-frame",
            Signal::Key => "key",
            Signal::Modifiers => "modifiers",
            Signal::RequestSetCursor => "request-set-cursor",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
