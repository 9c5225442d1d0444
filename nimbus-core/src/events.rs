//! Payloads carried by native signals.

use crate::toolkit::{AxisEvent, ButtonState, DeviceKind, Edges, KeyState};
use crate::NativeHandle;

/// Data delivered alongside a [`crate::Signal`].
///
/// The variant is determined by the signal; subscribers match on the variant
/// they expect and ignore anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Signals that carry no data (destroy, frame, map, unmap, pointer-frame,
    /// modifiers).
    Empty,

    NewOutput {
        output: NativeHandle,
    },
    /// The backend asks for a new output state (e.g. a nested window was
    /// resized). `state` is toolkit-owned and only valid during dispatch.
    OutputRequestState {
        state: NativeHandle,
    },
    NewInput {
        device: NativeHandle,
        kind: DeviceKind,
    },
    NewToplevel {
        toplevel: NativeHandle,
        surface: NativeHandle,
    },
    NewPopup {
        popup: NativeHandle,
        parent: Option<NativeHandle>,
    },
    Commit {
        initial: bool,
    },
    RequestMove {
        serial: u32,
    },
    RequestResize {
        serial: u32,
        edges: Edges,
    },

    PointerMotion {
        device: NativeHandle,
        time_msec: u32,
        dx: f64,
        dy: f64,
    },
    PointerMotionAbsolute {
        device: NativeHandle,
        time_msec: u32,
        x: f64,
        y: f64,
    },
    PointerButton {
        time_msec: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis(AxisEvent),

    Key {
        time_msec: u32,
        keycode: u32,
        state: KeyState,
    },

    RequestSetCursor {
        client: NativeHandle,
        surface: Option<NativeHandle>,
        hotspot_x: i32,
        hotspot_y: i32,
    },
}
