//! The boundary to the foreign toolkit.
//!
//! Backend enumeration, rendering, the scene graph, keymap compilation and the
//! wire protocol all live on the other side of this boundary. The compositor
//! core only ever talks to them through [`Toolkit`], and the toolkit only ever
//! talks back through [`crate::registry::EventRegistry::dispatch`].

use crate::error::ToolkitError;
use crate::keysym::Keysym;
use crate::registry::NativeSignals;
use crate::NativeHandle;
use bitflags::bitflags;
use std::sync::Arc;

/// An axis-aligned box in layout coordinates.
///
/// The far edges are `x + width` and `y + height`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GeoBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl GeoBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns the box shifted by `(dx, dy)`.
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..self }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && px < self.right() as f64
            && py >= self.y as f64
            && py < self.bottom() as f64
    }
}

bitflags! {
    /// Window edges grabbed by an interactive resize.
    ///
    /// Bit values match the toolkit's edge enumeration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Edges: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

bitflags! {
    /// Keyboard modifier state as reported by the toolkit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1;
        const CAPS = 2;
        const CTRL = 4;
        const ALT = 8;
        const MOD2 = 16;
        const MOD3 = 32;
        const LOGO = 64;
        const MOD5 = 128;
    }
}

bitflags! {
    /// Capabilities advertised by the seat.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SeatCapabilities: u32 {
        const POINTER = 1;
        const KEYBOARD = 2;
        const TOUCH = 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSource {
    Wheel,
    Finger,
    Continuous,
    WheelTilt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisOrientation {
    Vertical,
    Horizontal,
}

/// A scroll event, forwarded to the seat untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvent {
    pub time_msec: u32,
    pub source: AxisSource,
    pub orientation: AxisOrientation,
    pub delta: f64,
    pub delta_discrete: i32,
}

/// Input device categories the backend can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Keyboard,
    Pointer,
    Touch,
    TabletTool,
    TabletPad,
    Switch,
}

/// A display mode: resolution plus refresh rate in mHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputMode {
    pub width: i32,
    pub height: i32,
    pub refresh_mhz: i32,
}

/// The state committed to an output when it is first configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfiguration {
    pub enabled: bool,
    pub mode: Option<OutputMode>,
}

/// Result of a scene hit test: the surface under the point and the point in
/// surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub surface: NativeHandle,
    pub sx: f64,
    pub sy: f64,
}

/// Commands and queries the compositor core issues to the foreign toolkit.
///
/// Every handle passed in must still be alive; the core guarantees this by
/// dropping its references as soon as the matching destroy signal fires.
pub trait Toolkit {
    // --- Well-known singletons -------------------------------------------

    fn backend(&self) -> NativeHandle;
    fn xdg_shell(&self) -> NativeHandle;
    fn cursor(&self) -> NativeHandle;
    fn seat(&self) -> NativeHandle;

    /// The native signal plumbing used by the event registry.
    fn native_signals(&self) -> Arc<dyn NativeSignals>;

    // --- Display lifecycle -----------------------------------------------

    /// Opens a listening socket and returns its name (e.g. `wayland-1`).
    fn add_socket_auto(&mut self) -> Result<String, ToolkitError>;
    fn start_backend(&mut self) -> Result<(), ToolkitError>;
    /// Asks the display event loop to return.
    fn terminate(&mut self);
    fn destroy_clients(&mut self);
    fn destroy_scene(&mut self);

    // --- Outputs ---------------------------------------------------------

    fn init_output_render(&mut self, output: NativeHandle);
    fn preferred_mode(&self, output: NativeHandle) -> Option<OutputMode>;
    fn commit_output(&mut self, output: NativeHandle, configuration: OutputConfiguration) -> bool;
    /// Commits a state object the backend itself asked for.
    fn commit_requested_state(&mut self, output: NativeHandle, state: NativeHandle) -> bool;
    /// Places the output in the layout (left to right) and the scene.
    fn add_output_to_layout(&mut self, output: NativeHandle);
    /// Renders the scene output if needed, commits it and sends frame-done.
    fn render_output_frame(&mut self, output: NativeHandle);

    // --- Scene and shell -------------------------------------------------

    /// Creates a scene tree for a toplevel at the root of the scene and
    /// returns the tree's node.
    fn create_toplevel_scene(&mut self, toplevel: NativeHandle) -> NativeHandle;
    /// Creates a scene tree for a popup under its parent's tree.
    fn create_popup_scene(&mut self, popup: NativeHandle, parent: NativeHandle) -> NativeHandle;
    fn scene_position(&self, node: NativeHandle) -> (i32, i32);
    fn set_scene_position(&mut self, node: NativeHandle, x: i32, y: i32);
    fn raise_to_top(&mut self, node: NativeHandle);
    /// Topmost surface at the given layout coordinates, if any.
    fn surface_at(&self, lx: f64, ly: f64) -> Option<SurfaceHit>;
    /// The toplevel whose surface tree contains `surface`.
    fn toplevel_of(&self, surface: NativeHandle) -> Option<NativeHandle>;
    fn toplevel_geometry(&self, toplevel: NativeHandle) -> GeoBox;
    fn set_activated(&mut self, toplevel: NativeHandle, activated: bool);
    fn set_toplevel_size(&mut self, toplevel: NativeHandle, width: u32, height: u32);
    fn schedule_configure(&mut self, xdg_surface: NativeHandle);

    // --- Cursor ----------------------------------------------------------

    fn cursor_position(&self) -> (f64, f64);
    fn move_cursor(&mut self, device: NativeHandle, dx: f64, dy: f64);
    /// Warps to normalised `[0, 1]` coordinates across the layout.
    fn warp_cursor_absolute(&mut self, device: NativeHandle, x: f64, y: f64);
    fn attach_pointer(&mut self, device: NativeHandle);
    fn load_cursor_theme(&mut self, theme: Option<&str>, size: u32);
    fn set_cursor_image(&mut self, name: &str);
    fn set_cursor_surface(&mut self, surface: Option<NativeHandle>, hotspot_x: i32, hotspot_y: i32);

    // --- Keyboards -------------------------------------------------------

    /// Installs the default keymap and the repeat settings.
    fn configure_keyboard(&mut self, device: NativeHandle, repeat_rate: i32, repeat_delay: i32);
    /// Keysyms produced by `keycode` (evdev numbering) in the current state.
    fn keysyms(&self, device: NativeHandle, keycode: u32) -> Vec<Keysym>;
    fn keyboard_modifiers(&self, device: NativeHandle) -> Modifiers;

    // --- Seat ------------------------------------------------------------

    fn pointer_focused_surface(&self) -> Option<NativeHandle>;
    fn pointer_focused_client(&self) -> Option<NativeHandle>;
    fn keyboard_focused_surface(&self) -> Option<NativeHandle>;
    fn notify_pointer_enter(&mut self, surface: NativeHandle, sx: f64, sy: f64);
    fn notify_pointer_motion(&mut self, time_msec: u32, sx: f64, sy: f64);
    fn notify_pointer_button(&mut self, time_msec: u32, button: u32, state: ButtonState);
    fn notify_pointer_axis(&mut self, event: &AxisEvent);
    fn notify_pointer_frame(&mut self);
    fn clear_pointer_focus(&mut self);
    fn set_seat_keyboard(&mut self, device: NativeHandle);
    fn notify_keyboard_enter(&mut self, surface: NativeHandle);
    fn notify_keyboard_key(&mut self, time_msec: u32, keycode: u32, state: KeyState);
    fn notify_keyboard_modifiers(&mut self, device: NativeHandle);
    fn set_seat_capabilities(&mut self, capabilities: SeatCapabilities);
}
