//! Recording toolkit and test harness shared by the integration tests.
#![allow(dead_code)]

use nimbus_core::config::CompositorConfig;
use nimbus_core::error::ToolkitError;
use nimbus_core::keysym::Keysym;
use nimbus_core::registry::{NativeListener, NativeSignals};
use nimbus_core::toolkit::{
    AxisEvent, ButtonState, DeviceKind, GeoBox, KeyState, Modifiers, OutputConfiguration, OutputMode,
    SeatCapabilities, SurfaceHit, Toolkit,
};
use nimbus_core::window::WindowId;
use nimbus_core::{Event, NativeHandle, Server, Signal};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const BACKEND: NativeHandle = NativeHandle::from_raw(0x10);
pub const XDG_SHELL: NativeHandle = NativeHandle::from_raw(0x20);
pub const CURSOR: NativeHandle = NativeHandle::from_raw(0x30);
pub const SEAT: NativeHandle = NativeHandle::from_raw(0x40);

pub const KEY_ESC: u32 = 1;
pub const KEY_F1: u32 = 59;
pub const KEY_A: u32 = 30;

/// Native listener bookkeeping, shared between the mock and the tests.
#[derive(Default)]
pub struct MockSignals {
    next: AtomicU64,
    pub live: Mutex<HashMap<NativeListener, (NativeHandle, Signal)>>,
    pub connects: Mutex<Vec<(NativeHandle, Signal)>>,
    pub disconnects: Mutex<usize>,
}

impl MockSignals {
    pub fn live_on(&self, handle: NativeHandle) -> usize {
        self.live.lock().values().filter(|(h, _)| *h == handle).count()
    }

    pub fn connects_for(&self, handle: NativeHandle, signal: Signal) -> usize {
        self.connects
            .lock()
            .iter()
            .filter(|(h, s)| *h == handle && *s == signal)
            .count()
    }
}

impl NativeSignals for MockSignals {
    fn connect(&self, handle: NativeHandle, signal: Signal) -> NativeListener {
        let listener = NativeListener(self.next.fetch_add(1, Ordering::Relaxed));
        self.live.lock().insert(listener, (handle, signal));
        self.connects.lock().push((handle, signal));
        listener
    }

    fn disconnect(&self, listener: NativeListener) {
        let removed = self.live.lock().remove(&listener);
        assert!(removed.is_some(), "listener {:?} disconnected twice", listener);
        *self.disconnects.lock() += 1;
    }
}

/// Outbound calls recorded by [`MockToolkit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StartBackend,
    Terminate,
    DestroyClients,
    DestroyScene,
    InitOutputRender(NativeHandle),
    CommitOutput(NativeHandle, OutputConfiguration),
    CommitRequestedState(NativeHandle, NativeHandle),
    AddOutputToLayout(NativeHandle),
    RenderOutputFrame(NativeHandle),
    CreatePopupScene(NativeHandle, NativeHandle),
    SetScenePosition(NativeHandle, i32, i32),
    RaiseToTop(NativeHandle),
    SetActivated(NativeHandle, bool),
    SetToplevelSize(NativeHandle, u32, u32),
    ScheduleConfigure(NativeHandle),
    AttachPointer(NativeHandle),
    LoadCursorTheme(Option<String>, u32),
    SetCursorImage(String),
    SetCursorSurface(Option<NativeHandle>, i32, i32),
    ConfigureKeyboard(NativeHandle, i32, i32),
    PointerEnter(NativeHandle, f64, f64),
    PointerMotion(u32, f64, f64),
    PointerButton(u32, u32, ButtonState),
    PointerAxis(AxisEvent),
    PointerFrame,
    ClearPointerFocus,
    SetSeatKeyboard(NativeHandle),
    KeyboardEnter(NativeHandle),
    KeyboardKey(u32, u32, KeyState),
    KeyboardModifiers(NativeHandle),
    SetSeatCapabilities(SeatCapabilities),
}

/// A toolkit that keeps just enough scene state to hit-test, and records
/// every command it receives.
pub struct MockToolkit {
    pub signals: Arc<MockSignals>,
    pub calls: Vec<Call>,
    pub socket: Result<String, ToolkitError>,
    pub backend: Result<(), ToolkitError>,
    pub accept_commits: bool,
    pub modes: HashMap<NativeHandle, OutputMode>,

    next_node: u64,
    pub cursor: (f64, f64),
    /// Scene node positions; also the paint order (last is topmost).
    pub nodes: Vec<(NativeHandle, (i32, i32))>,
    pub toplevel_nodes: HashMap<NativeHandle, NativeHandle>,
    pub surface_toplevel: HashMap<NativeHandle, NativeHandle>,
    pub toplevel_surface: HashMap<NativeHandle, NativeHandle>,
    pub surface_client: HashMap<NativeHandle, NativeHandle>,
    pub geometry: HashMap<NativeHandle, GeoBox>,
    /// Where new toplevel scene trees are placed.
    pub placements: HashMap<NativeHandle, (i32, i32)>,
    /// Root surface -> the subsurface hit tests report over it.
    pub subsurfaces: HashMap<NativeHandle, NativeHandle>,

    pub keymap: HashMap<u32, Keysym>,
    pub modifiers: Modifiers,
    pub pointer_focus: Option<NativeHandle>,
    pub keyboard_focus: Option<NativeHandle>,
    pub activated: HashMap<NativeHandle, bool>,
}

impl Default for MockToolkit {
    fn default() -> Self {
        let keymap = [
            (KEY_ESC, Keysym::ESCAPE),
            (KEY_F1, Keysym::F1),
            (KEY_A, Keysym(u32::from('a'))),
        ]
        .into_iter()
        .collect();
        Self {
            signals: Arc::new(MockSignals::default()),
            calls: Vec::new(),
            socket: Ok("wayland-1".to_string()),
            backend: Ok(()),
            accept_commits: true,
            modes: HashMap::new(),
            next_node: 0x9000,
            cursor: (0.0, 0.0),
            nodes: Vec::new(),
            toplevel_nodes: HashMap::new(),
            surface_toplevel: HashMap::new(),
            toplevel_surface: HashMap::new(),
            surface_client: HashMap::new(),
            geometry: HashMap::new(),
            placements: HashMap::new(),
            subsurfaces: HashMap::new(),
            keymap,
            modifiers: Modifiers::empty(),
            pointer_focus: None,
            keyboard_focus: None,
            activated: HashMap::new(),
        }
    }
}

impl MockToolkit {
    fn new_node(&mut self, position: (i32, i32)) -> NativeHandle {
        self.next_node += 1;
        let node = NativeHandle::from_raw(self.next_node);
        self.nodes.push((node, position));
        node
    }

    pub fn node_position(&self, node: NativeHandle) -> Option<(i32, i32)> {
        self.nodes.iter().find(|(n, _)| *n == node).map(|(_, p)| *p)
    }

    pub fn topmost_node(&self) -> Option<NativeHandle> {
        self.nodes.last().map(|(n, _)| *n)
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn last_size(&self, toplevel: NativeHandle) -> Option<(u32, u32)> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetToplevelSize(t, w, h) if *t == toplevel => Some((*w, *h)),
            _ => None,
        })
    }
}

impl Toolkit for MockToolkit {
    fn backend(&self) -> NativeHandle {
        BACKEND
    }
    fn xdg_shell(&self) -> NativeHandle {
        XDG_SHELL
    }
    fn cursor(&self) -> NativeHandle {
        CURSOR
    }
    fn seat(&self) -> NativeHandle {
        SEAT
    }
    fn native_signals(&self) -> Arc<dyn NativeSignals> {
        self.signals.clone()
    }

    fn add_socket_auto(&mut self) -> Result<String, ToolkitError> {
        self.socket.clone()
    }
    fn start_backend(&mut self) -> Result<(), ToolkitError> {
        self.calls.push(Call::StartBackend);
        self.backend.clone()
    }
    fn terminate(&mut self) {
        self.calls.push(Call::Terminate);
    }
    fn destroy_clients(&mut self) {
        self.calls.push(Call::DestroyClients);
    }
    fn destroy_scene(&mut self) {
        self.calls.push(Call::DestroyScene);
    }

    fn init_output_render(&mut self, output: NativeHandle) {
        self.calls.push(Call::InitOutputRender(output));
    }
    fn preferred_mode(&self, output: NativeHandle) -> Option<OutputMode> {
        self.modes.get(&output).copied()
    }
    fn commit_output(&mut self, output: NativeHandle, configuration: OutputConfiguration) -> bool {
        self.calls.push(Call::CommitOutput(output, configuration));
        self.accept_commits
    }
    fn commit_requested_state(&mut self, output: NativeHandle, state: NativeHandle) -> bool {
        self.calls.push(Call::CommitRequestedState(output, state));
        self.accept_commits
    }
    fn add_output_to_layout(&mut self, output: NativeHandle) {
        self.calls.push(Call::AddOutputToLayout(output));
    }
    fn render_output_frame(&mut self, output: NativeHandle) {
        self.calls.push(Call::RenderOutputFrame(output));
    }

    fn create_toplevel_scene(&mut self, toplevel: NativeHandle) -> NativeHandle {
        let position = self.placements.get(&toplevel).copied().unwrap_or_default();
        let node = self.new_node(position);
        self.toplevel_nodes.insert(toplevel, node);
        node
    }
    fn create_popup_scene(&mut self, popup: NativeHandle, parent: NativeHandle) -> NativeHandle {
        self.calls.push(Call::CreatePopupScene(popup, parent));
        self.new_node((0, 0))
    }
    fn scene_position(&self, node: NativeHandle) -> (i32, i32) {
        self.node_position(node).unwrap_or_default()
    }
    fn set_scene_position(&mut self, node: NativeHandle, x: i32, y: i32) {
        self.calls.push(Call::SetScenePosition(node, x, y));
        if let Some(entry) = self.nodes.iter_mut().find(|(n, _)| *n == node) {
            entry.1 = (x, y);
        }
    }
    fn raise_to_top(&mut self, node: NativeHandle) {
        self.calls.push(Call::RaiseToTop(node));
        if let Some(index) = self.nodes.iter().position(|(n, _)| *n == node) {
            let entry = self.nodes.remove(index);
            self.nodes.push(entry);
        }
    }
    fn surface_at(&self, lx: f64, ly: f64) -> Option<SurfaceHit> {
        for (node, (x, y)) in self.nodes.iter().rev() {
            let Some((toplevel, _)) = self.toplevel_nodes.iter().find(|(_, n)| *n == node) else {
                continue;
            };
            let geometry = self.toplevel_geometry(*toplevel);
            let area = GeoBox::new(*x, *y, geometry.x + geometry.width, geometry.y + geometry.height);
            if area.contains(lx, ly) {
                let root = self.toplevel_surface[toplevel];
                let surface = self.subsurfaces.get(&root).copied().unwrap_or(root);
                return Some(SurfaceHit {
                    surface,
                    sx: lx - *x as f64,
                    sy: ly - *y as f64,
                });
            }
        }
        None
    }
    fn toplevel_of(&self, surface: NativeHandle) -> Option<NativeHandle> {
        self.surface_toplevel.get(&surface).copied()
    }
    fn toplevel_geometry(&self, toplevel: NativeHandle) -> GeoBox {
        self.geometry
            .get(&toplevel)
            .copied()
            .unwrap_or(GeoBox::new(0, 0, 200, 100))
    }
    fn set_activated(&mut self, toplevel: NativeHandle, activated: bool) {
        self.calls.push(Call::SetActivated(toplevel, activated));
        self.activated.insert(toplevel, activated);
    }
    fn set_toplevel_size(&mut self, toplevel: NativeHandle, width: u32, height: u32) {
        self.calls.push(Call::SetToplevelSize(toplevel, width, height));
    }
    fn schedule_configure(&mut self, xdg_surface: NativeHandle) {
        self.calls.push(Call::ScheduleConfigure(xdg_surface));
    }

    fn cursor_position(&self) -> (f64, f64) {
        self.cursor
    }
    fn move_cursor(&mut self, _device: NativeHandle, dx: f64, dy: f64) {
        self.cursor = (self.cursor.0 + dx, self.cursor.1 + dy);
    }
    fn warp_cursor_absolute(&mut self, _device: NativeHandle, x: f64, y: f64) {
        // A single 1000x1000 layout.
        self.cursor = (x * 1000.0, y * 1000.0);
    }
    fn attach_pointer(&mut self, device: NativeHandle) {
        self.calls.push(Call::AttachPointer(device));
    }
    fn load_cursor_theme(&mut self, theme: Option<&str>, size: u32) {
        self.calls.push(Call::LoadCursorTheme(theme.map(str::to_string), size));
    }
    fn set_cursor_image(&mut self, name: &str) {
        self.calls.push(Call::SetCursorImage(name.to_string()));
    }
    fn set_cursor_surface(&mut self, surface: Option<NativeHandle>, hotspot_x: i32, hotspot_y: i32) {
        self.calls.push(Call::SetCursorSurface(surface, hotspot_x, hotspot_y));
    }

    fn configure_keyboard(&mut self, device: NativeHandle, repeat_rate: i32, repeat_delay: i32) {
        self.calls.push(Call::ConfigureKeyboard(device, repeat_rate, repeat_delay));
    }
    fn keysyms(&self, _device: NativeHandle, keycode: u32) -> Vec<Keysym> {
        self.keymap.get(&keycode).copied().into_iter().collect()
    }
    fn keyboard_modifiers(&self, _device: NativeHandle) -> Modifiers {
        self.modifiers
    }

    fn pointer_focused_surface(&self) -> Option<NativeHandle> {
        self.pointer_focus
    }
    fn pointer_focused_client(&self) -> Option<NativeHandle> {
        self.pointer_focus.and_then(|s| self.surface_client.get(&s).copied())
    }
    fn keyboard_focused_surface(&self) -> Option<NativeHandle> {
        self.keyboard_focus
    }
    fn notify_pointer_enter(&mut self, surface: NativeHandle, sx: f64, sy: f64) {
        self.calls.push(Call::PointerEnter(surface, sx, sy));
        self.pointer_focus = Some(surface);
    }
    fn notify_pointer_motion(&mut self, time_msec: u32, sx: f64, sy: f64) {
        self.calls.push(Call::PointerMotion(time_msec, sx, sy));
    }
    fn notify_pointer_button(&mut self, time_msec: u32, button: u32, state: ButtonState) {
        self.calls.push(Call::PointerButton(time_msec, button, state));
    }
    fn notify_pointer_axis(&mut self, event: &AxisEvent) {
        self.calls.push(Call::PointerAxis(*event));
    }
    fn notify_pointer_frame(&mut self) {
        self.calls.push(Call::PointerFrame);
    }
    fn clear_pointer_focus(&mut self) {
        self.calls.push(Call::ClearPointerFocus);
        self.pointer_focus = None;
    }
    fn set_seat_keyboard(&mut self, device: NativeHandle) {
        self.calls.push(Call::SetSeatKeyboard(device));
    }
    fn notify_keyboard_enter(&mut self, surface: NativeHandle) {
        self.calls.push(Call::KeyboardEnter(surface));
        self.keyboard_focus = Some(surface);
    }
    fn notify_keyboard_key(&mut self, time_msec: u32, keycode: u32, state: KeyState) {
        self.calls.push(Call::KeyboardKey(time_msec, keycode, state));
    }
    fn notify_keyboard_modifiers(&mut self, device: NativeHandle) {
        self.calls.push(Call::KeyboardModifiers(device));
    }
    fn set_seat_capabilities(&mut self, capabilities: SeatCapabilities) {
        self.calls.push(Call::SetSeatCapabilities(capabilities));
    }
}

/// Native handles of one test toplevel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestWindow {
    pub toplevel: NativeHandle,
    pub surface: NativeHandle,
    pub client: NativeHandle,
}

impl TestWindow {
    pub fn new(n: u64) -> Self {
        Self {
            toplevel: NativeHandle::from_raw(0x1000 + n),
            surface: NativeHandle::from_raw(0x2000 + n),
            client: NativeHandle::from_raw(0x3000 + n),
        }
    }
}

/// A server over a [`MockToolkit`], plus shortcuts for emitting signals.
pub struct Harness {
    pub server: Server<MockToolkit>,
    time: u32,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CompositorConfig::default())
    }

    pub fn with_config(config: CompositorConfig) -> Self {
        Self::with_toolkit(MockToolkit::default(), config)
    }

    pub fn with_toolkit(toolkit: MockToolkit, config: CompositorConfig) -> Self {
        let server = Server::new(toolkit, config).expect("server setup");
        Self { server, time: 0 }
    }

    pub fn toolkit(&self) -> &MockToolkit {
        self.server.toolkit()
    }

    pub fn toolkit_mut(&mut self) -> &mut MockToolkit {
        self.server.toolkit_mut()
    }

    pub fn signals(&self) -> Arc<MockSignals> {
        self.server.toolkit().signals.clone()
    }

    fn tick(&mut self) -> u32 {
        self.time += 1;
        self.time
    }

    pub fn emit(&mut self, handle: NativeHandle, signal: Signal, event: Event) -> usize {
        self.server.dispatch(handle, signal, &event)
    }

    pub fn destroy(&mut self, handle: NativeHandle) -> usize {
        self.emit(handle, Signal::Destroy, Event::Empty)
    }

    // --- Devices and outputs ---------------------------------------------

    pub fn add_device(&mut self, device: NativeHandle, kind: DeviceKind) {
        self.emit(BACKEND, Signal::NewInput, Event::NewInput { device, kind });
    }

    pub fn add_output(&mut self, output: NativeHandle) {
        self.emit(BACKEND, Signal::NewOutput, Event::NewOutput { output });
    }

    // --- Windows ---------------------------------------------------------

    /// Announces a toplevel whose geometry is `geometry`, placed at `(x, y)`.
    pub fn new_window(&mut self, n: u64, x: i32, y: i32, geometry: GeoBox) -> TestWindow {
        let w = TestWindow::new(n);
        {
            let toolkit = self.toolkit_mut();
            toolkit.surface_toplevel.insert(w.surface, w.toplevel);
            toolkit.toplevel_surface.insert(w.toplevel, w.surface);
            toolkit.surface_client.insert(w.surface, w.client);
            toolkit.geometry.insert(w.toplevel, geometry);
            toolkit.placements.insert(w.toplevel, (x, y));
        }
        self.emit(
            XDG_SHELL,
            Signal::NewToplevel,
            Event::NewToplevel { toplevel: w.toplevel, surface: w.surface },
        );
        w
    }

    pub fn map(&mut self, w: TestWindow) {
        self.emit(w.surface, Signal::Commit, Event::Commit { initial: true });
        self.emit(w.surface, Signal::Map, Event::Empty);
    }

    pub fn unmap(&mut self, w: TestWindow) {
        self.emit(w.surface, Signal::Unmap, Event::Empty);
    }

    /// Toplevel destroy followed by the surface's own destroy, as the toolkit
    /// emits them.
    pub fn destroy_window(&mut self, w: TestWindow) {
        self.destroy(w.toplevel);
        self.destroy(w.surface);
    }

    pub fn id(&self, w: TestWindow) -> WindowId {
        self.server
            .windows()
            .find_by_toplevel(w.toplevel)
            .expect("window is known")
    }

    pub fn order(&self, windows: &[TestWindow]) -> Vec<TestWindow> {
        self.server
            .windows()
            .order()
            .into_iter()
            .map(|id| {
                *windows
                    .iter()
                    .find(|w| self.server.windows().get(id).map(|r| r.toplevel) == Some(w.toplevel))
                    .expect("window in list")
            })
            .collect()
    }

    // --- Pointer ---------------------------------------------------------

    pub fn move_pointer_to(&mut self, x: f64, y: f64) {
        let (cx, cy) = self.toolkit().cursor;
        let time_msec = self.tick();
        self.emit(
            CURSOR,
            Signal::Motion,
            Event::PointerMotion { device: NativeHandle::from_raw(0x50), time_msec, dx: x - cx, dy: y - cy },
        );
    }

    pub fn button(&mut self, state: ButtonState) {
        let time_msec = self.tick();
        self.emit(CURSOR, Signal::Button, Event::PointerButton { time_msec, button: 0x110, state });
    }

    // --- Keyboard --------------------------------------------------------

    pub fn key(&mut self, keyboard: NativeHandle, keycode: u32, state: KeyState) {
        let time_msec = self.tick();
        self.emit(keyboard, Signal::Key, Event::Key { time_msec, keycode, state });
    }

    pub fn tap(&mut self, keyboard: NativeHandle, keycode: u32) {
        self.key(keyboard, keycode, KeyState::Pressed);
        self.key(keyboard, keycode, KeyState::Released);
    }
}
