//! Compositor state and lifecycle.
//!
//! [`Server`] is the dispatch state of the [`EventRegistry`]: every callback
//! receives it mutably. The handlers themselves live next to the concern they
//! implement (`output`, `shell`, `input::*`); this module wires the global
//! objects up and drives the display from start to shutdown.

use crate::config::CompositorConfig;
use crate::error::{NimbusError, Result, StartupStage};
use crate::events::Event;
use crate::input::bindings::KeyBindings;
use crate::interaction::InteractionState;
use crate::launch;
use crate::registry::{EventRegistry, NativeListener};
use crate::toolkit::{SeatCapabilities, Toolkit};
use crate::window::WindowRegistry;
use crate::{NativeHandle, Signal};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One signal emission, as delivered by an [`EventSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub handle: NativeHandle,
    pub signal: Signal,
    pub event: Event,
}

impl NativeEvent {
    pub fn new(handle: NativeHandle, signal: Signal, event: Event) -> Self {
        Self { handle, signal, event }
    }
}

/// The display's event loop, seen from the compositor.
///
/// `next_event` blocks until the toolkit emits the next signal and returns
/// `None` once the display has nothing more to deliver.
pub trait EventSource {
    fn next_event(&mut self) -> Option<NativeEvent>;
}

impl<I> EventSource for I
where
    I: Iterator<Item = NativeEvent>,
{
    fn next_event(&mut self) -> Option<NativeEvent> {
        self.next()
    }
}

/// The compositor: toolkit, registry, windows, grab state and input devices.
pub struct Server<T: Toolkit + 'static> {
    pub(crate) toolkit: T,
    pub(crate) registry: Arc<EventRegistry<Server<T>>>,
    pub(crate) config: CompositorConfig,
    pub(crate) bindings: KeyBindings,
    pub(crate) windows: WindowRegistry,
    pub(crate) interaction: InteractionState,
    pub(crate) keyboards: Vec<NativeHandle>,
    pub(crate) outputs: Vec<NativeHandle>,
    socket: Option<String>,
    running: bool,
}

impl<T: Toolkit + 'static> Server<T> {
    /// Builds the compositor around an initialised toolkit and subscribes to
    /// the backend, xdg-shell, cursor and seat signals.
    pub fn new(toolkit: T, config: CompositorConfig) -> Result<Self> {
        let bindings = config.bindings.resolve()?;
        let registry = Arc::new(EventRegistry::new(toolkit.native_signals()));

        let mut server = Self {
            toolkit,
            registry,
            config,
            bindings,
            windows: WindowRegistry::new(),
            interaction: InteractionState::default(),
            keyboards: Vec::new(),
            outputs: Vec::new(),
            socket: None,
            running: false,
        };

        server.toolkit.load_cursor_theme(
            server.config.cursor.theme.as_deref(),
            server.config.cursor.size,
        );
        server.wire_globals()?;
        debug!(registry = ?server.registry, "compositor wired");
        Ok(server)
    }

    fn wire_globals(&mut self) -> Result<()> {
        let backend = self.toolkit.backend();
        self.registry.register(backend, Signal::NewOutput, |s: &mut Self, event| match *event {
            Event::NewOutput { output } => s.handle_new_output(output),
            _ => unexpected_payload(Signal::NewOutput, event),
        })?;
        self.registry.register(backend, Signal::NewInput, |s: &mut Self, event| match *event {
            Event::NewInput { device, kind } => s.handle_new_input(device, kind),
            _ => unexpected_payload(Signal::NewInput, event),
        })?;
        self.registry.track_lifetime(backend, Signal::Destroy)?;

        let xdg_shell = self.toolkit.xdg_shell();
        self.registry.register(xdg_shell, Signal::NewToplevel, |s: &mut Self, event| match *event {
            Event::NewToplevel { toplevel, surface } => s.handle_new_toplevel(toplevel, surface),
            _ => unexpected_payload(Signal::NewToplevel, event),
        })?;
        self.registry.register(xdg_shell, Signal::NewPopup, |s: &mut Self, event| match *event {
            Event::NewPopup { popup, parent } => s.handle_new_popup(popup, parent),
            _ => unexpected_payload(Signal::NewPopup, event),
        })?;
        self.registry.track_lifetime(xdg_shell, Signal::Destroy)?;

        let cursor = self.toolkit.cursor();
        self.registry.register(cursor, Signal::Motion, |s: &mut Self, event| match *event {
            Event::PointerMotion { device, time_msec, dx, dy } => s.handle_motion(device, time_msec, dx, dy),
            _ => unexpected_payload(Signal::Motion, event),
        })?;
        self.registry.register(cursor, Signal::MotionAbsolute, |s: &mut Self, event| match *event {
            Event::PointerMotionAbsolute { device, time_msec, x, y } => {
                s.handle_motion_absolute(device, time_msec, x, y)
            }
            _ => unexpected_payload(Signal::MotionAbsolute, event),
        })?;
        self.registry.register(cursor, Signal::Button, |s: &mut Self, event| match *event {
            Event::PointerButton { time_msec, button, state } => s.handle_button(time_msec, button, state),
            _ => unexpected_payload(Signal::Button, event),
        })?;
        self.registry.register(cursor, Signal::Axis, |s: &mut Self, event| match event {
            Event::PointerAxis(axis) => s.handle_axis(axis),
            _ => unexpected_payload(Signal::Axis, event),
        })?;
        self.registry
            .register(cursor, Signal::PointerFrame, |s: &mut Self, _| s.handle_pointer_frame())?;

        let seat = self.toolkit.seat();
        self.registry.register(seat, Signal::RequestSetCursor, |s: &mut Self, event| match *event {
            Event::RequestSetCursor { client, surface, hotspot_x, hotspot_y } => {
                s.handle_set_cursor_request(client, surface, hotspot_x, hotspot_y)
            }
            _ => unexpected_payload(Signal::RequestSetCursor, event),
        })?;
        self.registry.track_lifetime(seat, Signal::Destroy)?;

        Ok(())
    }

    /// Subscribes `callback` to a per-object signal from inside a handler.
    ///
    /// Rejections (the object is already gone) are logged by the registry
    /// and otherwise ignored. Creation handlers revive reused handle values
    /// before subscribing, so a rejection here always means a dead object.
    pub(crate) fn listen<F>(&self, handle: NativeHandle, signal: Signal, callback: F)
    where
        F: Fn(&mut Self, &Event) + Send + Sync + 'static,
    {
        let _ = self.registry.register(handle, signal, callback);
    }

    /// Releases every listener of `handle` once its destroy signal fires.
    /// Registered after the object's own handlers, so those still run first.
    pub(crate) fn track(&self, handle: NativeHandle) {
        let _ = self.registry.track_lifetime(handle, Signal::Destroy);
    }

    /// Delivers one signal emission to its subscribers.
    pub fn dispatch(&mut self, handle: NativeHandle, signal: Signal, event: &Event) -> usize {
        let registry = Arc::clone(&self.registry);
        registry.dispatch(self, handle, signal, event)
    }

    /// Delivers a signal identified by the native listener that fired.
    pub fn dispatch_native(&mut self, listener: NativeListener, event: &Event) -> usize {
        let registry = Arc::clone(&self.registry);
        registry.dispatch_native(self, listener, event)
    }

    /// Opens the display socket, starts the backend, advertises the socket
    /// through `WAYLAND_DISPLAY` and launches the startup command.
    ///
    /// Returns the socket name.
    pub fn start(&mut self) -> Result<String> {
        let socket = self.toolkit.add_socket_auto().map_err(|source| NimbusError::Startup {
            stage: StartupStage::CreatingSocket,
            source,
        })?;
        self.toolkit.start_backend().map_err(|source| NimbusError::Startup {
            stage: StartupStage::StartingBackend,
            source,
        })?;

        std::env::set_var("WAYLAND_DISPLAY", &socket);
        if let Some(command) = &self.config.startup_command {
            launch::spawn_startup_command(command, &socket)?;
        }

        info!(socket = %socket, "Running Wayland compositor on WAYLAND_DISPLAY={}", socket);
        self.socket = Some(socket.clone());
        self.running = true;
        Ok(socket)
    }

    /// Pumps `source` until it runs dry or the session is terminated.
    /// Returns the number of signal emissions processed.
    pub fn run<S: EventSource>(&mut self, source: &mut S) -> usize {
        if !self.running {
            warn!("run called before start");
            return 0;
        }
        let mut processed = 0;
        while self.running {
            let Some(native) = source.next_event() else {
                debug!("event source drained");
                break;
            };
            self.dispatch(native.handle, native.signal, &native.event);
            processed += 1;
        }
        processed
    }

    /// Stops the event loop. Used by the terminate binding.
    pub fn terminate(&mut self) {
        info!("session termination requested");
        self.running = false;
        self.toolkit.terminate();
    }

    /// Disconnects all clients, tears down the scene and releases whatever is
    /// still registered.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.toolkit.destroy_clients();
        self.interaction.reset();
        self.windows = WindowRegistry::new();
        self.toolkit.destroy_scene();
        self.registry.shutdown();
        self.socket = None;
        info!("compositor shut down");
    }

    /// Recomputes and advertises the seat capabilities. A pointer is always
    /// advertised since the cursor exists without any device attached.
    pub(crate) fn update_capabilities(&mut self) {
        let mut capabilities = SeatCapabilities::POINTER;
        if !self.keyboards.is_empty() {
            capabilities |= SeatCapabilities::KEYBOARD;
        }
        debug!(?capabilities, "seat capabilities updated");
        self.toolkit.set_seat_capabilities(capabilities);
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    pub fn registry(&self) -> &Arc<EventRegistry<Server<T>>> {
        &self.registry
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn keyboards(&self) -> &[NativeHandle] {
        &self.keyboards
    }

    pub fn outputs(&self) -> &[NativeHandle] {
        &self.outputs
    }

    pub fn socket_name(&self) -> Option<&str> {
        self.socket.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// A signal arrived with a payload its handler does not understand.
///
/// # Panics
///
/// Always. The toolkit broke its signal contract.
pub(crate) fn unexpected_payload(signal: Signal, event: &Event) -> ! {
    error!(signal = %signal, ?event, "unexpected payload for signal");
    panic!("signal {} delivered an unexpected payload: {:?}", signal, event);
}
