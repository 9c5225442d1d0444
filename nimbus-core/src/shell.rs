//! xdg-shell toplevel and popup lifecycle, plus client move/resize requests.

use crate::events::Event;
use crate::interaction::GrabMode;
use crate::server::{unexpected_payload, Server};
use crate::toolkit::{Edges, Toolkit};
use crate::window::{Window, WindowId};
use crate::{NativeHandle, Signal};
use tracing::{debug, info, trace};

impl<T: Toolkit + 'static> Server<T> {
    /// Creates the window record and scene tree for a new toplevel.
    ///
    /// Map, unmap and commit are surface signals; destroy and the interactive
    /// requests belong to the toplevel. Both objects are lifetime-tracked.
    pub(crate) fn handle_new_toplevel(&mut self, toplevel: NativeHandle, surface: NativeHandle) {
        self.registry.revive(toplevel);
        self.registry.revive(surface);
        let scene = self.toolkit.create_toplevel_scene(toplevel);
        let mut window = Window::new(toplevel, surface, scene);
        window.position = self.toolkit.scene_position(scene);
        let id = self.windows.insert(window);

        self.listen(surface, Signal::Map, move |s: &mut Self, _| s.handle_map(id));
        self.listen(surface, Signal::Unmap, move |s: &mut Self, _| s.handle_unmap(id));
        self.listen(surface, Signal::Commit, move |s: &mut Self, event| match *event {
            Event::Commit { initial } => s.handle_toplevel_commit(id, initial),
            _ => unexpected_payload(Signal::Commit, event),
        });
        self.listen(toplevel, Signal::Destroy, move |s: &mut Self, _| s.handle_toplevel_destroy(id));
        self.listen(toplevel, Signal::RequestMove, move |s: &mut Self, _| {
            s.begin_interactive(id, GrabMode::Move, Edges::empty());
        });
        self.listen(toplevel, Signal::RequestResize, move |s: &mut Self, event| match *event {
            Event::RequestResize { edges, .. } => {
                s.begin_interactive(id, GrabMode::Resize, edges);
            }
            _ => unexpected_payload(Signal::RequestResize, event),
        });
        self.track(surface);
        self.track(toplevel);

        debug!(window = %id, toplevel = ?toplevel, surface = ?surface, "toplevel created");
    }

    fn handle_toplevel_commit(&mut self, id: WindowId, initial: bool) {
        let Some(toplevel) = self.windows.get(id).map(|w| w.toplevel) else {
            return;
        };
        if initial {
            // Let the client pick its own size.
            self.toolkit.schedule_configure(toplevel);
        }
        let geometry = self.toolkit.toplevel_geometry(toplevel);
        if let Some(window) = self.windows.get_mut(id) {
            window.geometry = geometry;
        }
        trace!(window = %id, initial, ?geometry, "toplevel committed");
    }

    fn handle_map(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        window.mapped = true;
        let surface = window.surface;
        self.windows.add(id);
        self.focus_window(id, surface);
        info!(window = %id, mapped = self.windows.len(), "window mapped");
    }

    fn handle_unmap(&mut self, id: WindowId) {
        if self.interaction.release_window(id) {
            debug!(window = %id, "grab released by unmap");
        }
        if let Some(window) = self.windows.get_mut(id) {
            window.mapped = false;
        }
        self.windows.remove(id);
        debug!(window = %id, mapped = self.windows.len(), "window unmapped");
    }

    fn handle_toplevel_destroy(&mut self, id: WindowId) {
        if self.interaction.release_window(id) {
            debug!(window = %id, "grab released by destroy");
        }
        if let Some(window) = self.windows.destroy(id) {
            // The surface outlives its toplevel role; its listeners go now.
            self.registry.unregister_all(window.surface);
            debug!(window = %id, "window destroyed");
        }
    }

    /// Tracks a new popup under its parent's scene tree.
    ///
    /// # Panics
    ///
    /// If the toolkit reports a popup without a parent.
    pub(crate) fn handle_new_popup(&mut self, popup: NativeHandle, parent: Option<NativeHandle>) {
        let Some(parent) = parent else {
            panic!("popup {} reported without a parent surface", popup);
        };
        self.registry.revive(popup);
        let scene = self.toolkit.create_popup_scene(popup, parent);

        self.listen(popup, Signal::Commit, move |s: &mut Self, event| {
            if let Event::Commit { initial: true } = event {
                s.toolkit.schedule_configure(popup);
            }
        });
        self.track(popup);
        debug!(popup = ?popup, parent = ?parent, scene = ?scene, "popup created");
    }

    /// Starts an interactive move or resize of `id`.
    ///
    /// Denied unless the pointer is currently over the window, since clients
    /// send these requests from stale button presses too. Returns whether the
    /// grab started.
    pub fn begin_interactive(&mut self, id: WindowId, mode: GrabMode, edges: Edges) -> bool {
        let Some(window) = self.windows.get(id) else {
            return false;
        };
        let (toplevel, position) = (window.toplevel, window.position);

        let focused = self
            .toolkit
            .pointer_focused_surface()
            .and_then(|surface| self.toolkit.toplevel_of(surface));
        if focused != Some(toplevel) {
            debug!(window = %id, %mode, "interactive request denied: window lacks pointer focus");
            return false;
        }

        let cursor = self.toolkit.cursor_position();
        match mode {
            GrabMode::Move => self.interaction.begin_move(id, cursor, position),
            GrabMode::Resize => {
                let geometry = self.toolkit.toplevel_geometry(toplevel);
                self.interaction.begin_resize(id, cursor, position, geometry, edges);
            }
        }
        debug!(window = %id, %mode, ?edges, "interactive grab started");
        true
    }

    /// Uses a client-provided cursor image, if that client has pointer focus.
    pub(crate) fn handle_set_cursor_request(
        &mut self,
        client: NativeHandle,
        surface: Option<NativeHandle>,
        hotspot_x: i32,
        hotspot_y: i32,
    ) {
        if self.toolkit.pointer_focused_client() == Some(client) {
            self.toolkit.set_cursor_surface(surface, hotspot_x, hotspot_y);
        } else {
            trace!(client = ?client, "ignoring cursor request from unfocused client");
        }
    }
}
