use crate::interaction::{InteractionState, MoveGrab, ResizeGrab};
use crate::server::Server;
use crate::toolkit::{AxisEvent, ButtonState, SurfaceHit, Toolkit};
use crate::window::WindowId;
use crate::NativeHandle;
use tracing::{debug, trace, warn};

impl<T: Toolkit + 'static> Server<T> {
    pub(crate) fn handle_motion(&mut self, device: NativeHandle, time_msec: u32, dx: f64, dy: f64) {
        self.toolkit.move_cursor(device, dx, dy);
        self.process_motion(time_msec);
    }

    pub(crate) fn handle_motion_absolute(&mut self, device: NativeHandle, time_msec: u32, x: f64, y: f64) {
        self.toolkit.warp_cursor_absolute(device, x, y);
        self.process_motion(time_msec);
    }

    /// Applies the current cursor position: drives the active grab, or
    /// forwards the motion to whatever surface is under the cursor.
    pub fn process_motion(&mut self, time_msec: u32) {
        match self.interaction {
            InteractionState::Move(grab) => self.process_move(grab),
            InteractionState::Resize(grab) => self.process_resize(grab),
            InteractionState::PassThrough => self.process_pass_through(time_msec),
        }
    }

    fn process_move(&mut self, grab: MoveGrab) {
        let (x, y) = grab.target(self.toolkit.cursor_position());
        let Some(window) = self.windows.get_mut(grab.window) else {
            warn!(window = %grab.window, "move grab on a window that no longer exists");
            self.interaction.reset();
            return;
        };
        window.position = (x, y);
        let scene = window.scene;
        self.toolkit.set_scene_position(scene, x, y);
    }

    /// Resizes from the anchor box. The scene node is placed so that the
    /// window's geometry (not its surface origin) lands on the new box.
    fn process_resize(&mut self, grab: ResizeGrab) {
        let target = grab.target(self.toolkit.cursor_position());
        let Some(window) = self.windows.get(grab.window) else {
            warn!(window = %grab.window, "resize grab on a window that no longer exists");
            self.interaction.reset();
            return;
        };
        let (toplevel, scene) = (window.toplevel, window.scene);

        let geometry = self.toolkit.toplevel_geometry(toplevel);
        let position = (target.x - geometry.x, target.y - geometry.y);
        if let Some(window) = self.windows.get_mut(grab.window) {
            window.position = position;
        }
        self.toolkit.set_scene_position(scene, position.0, position.1);
        self.toolkit
            .set_toplevel_size(toplevel, target.width as u32, target.height as u32);
        trace!(window = %grab.window, ?target, "resizing");
    }

    /// Always sends enter and motion; the toolkit drops duplicates itself.
    fn process_pass_through(&mut self, time_msec: u32) {
        let (cx, cy) = self.toolkit.cursor_position();
        let hit = self.toolkit.surface_at(cx, cy);

        if hit.and_then(|h| self.window_for_surface(h.surface)).is_none() {
            self.toolkit.set_cursor_image(&self.config.cursor.default_image);
        }

        match hit {
            Some(SurfaceHit { surface, sx, sy }) => {
                self.toolkit.notify_pointer_enter(surface, sx, sy);
                self.toolkit.notify_pointer_motion(time_msec, sx, sy);
            }
            None => self.toolkit.clear_pointer_focus(),
        }
    }

    /// The window owning `surface`, which may be a subsurface or popup.
    pub fn window_for_surface(&self, surface: NativeHandle) -> Option<WindowId> {
        self.toolkit
            .toplevel_of(surface)
            .and_then(|toplevel| self.windows.find_by_toplevel(toplevel))
    }

    /// Forwards the button to the pointer-focused client. A press also
    /// focuses the window under the cursor; a release ends any grab.
    pub(crate) fn handle_button(&mut self, time_msec: u32, button: u32, state: ButtonState) {
        self.toolkit.notify_pointer_button(time_msec, button, state);

        match state {
            ButtonState::Released => {
                if let Some(window) = self.interaction.reset() {
                    debug!(window = %window, "grab ended");
                }
            }
            ButtonState::Pressed => {
                let (cx, cy) = self.toolkit.cursor_position();
                let Some(hit) = self.toolkit.surface_at(cx, cy) else {
                    return;
                };
                if let Some(id) = self.window_for_surface(hit.surface) {
                    self.focus_window(id, hit.surface);
                }
            }
        }
    }

    pub(crate) fn handle_axis(&mut self, event: &AxisEvent) {
        self.toolkit.notify_pointer_axis(event);
    }

    /// Groups the preceding pointer events into one logical event for clients.
    pub(crate) fn handle_pointer_frame(&mut self) {
        self.toolkit.notify_pointer_frame();
    }
}
