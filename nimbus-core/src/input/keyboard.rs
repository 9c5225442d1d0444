use super::bindings::Action;
use crate::server::Server;
use crate::toolkit::{KeyState, Toolkit};
use crate::window::WindowId;
use crate::NativeHandle;
use tracing::{debug, trace};

impl<T: Toolkit + 'static> Server<T> {
    /// Forwards modifier changes to the focused client through the seat.
    pub(crate) fn handle_modifiers(&mut self, device: NativeHandle) {
        // A seat has one active keyboard; the last one used wins.
        self.toolkit.set_seat_keyboard(device);
        self.toolkit.notify_keyboard_modifiers(device);
    }

    /// Runs a compositor binding for accelerator presses, forwards everything
    /// else to the focused client.
    pub(crate) fn handle_key(&mut self, device: NativeHandle, time_msec: u32, keycode: u32, state: KeyState) {
        let modifiers = self.toolkit.keyboard_modifiers(device);

        let mut handled = false;
        if state == KeyState::Pressed && self.bindings.accelerator_held(modifiers) {
            let action = self
                .toolkit
                .keysyms(device, keycode)
                .into_iter()
                .find_map(|sym| self.bindings.lookup(modifiers, sym));
            if let Some(action) = action {
                self.run_action(action);
                handled = true;
            }
        }

        if !handled {
            trace!(device = ?device, keycode, ?state, "forwarding key");
            self.toolkit.set_seat_keyboard(device);
            self.toolkit.notify_keyboard_key(time_msec, keycode, state);
        }
    }

    fn run_action(&mut self, action: Action) {
        debug!(%action, "compositor binding");
        match action {
            Action::Terminate => self.terminate(),
            Action::CycleFocus => self.cycle_focus(),
        }
    }

    /// Focuses the window right behind the focused one. Needs at least two
    /// mapped windows.
    pub fn cycle_focus(&mut self) {
        if self.windows.len() < 2 {
            return;
        }
        let Some(next) = self.windows.next_after_front() else {
            return;
        };
        if let Some(surface) = self.windows.get(next).map(|w| w.surface) {
            self.focus_window(next, surface);
        }
    }

    /// Gives keyboard focus to window `id`, reached through `surface`.
    ///
    /// `surface` may be any surface of the window (a subsurface under the
    /// pointer, say); nothing happens if it already has keyboard focus.
    /// Otherwise the previously focused toplevel is deactivated, and the
    /// window is raised, moved to the front of the focus stack, activated and
    /// given keyboard focus on its own surface.
    pub fn focus_window(&mut self, id: WindowId, surface: NativeHandle) {
        let previous = self.toolkit.keyboard_focused_surface();
        if previous == Some(surface) {
            return;
        }
        let Some(window) = self.windows.get(id) else {
            return;
        };
        let (toplevel, root, scene) = (window.toplevel, window.surface, window.scene);

        if let Some(previous_toplevel) = previous.and_then(|p| self.toolkit.toplevel_of(p)) {
            if previous_toplevel != toplevel {
                self.toolkit.set_activated(previous_toplevel, false);
            }
        }

        self.toolkit.raise_to_top(scene);
        self.windows.move_to_front(id);
        self.toolkit.set_activated(toplevel, true);
        self.toolkit.notify_keyboard_enter(root);
        debug!(window = %id, surface = ?root, via = ?surface, "keyboard focus changed");
    }
}
