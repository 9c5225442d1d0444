use crate::events::Event;
use crate::server::{unexpected_payload, Server};
use crate::toolkit::{DeviceKind, Toolkit};
use crate::{NativeHandle, Signal};
use tracing::{debug, info};

impl<T: Toolkit + 'static> Server<T> {
    pub(crate) fn handle_new_input(&mut self, device: NativeHandle, kind: DeviceKind) {
        self.registry.revive(device);
        match kind {
            DeviceKind::Keyboard => self.attach_keyboard(device),
            DeviceKind::Pointer => self.attach_pointer(device),
            DeviceKind::Touch | DeviceKind::TabletTool | DeviceKind::TabletPad | DeviceKind::Switch => {
                debug!(device = ?device, ?kind, "ignoring unsupported input device");
            }
        }
        self.update_capabilities();
    }

    fn attach_keyboard(&mut self, device: NativeHandle) {
        let keyboard = &self.config.keyboard;
        self.toolkit
            .configure_keyboard(device, keyboard.repeat_rate, keyboard.repeat_delay);

        self.listen(device, Signal::Modifiers, move |s: &mut Self, _| s.handle_modifiers(device));
        self.listen(device, Signal::Key, move |s: &mut Self, event| match *event {
            Event::Key { time_msec, keycode, state } => s.handle_key(device, time_msec, keycode, state),
            _ => unexpected_payload(Signal::Key, event),
        });
        self.listen(device, Signal::Destroy, move |s: &mut Self, _| s.detach_keyboard(device));
        self.track(device);

        self.toolkit.set_seat_keyboard(device);
        self.keyboards.push(device);
        info!(device = ?device, keyboards = self.keyboards.len(), "keyboard attached");
    }

    fn detach_keyboard(&mut self, device: NativeHandle) {
        self.keyboards.retain(|k| *k != device);
        debug!(device = ?device, keyboards = self.keyboards.len(), "keyboard detached");
        self.update_capabilities();
    }

    fn attach_pointer(&mut self, device: NativeHandle) {
        // Motion and buttons arrive through the cursor's aggregated signals.
        self.toolkit.attach_pointer(device);
        info!(device = ?device, "pointer attached");
    }
}
