//! Output hot-plug handling.

use crate::events::Event;
use crate::server::{unexpected_payload, Server};
use crate::toolkit::{OutputConfiguration, Toolkit};
use crate::{NativeHandle, Signal};
use tracing::{debug, info, warn};

impl<T: Toolkit + 'static> Server<T> {
    /// Brings a newly reported output up with its preferred mode and places it
    /// in the layout.
    pub(crate) fn handle_new_output(&mut self, output: NativeHandle) {
        self.registry.revive(output);
        self.toolkit.init_output_render(output);

        // Outputs without modes (nested or headless backends) are only enabled.
        let configuration = OutputConfiguration {
            enabled: true,
            mode: self.toolkit.preferred_mode(output),
        };
        if !self.toolkit.commit_output(output, configuration) {
            warn!(output = ?output, ?configuration, "output rejected its initial state");
        }

        self.listen(output, Signal::Frame, move |s: &mut Self, _| {
            s.toolkit.render_output_frame(output);
        });
        self.listen(output, Signal::RequestState, move |s: &mut Self, event| match *event {
            Event::OutputRequestState { state } => s.handle_output_request_state(output, state),
            _ => unexpected_payload(Signal::RequestState, event),
        });
        self.listen(output, Signal::Destroy, move |s: &mut Self, _| s.handle_output_destroy(output));
        self.track(output);

        self.toolkit.add_output_to_layout(output);
        self.outputs.push(output);
        info!(output = ?output, mode = ?configuration.mode, "output added");
    }

    fn handle_output_request_state(&mut self, output: NativeHandle, state: NativeHandle) {
        if !self.toolkit.commit_requested_state(output, state) {
            warn!(output = ?output, "requested output state could not be committed");
        }
    }

    fn handle_output_destroy(&mut self, output: NativeHandle) {
        self.outputs.retain(|o| *o != output);
        debug!(output = ?output, remaining = self.outputs.len(), "output removed");
    }
}
