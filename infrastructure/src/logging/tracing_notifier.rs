//! Notifier that forwards session events to `tracing`.

use council_application::{Notifier, SessionEvent};
use tracing::info;

/// Emits every event at `info` level under the `council::events` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &SessionEvent) {
        info!(
            target: "council::events",
            session = %event.session,
            entity = event.entity.as_deref().unwrap_or("-"),
            payload = %event.payload,
            "{}",
            event.kind
        );
    }
}
