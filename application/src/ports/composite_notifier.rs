//! Composite notifier: fans one event out to several notifiers.
//!
//! ```text
//! CouncilOrchestrator ──notify──▶ CompositeNotifier
//!                                   ├─▶ TracingNotifier   (log lines)
//!                                   └─▶ JsonlEventNotifier (events file)
//! ```

use super::notifier::{Notifier, SessionEvent};
use std::sync::Arc;

/// A notifier that delegates to multiple inner notifiers, in order.
#[derive(Default, Clone)]
pub struct CompositeNotifier {
    delegates: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new(delegates: Vec<Arc<dyn Notifier>>) -> Self {
        Self { delegates }
    }

    pub fn push(&mut self, notifier: Arc<dyn Notifier>) {
        self.delegates.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl Notifier for CompositeNotifier {
    fn notify(&self, event: &SessionEvent) {
        for d in &self.delegates {
            d.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::notifier::SessionEventKind;
    use council_domain::SessionId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<SessionEventKind>>);

    impl Notifier for Recording {
        fn notify(&self, event: &SessionEvent) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[test]
    fn test_every_delegate_sees_every_event() {
        let first = Arc::new(Recording::default());
        let second = Arc::new(Recording::default());
        let composite =
            CompositeNotifier::new(vec![first.clone() as Arc<dyn Notifier>, second.clone()]);

        composite.notify(&SessionEvent::new(SessionEventKind::Started, &SessionId::new("s")));
        composite.notify(&SessionEvent::new(SessionEventKind::Adjourned, &SessionId::new("s")));

        let expected = vec![SessionEventKind::Started, SessionEventKind::Adjourned];
        assert_eq!(*first.0.lock().unwrap(), expected);
        assert_eq!(*second.0.lock().unwrap(), expected);
    }
}
