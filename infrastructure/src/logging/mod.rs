//! Logging infrastructure: session event sinks.
//!
//! Provides [`JsonlEventNotifier`], a JSONL file writer, and
//! [`TracingNotifier`], which forwards events to the tracing subscriber.
//! Both implement the [`Notifier`](council_application::Notifier) port.

mod jsonl_notifier;
mod tracing_notifier;

pub use jsonl_notifier::JsonlEventNotifier;
pub use tracing_notifier::TracingNotifier;
