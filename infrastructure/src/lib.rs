//! Infrastructure layer for council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod responders;
pub mod scribe;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileEngineConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileParticipantConfig, FileResponderConfig, Severity,
};
pub use logging::{JsonlEventNotifier, TracingNotifier};
pub use responders::{
    CommandResponder, PromptTemplate, ScriptedResponder, build_registry, responder_for,
};
pub use scribe::MarkdownScribe;
