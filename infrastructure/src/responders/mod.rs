//! Participant responder adapters
//!
//! - [`CommandResponder`]: runs an external program per request
//! - [`ScriptedResponder`]: replays fixed lines
//!
//! [`build_registry`] turns the configured participants, consultants and
//! reserves into the directory the orchestrator resolves ids against.

mod command;
pub mod prompt;
mod scripted;

pub use command::CommandResponder;
pub use prompt::PromptTemplate;
pub use scripted::ScriptedResponder;

use crate::config::{FileConfig, FileResponderConfig};
use council_application::{ParticipantResponder, ResponderRegistry};
use std::sync::Arc;
use tracing::debug;

/// Create the adapter for one responder entry
pub fn responder_for(config: &FileResponderConfig) -> Arc<dyn ParticipantResponder> {
    match config {
        FileResponderConfig::Command {
            command,
            args,
            working_dir,
        } => Arc::new(
            CommandResponder::new(command.trim())
                .with_args(args.clone())
                .with_working_dir(working_dir.clone()),
        ),
        FileResponderConfig::Scripted { lines } => Arc::new(ScriptedResponder::new(lines.clone())),
    }
}

/// Register every configured responder, participants first
///
/// Later entries with an id already registered replace earlier ones;
/// `FileConfig::validate` reports such duplicates.
pub fn build_registry(config: &FileConfig) -> ResponderRegistry {
    let mut registry = ResponderRegistry::new();
    for entry in config.all_responders() {
        debug!(id = %entry.id, kind = entry.responder.kind(), "Registering responder");
        registry.register(entry.id.trim(), responder_for(&entry.responder));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileParticipantConfig;
    use council_application::{PromptContext, ResponderDirectory};

    fn entry(id: &str, line: &str) -> FileParticipantConfig {
        FileParticipantConfig {
            id: id.to_string(),
            expertise: Vec::new(),
            responder: FileResponderConfig::Scripted {
                lines: vec![line.to_string()],
            },
        }
    }

    #[tokio::test]
    async fn test_build_registry_resolves_all_lists() {
        let config = FileConfig {
            participants: vec![entry("a", "from a")],
            consultants: vec![entry("oracle", "from oracle")],
            reserves: vec![entry(" dba ", "from dba")],
            ..Default::default()
        };
        let registry = build_registry(&config);
        assert_eq!(registry.len(), 3);

        let dba = registry.resolve(&"dba".into()).unwrap();
        let reply = dba
            .respond(&PromptContext::Consultation {
                question: "?".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reply.statement, "from dba");
        assert!(registry.resolve(&"ORACLE".into()).is_some());
    }
}
