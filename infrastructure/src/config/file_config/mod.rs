//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types on demand.

mod engine;
mod logging;
mod output;
mod participants;

pub use engine::FileEngineConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use participants::{FileParticipantConfig, FileResponderConfig};

use super::validation::{ConfigIssue, ConfigIssueCode};
use council_domain::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Orchestrator parameters
    pub engine: FileEngineConfig,
    /// Log and event sinks
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Initial participants, in round-robin order
    pub participants: Vec<FileParticipantConfig>,
    /// Resolvable for consultation only
    pub consultants: Vec<FileParticipantConfig>,
    /// Resolvable for summon (and consultation)
    pub reserves: Vec<FileParticipantConfig>,
}

impl FileConfig {
    /// Every configured responder: participants, then consultants, then reserves
    pub fn all_responders(&self) -> impl Iterator<Item = &FileParticipantConfig> {
        self.participants
            .iter()
            .chain(&self.consultants)
            .chain(&self.reserves)
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// It checks:
    /// 1. Engine enum values and timeouts
    /// 2. Blank, reserved and duplicate ids across all responder lists
    /// 3. Command responders with nothing to run
    /// 4. An empty participant list
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Engine section
        issues.extend(self.engine.to_engine_params().1);

        // 2. Ids
        let mut seen = HashSet::new();
        for entry in self.all_responders() {
            let Some(id) = ParticipantId::try_new(entry.id.as_str()) else {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ReservedId {
                        id: entry.id.clone(),
                    },
                    format!(
                        "'{}' cannot be used as a participant id (blank or reserved)",
                        entry.id
                    ),
                ));
                continue;
            };
            if !seen.insert(id.as_str().to_lowercase()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateId {
                        id: id.to_string(),
                    },
                    format!("'{}' is configured more than once", id),
                ));
            }

            // 3. Commands
            if let FileResponderConfig::Command { command, .. } = &entry.responder
                && command.trim().is_empty()
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyCommand { id: id.to_string() },
                    format!("{}: responder command is empty", id),
                ));
            }
        }

        // 4. Participants
        if self.participants.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoParticipants,
                "no [[participants]] configured",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::Severity;

    fn scripted(id: &str) -> FileParticipantConfig {
        FileParticipantConfig {
            id: id.to_string(),
            expertise: Vec::new(),
            responder: FileResponderConfig::Scripted {
                lines: vec!["ok".to_string()],
            },
        }
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[engine]
responder_timeout_secs = 30
convergence_threshold = 6
write_contention = "reject"

[logging]
events_file = "events.jsonl"

[output]
format = "summary"
color = false

[[participants]]
id = "a"
responder = { kind = "scripted", lines = ["hello"] }

[[participants]]
id = "b"
responder = { kind = "command", command = "cat" }

[[consultants]]
id = "oracle"
responder = { kind = "scripted" }
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.responder_timeout_secs, 30);
        assert_eq!(config.engine.convergence_threshold, 6);
        assert_eq!(config.engine.scribe_timeout_secs, 60);
        assert_eq!(config.logging.events_file.as_deref(), Some("events.jsonl"));
        assert_eq!(config.output.format, Some(FileOutputFormat::Summary));
        assert!(!config.output.color);
        assert_eq!(config.participants.len(), 2);
        assert_eq!(config.consultants.len(), 1);
        assert!(config.reserves.is_empty());
        assert_eq!(config.all_responders().count(), 3);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.participants.is_empty());
        assert!(config.output.color);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let config = FileConfig {
            participants: vec![
                scripted("a"),
                scripted("Chair"),
                FileParticipantConfig {
                    id: "b".to_string(),
                    expertise: Vec::new(),
                    responder: FileResponderConfig::Command {
                        command: "  ".to_string(),
                        args: Vec::new(),
                        working_dir: None,
                    },
                },
            ],
            reserves: vec![scripted("A")],
            ..Default::default()
        };

        let issues = config.validate();
        let codes: Vec<_> = issues.iter().map(|i| i.code.clone()).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::ReservedId {
                    id: "Chair".to_string()
                },
                ConfigIssueCode::EmptyCommand { id: "b".to_string() },
                ConfigIssueCode::DuplicateId { id: "A".to_string() },
            ]
        );
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn test_validate_requires_participants() {
        let config = FileConfig {
            consultants: vec![scripted("oracle")],
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NoParticipants);
    }
}
