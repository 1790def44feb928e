//! Participant configuration from TOML
//! (`[[participants]]`, `[[consultants]]`, `[[reserves]]`)
//!
//! All three lists share one shape. Only `participants` join a session at
//! convene time; consultants and reserves are resolvable for consult and
//! summon.
//!
//! ```toml
//! [[participants]]
//! id = "architect"
//! expertise = ["storage", "latency"]
//! responder = { kind = "command", command = "llm", args = ["-s", "You are an architect"] }
//!
//! [[reserves]]
//! id = "dba"
//! responder = { kind = "scripted", lines = ["Backups first. [REQUEST FLOOR]"] }
//! ```

use council_domain::ParticipantSpec;
use serde::{Deserialize, Serialize};

/// How a configured id is answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileResponderConfig {
    /// Run an external program; the prompt goes to stdin, the reply comes from stdout
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_dir: Option<String>,
    },
    /// Replay fixed lines in order, then repeat the last one
    Scripted {
        #[serde(default)]
        lines: Vec<String>,
    },
}

impl FileResponderConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            FileResponderConfig::Command { .. } => "command",
            FileResponderConfig::Scripted { .. } => "scripted",
        }
    }
}

/// One configured participant, consultant or reserve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileParticipantConfig {
    pub id: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub responder: FileResponderConfig,
}

impl FileParticipantConfig {
    pub fn to_spec(&self) -> ParticipantSpec {
        ParticipantSpec::new(self.id.trim()).with_expertise(self.expertise.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_responders() {
        let toml_str = r#"
[[participants]]
id = "architect"
expertise = ["storage"]
responder = { kind = "command", command = "llm", args = ["-m", "small"] }

[[reserves]]
id = "dba"
responder = { kind = "scripted", lines = ["Backups first."] }
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.participants.len(), 1);
        assert_eq!(
            config.participants[0].responder,
            FileResponderConfig::Command {
                command: "llm".to_string(),
                args: vec!["-m".to_string(), "small".to_string()],
                working_dir: None,
            }
        );
        assert_eq!(config.reserves[0].responder.kind(), "scripted");

        let spec = config.participants[0].to_spec();
        assert_eq!(spec.id.as_str(), "architect");
        assert_eq!(spec.expertise, vec!["storage".to_string()]);
    }
}
