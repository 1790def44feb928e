//! Identifiers for sessions, participants and speakers

use serde::{Deserialize, Serialize};

/// Names that belong to the engine itself and can never be used by a participant.
pub const RESERVED_NAMES: [&str; 2] = ["Chair", "Facilitator"];

/// Opaque identifier of a participant (Value Object)
///
/// The engine knows nothing about the responder behind an id; it only
/// compares ids. Lookups from free text (signals, Chair directions) go
/// through [`ParticipantId::matches`], which ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create an id, rejecting blank and reserved names
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let id = Self(id.into().trim().to_string());
        if id.0.is_empty() || id.is_reserved() {
            None
        } else {
            Some(id)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id collides with `Chair` or `Facilitator`
    pub fn is_reserved(&self) -> bool {
        RESERVED_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(self.0.trim()))
    }

    /// Case-insensitive comparison against a name taken from free text
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name.trim())
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        ParticipantId::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        ParticipantId::new(s)
    }
}

/// Author of a transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "id")]
pub enum Speaker {
    /// The single privileged actor
    Chair,
    /// The engine's own procedural voice
    Facilitator,
    Participant(ParticipantId),
}

impl Speaker {
    pub fn participant(&self) -> Option<&ParticipantId> {
        match self {
            Speaker::Participant(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_chair(&self) -> bool {
        matches!(self, Speaker::Chair)
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Chair => f.write_str("Chair"),
            Speaker::Facilitator => f.write_str("Facilitator"),
            Speaker::Participant(id) => write!(f, "{}", id),
        }
    }
}

impl From<ParticipantId> for Speaker {
    fn from(id: ParticipantId) -> Self {
        Speaker::Participant(id)
    }
}

/// Opaque unique identifier of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err("Session id cannot be empty".to_string())
        } else {
            Ok(SessionId::new(trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_are_rejected() {
        assert!(ParticipantId::try_new("Chair").is_none());
        assert!(ParticipantId::try_new("facilitator").is_none());
        assert!(ParticipantId::try_new("   ").is_none());
        assert!(ParticipantId::try_new("architect").is_some());
    }

    #[test]
    fn test_try_new_trims() {
        let id = ParticipantId::try_new("  security ").unwrap();
        assert_eq!(id.as_str(), "security");
    }

    #[test]
    fn test_matches_ignores_case() {
        let id = ParticipantId::new("Architect");
        assert!(id.matches("architect"));
        assert!(id.matches(" ARCHITECT "));
        assert!(!id.matches("architects"));
    }

    #[test]
    fn test_speaker_display() {
        assert_eq!(Speaker::Chair.to_string(), "Chair");
        assert_eq!(Speaker::Facilitator.to_string(), "Facilitator");
        assert_eq!(Speaker::Participant("ops".into()).to_string(), "ops");
    }

    #[test]
    fn test_speaker_serialization() {
        let json = serde_json::to_string(&Speaker::Participant("ops".into())).unwrap();
        assert_eq!(json, r#"{"role":"participant","id":"ops"}"#);
        let json = serde_json::to_string(&Speaker::Chair).unwrap();
        assert_eq!(json, r#"{"role":"chair"}"#);
    }
}
