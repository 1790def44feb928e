//! Participant registry

use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// How a participant entered the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Listed when the session was convened
    Initial,
    /// Added mid-session through a summon
    Summoned,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Initial => write!(f, "initial"),
            Origin::Summoned => write!(f, "summoned"),
        }
    }
}

/// Declaration of a participant at convene time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSpec {
    pub id: ParticipantId,
    #[serde(default)]
    pub expertise: Vec<String>,
}

impl ParticipantSpec {
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            expertise: Vec::new(),
        }
    }

    pub fn with_expertise(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.expertise = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A member of the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub expertise: Vec<String>,
    pub origin: Origin,
    /// Transcript length when the participant joined
    pub joined_at: usize,
}

/// Participants of one session in registration order
///
/// Registration order is the round-robin order used by the speaker policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRegistry {
    members: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant; returns `false` if the id, compared
    /// case-insensitively, is already present
    pub fn insert(&mut self, participant: Participant) -> bool {
        if self.resolve(&participant.id).is_some() {
            return false;
        }
        self.members.push(participant);
        true
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.iter().any(|p| &p.id == id)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.members.iter().find(|p| &p.id == id)
    }

    /// Resolve a name taken from free text (case-insensitive)
    pub fn resolve(&self, name: &ParticipantId) -> Option<&ParticipantId> {
        self.members
            .iter()
            .find(|p| p.id == *name)
            .or_else(|| self.members.iter().find(|p| p.id.matches(name.as_str())))
            .map(|p| &p.id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.iter().map(|p| &p.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.members.iter()
    }

    pub fn first(&self) -> Option<&ParticipantId> {
        self.members.first().map(|p| &p.id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn summoned(&self) -> impl Iterator<Item = &Participant> {
        self.members.iter().filter(|p| p.origin == Origin::Summoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, origin: Origin) -> Participant {
        Participant {
            id: id.into(),
            expertise: vec![],
            origin,
            joined_at: 0,
        }
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut registry = ParticipantRegistry::new();
        assert!(registry.insert(member("a", Origin::Initial)));
        assert!(!registry.insert(member("a", Origin::Summoned)));
        assert!(!registry.insert(member("A", Origin::Summoned)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&"a".into()).unwrap().origin, Origin::Initial);
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = ParticipantRegistry::new();
        registry.insert(member("b", Origin::Initial));
        registry.insert(member("a", Origin::Initial));
        registry.insert(member("c", Origin::Summoned));
        let ids: Vec<_> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(registry.first().unwrap().as_str(), "b");
        assert_eq!(registry.summoned().count(), 1);
    }

    #[test]
    fn test_resolve_prefers_exact_then_case_insensitive() {
        let mut registry = ParticipantRegistry::new();
        registry.insert(member("Ops", Origin::Initial));
        assert_eq!(registry.resolve(&"ops".into()).unwrap().as_str(), "Ops");
        assert!(registry.resolve(&"legal".into()).is_none());
    }

    #[test]
    fn test_spec_builder() {
        let spec = ParticipantSpec::new("security").with_expertise(["auth", "crypto"]);
        assert_eq!(spec.expertise, vec!["auth", "crypto"]);
    }
}
