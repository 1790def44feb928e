//! Vote records and responses

use super::rule::ConsensusRule;
use super::tally::VoteTally;
use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// Per-session vote identifier: `V-NNN`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteId(String);

impl VoteId {
    pub fn new(sequence: usize) -> Self {
        Self(format!("V-{:03}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VoteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s
            .trim()
            .trim_start_matches(['V', 'v'])
            .trim_start_matches('-')
            .parse()
            .map_err(|_| format!("Invalid vote id: {}", s))?;
        Ok(VoteId::new(n))
    }
}

/// How sure a participant is of its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Confidence::High),
            "medium" | "med" | "m" => Ok(Confidence::Medium),
            "low" | "l" => Ok(Confidence::Low),
            other => Err(format!(
                "Unknown confidence: {}. Valid: high, medium, low",
                other
            )),
        }
    }
}

/// A participant's position: one of the allowed options or the implicit abstention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Option(String),
    Abstain,
}

impl Position {
    pub fn option(&self) -> Option<&str> {
        match self {
            Position::Option(o) => Some(o),
            Position::Abstain => None,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Option(o) => f.write_str(o),
            Position::Abstain => f.write_str("Abstain"),
        }
    }
}

/// One participant's answer to a vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub participant: ParticipantId,
    pub position: Position,
    pub rationale: String,
    pub confidence: Confidence,
}

/// An advisory poll over a closed set of participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub question: String,
    pub options: Vec<String>,
    /// Participants present when the vote was called; nobody else may answer
    pub polled: Vec<ParticipantId>,
    /// Responses in submission order
    pub responses: Vec<VoteResponse>,
    /// Transcript position of the `VoteCall` entry
    pub called_at: usize,
}

impl Vote {
    pub fn new(
        id: VoteId,
        question: impl Into<String>,
        options: Vec<String>,
        polled: Vec<ParticipantId>,
        called_at: usize,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            options,
            polled,
            responses: Vec::new(),
            called_at,
        }
    }

    /// Map raw text onto an allowed position (case-insensitive)
    pub fn resolve_position(&self, raw: &str) -> Option<Position> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("abstain") {
            return Some(Position::Abstain);
        }
        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(raw))
            .map(|o| Position::Option(o.clone()))
    }

    pub fn is_polled(&self, participant: &ParticipantId) -> bool {
        self.polled.contains(participant)
    }

    pub fn has_responded(&self, participant: &ParticipantId) -> bool {
        self.responses.iter().any(|r| &r.participant == participant)
    }

    /// Polled participants that have not answered yet, in polling order
    pub fn pending(&self) -> Vec<ParticipantId> {
        self.polled
            .iter()
            .filter(|p| !self.has_responded(p))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.polled.iter().all(|p| self.has_responded(p))
    }

    pub fn tally(&self, forced: bool, rule: &ConsensusRule) -> VoteTally {
        VoteTally::from_vote(self, forced, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote() -> Vote {
        Vote::new(
            VoteId::new(1),
            "Use X or Y?",
            vec!["X".to_string(), "Y".to_string()],
            vec!["a".into(), "b".into()],
            3,
        )
    }

    #[test]
    fn test_vote_id_roundtrip() {
        let id: VoteId = "V-007".parse().unwrap();
        assert_eq!(id, VoteId::new(7));
        assert_eq!("v7".parse::<VoteId>().unwrap(), VoteId::new(7));
        assert!("nope".parse::<VoteId>().is_err());
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!("HIGH".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!(" low ".parse::<Confidence>().unwrap(), Confidence::Low);
        assert!("certain".parse::<Confidence>().is_err());
        assert_eq!(Confidence::default(), Confidence::Medium);
    }

    #[test]
    fn test_resolve_position() {
        let vote = vote();
        assert_eq!(vote.resolve_position("x"), Some(Position::Option("X".into())));
        assert_eq!(vote.resolve_position("ABSTAIN"), Some(Position::Abstain));
        assert_eq!(vote.resolve_position("Z"), None);
    }

    #[test]
    fn test_pending_tracks_responses() {
        let mut vote = vote();
        assert_eq!(vote.pending().len(), 2);
        vote.responses.push(VoteResponse {
            participant: "b".into(),
            position: Position::Abstain,
            rationale: String::new(),
            confidence: Confidence::Low,
        });
        assert_eq!(vote.pending(), vec![ParticipantId::from("a")]);
        assert!(!vote.is_complete());
        assert!(vote.has_responded(&"b".into()));
        assert!(!vote.is_polled(&"c".into()));
    }
}
