//! Inputs of a speaker selection

use crate::core::ids::ParticipantId;
use crate::session::stage::Stage;
use crate::signal::Signals;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot the speaker policy reasons over
///
/// Built by the session right after a statement is recorded. It is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    pub stage: Stage,
    /// Active participants in registration order
    pub participants: Vec<ParticipantId>,
    pub last_speaker: Option<ParticipantId>,
    /// Signals of the most recent statement
    pub last_signals: Signals,
    /// Floor request queue, front first
    pub floor_requests: Vec<ParticipantId>,
    pub turn_counts: BTreeMap<ParticipantId, usize>,
    /// Participants that already spoke in the current round
    pub spoken_this_round: BTreeSet<ParticipantId>,
    /// Statements since the Chair last spoke, decided or called a vote
    pub turns_since_chair: usize,
    /// Pending one-shot Chair direction
    pub chair_override: Option<ParticipantId>,
}

impl TurnContext {
    /// Context for the very first turn of a session
    pub fn opening(participants: Vec<ParticipantId>) -> Self {
        Self {
            stage: Stage::InSession,
            participants,
            last_speaker: None,
            last_signals: Signals::empty(),
            floor_requests: Vec::new(),
            turn_counts: BTreeMap::new(),
            spoken_this_round: BTreeSet::new(),
            turns_since_chair: 0,
            chair_override: None,
        }
    }

    /// Resolve a name against the active participants (case-insensitive)
    pub fn resolve(&self, name: &ParticipantId) -> Option<&ParticipantId> {
        self.participants
            .iter()
            .find(|p| *p == name)
            .or_else(|| self.participants.iter().find(|p| p.matches(name.as_str())))
    }

    pub fn turns_taken(&self, participant: &ParticipantId) -> usize {
        self.turn_counts.get(participant).copied().unwrap_or(0)
    }
}
