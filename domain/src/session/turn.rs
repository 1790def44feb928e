//! Inputs and outputs of a main turn

use crate::core::ids::ParticipantId;
use crate::policy::{SelectionRule, Warning};
use crate::signal::Signals;
use serde::{Deserialize, Serialize};

/// What the current speaker said, plus anything staged during the turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResponse {
    pub statement: String,
    /// Signals reported out of band by the responder; merged ahead of the
    /// ones parsed from the statement
    pub signals: Signals,
    /// Consultations answered inside the turn, committed ahead of the
    /// statement and attributed to the speaker
    pub consultations: Vec<StagedConsultation>,
}

/// A consultation the speaker made while preparing the statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedConsultation {
    pub target: ParticipantId,
    pub question: String,
    pub answer: String,
}

impl TurnResponse {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            signals: Signals::empty(),
            consultations: Vec::new(),
        }
    }

    pub fn with_signals(mut self, signals: Signals) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_consultation(
        mut self,
        target: ParticipantId,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        self.consultations.push(StagedConsultation {
            target,
            question: question.into(),
            answer: answer.into(),
        });
        self
    }
}

/// Result of opening a turn: who has the floor and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDirective {
    pub next_speaker: ParticipantId,
    pub rule: SelectionRule,
    pub announcement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chair_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    /// Sequence number of the statement that closed the previous turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_seq: Option<usize>,
    /// Sequence number of the Facilitator announcement
    pub announced_at: usize,
}

/// Result of a Chair interjection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairOutcome {
    pub seq: usize,
    /// Participant that will speak next by Chair direction
    pub directed_to: Option<ParticipantId>,
    pub warnings: Vec<Warning>,
}
