//! Types for the council orchestrator.

use crate::ports::scribe::ScribeRecord;
use council_domain::{
    Confidence, DomainError, ErrorKind, ParticipantId, ParticipantSpec, SessionId,
    SessionSummary, Stage, VoteId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running a council session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouncilError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{collaborator} did not answer within {timeout:?} (stage: {stage})")]
    CollaboratorTimeout {
        collaborator: String,
        timeout: Duration,
        stage: Stage,
    },

    #[error("{collaborator} failed: {message} (stage: {stage})")]
    CollaboratorFailed {
        collaborator: String,
        message: String,
        stage: Stage,
    },

    #[error("Session {session} is being modified by another operation (stage: {stage})")]
    ConcurrentModification { session: SessionId, stage: Stage },

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
}

impl CouncilError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CouncilError::Domain(e) => e.kind(),
            CouncilError::CollaboratorTimeout { .. } => ErrorKind::CollaboratorTimeout,
            CouncilError::CollaboratorFailed { .. } => ErrorKind::CollaboratorFailed,
            CouncilError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            CouncilError::SessionNotFound(_) => ErrorKind::SessionNotFound,
        }
    }

    /// Stage of the session when the failure was reported; `None` when the
    /// session does not exist.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            CouncilError::Domain(e) => Some(e.stage()),
            CouncilError::CollaboratorTimeout { stage, .. }
            | CouncilError::CollaboratorFailed { stage, .. }
            | CouncilError::ConcurrentModification { stage, .. } => Some(*stage),
            CouncilError::SessionNotFound(_) => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Input for `convene`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConveneRequest {
    /// Caller-chosen session id; a fresh UUID when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SessionId>,
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub agenda: Vec<String>,
    pub participants: Vec<ParticipantSpec>,
}

impl ConveneRequest {
    pub fn new(
        title: impl Into<String>,
        topic: impl Into<String>,
        participants: Vec<ParticipantSpec>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            topic: topic.into(),
            agenda: Vec::new(),
            participants,
        }
    }

    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_agenda(mut self, agenda: Vec<String>) -> Self {
        self.agenda = agenda;
        self
    }
}

/// Input for `summon`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonRequest {
    pub participant: ParticipantSpec,
    pub reason: String,
    pub question: String,
}

impl SummonRequest {
    pub fn new(
        participant: impl Into<ParticipantId>,
        reason: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            participant: ParticipantSpec::new(participant),
            reason: reason.into(),
            question: question.into(),
        }
    }

    pub fn with_expertise(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.participant = self.participant.with_expertise(tags);
        self
    }
}

/// Input for `submit_vote`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub vote: VoteId,
    pub participant: ParticipantId,
    pub position: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub confidence: Confidence,
}

/// Input for `decide`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecideRequest {
    pub text: String,
    pub rationale: Option<String>,
    #[serde(default)]
    pub action_items: Vec<serde_json::Value>,
    /// Closed vote the decision follows; defaults to the latest unreferenced one
    pub vote: Option<VoteId>,
}

impl DecideRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn with_action_items(mut self, items: Vec<serde_json::Value>) -> Self {
        self.action_items = items;
        self
    }

    pub fn for_vote(mut self, vote: VoteId) -> Self {
        self.vote = Some(vote);
        self
    }
}

/// Result of `consult`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultOutcome {
    pub seq: usize,
    pub answer: String,
}

/// Result of `poll_vote`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollReport {
    /// Participants whose answer was recorded, in completion order
    pub submitted: Vec<ParticipantId>,
    pub timed_out: Vec<ParticipantId>,
    /// Participants with no responder or a failed call, with the reason
    pub failed: Vec<(ParticipantId, String)>,
}

impl PollReport {
    /// Whether anybody polled is left without an answer
    pub fn is_incomplete(&self) -> bool {
        !self.timed_out.is_empty() || !self.failed.is_empty()
    }
}

/// Result of `adjourn`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjournOutcome {
    pub summary: SessionSummary,
    pub record: ScribeRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_and_stage() {
        let err = CouncilError::from(DomainError::SessionClosed);
        assert_eq!(err.kind(), ErrorKind::SessionClosed);
        assert_eq!(err.stage(), Some(Stage::Adjourned));
        assert!(!err.is_retryable());

        let err = CouncilError::CollaboratorTimeout {
            collaborator: "alice".to_string(),
            timeout: Duration::from_secs(1),
            stage: Stage::InSession,
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("in_session"));

        let err = CouncilError::SessionNotFound(SessionId::new("x"));
        assert_eq!(err.stage(), None);
    }
}
