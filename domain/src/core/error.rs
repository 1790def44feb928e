//! Domain error types

use crate::session::stage::Stage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of every failure the engine can report.
///
/// Shared by [`DomainError`] and the application-level error so callers can
/// branch on the kind without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidSession,
    SessionNotActive,
    VoteInProgress,
    SessionClosed,
    AlreadyVoted,
    UnresolvedReference,
    CollaboratorTimeout,
    CollaboratorFailed,
    ConcurrentModification,
    InvalidTransition,
    UnknownParticipant,
    DuplicateParticipant,
    UnknownVote,
    NotPolled,
    InvalidOption,
    VoteIncomplete,
    SessionNotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidSession => "invalid_session",
            ErrorKind::SessionNotActive => "session_not_active",
            ErrorKind::VoteInProgress => "vote_in_progress",
            ErrorKind::SessionClosed => "session_closed",
            ErrorKind::AlreadyVoted => "already_voted",
            ErrorKind::UnresolvedReference => "unresolved_reference",
            ErrorKind::CollaboratorTimeout => "collaborator_timeout",
            ErrorKind::CollaboratorFailed => "collaborator_failed",
            ErrorKind::ConcurrentModification => "concurrent_modification",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::UnknownParticipant => "unknown_participant",
            ErrorKind::DuplicateParticipant => "duplicate_participant",
            ErrorKind::UnknownVote => "unknown_vote",
            ErrorKind::NotPolled => "not_polled",
            ErrorKind::InvalidOption => "invalid_option",
            ErrorKind::VoteIncomplete => "vote_incomplete",
            ErrorKind::SessionNotFound => "session_not_found",
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    ///
    /// Only collaborator-boundary failures and lock contention qualify;
    /// state machine violations will fail again until the caller acts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::CollaboratorTimeout
                | ErrorKind::CollaboratorFailed
                | ErrorKind::ConcurrentModification
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State machine violations raised by [`Session`](crate::session::Session).
///
/// Every variant carries the stage the session was in when the operation was
/// rejected. A rejected operation never changes the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid session: {reason}")]
    InvalidSession { reason: String },

    #[error("Session is not in session (stage: {stage})")]
    SessionNotActive { stage: Stage },

    #[error("A vote is in progress (stage: {stage})")]
    VoteInProgress { stage: Stage },

    #[error("Session is adjourned")]
    SessionClosed,

    #[error("Participant {participant} has already voted")]
    AlreadyVoted { participant: String, stage: Stage },

    #[error("Cannot {operation} while session is {stage}")]
    InvalidTransition {
        operation: &'static str,
        stage: Stage,
    },

    #[error("Unknown participant: {participant}")]
    UnknownParticipant { participant: String, stage: Stage },

    #[error("Participant already present: {participant}")]
    DuplicateParticipant { participant: String, stage: Stage },

    #[error("Unknown or closed vote: {vote}")]
    UnknownVote { vote: String, stage: Stage },

    #[error("Participant {participant} was not polled in this vote")]
    NotPolled { participant: String, stage: Stage },

    #[error("Invalid vote option '{option}'")]
    InvalidOption { option: String, stage: Stage },

    #[error("Vote {vote} still awaits {pending} response(s)")]
    VoteIncomplete {
        vote: String,
        pending: usize,
        stage: Stage,
    },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidSession { .. } => ErrorKind::InvalidSession,
            DomainError::SessionNotActive { .. } => ErrorKind::SessionNotActive,
            DomainError::VoteInProgress { .. } => ErrorKind::VoteInProgress,
            DomainError::SessionClosed => ErrorKind::SessionClosed,
            DomainError::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            DomainError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            DomainError::UnknownParticipant { .. } => ErrorKind::UnknownParticipant,
            DomainError::DuplicateParticipant { .. } => ErrorKind::DuplicateParticipant,
            DomainError::UnknownVote { .. } => ErrorKind::UnknownVote,
            DomainError::NotPolled { .. } => ErrorKind::NotPolled,
            DomainError::InvalidOption { .. } => ErrorKind::InvalidOption,
            DomainError::VoteIncomplete { .. } => ErrorKind::VoteIncomplete,
        }
    }

    /// Stage of the session at the time of the failure.
    ///
    /// `InvalidSession` is raised before a session exists and reports
    /// [`Stage::Convened`], the stage it would have been created in.
    pub fn stage(&self) -> Stage {
        match self {
            DomainError::InvalidSession { .. } => Stage::Convened,
            DomainError::SessionClosed => Stage::Adjourned,
            DomainError::SessionNotActive { stage }
            | DomainError::VoteInProgress { stage }
            | DomainError::AlreadyVoted { stage, .. }
            | DomainError::InvalidTransition { stage, .. }
            | DomainError::UnknownParticipant { stage, .. }
            | DomainError::DuplicateParticipant { stage, .. }
            | DomainError::UnknownVote { stage, .. }
            | DomainError::NotPolled { stage, .. }
            | DomainError::InvalidOption { stage, .. }
            | DomainError::VoteIncomplete { stage, .. } => *stage,
        }
    }

    pub(crate) fn invalid_session(reason: impl Into<String>) -> Self {
        DomainError::InvalidSession {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_closed_display() {
        assert_eq!(DomainError::SessionClosed.to_string(), "Session is adjourned");
        assert_eq!(DomainError::SessionClosed.stage(), Stage::Adjourned);
    }

    #[test]
    fn test_kind_and_stage_are_reported() {
        let err = DomainError::VoteInProgress {
            stage: Stage::Voting,
        };
        assert_eq!(err.kind(), ErrorKind::VoteInProgress);
        assert_eq!(err.stage(), Stage::Voting);
        assert!(err.to_string().contains("voting"));
    }

    #[test]
    fn test_only_collaborator_kinds_are_retryable() {
        assert!(ErrorKind::CollaboratorTimeout.is_retryable());
        assert!(ErrorKind::ConcurrentModification.is_retryable());
        assert!(!ErrorKind::AlreadyVoted.is_retryable());
        assert!(!ErrorKind::SessionClosed.is_retryable());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::CollaboratorTimeout).unwrap();
        assert_eq!(json, "\"collaborator_timeout\"");
    }
}
