//! Domain layer for council
//!
//! This crate contains the session state machine, the speaker-selection
//! policy, the signal parser and the vote records. It performs no I/O and
//! knows nothing about the responders behind participant ids.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A [`Session`] moves through `Convened → InSession ⇄ Voting → Adjourned`.
//! At any instant exactly one of these holds: a participant has the floor,
//! a vote is open, or the session is not running.
//!
//! ## Transcript
//!
//! Everything said or done is appended to the [`Transcript`], which never
//! changes an entry once written.
//!
//! ## Speaker selection
//!
//! After every statement a [`SpeakerPolicy`] picks the next speaker from the
//! Chair's override, direct questions, the floor queue and round robin.

pub mod core;
pub mod policy;
pub mod session;
pub mod signal;
pub mod util;
pub mod vote;

// Re-export commonly used types
pub use core::{
    error::{DomainError, ErrorKind},
    ids::{ParticipantId, RESERVED_NAMES, SessionId, Speaker},
};
pub use policy::{
    DefaultSpeakerPolicy, SelectionRule, SpeakerDecision, SpeakerPolicy, TurnContext, Warning,
    speaker_selection::DEFAULT_CONVERGENCE_THRESHOLD,
};
pub use session::{
    Session,
    decision::{Decision, DecisionId},
    participant::{Origin, Participant, ParticipantRegistry, ParticipantSpec},
    stage::Stage,
    summary::{
        ActiveMode, Briefing, BriefingLimits, SessionDigest, SessionSnapshot, SessionStatus,
        SessionSummary, VoteProgress,
    },
    transcript::{EntryDetail, EntryDraft, EntryKind, Transcript, TranscriptEntry},
    turn::{ChairOutcome, StagedConsultation, TurnDirective, TurnResponse},
};
pub use signal::{Signal, Signals, parse_signals};
pub use vote::{
    AdvisoryOutcome, Confidence, ConsensusRule, Position, TallyGroup, Vote, VoteId, VoteReply,
    VoteResponse, VoteTally, parse_vote_reply,
};
