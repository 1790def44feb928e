//! Application layer for council
//!
//! This crate contains the orchestrator, the in-memory session store, port
//! definitions, and engine configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod store;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineParams, WriteContention};
pub use ports::{
    composite_notifier::CompositeNotifier,
    notifier::{NoNotifier, Notifier, SessionEvent, SessionEventKind},
    participant_responder::{
        ConsultationAnswer, ParticipantResponder, PromptContext, ResponderDirectory,
        ResponderError, ResponderRegistry, ResponderReply,
    },
    scribe::{NoScribe, Scribe, ScribeError, ScribeRecord},
};
pub use store::{SessionHandle, SessionStore};
pub use use_cases::council::{
    AdjournOutcome, ConsultOutcome, ConveneRequest, CouncilError, CouncilOrchestrator,
    DecideRequest, PollReport, SummonRequest, VoteSubmission,
};
