//! Speaker selection
//!
//! Decides who speaks next from a [`TurnContext`] snapshot. The decision is
//! a pure function of its inputs: the same context always yields the same
//! [`SpeakerDecision`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ 1. Chair override (one-shot)                 │
//! │ 2. Direct question to an active participant  │
//! │ 3. Floor request queue (strict FIFO)         │
//! │ 4. Convergence prompt to the Chair (advisory)│
//! │ 5. Round robin                               │
//! └──────────────────────────────────────────────┘
//!          first match wins
//! ```

pub mod context;
pub mod speaker_selection;

pub use context::TurnContext;
pub use speaker_selection::{
    DefaultSpeakerPolicy, SelectionRule, SpeakerDecision, SpeakerPolicy, Warning,
};
