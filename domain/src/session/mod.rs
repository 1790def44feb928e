//! Council sessions
//!
//! - [`entities::Session`]: the state machine every operation goes through
//! - [`transcript`]: the append-only record of everything said and done
//! - [`participant`]: the ordered participant registry
//! - [`decision`]: Chair decisions
//! - [`summary`]: read-only views (status, summary, snapshot, briefing)

pub mod decision;
pub mod entities;
pub mod participant;
pub mod stage;
pub mod summary;
pub mod transcript;
pub mod turn;

pub use entities::Session;

#[cfg(test)]
mod proptests;
