//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: participant, speaker and session identifiers
//! - [`error::DomainError`]: state machine violations

pub mod error;
pub mod ids;
