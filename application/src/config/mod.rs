//! Application-level configuration.
//!
//! - [`EngineParams`]: collaborator timeouts, policy thresholds, briefing limits
//! - [`WriteContention`]: behaviour of concurrent writes on one session

pub mod engine_params;

pub use engine_params::{EngineParams, WriteContention};
