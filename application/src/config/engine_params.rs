//! Engine parameters: orchestrator behaviour knobs.
//!
//! [`EngineParams`] groups the static parameters the
//! [`CouncilOrchestrator`](crate::use_cases::council::CouncilOrchestrator)
//! needs: collaborator timeouts, policy thresholds and briefing limits.
//! These are application-layer concerns, not domain state.

use council_domain::{BriefingLimits, ConsensusRule, DEFAULT_CONVERGENCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a mutating call does when another write is in flight on the same session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteContention {
    /// Wait for the in-flight write to finish
    #[default]
    Queue,
    /// Fail immediately with `ConcurrentModification`
    Reject,
}

impl std::str::FromStr for WriteContention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(WriteContention::Queue),
            "reject" => Ok(WriteContention::Reject),
            other => Err(format!(
                "Unknown write contention: {}. Valid: queue, reject",
                other
            )),
        }
    }
}

impl std::fmt::Display for WriteContention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteContention::Queue => write!(f, "queue"),
            WriteContention::Reject => write!(f, "reject"),
        }
    }
}

/// Orchestrator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Bound on every participant responder call.
    pub responder_timeout: Duration,
    /// Bound on the scribe call made at adjourn.
    pub scribe_timeout: Duration,
    /// Statements without Chair involvement before the convergence prompt.
    pub convergence_threshold: usize,
    /// In-turn consultations honoured per main turn.
    pub max_consults_per_turn: usize,
    /// Transcript entries sent with a main-turn prompt.
    pub transcript_tail: usize,
    pub briefing: BriefingLimits,
    pub write_contention: WriteContention,
    /// Rule used to annotate vote tallies.
    pub consensus_rule: ConsensusRule,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            responder_timeout: Duration::from_secs(120),
            scribe_timeout: Duration::from_secs(60),
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_consults_per_turn: 2,
            transcript_tail: 20,
            briefing: BriefingLimits::default(),
            write_contention: WriteContention::Queue,
            consensus_rule: ConsensusRule::Majority,
        }
    }
}

impl EngineParams {
    // ==================== Builder Methods ====================

    pub fn with_responder_timeout(mut self, timeout: Duration) -> Self {
        self.responder_timeout = timeout;
        self
    }

    pub fn with_scribe_timeout(mut self, timeout: Duration) -> Self {
        self.scribe_timeout = timeout;
        self
    }

    pub fn with_convergence_threshold(mut self, turns: usize) -> Self {
        self.convergence_threshold = turns;
        self
    }

    pub fn with_max_consults_per_turn(mut self, max: usize) -> Self {
        self.max_consults_per_turn = max;
        self
    }

    pub fn with_transcript_tail(mut self, entries: usize) -> Self {
        self.transcript_tail = entries;
        self
    }

    pub fn with_briefing(mut self, limits: BriefingLimits) -> Self {
        self.briefing = limits;
        self
    }

    pub fn with_write_contention(mut self, contention: WriteContention) -> Self {
        self.write_contention = contention;
        self
    }

    pub fn with_consensus_rule(mut self, rule: ConsensusRule) -> Self {
        self.consensus_rule = rule;
        self
    }
}
