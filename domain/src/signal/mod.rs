//! Control signals embedded in participant statements
//!
//! Participants steer the discussion with a small bracketed vocabulary
//! (`[YIELD]`, `[QUESTION: ops]`, `[CONSULT: legal | ...]`, ...). The
//! [`parser`] turns those markers into the closed [`Signal`] enum; nothing
//! past this module ever matches on raw marker text.

pub mod parser;

pub use parser::parse_signals;

use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// A single control directive extracted from a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Signal {
    /// The speaker is done and hands the floor back
    Yield,
    /// The speaker wants to be recognised again later
    RequestFloor,
    /// The speaker asks a specific participant to answer next
    DirectQuestion { target: ParticipantId },
    /// The speaker wants a private, context-free answer from another responder
    ConsultRequest {
        target: ParticipantId,
        question: String,
    },
    Concern { note: Option<String> },
    Support { note: Option<String> },
    /// The speaker cannot proceed without more information
    InfoNeeded { detail: Option<String> },
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Yield => "yield",
            Signal::RequestFloor => "request_floor",
            Signal::DirectQuestion { .. } => "direct_question",
            Signal::ConsultRequest { .. } => "consult_request",
            Signal::Concern { .. } => "concern",
            Signal::Support { .. } => "support",
            Signal::InfoNeeded { .. } => "info_needed",
        }
    }

    /// Signals worth surfacing in a briefing digest
    pub fn is_highlight(&self) -> bool {
        matches!(
            self,
            Signal::Concern { .. } | Signal::Support { .. } | Signal::InfoNeeded { .. }
        )
    }
}

/// Ordered set of signals attached to one transcript entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signals(Vec<Signal>);

impl Signals {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self(signals)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.0.iter()
    }

    /// First direct-question target, if any
    pub fn direct_question(&self) -> Option<&ParticipantId> {
        self.0.iter().find_map(|s| match s {
            Signal::DirectQuestion { target } => Some(target),
            _ => None,
        })
    }

    pub fn requests_floor(&self) -> bool {
        self.0.contains(&Signal::RequestFloor)
    }

    pub fn yields(&self) -> bool {
        self.0.contains(&Signal::Yield)
    }

    /// All consult requests, in order of appearance
    pub fn consult_requests(&self) -> impl Iterator<Item = (&ParticipantId, &str)> {
        self.0.iter().filter_map(|s| match s {
            Signal::ConsultRequest { target, question } => Some((target, question.as_str())),
            _ => None,
        })
    }

    pub fn has_highlight(&self) -> bool {
        self.0.iter().any(Signal::is_highlight)
    }

    /// Append signals not already present, keeping first-seen order
    pub fn merge(mut self, other: Signals) -> Self {
        for signal in other.0 {
            if !self.0.contains(&signal) {
                self.0.push(signal);
            }
        }
        self
    }

    /// Drop every consult request (they are resolved inside the turn)
    pub fn without_consults(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|s| !matches!(s, Signal::ConsultRequest { .. }))
                .collect(),
        )
    }
}

impl From<Vec<Signal>> for Signals {
    fn from(signals: Vec<Signal>) -> Self {
        Signals::new(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_deduplicates_and_keeps_order() {
        let explicit = Signals::new(vec![Signal::Yield]);
        let parsed = Signals::new(vec![Signal::RequestFloor, Signal::Yield]);
        let merged = explicit.merge(parsed);
        let labels: Vec<_> = merged.iter().map(Signal::label).collect();
        assert_eq!(labels, vec!["yield", "request_floor"]);
    }

    #[test]
    fn test_direct_question_returns_first() {
        let signals = Signals::new(vec![
            Signal::Concern { note: None },
            Signal::DirectQuestion {
                target: "ops".into(),
            },
            Signal::DirectQuestion {
                target: "legal".into(),
            },
        ]);
        assert_eq!(signals.direct_question().map(|t| t.as_str()), Some("ops"));
    }

    #[test]
    fn test_without_consults() {
        let signals = Signals::new(vec![
            Signal::ConsultRequest {
                target: "legal".into(),
                question: "Is it allowed?".to_string(),
            },
            Signal::Yield,
        ]);
        let stripped = signals.without_consults();
        assert_eq!(stripped.len(), 1);
        assert!(stripped.yields());
    }
}
