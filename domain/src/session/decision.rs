//! Chair decisions

use crate::core::ids::Speaker;
use crate::vote::VoteId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Human-legible decision identifier: `D-YYYYMMDD-NNN`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(String);

impl DecisionId {
    /// Build the id for the `sequence`-th decision (1-based) taken on `date`
    pub fn new(date: NaiveDate, sequence: usize) -> Self {
        Self(format!("D-{}-{:03}", date.format("%Y%m%d"), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decision recorded by the Chair
///
/// Action items are opaque structured data kept for external consumers;
/// the engine never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub text: String,
    pub rationale: Option<String>,
    #[serde(default)]
    pub action_items: Vec<serde_json::Value>,
    /// Completed vote this decision follows, if any
    pub vote: Option<VoteId>,
    /// Always [`Speaker::Chair`]
    pub decided_by: Speaker,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    pub fn summary_line(&self) -> String {
        match &self.vote {
            Some(vote) => format!("{} {} (after {})", self.id, self.text, vote),
            None => format!("{} {}", self.id, self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_id_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(DecisionId::new(date, 1).as_str(), "D-20260307-001");
        assert_eq!(DecisionId::new(date, 42).to_string(), "D-20260307-042");
    }

    #[test]
    fn test_decision_ids_order_by_sequence() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert!(DecisionId::new(date, 2) > DecisionId::new(date, 1));
    }

    #[test]
    fn test_summary_line_mentions_vote() {
        let decision = Decision {
            id: DecisionId::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 1),
            text: "Use X".to_string(),
            rationale: None,
            action_items: vec![],
            vote: Some(VoteId::new(1)),
            decided_by: Speaker::Chair,
            timestamp: Utc::now(),
        };
        assert_eq!(decision.summary_line(), "D-20260101-001 Use X (after V-001)");
    }
}
