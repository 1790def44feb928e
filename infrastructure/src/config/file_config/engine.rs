//! Engine configuration from TOML (`[engine]` section)

use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use council_application::{EngineParams, WriteContention};
use council_domain::{BriefingLimits, ConsensusRule, DEFAULT_CONVERGENCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Bound on each participant call, in seconds
    pub responder_timeout_secs: u64,
    /// Bound on the scribe call at adjourn, in seconds
    pub scribe_timeout_secs: u64,
    pub convergence_threshold: usize,
    pub max_consults_per_turn: usize,
    pub transcript_tail: usize,
    pub briefing_max_decisions: usize,
    pub briefing_max_highlights: usize,
    pub briefing_excerpt_chars: usize,
    /// "queue" or "reject"
    pub write_contention: String,
    /// "majority", "unanimous", "atleast:N" or "N%"
    pub consensus_rule: String,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            responder_timeout_secs: params.responder_timeout.as_secs(),
            scribe_timeout_secs: params.scribe_timeout.as_secs(),
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_consults_per_turn: params.max_consults_per_turn,
            transcript_tail: params.transcript_tail,
            briefing_max_decisions: params.briefing.max_decisions,
            briefing_max_highlights: params.briefing.max_highlights,
            briefing_excerpt_chars: params.briefing.max_excerpt_chars,
            write_contention: "queue".to_string(),
            consensus_rule: "majority".to_string(),
        }
    }
}

impl FileEngineConfig {
    pub fn parse_write_contention(&self) -> (WriteContention, Vec<ConfigIssue>) {
        match self.write_contention.parse() {
            Ok(contention) => (contention, Vec::new()),
            Err(_) => (
                WriteContention::default(),
                vec![invalid_enum(
                    "engine.write_contention",
                    &self.write_contention,
                    &["queue", "reject"],
                )],
            ),
        }
    }

    pub fn parse_consensus_rule(&self) -> (ConsensusRule, Vec<ConfigIssue>) {
        match self.consensus_rule.parse() {
            Ok(rule) => (rule, Vec::new()),
            Err(_) => (
                ConsensusRule::default(),
                vec![invalid_enum(
                    "engine.consensus_rule",
                    &self.consensus_rule,
                    &["majority", "unanimous", "atleast:N", "N%"],
                )],
            ),
        }
    }

    /// Convert to orchestrator parameters, falling back to defaults for
    /// unparseable values.
    pub fn to_engine_params(&self) -> (EngineParams, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let defaults = EngineParams::default();

        let (contention, mut contention_issues) = self.parse_write_contention();
        issues.append(&mut contention_issues);
        let (rule, mut rule_issues) = self.parse_consensus_rule();
        issues.append(&mut rule_issues);

        let responder_timeout = match self.responder_timeout_secs {
            0 => {
                issues.push(zero_value("engine.responder_timeout_secs"));
                defaults.responder_timeout
            }
            secs => Duration::from_secs(secs),
        };
        let scribe_timeout = match self.scribe_timeout_secs {
            0 => {
                issues.push(zero_value("engine.scribe_timeout_secs"));
                defaults.scribe_timeout
            }
            secs => Duration::from_secs(secs),
        };

        let params = EngineParams::default()
            .with_responder_timeout(responder_timeout)
            .with_scribe_timeout(scribe_timeout)
            .with_convergence_threshold(self.convergence_threshold)
            .with_max_consults_per_turn(self.max_consults_per_turn)
            .with_transcript_tail(self.transcript_tail)
            .with_briefing(BriefingLimits {
                max_decisions: self.briefing_max_decisions,
                max_highlights: self.briefing_max_highlights,
                max_excerpt_chars: self.briefing_excerpt_chars,
            })
            .with_write_contention(contention)
            .with_consensus_rule(rule);
        (params, issues)
    }
}

fn invalid_enum(field: &str, value: &str, valid: &[&str]) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            valid_values: valid.iter().map(|v| v.to_string()).collect(),
        },
        format!("{}: unknown value '{}', using the default", field, value),
    )
}

fn zero_value(field: &str) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::ZeroValue {
            field: field.to_string(),
        },
        format!("{} must be positive, using the default", field),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_params() {
        let (params, issues) = FileEngineConfig::default().to_engine_params();
        assert!(issues.is_empty());
        assert_eq!(params, EngineParams::default());
    }

    #[test]
    fn test_parse_values() {
        let config = FileEngineConfig {
            responder_timeout_secs: 5,
            write_contention: "Reject".to_string(),
            consensus_rule: "unanimous".to_string(),
            ..Default::default()
        };
        let (params, issues) = config.to_engine_params();
        assert!(issues.is_empty());
        assert_eq!(params.responder_timeout, Duration::from_secs(5));
        assert_eq!(params.write_contention, WriteContention::Reject);
        assert_eq!(params.consensus_rule, ConsensusRule::Unanimous);
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let config = FileEngineConfig {
            scribe_timeout_secs: 0,
            write_contention: "shove".to_string(),
            ..Default::default()
        };
        let (params, issues) = config.to_engine_params();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| !i.is_error()));
        assert_eq!(params.write_contention, WriteContention::Queue);
        assert_eq!(params.scribe_timeout, EngineParams::default().scribe_timeout);
    }
}
