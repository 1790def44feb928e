//! Advisory consensus rules
//!
//! A rule never decides anything. It annotates a closed vote with whether
//! the leading option gathered enough support, for the Chair to weigh.
//! Rules are written in config as `majority`, `unanimous`, `atleast:N` or
//! `N%` (`percentage:N` is accepted too).

use super::tally::TallyGroup;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Threshold the leading option is measured against
///
/// Support counts against everyone polled, so a participant that never
/// answered weighs the same as one that backed another option.
///
/// ```
/// use council_domain::vote::ConsensusRule;
///
/// assert_eq!(ConsensusRule::Majority.threshold(4), Some(3));
/// assert_eq!("60%".parse::<ConsensusRule>().unwrap().threshold(5), Some(3));
/// assert_eq!(ConsensusRule::Unanimous.threshold(0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConsensusRule {
    #[default]
    Majority,
    Unanimous,
    AtLeast(usize),
    Percentage(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("unknown consensus rule '{0}' (expected majority, unanimous, atleast:N or N%)")]
    Unknown(String),

    #[error("'{0}' is not a whole number")]
    BadNumber(String),

    #[error("percentage {0} is above 100")]
    OutOfRange(u32),
}

/// How a closed vote measured up against the configured rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryOutcome {
    pub rule: ConsensusRule,
    /// Option with strictly the most support; `None` on a tie or no support
    pub leading: Option<String>,
    /// Responses behind the leading option
    pub support: usize,
    /// Responses the rule asks for; `None` when nobody was polled
    pub needed: Option<usize>,
    pub satisfied: bool,
}

impl ConsensusRule {
    /// Responses needed out of `polled`
    pub fn threshold(&self, polled: usize) -> Option<usize> {
        if polled == 0 {
            return None;
        }
        Some(match *self {
            Self::Majority => polled / 2 + 1,
            Self::Unanimous => polled,
            Self::AtLeast(n) => n,
            Self::Percentage(p) => (polled * usize::from(p)).div_ceil(100),
        })
    }

    /// Annotate grouped responses. Abstentions never lead.
    pub fn annotate(&self, groups: &[TallyGroup], polled: usize) -> AdvisoryOutcome {
        let leader = leading_option(groups);
        let support = leader.map_or(0, |(_, count)| count);
        let needed = self.threshold(polled);
        AdvisoryOutcome {
            rule: *self,
            leading: leader.map(|(option, _)| option.to_string()),
            support,
            needed,
            satisfied: leader.is_some() && needed.is_some_and(|n| support >= n),
        }
    }
}

fn leading_option(groups: &[TallyGroup]) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    let mut tied = false;
    for group in groups {
        let (Some(option), count) = (group.position.option(), group.count()) else {
            continue;
        };
        match best {
            _ if count == 0 => {}
            Some((_, top)) if count == top => tied = true,
            Some((_, top)) if count < top => {}
            _ => {
                best = Some((option, count));
                tied = false;
            }
        }
    }
    best.filter(|_| !tied)
}

fn percentage(raw: &str) -> Result<ConsensusRule, RuleParseError> {
    let raw = raw.trim();
    let p: u32 = raw
        .parse()
        .map_err(|_| RuleParseError::BadNumber(raw.to_string()))?;
    u8::try_from(p)
        .ok()
        .filter(|p| *p <= 100)
        .map(ConsensusRule::Percentage)
        .ok_or(RuleParseError::OutOfRange(p))
}

impl std::str::FromStr for ConsensusRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        if let Some(p) = text.strip_suffix('%') {
            return percentage(p);
        }
        let (keyword, arg) = match text.split_once(':') {
            Some((keyword, arg)) => (keyword.trim(), Some(arg.trim())),
            None => (text.as_str(), None),
        };
        match (keyword, arg) {
            ("majority", None) => Ok(Self::Majority),
            ("unanimous", None) => Ok(Self::Unanimous),
            ("atleast" | "at_least", Some(n)) => n
                .parse()
                .map(Self::AtLeast)
                .map_err(|_| RuleParseError::BadNumber(n.to_string())),
            ("percentage", Some(p)) => percentage(p),
            _ => Err(RuleParseError::Unknown(s.trim().to_string())),
        }
    }
}

/// Canonical config form, accepted back by `FromStr`
impl std::fmt::Display for ConsensusRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Majority => f.write_str("majority"),
            Self::Unanimous => f.write_str("unanimous"),
            Self::AtLeast(n) => write!(f, "atleast:{}", n),
            Self::Percentage(p) => write!(f, "{}%", p),
        }
    }
}

impl TryFrom<String> for ConsensusRule {
    type Error = RuleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConsensusRule> for String {
    fn from(rule: ConsensusRule) -> Self {
        rule.to_string()
    }
}
