//! Session lifecycle stage

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a session
///
/// ```text
/// Convened ──start──▶ InSession ──adjourn──▶ Adjourned
///                      │     ▲
///                call_vote  close_vote
///                      ▼     │
///                      Voting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Created, not started
    Convened,
    /// Main turn open
    InSession,
    /// Advisory poll open; the main turn is suspended
    Voting,
    /// Terminal
    Adjourned,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Convened => "convened",
            Stage::InSession => "in_session",
            Stage::Voting => "voting",
            Stage::Adjourned => "adjourned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Adjourned)
    }

    /// Started and not yet adjourned
    pub fn is_active(&self) -> bool {
        matches!(self, Stage::InSession | Stage::Voting)
    }

    /// Stages reachable from this one in a single operation
    pub fn valid_transitions(&self) -> &'static [Stage] {
        match self {
            Stage::Convened => &[Stage::InSession],
            Stage::InSession => &[Stage::Voting, Stage::Adjourned],
            Stage::Voting => &[Stage::InSession],
            Stage::Adjourned => &[],
        }
    }

    pub fn can_transition_to(&self, next: Stage) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_never_skip_stages() {
        assert!(Stage::Convened.can_transition_to(Stage::InSession));
        assert!(!Stage::Convened.can_transition_to(Stage::Voting));
        assert!(!Stage::Convened.can_transition_to(Stage::Adjourned));
        assert!(!Stage::Voting.can_transition_to(Stage::Adjourned));
        assert!(Stage::Voting.can_transition_to(Stage::InSession));
    }

    #[test]
    fn test_adjourned_is_terminal() {
        assert!(Stage::Adjourned.is_terminal());
        assert!(Stage::Adjourned.valid_transitions().is_empty());
        assert!(!Stage::InSession.is_terminal());
        assert!(Stage::Voting.is_active());
        assert!(!Stage::Convened.is_active());
        assert!(!Stage::Adjourned.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::InSession.to_string(), "in_session");
        assert_eq!(Stage::Voting.to_string(), "voting");
    }
}
