//! Vote tallies

use super::ballot::{Position, Vote, VoteId, VoteResponse};
use super::rule::{AdvisoryOutcome, ConsensusRule};
use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// Responses sharing one position, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyGroup {
    pub position: Position,
    pub responses: Vec<VoteResponse>,
}

impl TallyGroup {
    pub fn count(&self) -> usize {
        self.responses.len()
    }
}

/// Result of closing a vote
///
/// Groups appear in option order followed by `Abstain`; every option is
/// present even with zero responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub vote_id: VoteId,
    pub question: String,
    pub groups: Vec<TallyGroup>,
    /// Polled participants that never answered
    pub non_responders: Vec<ParticipantId>,
    /// Closed early by the Chair
    pub forced: bool,
    pub polled: usize,
    pub advisory: AdvisoryOutcome,
}

impl VoteTally {
    pub fn from_vote(vote: &Vote, forced: bool, rule: &ConsensusRule) -> Self {
        let mut groups: Vec<TallyGroup> = vote
            .options
            .iter()
            .map(|o| TallyGroup {
                position: Position::Option(o.clone()),
                responses: Vec::new(),
            })
            .chain(std::iter::once(TallyGroup {
                position: Position::Abstain,
                responses: Vec::new(),
            }))
            .collect();

        for response in &vote.responses {
            if let Some(group) = groups.iter_mut().find(|g| g.position == response.position) {
                group.responses.push(response.clone());
            }
        }

        Self {
            vote_id: vote.id.clone(),
            question: vote.question.clone(),
            non_responders: vote.pending(),
            forced,
            polled: vote.polled.len(),
            advisory: rule.annotate(&groups, vote.polled.len()),
            groups,
        }
    }

    pub fn count(&self, position: &Position) -> usize {
        self.groups
            .iter()
            .find(|g| &g.position == position)
            .map(TallyGroup::count)
            .unwrap_or(0)
    }

    pub fn total_responses(&self) -> usize {
        self.groups.iter().map(TallyGroup::count).sum()
    }

    pub fn includes(&self, participant: &ParticipantId) -> bool {
        self.groups
            .iter()
            .any(|g| g.responses.iter().any(|r| &r.participant == participant))
    }

    /// Compact one-line summary, e.g. `X:2 Y:1 Abstain:0`
    pub fn summary(&self) -> String {
        self.groups
            .iter()
            .map(|g| format!("{}:{}", g.position, g.count()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::Confidence;

    fn response(participant: &str, position: Position) -> VoteResponse {
        VoteResponse {
            participant: participant.into(),
            position,
            rationale: format!("{} reasons", participant),
            confidence: Confidence::High,
        }
    }

    fn vote_with(responses: Vec<VoteResponse>) -> Vote {
        let mut vote = Vote::new(
            VoteId::new(1),
            "Use X or Y?",
            vec!["X".to_string(), "Y".to_string()],
            vec!["a".into(), "b".into(), "c".into()],
            0,
        );
        vote.responses = responses;
        vote
    }

    fn x() -> Position {
        Position::Option("X".to_string())
    }

    #[test]
    fn test_groups_keep_option_order_and_submission_order() {
        let vote = vote_with(vec![
            response("c", x()),
            response("a", Position::Option("Y".to_string())),
            response("b", x()),
        ]);
        let tally = vote.tally(false, &ConsensusRule::Majority);

        assert_eq!(tally.groups.len(), 3);
        assert_eq!(tally.groups[0].position, x());
        let order: Vec<_> = tally.groups[0]
            .responses
            .iter()
            .map(|r| r.participant.as_str())
            .collect();
        assert_eq!(order, vec!["c", "b"]);
        assert_eq!(tally.groups[2].position, Position::Abstain);
        assert_eq!(tally.summary(), "X:2 Y:1 Abstain:0");
    }

    #[test]
    fn test_forced_close_lists_non_responders() {
        let vote = vote_with(vec![response("a", x()), response("b", x())]);
        let tally = vote.tally(true, &ConsensusRule::Majority);

        assert!(tally.forced);
        assert_eq!(tally.total_responses(), 2);
        assert_eq!(tally.non_responders, vec![ParticipantId::from("c")]);
        assert!(!tally.includes(&"c".into()));
        assert_eq!(tally.advisory.leading.as_deref(), Some("X"));
        assert!(tally.advisory.satisfied);
    }

    #[test]
    fn test_tie_has_no_leading_option() {
        let vote = vote_with(vec![
            response("a", x()),
            response("b", Position::Option("Y".to_string())),
            response("c", Position::Abstain),
        ]);
        let tally = vote.tally(false, &ConsensusRule::Majority);
        assert!(tally.advisory.leading.is_none());
        assert!(!tally.advisory.satisfied);
    }

    #[test]
    fn test_unanimous_rule_counts_non_responders_against() {
        let vote = vote_with(vec![response("a", x()), response("b", x())]);
        let tally = vote.tally(true, &ConsensusRule::Unanimous);
        assert_eq!(tally.advisory.leading.as_deref(), Some("X"));
        assert!(!tally.advisory.satisfied);
    }
}
