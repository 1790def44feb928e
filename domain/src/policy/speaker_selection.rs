//! Speaker selection policy

use super::context::TurnContext;
use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// Default number of statements without Chair involvement before the
/// policy suggests the Chair step in
pub const DEFAULT_CONVERGENCE_THRESHOLD: usize = 12;

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// First turn of the session
    Opening,
    ChairOverride,
    DirectQuestion,
    FloorRequest,
    /// Round robin choice plus an advisory prompt for the Chair
    Convergence,
    RoundRobin,
}

impl SelectionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionRule::Opening => "opening",
            SelectionRule::ChairOverride => "chair_override",
            SelectionRule::DirectQuestion => "direct_question",
            SelectionRule::FloorRequest => "floor_request",
            SelectionRule::Convergence => "convergence",
            SelectionRule::RoundRobin => "round_robin",
        }
    }
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory problems found while selecting; never a failure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Warning {
    /// A direct question or Chair direction named someone who is not an
    /// active participant
    UnresolvedReference { target: ParticipantId },
    /// An in-turn consult named a responder that could not be reached
    ConsultUnavailable {
        target: ParticipantId,
        reason: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnresolvedReference { target } => {
                write!(f, "{} is not an active participant", target)
            }
            Warning::ConsultUnavailable { target, reason } => {
                write!(f, "could not consult {}: {}", target, reason)
            }
        }
    }
}

/// Who speaks next and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerDecision {
    pub next_speaker: ParticipantId,
    pub rule: SelectionRule,
    /// Procedural announcement in the Facilitator's voice
    pub announcement: String,
    /// Suggestion for the Chair (convergence); does not move the session
    pub chair_prompt: Option<String>,
    pub warnings: Vec<Warning>,
}

/// Pluggable speaker selection
///
/// Implementations must be deterministic: identical contexts yield
/// identical decisions. Returns `None` only when there is nobody to select.
pub trait SpeakerPolicy: Send + Sync {
    fn select(&self, context: &TurnContext) -> Option<SpeakerDecision>;
}

/// Rule-ordered policy used by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSpeakerPolicy {
    pub convergence_threshold: usize,
}

impl Default for DefaultSpeakerPolicy {
    fn default() -> Self {
        Self {
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl DefaultSpeakerPolicy {
    pub fn new(convergence_threshold: usize) -> Self {
        Self {
            convergence_threshold,
        }
    }

    /// Next participant in registration order that has not spoken this round.
    ///
    /// When the round is complete a new one starts; the speaker who just
    /// finished is skipped if anyone else is available.
    pub fn round_robin(context: &TurnContext) -> Option<&ParticipantId> {
        let last = context.last_speaker.as_ref();
        let not_last = |p: &&ParticipantId| Some(*p) != last;

        context
            .participants
            .iter()
            .filter(|p| !context.spoken_this_round.contains(*p))
            .find(not_last)
            .or_else(|| context.participants.iter().find(not_last))
            .or(context.participants.first())
    }
}

impl SpeakerPolicy for DefaultSpeakerPolicy {
    fn select(&self, context: &TurnContext) -> Option<SpeakerDecision> {
        let mut warnings = Vec::new();

        if context.last_speaker.is_none() && context.chair_override.is_none() {
            let opener = Self::round_robin(context)?;
            return Some(decision(
                opener,
                SelectionRule::Opening,
                format!("{} opens the discussion.", opener),
                warnings,
            ));
        }

        // 1. One-shot Chair direction
        if let Some(target) = &context.chair_override {
            match context.resolve(target) {
                Some(next) => {
                    return Some(decision(
                        next,
                        SelectionRule::ChairOverride,
                        format!("The Chair recognises {}.", next),
                        warnings,
                    ));
                }
                None => warnings.push(Warning::UnresolvedReference {
                    target: target.clone(),
                }),
            }
        }

        // 2. Direct question
        if let Some(target) = context.last_signals.direct_question() {
            match context.resolve(target) {
                Some(next) => {
                    let asker = context
                        .last_speaker
                        .as_ref()
                        .map(|s| s.as_str())
                        .unwrap_or("the previous speaker");
                    return Some(decision(
                        next,
                        SelectionRule::DirectQuestion,
                        format!("{}, {} has put a question to you.", next, asker),
                        warnings,
                    ));
                }
                None => warnings.push(Warning::UnresolvedReference {
                    target: target.clone(),
                }),
            }
        }

        // 3. Floor requests, strictly first come first served. A request
        // made in the statement just given waits until someone else spoke.
        if let Some(next) = context.floor_requests.first()
            && context.last_speaker.as_ref() != Some(next)
        {
            return Some(decision(
                next,
                SelectionRule::FloorRequest,
                format!("{} has the floor, as requested.", next),
                warnings,
            ));
        }

        let next = Self::round_robin(context)?;

        // 4. Convergence: advisory only, the round robin choice still stands
        if context.turns_since_chair > self.convergence_threshold {
            let mut d = decision(
                next,
                SelectionRule::Convergence,
                format!(
                    "{} turns without direction from the Chair. {} has the floor unless the Chair intervenes.",
                    context.turns_since_chair, next
                ),
                warnings,
            );
            d.chair_prompt = Some(
                "The discussion may have converged. Chair: record a decision, call a vote, or direct the next speaker."
                    .to_string(),
            );
            return Some(d);
        }

        // 5. Round robin
        Some(decision(
            next,
            SelectionRule::RoundRobin,
            format!("{}, you have the floor.", next),
            warnings,
        ))
    }
}

fn decision(
    next: &ParticipantId,
    rule: SelectionRule,
    announcement: String,
    warnings: Vec<Warning>,
) -> SpeakerDecision {
    let announcement = if warnings.is_empty() {
        announcement
    } else {
        let notes = warnings
            .iter()
            .map(|w| format!("Note: {}.", w))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}", notes, announcement)
    };
    SpeakerDecision {
        next_speaker: next.clone(),
        rule,
        announcement,
        chair_prompt: None,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Signal, Signals};

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::from(*n)).collect()
    }

    fn after(speaker: &str, participants: &[&str]) -> TurnContext {
        let mut context = TurnContext::opening(ids(participants));
        context.last_speaker = Some(speaker.into());
        context.spoken_this_round.insert(speaker.into());
        context.turn_counts.insert(speaker.into(), 1);
        context.turns_since_chair = 1;
        context
    }

    fn select(context: &TurnContext) -> SpeakerDecision {
        DefaultSpeakerPolicy::default().select(context).unwrap()
    }

    #[test]
    fn test_opening_picks_first_registered() {
        let d = select(&TurnContext::opening(ids(&["a", "b"])));
        assert_eq!(d.next_speaker.as_str(), "a");
        assert_eq!(d.rule, SelectionRule::Opening);
    }

    #[test]
    fn test_empty_participants_selects_nobody() {
        let context = TurnContext::opening(vec![]);
        assert!(DefaultSpeakerPolicy::default().select(&context).is_none());
    }

    #[test]
    fn test_direct_question_wins() {
        let mut context = after("a", &["a", "b", "c"]);
        context.last_signals = Signals::new(vec![Signal::DirectQuestion { target: "c".into() }]);
        context.floor_requests = ids(&["b"]);
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "c");
        assert_eq!(d.rule, SelectionRule::DirectQuestion);
    }

    #[test]
    fn test_unresolved_question_falls_through_with_warning() {
        let mut context = after("a", &["a", "b", "c"]);
        context.last_signals = Signals::new(vec![Signal::DirectQuestion { target: "z".into() }]);
        context.floor_requests = ids(&["c"]);
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "c");
        assert_eq!(d.rule, SelectionRule::FloorRequest);
        assert_eq!(
            d.warnings,
            vec![Warning::UnresolvedReference { target: "z".into() }]
        );
        assert!(d.announcement.contains("z is not an active participant"));
    }

    #[test]
    fn test_floor_requests_beat_round_robin() {
        let mut context = after("a", &["a", "b", "c"]);
        context.floor_requests = ids(&["c", "b"]);
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "c");
        assert_eq!(d.rule, SelectionRule::FloorRequest);
    }

    #[test]
    fn test_own_floor_request_waits_a_turn() {
        let mut context = after("a", &["a", "b", "c"]);
        context.floor_requests = ids(&["a", "c"]);
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "b");
        assert_eq!(d.rule, SelectionRule::RoundRobin);

        // Once someone else spoke, the queue front is granted in order
        context.last_speaker = Some("b".into());
        context.spoken_this_round.insert("b".into());
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "a");
        assert_eq!(d.rule, SelectionRule::FloorRequest);
    }

    #[test]
    fn test_chair_override_preempts_question_and_floor() {
        let mut context = after("a", &["a", "b", "c"]);
        context.last_signals = Signals::new(vec![Signal::DirectQuestion { target: "b".into() }]);
        context.floor_requests = ids(&["b"]);
        context.chair_override = Some("c".into());
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "c");
        assert_eq!(d.rule, SelectionRule::ChairOverride);
    }

    #[test]
    fn test_round_robin_follows_registration_order() {
        let mut context = after("a", &["a", "b", "c"]);
        assert_eq!(select(&context).next_speaker.as_str(), "b");

        context.last_speaker = Some("b".into());
        context.spoken_this_round.insert("b".into());
        assert_eq!(select(&context).next_speaker.as_str(), "c");
    }

    #[test]
    fn test_new_round_skips_last_speaker() {
        // Round just completed with "a" speaking last: the new round must
        // not hand the floor straight back to "a".
        let mut context = after("a", &["a", "b"]);
        context.spoken_this_round.clear();
        let d = select(&context);
        assert_eq!(d.next_speaker.as_str(), "b");
        assert_eq!(d.rule, SelectionRule::RoundRobin);
    }

    #[test]
    fn test_single_participant_speaks_again() {
        let mut context = after("a", &["a"]);
        context.spoken_this_round.clear();
        assert_eq!(select(&context).next_speaker.as_str(), "a");
    }

    #[test]
    fn test_convergence_is_advisory() {
        let mut context = after("a", &["a", "b"]);
        context.turns_since_chair = 5;
        let d = DefaultSpeakerPolicy::new(4).select(&context).unwrap();
        assert_eq!(d.rule, SelectionRule::Convergence);
        assert_eq!(d.next_speaker.as_str(), "b");
        assert!(d.chair_prompt.is_some());

        context.turns_since_chair = 4;
        let d = DefaultSpeakerPolicy::new(4).select(&context).unwrap();
        assert_eq!(d.rule, SelectionRule::RoundRobin);
        assert!(d.chair_prompt.is_none());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let mut context = after("b", &["a", "b", "c"]);
        context.floor_requests = ids(&["a"]);
        let first = select(&context);
        for _ in 0..10 {
            assert_eq!(select(&context), first);
        }
    }
}
