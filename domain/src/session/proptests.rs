//! Randomized operation sequences against the session state machine

use super::*;
use crate::core::ids::{ParticipantId, SessionId};
use crate::policy::{DefaultSpeakerPolicy, SelectionRule, SpeakerPolicy};
use crate::session::participant::ParticipantSpec;
use crate::session::stage::Stage;
use crate::session::transcript::{EntryDetail, EntryKind};
use crate::session::turn::TurnResponse;
use crate::signal::Signals;
use crate::vote::Confidence;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

#[derive(Debug, Clone)]
enum Op {
    Start(Option<usize>),
    Say(Utterance),
    Speak(Option<usize>),
    RequestFloor(usize),
    CallVote,
    Submit(usize, usize),
    Close(bool),
    Decide,
    Summon(usize),
    Adjourn,
}

#[derive(Debug, Clone)]
enum Utterance {
    Plain,
    QuestionTo(usize),
    QuestionToStranger,
    RequestFloor,
    Concern,
}

fn arb_utterance() -> impl Strategy<Value = Utterance> {
    prop_oneof![
        Just(Utterance::Plain),
        (0..NAMES.len()).prop_map(Utterance::QuestionTo),
        Just(Utterance::QuestionToStranger),
        Just(Utterance::RequestFloor),
        Just(Utterance::Concern),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => proptest::option::of(0..NAMES.len()).prop_map(Op::Start),
        6 => arb_utterance().prop_map(Op::Say),
        1 => proptest::option::of(0..NAMES.len()).prop_map(Op::Speak),
        2 => (0..NAMES.len()).prop_map(Op::RequestFloor),
        1 => Just(Op::CallVote),
        3 => (0..NAMES.len(), 0..3usize).prop_map(|(p, o)| Op::Submit(p, o)),
        1 => any::<bool>().prop_map(Op::Close),
        1 => Just(Op::Decide),
        1 => (3..NAMES.len()).prop_map(Op::Summon),
        1 => Just(Op::Adjourn),
    ]
}

fn id(i: usize) -> ParticipantId {
    ParticipantId::from(NAMES[i])
}

fn text(utterance: &Utterance) -> String {
    match utterance {
        Utterance::Plain => "I agree with the direction.".to_string(),
        Utterance::QuestionTo(i) => format!("What about latency? [QUESTION: {}]", NAMES[*i]),
        Utterance::QuestionToStranger => "[QUESTION: nobody]".to_string(),
        Utterance::RequestFloor => "One more point later. [REQUEST FLOOR]".to_string(),
        Utterance::Concern => "[CONCERN: cost]".to_string(),
    }
}

/// Apply `op`, returning whether it succeeded
fn apply(session: &mut Session, op: &Op, policy: &DefaultSpeakerPolicy) -> bool {
    let vote = session.active_vote().map(|v| v.id.clone());
    match op {
        Op::Start(opener) => session
            .start(None, opener.map(id).as_ref(), policy)
            .is_ok(),
        Op::Say(u) => session
            .advance_turn(TurnResponse::new(text(u)), policy)
            .is_ok(),
        Op::Speak(target) => session
            .speak("Chair remarks.", target.map(id).as_ref())
            .is_ok(),
        Op::RequestFloor(i) => session.request_floor(&id(*i)).is_ok(),
        Op::CallVote => session
            .call_vote("Ship it?", vec!["yes".to_string(), "no".to_string()])
            .is_ok(),
        Op::Submit(p, o) => {
            let position = ["yes", "no", "abstain"][*o];
            let vote = vote.unwrap_or_else(|| crate::vote::VoteId::new(99));
            session
                .submit_vote_response(&vote, &id(*p), position, "because", Confidence::Medium)
                .is_ok()
        }
        Op::Close(force) => {
            let vote = vote.unwrap_or_else(|| crate::vote::VoteId::new(99));
            session.close_vote(&vote, *force).is_ok()
        }
        Op::Decide => session.decide("Proceed.", None, vec![], None).is_ok(),
        Op::Summon(i) => session
            .admit_summoned(
                ParticipantSpec::new(NAMES[*i]),
                "expertise",
                "Thoughts?",
                "Glad to help.",
                Signals::empty(),
            )
            .is_ok(),
        Op::Adjourn => session.adjourn(None).is_ok(),
    }
}

fn convene() -> Session {
    Session::convene(
        SessionId::new("prop"),
        "Release review",
        "Ship or hold",
        vec![],
        vec![
            ParticipantSpec::new("a"),
            ParticipantSpec::new("b"),
            ParticipantSpec::new("c"),
        ],
    )
    .unwrap()
}

proptest! {
    #[test]
    fn session_invariants_hold(ops in proptest::collection::vec(arb_op(), 1..60)) {
        let policy = DefaultSpeakerPolicy::new(4);
        let mut session = convene();
        let mut decides = 0;

        for op in &ops {
            let before = session.clone();
            // The speaker's own queue entry is dropped when the statement lands
            let queue_front = session
                .floor_requests()
                .find(|p| Some(*p) != session.current_speaker())
                .cloned();
            let ok = apply(&mut session, op, &policy);

            // Single active mode after every step
            prop_assert!(session.is_consistent(), "inconsistent after {:?}", op);

            if !ok {
                // A rejected operation changes nothing
                prop_assert_eq!(&session, &before);
                continue;
            }

            // Append-only: earlier entries are untouched
            let len = before.transcript().len();
            prop_assert!(session.transcript().len() >= len);
            prop_assert_eq!(&session.transcript().entries()[..len], before.transcript().entries());

            // Floor grants come from the queue front
            let announced = session.transcript().since(len).iter().find_map(|e| match &e.detail {
                Some(EntryDetail::Announcement { next, rule }) => Some((next.clone(), *rule)),
                _ => None,
            });
            if let Some((next, SelectionRule::FloorRequest)) = announced {
                prop_assert_eq!(Some(next), queue_front);
            }

            if matches!(op, Op::Decide) {
                decides += 1;
            }
        }

        // Only explicit decide calls produce decisions
        prop_assert_eq!(session.transcript().count_kind(EntryKind::Decision), decides);

        // Tallies only contain participants polled at call time
        for tally in session.closed_votes() {
            let polled = session.transcript().entries().iter().find_map(|e| match &e.detail {
                Some(EntryDetail::VoteCall { vote, polled, .. }) if *vote == tally.vote_id => {
                    Some(polled.clone())
                }
                _ => None,
            });
            prop_assert!(polled.is_some());
            let polled = polled.unwrap_or_default();
            for group in &tally.groups {
                for response in &group.responses {
                    prop_assert!(polled.contains(&response.participant));
                }
            }
        }

        if session.stage() == Stage::Adjourned {
            prop_assert!(session.current_speaker().is_none());
        }
    }

    #[test]
    fn policy_is_deterministic(ops in proptest::collection::vec(arb_op(), 1..30)) {
        let policy = DefaultSpeakerPolicy::default();
        let mut session = convene();
        for op in &ops {
            apply(&mut session, op, &policy);
        }
        let context = session.turn_context();
        prop_assert_eq!(policy.select(&context), policy.select(&context));
    }
}
