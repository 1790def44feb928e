//! The session state machine
//!
//! [`Session`] owns every piece of mutable council state. Each operation
//! validates against the current state first and only then mutates, so a
//! rejected call leaves the session exactly as it was.

use super::decision::{Decision, DecisionId};
use super::participant::{Origin, Participant, ParticipantRegistry, ParticipantSpec};
use super::stage::Stage;
use super::summary::{
    ActiveMode, Briefing, BriefingLimits, SessionDigest, SessionSnapshot, SessionStatus,
    SessionSummary, VoteProgress,
};
use super::transcript::{EntryDetail, EntryDraft, EntryKind, Transcript, TranscriptEntry};
use super::turn::{ChairOutcome, TurnDirective, TurnResponse};
use crate::core::error::DomainError;
use crate::core::ids::{ParticipantId, SessionId, Speaker};
use crate::policy::{SelectionRule, SpeakerDecision, SpeakerPolicy, TurnContext, Warning};
use crate::signal::{Signals, parse_signals};
use crate::vote::{Confidence, ConsensusRule, Vote, VoteId, VoteResponse, VoteTally};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const DEFAULT_OPENING: &str = "The session is called to order.";
const DEFAULT_CLOSING: &str = "The session is adjourned.";

/// A council session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    title: String,
    topic: String,
    agenda: Vec<String>,
    stage: Stage,
    convened_at: DateTime<Utc>,
    participants: ParticipantRegistry,
    transcript: Transcript,
    floor_requests: VecDeque<ParticipantId>,
    current_speaker: Option<ParticipantId>,
    /// Speaker whose turn was interrupted by the open vote
    suspended_speaker: Option<ParticipantId>,
    active_vote: Option<Vote>,
    closed_votes: Vec<VoteTally>,
    decisions: Vec<Decision>,
    chair_override: Option<ParticipantId>,
    turn_counts: BTreeMap<ParticipantId, usize>,
    spoken_this_round: BTreeSet<ParticipantId>,
    turns_since_chair: usize,
    vote_sequence: usize,
    consensus_rule: ConsensusRule,
}

impl Session {
    /// Create a session in [`Stage::Convened`]
    pub fn convene(
        id: SessionId,
        title: impl Into<String>,
        topic: impl Into<String>,
        agenda: Vec<String>,
        participants: Vec<ParticipantSpec>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        let topic = topic.into().trim().to_string();
        if title.is_empty() {
            return Err(DomainError::invalid_session("title must not be empty"));
        }
        if topic.is_empty() {
            return Err(DomainError::invalid_session("topic must not be empty"));
        }
        if participants.is_empty() {
            return Err(DomainError::invalid_session(
                "at least one participant is required",
            ));
        }

        let mut registry = ParticipantRegistry::new();
        for spec in participants {
            let member = ParticipantId::new(spec.id.as_str().trim());
            if member.as_str().is_empty() {
                return Err(DomainError::invalid_session("participant id must not be empty"));
            }
            if member.is_reserved() {
                return Err(DomainError::invalid_session(format!(
                    "'{}' is a reserved name",
                    member
                )));
            }
            if let Some(existing) = registry.resolve(&member) {
                return Err(DomainError::invalid_session(format!(
                    "duplicate participant '{}' (already registered as '{}')",
                    member, existing
                )));
            }
            registry.insert(Participant {
                id: member,
                expertise: spec.expertise,
                origin: Origin::Initial,
                joined_at: 0,
            });
        }

        Ok(Self {
            id,
            title,
            topic,
            agenda: agenda
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            stage: Stage::Convened,
            convened_at: Utc::now(),
            participants: registry,
            transcript: Transcript::new(),
            floor_requests: VecDeque::new(),
            current_speaker: None,
            suspended_speaker: None,
            active_vote: None,
            closed_votes: Vec::new(),
            decisions: Vec::new(),
            chair_override: None,
            turn_counts: BTreeMap::new(),
            spoken_this_round: BTreeSet::new(),
            turns_since_chair: 0,
            vote_sequence: 0,
            consensus_rule: ConsensusRule::default(),
        })
    }

    /// Rule used to annotate vote tallies
    pub fn with_consensus_rule(mut self, rule: ConsensusRule) -> Self {
        self.consensus_rule = rule;
        self
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn agenda(&self) -> &[String] {
        &self.agenda
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.participants
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn current_speaker(&self) -> Option<&ParticipantId> {
        self.current_speaker.as_ref()
    }

    pub fn floor_requests(&self) -> impl Iterator<Item = &ParticipantId> {
        self.floor_requests.iter()
    }

    pub fn active_vote(&self) -> Option<&Vote> {
        self.active_vote.as_ref()
    }

    pub fn closed_votes(&self) -> &[VoteTally] {
        &self.closed_votes
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn chair_override(&self) -> Option<&ParticipantId> {
        self.chair_override.as_ref()
    }

    pub fn consensus_rule(&self) -> ConsensusRule {
        self.consensus_rule
    }

    pub fn mode(&self) -> ActiveMode {
        match self.stage {
            Stage::Convened => ActiveMode::NotStarted,
            Stage::Adjourned => ActiveMode::Finished,
            Stage::InSession => match &self.current_speaker {
                Some(id) => ActiveMode::TurnOpen(id.clone()),
                None => ActiveMode::NotStarted,
            },
            Stage::Voting => match &self.active_vote {
                Some(vote) => ActiveMode::VoteInProgress(vote.id.clone()),
                None => ActiveMode::NotStarted,
            },
        }
    }

    /// Exactly one of: a turn is open, a vote is open, the session is not
    /// running. Holds after every operation, successful or not.
    pub fn is_consistent(&self) -> bool {
        let turn = self.current_speaker.is_some();
        let vote = self.active_vote.is_some();
        let idle = matches!(self.stage, Stage::Convened | Stage::Adjourned);
        let stage_matches = match self.stage {
            Stage::InSession => turn,
            Stage::Voting => vote,
            Stage::Convened | Stage::Adjourned => true,
        };
        [turn, vote, idle].iter().filter(|b| **b).count() == 1 && stage_matches
    }

    // ==================== Lifecycle ====================

    /// Open the session and the first turn.
    ///
    /// Without `first_speaker` the policy's opening choice (the first
    /// registered participant) takes the floor.
    pub fn start(
        &mut self,
        opening_remarks: Option<&str>,
        first_speaker: Option<&ParticipantId>,
        policy: &dyn SpeakerPolicy,
    ) -> Result<TurnDirective, DomainError> {
        match self.stage {
            Stage::Convened => {}
            Stage::Adjourned => return Err(DomainError::SessionClosed),
            stage => {
                return Err(DomainError::InvalidTransition {
                    operation: "start",
                    stage,
                });
            }
        }

        let decision = match first_speaker {
            Some(name) => {
                let id = self.resolve_participant(name)?.clone();
                SpeakerDecision {
                    announcement: format!("{} opens the discussion.", id),
                    next_speaker: id,
                    rule: SelectionRule::Opening,
                    chair_prompt: None,
                    warnings: Vec::new(),
                }
            }
            None => policy
                .select(&TurnContext::opening(self.participants.ids().cloned().collect()))
                .ok_or_else(|| DomainError::invalid_session("no participant can open"))?,
        };

        let remarks = opening_remarks
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_OPENING);
        self.transcript.append(EntryDraft::facilitator(remarks));
        self.transition(Stage::InSession);
        Ok(self.open_turn(decision, None))
    }

    /// Record the current speaker's statement and hand the floor on.
    pub fn advance_turn(
        &mut self,
        response: TurnResponse,
        policy: &dyn SpeakerPolicy,
    ) -> Result<TurnDirective, DomainError> {
        self.ensure_in_session()?;
        let speaker = self
            .current_speaker
            .clone()
            .ok_or(DomainError::SessionNotActive { stage: self.stage })?;

        let signals = response
            .signals
            .merge(parse_signals(&response.statement))
            .without_consults();

        let context = self.context_after_statement(&speaker, &signals);
        let decision = policy.select(&context).ok_or(DomainError::SessionNotActive {
            stage: self.stage,
        })?;

        for staged in response.consultations {
            self.transcript.append(EntryDraft::consultation(
                speaker.clone(),
                staged.target,
                staged.question,
                staged.answer,
            ));
        }
        let statement_seq = self
            .transcript
            .append(
                EntryDraft::new(
                    Speaker::Participant(speaker.clone()),
                    EntryKind::Statement,
                    response.statement,
                )
                .with_signals(signals.clone()),
            )
            .seq;

        self.record_turn(&speaker);
        if signals.requests_floor() {
            self.enqueue_floor(&speaker);
        }
        self.chair_override = None;
        Ok(self.open_turn(decision, Some(statement_seq)))
    }

    /// Close the session for good.
    pub fn adjourn(
        &mut self,
        closing_remarks: Option<&str>,
    ) -> Result<SessionSummary, DomainError> {
        self.ensure_in_session()?;

        let remarks = closing_remarks
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_CLOSING);
        self.transcript.append(EntryDraft::facilitator(remarks));
        self.transition(Stage::Adjourned);
        self.current_speaker = None;
        self.chair_override = None;
        self.floor_requests.clear();
        Ok(self.summary())
    }

    // ==================== Chair ====================

    /// Chair interjection; a resolvable `direct_to` picks the next speaker
    /// for one turn.
    pub fn speak(
        &mut self,
        statement: &str,
        direct_to: Option<&ParticipantId>,
    ) -> Result<ChairOutcome, DomainError> {
        self.ensure_in_session()?;

        let mut warnings = Vec::new();
        let directed_to = match direct_to {
            Some(name) => match self.participants.resolve(name) {
                Some(id) => Some(id.clone()),
                None => {
                    warnings.push(Warning::UnresolvedReference {
                        target: name.clone(),
                    });
                    None
                }
            },
            None => None,
        };

        let seq = self
            .transcript
            .append(
                EntryDraft::new(Speaker::Chair, EntryKind::ChairDirection, statement.trim())
                    .with_detail(EntryDetail::Direction {
                        direct_to: directed_to.clone(),
                    }),
            )
            .seq;
        if directed_to.is_some() {
            self.chair_override = directed_to.clone();
        }
        self.turns_since_chair = 0;

        Ok(ChairOutcome {
            seq,
            directed_to,
            warnings,
        })
    }

    /// Record a Chair decision, linked to `vote` or else to the latest
    /// closed vote no decision refers to yet.
    pub fn decide(
        &mut self,
        text: &str,
        rationale: Option<&str>,
        action_items: Vec<serde_json::Value>,
        vote: Option<&VoteId>,
    ) -> Result<Decision, DomainError> {
        self.ensure_in_session()?;

        let vote = match vote {
            Some(id) => {
                if !self.closed_votes.iter().any(|t| &t.vote_id == id) {
                    return Err(DomainError::UnknownVote {
                        vote: id.to_string(),
                        stage: self.stage,
                    });
                }
                Some(id.clone())
            }
            None => self
                .closed_votes
                .iter()
                .rev()
                .map(|t| &t.vote_id)
                .find(|id| !self.decisions.iter().any(|d| d.vote.as_ref() == Some(*id)))
                .cloned(),
        };

        let timestamp = Utc::now();
        let decision = Decision {
            id: DecisionId::new(timestamp.date_naive(), self.decisions.len() + 1),
            text: text.trim().to_string(),
            rationale: rationale.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            action_items,
            vote: vote.clone(),
            decided_by: Speaker::Chair,
            timestamp,
        };

        self.transcript.append(
            EntryDraft::new(Speaker::Chair, EntryKind::Decision, decision.text.clone())
                .with_detail(EntryDetail::Decision {
                    decision: decision.id.clone(),
                    vote,
                }),
        );
        self.decisions.push(decision.clone());
        self.turns_since_chair = 0;
        Ok(decision)
    }

    // ==================== Floor ====================

    /// Queue a floor request; returns `false` when already queued.
    pub fn request_floor(&mut self, participant: &ParticipantId) -> Result<bool, DomainError> {
        self.ensure_in_session()?;
        let id = self.resolve_participant(participant)?.clone();
        if self.floor_requests.contains(&id) {
            return Ok(false);
        }
        self.transcript
            .append(EntryDraft::facilitator(format!("{} requests the floor.", id)));
        self.floor_requests.push_back(id);
        Ok(true)
    }

    // ==================== Side channels ====================

    /// Check that `by` holds the floor and may consult.
    pub fn check_consult(&self, by: &ParticipantId) -> Result<(), DomainError> {
        self.ensure_in_session()?;
        if !self.participants.contains(by) {
            return Err(DomainError::UnknownParticipant {
                participant: by.to_string(),
                stage: self.stage,
            });
        }
        if self.current_speaker.as_ref() != Some(by) {
            return Err(DomainError::InvalidTransition {
                operation: "consult out of turn",
                stage: self.stage,
            });
        }
        Ok(())
    }

    /// Append a completed consultation; the floor does not move.
    pub fn record_consultation(
        &mut self,
        by: &ParticipantId,
        target: &ParticipantId,
        question: &str,
        answer: &str,
    ) -> Result<&TranscriptEntry, DomainError> {
        self.check_consult(by)?;
        Ok(self.transcript.append(EntryDraft::consultation(
            by.clone(),
            target.clone(),
            question,
            answer,
        )))
    }

    /// Check that `id` could be summoned right now.
    pub fn check_summon(&self, id: &ParticipantId) -> Result<(), DomainError> {
        self.ensure_in_session()?;
        if id.as_str().trim().is_empty() {
            return Err(DomainError::invalid_session("participant id must not be empty"));
        }
        if id.is_reserved() || self.participants.resolve(id).is_some() {
            return Err(DomainError::DuplicateParticipant {
                participant: id.to_string(),
                stage: self.stage,
            });
        }
        Ok(())
    }

    /// Register a summoned participant together with its reply to the
    /// summon question. The floor does not move.
    pub fn admit_summoned(
        &mut self,
        spec: ParticipantSpec,
        reason: &str,
        question: &str,
        reply: &str,
        signals: Signals,
    ) -> Result<&Participant, DomainError> {
        let id = ParticipantId::new(spec.id.as_str().trim());
        self.check_summon(&id)?;

        let signals = signals.merge(parse_signals(reply)).without_consults();
        let seq = self
            .transcript
            .append(
                EntryDraft::new(Speaker::Participant(id.clone()), EntryKind::Summon, reply)
                    .with_signals(signals.clone())
                    .with_detail(EntryDetail::Summon {
                        participant: id.clone(),
                        reason: reason.trim().to_string(),
                        question: question.trim().to_string(),
                    }),
            )
            .seq;
        self.participants.insert(Participant {
            id: id.clone(),
            expertise: spec.expertise,
            origin: Origin::Summoned,
            joined_at: seq,
        });
        if signals.requests_floor() {
            self.enqueue_floor(&id);
        }
        self.participants
            .get(&id)
            .ok_or_else(|| DomainError::UnknownParticipant {
                participant: id.to_string(),
                stage: self.stage,
            })
    }

    /// Bounded briefing for a newcomer
    pub fn briefing(&self, limits: &BriefingLimits) -> Briefing {
        let decisions = self.decisions[self.decisions.len().saturating_sub(limits.max_decisions)..]
            .iter()
            .map(Decision::summary_line)
            .collect();

        let flagged: Vec<&TranscriptEntry> = self
            .transcript
            .entries()
            .iter()
            .filter(|e| {
                e.kind == EntryKind::Decision
                    || (e.kind == EntryKind::Statement && e.signals.has_highlight())
            })
            .collect();
        let highlights = flagged[flagged.len().saturating_sub(limits.max_highlights)..]
            .iter()
            .map(|e| Briefing::highlight(e, limits.max_excerpt_chars))
            .collect();

        Briefing {
            topic: self.topic.clone(),
            agenda: self.agenda.clone(),
            decisions,
            highlights,
        }
    }

    // ==================== Votes ====================

    /// Open an advisory poll of every current participant.
    pub fn call_vote(
        &mut self,
        question: &str,
        options: Vec<String>,
    ) -> Result<VoteId, DomainError> {
        self.ensure_in_session()?;

        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
        if options.is_empty() {
            return Err(DomainError::InvalidOption {
                option: String::new(),
                stage: self.stage,
            });
        }
        for (i, option) in options.iter().enumerate() {
            let duplicate = options[..i].iter().any(|o| o.eq_ignore_ascii_case(option));
            if option.is_empty() || option.eq_ignore_ascii_case("abstain") || duplicate {
                return Err(DomainError::InvalidOption {
                    option: option.clone(),
                    stage: self.stage,
                });
            }
        }

        self.vote_sequence += 1;
        let id = VoteId::new(self.vote_sequence);
        let polled: Vec<ParticipantId> = self.participants.ids().cloned().collect();
        let called_at = self
            .transcript
            .append(
                EntryDraft::new(Speaker::Chair, EntryKind::VoteCall, question.trim()).with_detail(
                    EntryDetail::VoteCall {
                        vote: id.clone(),
                        options: options.clone(),
                        polled: polled.clone(),
                    },
                ),
            )
            .seq;

        self.active_vote = Some(Vote::new(
            id.clone(),
            question.trim(),
            options,
            polled,
            called_at,
        ));
        self.suspended_speaker = self.current_speaker.take();
        self.turns_since_chair = 0;
        self.transition(Stage::Voting);
        Ok(id)
    }

    /// Record one polled participant's answer.
    pub fn submit_vote_response(
        &mut self,
        vote_id: &VoteId,
        participant: &ParticipantId,
        position: &str,
        rationale: &str,
        confidence: Confidence,
    ) -> Result<&VoteResponse, DomainError> {
        let stage = self.stage;
        let vote = self.open_vote(vote_id)?;
        if !vote.is_polled(participant) {
            return Err(DomainError::NotPolled {
                participant: participant.to_string(),
                stage,
            });
        }
        if vote.has_responded(participant) {
            return Err(DomainError::AlreadyVoted {
                participant: participant.to_string(),
                stage,
            });
        }
        let position = vote
            .resolve_position(position)
            .ok_or_else(|| DomainError::InvalidOption {
                option: position.to_string(),
                stage,
            })?;

        self.transcript.append(
            EntryDraft::new(
                Speaker::Participant(participant.clone()),
                EntryKind::VoteResponse,
                rationale.trim(),
            )
            .with_detail(EntryDetail::VoteResponse {
                vote: vote_id.clone(),
                position: position.clone(),
                confidence,
            }),
        );

        let vote = self
            .active_vote
            .as_mut()
            .ok_or_else(|| DomainError::UnknownVote {
                vote: vote_id.to_string(),
                stage,
            })?;
        vote.responses.push(VoteResponse {
            participant: participant.clone(),
            position,
            rationale: rationale.trim().to_string(),
            confidence,
        });
        vote.responses
            .last()
            .ok_or_else(|| DomainError::UnknownVote {
                vote: vote_id.to_string(),
                stage,
            })
    }

    /// Close the open vote and resume the suspended turn. Never decides.
    pub fn close_vote(&mut self, vote_id: &VoteId, force: bool) -> Result<VoteTally, DomainError> {
        let stage = self.stage;
        let vote = self.open_vote(vote_id)?;
        if !force && !vote.is_complete() {
            return Err(DomainError::VoteIncomplete {
                vote: vote_id.to_string(),
                pending: vote.pending().len(),
                stage,
            });
        }

        let tally = vote.tally(force, &self.consensus_rule);
        self.active_vote = None;

        let mut body = format!("Vote {} closed: {}.", tally.vote_id, tally.summary());
        if !tally.non_responders.is_empty() {
            let missing = tally
                .non_responders
                .iter()
                .map(ParticipantId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            body.push_str(&format!(" No response from: {}.", missing));
        }
        if let Some(speaker) = &self.suspended_speaker {
            body.push_str(&format!(" {} resumes the floor.", speaker));
        }
        self.transcript.append(EntryDraft::facilitator(body).with_detail(
            EntryDetail::VoteClosed {
                vote: tally.vote_id.clone(),
                forced: force,
                non_responders: tally.non_responders.clone(),
            },
        ));

        self.closed_votes.push(tally.clone());
        self.current_speaker = self.suspended_speaker.take();
        self.transition(Stage::InSession);
        Ok(tally)
    }

    // ==================== Views ====================

    /// Policy input as of now
    pub fn turn_context(&self) -> TurnContext {
        TurnContext {
            stage: self.stage,
            participants: self.participants.ids().cloned().collect(),
            last_speaker: self.last_statement().and_then(|e| e.speaker.participant().cloned()),
            last_signals: self
                .last_statement()
                .map(|e| e.signals.clone())
                .unwrap_or_default(),
            floor_requests: self.floor_requests.iter().cloned().collect(),
            turn_counts: self.turn_counts.clone(),
            spoken_this_round: self.spoken_this_round.clone(),
            turns_since_chair: self.turns_since_chair,
            chair_override: self.chair_override.clone(),
        }
    }

    pub fn digest(&self) -> SessionDigest {
        SessionDigest {
            title: self.title.clone(),
            topic: self.topic.clone(),
            agenda: self.agenda.clone(),
            participants: self.participants.ids().cloned().collect(),
            decisions: self.decisions.iter().map(Decision::summary_line).collect(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            id: self.id.clone(),
            title: self.title.clone(),
            topic: self.topic.clone(),
            stage: self.stage,
            mode: self.mode(),
            participants: self.participants.ids().cloned().collect(),
            floor_requests: self.floor_requests.iter().cloned().collect(),
            transcript_len: self.transcript.len(),
            decisions: self.decisions.len(),
            closed_votes: self.closed_votes.len(),
            active_vote: self.active_vote.as_ref().map(|v| VoteProgress {
                id: v.id.clone(),
                question: v.question.clone(),
                options: v.options.clone(),
                responded: v.responses.iter().map(|r| r.participant.clone()).collect(),
                pending: v.pending(),
            }),
            turns_since_chair: self.turns_since_chair,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let mut entries_by_kind = BTreeMap::new();
        for entry in self.transcript.entries() {
            *entries_by_kind
                .entry(entry.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            entries: self.transcript.len(),
            entries_by_kind,
            turns: self.turn_counts.clone(),
            summoned: self.participants.summoned().map(|p| p.id.clone()).collect(),
            decisions: self.decisions.clone(),
            votes: self.closed_votes.clone(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            topic: self.topic.clone(),
            agenda: self.agenda.clone(),
            stage: self.stage,
            convened_at: self.convened_at,
            participants: self.participants.iter().cloned().collect(),
            transcript: self.transcript.entries().to_vec(),
            decisions: self.decisions.clone(),
            votes: self.closed_votes.clone(),
        }
    }

    /// The participant holding the floor, or why nobody does
    pub fn turn_holder(&self) -> Result<&ParticipantId, DomainError> {
        self.ensure_in_session()?;
        self.current_speaker
            .as_ref()
            .ok_or(DomainError::SessionNotActive { stage: self.stage })
    }

    // ==================== Internals ====================

    fn ensure_in_session(&self) -> Result<(), DomainError> {
        match self.stage {
            Stage::InSession => Ok(()),
            Stage::Voting => Err(DomainError::VoteInProgress { stage: self.stage }),
            Stage::Adjourned => Err(DomainError::SessionClosed),
            Stage::Convened => Err(DomainError::SessionNotActive { stage: self.stage }),
        }
    }

    /// The open vote with id `vote_id`, or why there is none
    pub fn open_vote(&self, vote_id: &VoteId) -> Result<&Vote, DomainError> {
        match self.stage {
            Stage::Voting => {}
            Stage::Adjourned => return Err(DomainError::SessionClosed),
            stage => {
                return Err(DomainError::UnknownVote {
                    vote: vote_id.to_string(),
                    stage,
                });
            }
        }
        self.active_vote
            .as_ref()
            .filter(|v| &v.id == vote_id)
            .ok_or_else(|| DomainError::UnknownVote {
                vote: vote_id.to_string(),
                stage: self.stage,
            })
    }

    fn resolve_participant(&self, name: &ParticipantId) -> Result<&ParticipantId, DomainError> {
        self.participants
            .resolve(name)
            .ok_or_else(|| DomainError::UnknownParticipant {
                participant: name.to_string(),
                stage: self.stage,
            })
    }

    fn transition(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        self.stage = next;
    }

    fn last_statement(&self) -> Option<&TranscriptEntry> {
        self.transcript
            .entries()
            .iter()
            .rev()
            .find(|e| e.kind == EntryKind::Statement)
    }

    /// Policy input as it will be once `speaker`'s statement is recorded
    fn context_after_statement(&self, speaker: &ParticipantId, signals: &Signals) -> TurnContext {
        let mut context = self.turn_context();
        context.last_speaker = Some(speaker.clone());
        context.last_signals = signals.clone();
        *context.turn_counts.entry(speaker.clone()).or_insert(0) += 1;
        context.turns_since_chair += 1;

        context.floor_requests.retain(|p| p != speaker);
        if signals.requests_floor() {
            context.floor_requests.push(speaker.clone());
        }

        context.spoken_this_round.insert(speaker.clone());
        if self
            .participants
            .ids()
            .all(|p| context.spoken_this_round.contains(p))
        {
            context.spoken_this_round.clear();
        }
        context
    }

    fn record_turn(&mut self, speaker: &ParticipantId) {
        *self.turn_counts.entry(speaker.clone()).or_insert(0) += 1;
        self.turns_since_chair += 1;
        self.floor_requests.retain(|p| p != speaker);
        self.spoken_this_round.insert(speaker.clone());
        if self
            .participants
            .ids()
            .all(|p| self.spoken_this_round.contains(p))
        {
            self.spoken_this_round.clear();
        }
    }

    fn enqueue_floor(&mut self, id: &ParticipantId) {
        if !self.floor_requests.contains(id) {
            self.floor_requests.push_back(id.clone());
        }
    }

    fn open_turn(
        &mut self,
        decision: SpeakerDecision,
        statement_seq: Option<usize>,
    ) -> TurnDirective {
        if decision.rule == SelectionRule::FloorRequest
            && self.floor_requests.front() == Some(&decision.next_speaker)
        {
            self.floor_requests.pop_front();
        }

        let announced_at = self
            .transcript
            .append(
                EntryDraft::facilitator(decision.announcement.clone()).with_detail(
                    EntryDetail::Announcement {
                        next: decision.next_speaker.clone(),
                        rule: decision.rule,
                    },
                ),
            )
            .seq;
        self.current_speaker = Some(decision.next_speaker.clone());

        TurnDirective {
            next_speaker: decision.next_speaker,
            rule: decision.rule,
            announcement: decision.announcement,
            chair_prompt: decision.chair_prompt,
            warnings: decision.warnings,
            statement_seq,
            announced_at,
        }
    }
}
