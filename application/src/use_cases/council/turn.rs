//! Main turns.

use super::{CouncilError, CouncilOrchestrator};
use crate::ports::notifier::{SessionEvent, SessionEventKind};
use crate::ports::participant_responder::{ConsultationAnswer, PromptContext, ResponderReply};
use council_domain::{
    ParticipantId, SessionId, Signals, StagedConsultation, Stage, TurnDirective, TurnResponse,
    Warning, parse_signals,
};
use serde_json::json;
use tracing::{info, warn};

/// Everything gathered while the current speaker prepares a statement
struct PreparedTurn {
    reply: ResponderReply,
    consultations: Vec<StagedConsultation>,
    warnings: Vec<Warning>,
}

impl CouncilOrchestrator {
    /// Ask the participant holding the floor for a statement, record it and
    /// hand the floor on.
    ///
    /// Consultations requested in the reply are answered before anything is
    /// recorded; the speaker is then re-prompted with the answers. If any
    /// call fails or times out, nothing is recorded.
    pub async fn next(&self, id: &SessionId) -> Result<TurnDirective, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let (speaker, context, stage) = {
            let session = handle.read().await;
            let speaker = session.turn_holder()?.clone();
            let context = PromptContext::Turn {
                participant: speaker.clone(),
                digest: session.digest(),
                transcript_tail: session.transcript().tail(self.params.transcript_tail).to_vec(),
                consultations: Vec::new(),
            };
            (speaker, context, session.stage())
        };

        let prepared = self.prepare_turn(&speaker, context, stage).await?;

        let mut directive = {
            let mut session = handle.write(&permit).await;
            // The permit guarantees nobody moved the floor meanwhile
            if session.turn_holder()? != &speaker {
                return Err(CouncilError::ConcurrentModification {
                    session: id.clone(),
                    stage: session.stage(),
                });
            }
            let mut response =
                TurnResponse::new(prepared.reply.statement).with_signals(prepared.reply.signals);
            response.consultations = prepared.consultations;
            session.advance_turn(response, self.policy.as_ref())?
        };
        let mut warnings = prepared.warnings;
        warnings.append(&mut directive.warnings);
        directive.warnings = warnings;

        for warning in &directive.warnings {
            warn!(session = %id, "{}", warning);
        }
        info!(
            session = %id,
            speaker = %speaker,
            next = %directive.next_speaker,
            rule = %directive.rule,
            "Turn advanced"
        );
        self.notify(
            SessionEvent::new(SessionEventKind::TurnAdvanced, id)
                .with_entity(&directive.next_speaker)
                .with_payload(json!({
                    "previous": speaker,
                    "rule": directive.rule,
                    "announcement": directive.announcement,
                    "chair_prompt": directive.chair_prompt,
                })),
        );
        Ok(directive)
    }

    async fn prepare_turn(
        &self,
        speaker: &ParticipantId,
        mut context: PromptContext,
        stage: Stage,
    ) -> Result<PreparedTurn, CouncilError> {
        let responder = self.responder(speaker, stage)?;
        let mut reply = self.ask(speaker, responder.as_ref(), &context, stage).await?;
        let mut consultations = Vec::new();
        let mut warnings = Vec::new();
        let mut answered: Vec<ConsultationAnswer> = Vec::new();
        let mut budget = self.params.max_consults_per_turn;

        loop {
            let requested = pending_consults(&reply, &answered);
            if requested.is_empty() || budget == 0 {
                break;
            }

            let mut asked = false;
            for (target, question) in requested {
                if budget == 0 {
                    break;
                }
                budget -= 1;

                let Some(consultant) = self.responders.resolve(&target) else {
                    warnings.push(Warning::ConsultUnavailable {
                        target: target.clone(),
                        reason: "no responder registered".to_string(),
                    });
                    answered.push(ConsultationAnswer {
                        target,
                        question,
                        answer: String::new(),
                    });
                    continue;
                };

                let consultation = PromptContext::Consultation {
                    question: question.clone(),
                };
                let answer = self
                    .ask(&target, consultant.as_ref(), &consultation, stage)
                    .await?;
                consultations.push(StagedConsultation {
                    target: target.clone(),
                    question: question.clone(),
                    answer: answer.statement.clone(),
                });
                answered.push(ConsultationAnswer {
                    target,
                    question,
                    answer: answer.statement,
                });
                asked = true;
            }

            if !asked {
                break;
            }
            if let PromptContext::Turn { consultations, .. } = &mut context {
                consultations.clone_from(&answered);
            }
            reply = self.ask(speaker, responder.as_ref(), &context, stage).await?;
        }

        Ok(PreparedTurn {
            reply,
            consultations,
            warnings,
        })
    }
}

/// Consult requests in `reply` that were not handled earlier in the turn
fn pending_consults(
    reply: &ResponderReply,
    answered: &[ConsultationAnswer],
) -> Vec<(ParticipantId, String)> {
    let signals: Signals = reply
        .signals
        .clone()
        .merge(parse_signals(&reply.statement));
    signals
        .consult_requests()
        .filter(|(target, question)| {
            !answered
                .iter()
                .any(|a| a.target.matches(target.as_str()) && a.question == *question)
        })
        .map(|(target, question)| (target.clone(), question.to_string()))
        .collect()
}
