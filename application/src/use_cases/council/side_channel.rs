//! Consultations and summons.
//!
//! Both are ordinary awaited calls made on behalf of the turn in flight.
//! Neither moves the floor.

use super::{ConsultOutcome, CouncilError, CouncilOrchestrator, SummonRequest};
use crate::ports::participant_responder::PromptContext;
use council_domain::{DomainError, Participant, ParticipantId, SessionId};
use tracing::info;

impl CouncilOrchestrator {
    /// Put a context-free question from the current speaker to any
    /// resolvable responder and record the answer.
    pub async fn consult(
        &self,
        id: &SessionId,
        by: &ParticipantId,
        target: &ParticipantId,
        question: &str,
    ) -> Result<ConsultOutcome, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let stage = {
            let session = handle.read().await;
            session.check_consult(by)?;
            session.stage()
        };
        let consultant = self
            .responders
            .resolve(target)
            .ok_or_else(|| DomainError::UnknownParticipant {
                participant: target.to_string(),
                stage,
            })?;

        let context = PromptContext::Consultation {
            question: question.trim().to_string(),
        };
        let reply = self.ask(target, consultant.as_ref(), &context, stage).await?;

        let seq = handle
            .write(&permit)
            .await
            .record_consultation(by, target, question.trim(), &reply.statement)?
            .seq;

        info!(session = %id, by = %by, target = %target, seq, "Consultation recorded");
        Ok(ConsultOutcome {
            seq,
            answer: reply.statement,
        })
    }

    /// Brief a new participant, record its reply and add it to the session.
    pub async fn summon(
        &self,
        id: &SessionId,
        request: SummonRequest,
    ) -> Result<Participant, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;
        let newcomer = request.participant.id.clone();

        let (briefing, stage) = {
            let session = handle.read().await;
            session.check_summon(&newcomer)?;
            (session.briefing(&self.params.briefing), session.stage())
        };
        let responder = self
            .responders
            .resolve(&newcomer)
            .ok_or_else(|| DomainError::UnknownParticipant {
                participant: newcomer.to_string(),
                stage,
            })?;

        let context = PromptContext::Summon {
            briefing,
            reason: request.reason.clone(),
            question: request.question.clone(),
        };
        let reply = self.ask(&newcomer, responder.as_ref(), &context, stage).await?;

        let participant = handle
            .write(&permit)
            .await
            .admit_summoned(
                request.participant,
                &request.reason,
                &request.question,
                &reply.statement,
                reply.signals,
            )?
            .clone();

        info!(
            session = %id,
            participant = %participant.id,
            reason = %request.reason,
            "Participant summoned"
        );
        Ok(participant)
    }
}
