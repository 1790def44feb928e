//! Session lifecycle and Chair operations.

use super::{AdjournOutcome, ConveneRequest, CouncilError, CouncilOrchestrator, DecideRequest};
use crate::ports::notifier::{SessionEvent, SessionEventKind};
use council_domain::{
    ChairOutcome, Decision, DomainError, ParticipantId, Session, SessionId, SessionSnapshot,
    SessionStatus, TranscriptEntry, TurnDirective,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

impl CouncilOrchestrator {
    /// Create a session in the `convened` stage.
    ///
    /// Every initial participant must have a registered responder. A
    /// caller-chosen id that is already live is rejected.
    pub async fn convene(&self, request: ConveneRequest) -> Result<SessionId, CouncilError> {
        if let Some(missing) = request
            .participants
            .iter()
            .find(|p| self.responders.resolve(&p.id).is_none())
        {
            return Err(DomainError::InvalidSession {
                reason: format!("no responder registered for '{}'", missing.id),
            }
            .into());
        }

        let id = request
            .id
            .unwrap_or_else(|| SessionId::new(Uuid::new_v4().to_string()));
        let session = Session::convene(
            id.clone(),
            request.title,
            request.topic,
            request.agenda,
            request.participants,
        )?
        .with_consensus_rule(self.params.consensus_rule);

        let title = session.title().to_string();
        let participants = session.participants().len();
        if !self.store.insert(session).await {
            return Err(DomainError::InvalidSession {
                reason: format!("session id '{}' is already in use", id),
            }
            .into());
        }

        info!(session = %id, title = %title, participants, "Session convened");
        Ok(id)
    }

    /// Open the session and hand the floor to the opener.
    pub async fn start(
        &self,
        id: &SessionId,
        opening_remarks: Option<&str>,
        first_speaker: Option<&ParticipantId>,
    ) -> Result<TurnDirective, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let directive = handle.write(&permit).await.start(
            opening_remarks,
            first_speaker,
            self.policy.as_ref(),
        )?;

        info!(session = %id, opener = %directive.next_speaker, "Session started");
        self.notify(
            SessionEvent::new(SessionEventKind::Started, id)
                .with_entity(&directive.next_speaker)
                .with_payload(json!({ "announcement": directive.announcement })),
        );
        Ok(directive)
    }

    /// Chair interjection. Does not consume a turn.
    pub async fn speak(
        &self,
        id: &SessionId,
        statement: &str,
        direct_to: Option<&ParticipantId>,
    ) -> Result<ChairOutcome, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let outcome = handle.write(&permit).await.speak(statement, direct_to)?;
        for warning in &outcome.warnings {
            warn!(session = %id, "{}", warning);
        }
        info!(session = %id, directed_to = ?outcome.directed_to, "Chair spoke");
        Ok(outcome)
    }

    /// Queue a floor request; `false` when the participant was already queued.
    pub async fn request_floor(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
    ) -> Result<bool, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let queued = handle.write(&permit).await.request_floor(participant)?;
        info!(session = %id, participant = %participant, queued, "Floor requested");
        Ok(queued)
    }

    /// Record a Chair decision.
    pub async fn decide(
        &self,
        id: &SessionId,
        request: DecideRequest,
    ) -> Result<Decision, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let decision = handle.write(&permit).await.decide(
            &request.text,
            request.rationale.as_deref(),
            request.action_items,
            request.vote.as_ref(),
        )?;

        info!(session = %id, decision = %decision.id, vote = ?decision.vote, "Decision recorded");
        self.notify(
            SessionEvent::new(SessionEventKind::DecisionRecorded, id)
                .with_entity(&decision.id)
                .with_payload(json!({
                    "text": decision.text,
                    "vote": decision.vote,
                })),
        );
        Ok(decision)
    }

    /// Close the session for good.
    ///
    /// The scribe sees the adjourned session before anything is committed;
    /// if it fails or times out the session stays in session.
    pub async fn adjourn(
        &self,
        id: &SessionId,
        closing_remarks: Option<&str>,
    ) -> Result<AdjournOutcome, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let (mut adjourned, stage) = {
            let session = handle.read().await;
            (session.clone(), session.stage())
        };
        let summary = adjourned.adjourn(closing_remarks)?;
        let snapshot = adjourned.snapshot();

        let record = match tokio::time::timeout(
            self.params.scribe_timeout,
            self.scribe.summarize(&snapshot),
        )
        .await
        {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                warn!(session = %id, error = %e, "Scribe failed");
                return Err(CouncilError::CollaboratorFailed {
                    collaborator: "scribe".to_string(),
                    message: e.to_string(),
                    stage,
                });
            }
            Err(_) => {
                warn!(session = %id, "Scribe timed out");
                return Err(CouncilError::CollaboratorTimeout {
                    collaborator: "scribe".to_string(),
                    timeout: self.params.scribe_timeout,
                    stage,
                });
            }
        };

        *handle.write(&permit).await = adjourned;

        info!(
            session = %id,
            entries = summary.entries,
            decisions = summary.decisions.len(),
            "Session adjourned"
        );
        self.notify(
            SessionEvent::new(SessionEventKind::Adjourned, id).with_payload(json!({
                "entries": summary.entries,
                "decisions": summary.decisions.len(),
                "record": record.location,
            })),
        );
        Ok(AdjournOutcome { summary, record })
    }

    // ==================== Queries ====================

    /// Consistent status; never waits for an in-flight external call.
    pub async fn status(&self, id: &SessionId) -> Result<SessionStatus, CouncilError> {
        Ok(self.handle(id).await?.read().await.status())
    }

    /// Transcript entries from `since` (inclusive) onward
    pub async fn transcript(
        &self,
        id: &SessionId,
        since: usize,
    ) -> Result<Vec<TranscriptEntry>, CouncilError> {
        Ok(self
            .handle(id)
            .await?
            .read()
            .await
            .transcript()
            .since(since)
            .to_vec())
    }

    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, CouncilError> {
        Ok(self.handle(id).await?.read().await.snapshot())
    }

    /// Remove a session from the store.
    pub async fn dispose(&self, id: &SessionId) -> Result<(), CouncilError> {
        match self.store.dispose(id).await {
            Some(_) => {
                info!(session = %id, "Session disposed");
                Ok(())
            }
            None => Err(CouncilError::SessionNotFound(id.clone())),
        }
    }
}
