//! Council orchestrator
//!
//! The transport-agnostic facade over council sessions. Every operation
//! resolves the session handle, serialises against other writes on that
//! session, performs any collaborator calls without holding the state lock,
//! then commits the domain mutation in one short critical section.
//!
//! ```text
//! request ─▶ SessionStore ─▶ SessionHandle ─┬─ write permit (held throughout)
//!                                           ├─ read snapshot ─▶ responder / scribe (timeout)
//!                                           └─ write lock ─▶ Session op ─▶ Notifier
//! ```
//!
//! | Operation     | Collaborator calls                | Event                     |
//! |---------------|-----------------------------------|---------------------------|
//! | `start`       | none                              | session.started           |
//! | `next`        | speaker, in-turn consultants      | session.turn.advanced     |
//! | `consult`     | target                            | none                      |
//! | `summon`      | newcomer                          | none                      |
//! | `call_vote`   | none                              | session.vote.called       |
//! | `poll_vote`   | pending voters (concurrently)     | none                      |
//! | `close_vote`  | none                              | session.vote.closed       |
//! | `decide`      | none                              | session.decision.recorded |
//! | `adjourn`     | scribe                            | session.adjourned         |

mod lifecycle;
mod side_channel;
mod turn;
mod types;
mod voting;


pub use types::{
    AdjournOutcome, ConsultOutcome, ConveneRequest, CouncilError, DecideRequest, PollReport,
    SummonRequest, VoteSubmission,
};

use crate::config::EngineParams;
use crate::ports::notifier::{NoNotifier, Notifier, SessionEvent};
use crate::ports::participant_responder::{
    ParticipantResponder, PromptContext, ResponderDirectory, ResponderError, ResponderReply,
};
use crate::ports::scribe::{NoScribe, Scribe};
use crate::store::{SessionHandle, SessionStore, WritePermit};
use council_domain::{DefaultSpeakerPolicy, ParticipantId, SessionId, SpeakerPolicy, Stage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Use case for running council sessions
pub struct CouncilOrchestrator {
    store: SessionStore,
    responders: Arc<dyn ResponderDirectory>,
    scribe: Arc<dyn Scribe>,
    notifier: Arc<dyn Notifier>,
    policy: Arc<dyn SpeakerPolicy>,
    params: EngineParams,
}

impl CouncilOrchestrator {
    pub fn new(responders: Arc<dyn ResponderDirectory>, params: EngineParams) -> Self {
        Self {
            store: SessionStore::new(),
            responders,
            scribe: Arc::new(NoScribe),
            notifier: Arc::new(NoNotifier),
            policy: Arc::new(DefaultSpeakerPolicy::new(params.convergence_threshold)),
            params,
        }
    }

    pub fn with_scribe(mut self, scribe: Arc<dyn Scribe>) -> Self {
        self.scribe = scribe;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the default rule-ordered speaker policy
    pub fn with_policy(mut self, policy: Arc<dyn SpeakerPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Ids of every live session
    pub async fn sessions(&self) -> Vec<SessionId> {
        self.store.ids().await
    }

    // ==================== Shared helpers ====================

    async fn handle(&self, id: &SessionId) -> Result<Arc<SessionHandle>, CouncilError> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| CouncilError::SessionNotFound(id.clone()))
    }

    async fn begin_write<'a>(
        &self,
        handle: &'a SessionHandle,
    ) -> Result<WritePermit<'a>, CouncilError> {
        match handle.begin_write(self.params.write_contention).await {
            Some(permit) => Ok(permit),
            None => Err(CouncilError::ConcurrentModification {
                session: handle.id().clone(),
                stage: handle.read().await.stage(),
            }),
        }
    }

    fn responder(
        &self,
        id: &ParticipantId,
        stage: Stage,
    ) -> Result<Arc<dyn ParticipantResponder>, CouncilError> {
        self.responders
            .resolve(id)
            .ok_or_else(|| CouncilError::CollaboratorFailed {
                collaborator: id.to_string(),
                message: "no responder registered".to_string(),
                stage,
            })
    }

    /// Call a responder bounded by the configured timeout
    async fn ask(
        &self,
        who: &ParticipantId,
        responder: &dyn ParticipantResponder,
        context: &PromptContext,
        stage: Stage,
    ) -> Result<ResponderReply, CouncilError> {
        debug!(participant = %who, kind = context.kind(), "Calling responder");
        match tokio::time::timeout(self.params.responder_timeout, responder.respond(context)).await
        {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                warn!(participant = %who, error = %e, "Responder failed");
                Err(responder_failed(who, e, stage))
            }
            Err(_) => {
                warn!(
                    participant = %who,
                    timeout = ?self.params.responder_timeout,
                    "Responder timed out"
                );
                Err(CouncilError::CollaboratorTimeout {
                    collaborator: who.to_string(),
                    timeout: self.params.responder_timeout,
                    stage,
                })
            }
        }
    }

    fn notify(&self, event: SessionEvent) {
        debug!(session = %event.session, event = %event.kind, "Notifying");
        self.notifier.notify(&event);
    }
}

fn responder_failed(who: &ParticipantId, error: ResponderError, stage: Stage) -> CouncilError {
    CouncilError::CollaboratorFailed {
        collaborator: who.to_string(),
        message: error.to_string(),
        stage,
    }
}
