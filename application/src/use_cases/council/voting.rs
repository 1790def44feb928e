//! Advisory votes.

use super::{CouncilError, CouncilOrchestrator, PollReport, VoteSubmission};
use crate::ports::notifier::{SessionEvent, SessionEventKind};
use crate::ports::participant_responder::PromptContext;
use council_domain::{SessionId, VoteId, VoteResponse, VoteTally, parse_vote_reply};
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::json;
use tracing::{info, warn};

impl CouncilOrchestrator {
    /// Open a vote polling every current participant.
    pub async fn call_vote(
        &self,
        id: &SessionId,
        question: &str,
        options: Vec<String>,
    ) -> Result<VoteId, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let (vote, options, polled) = {
            let mut session = handle.write(&permit).await;
            let vote = session.call_vote(question, options)?;
            let open = session.open_vote(&vote)?;
            (vote, open.options.clone(), open.polled.clone())
        };

        info!(session = %id, vote = %vote, polled = polled.len(), "Vote called");
        self.notify(
            SessionEvent::new(SessionEventKind::VoteCalled, id)
                .with_entity(&vote)
                .with_payload(json!({
                    "question": question.trim(),
                    "options": options,
                    "polled": polled,
                })),
        );
        Ok(vote)
    }

    /// Record a position supplied directly by the caller.
    pub async fn submit_vote(
        &self,
        id: &SessionId,
        submission: VoteSubmission,
    ) -> Result<VoteResponse, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let response = handle
            .write(&permit)
            .await
            .submit_vote_response(
                &submission.vote,
                &submission.participant,
                &submission.position,
                &submission.rationale,
                submission.confidence,
            )?
            .clone();

        info!(
            session = %id,
            vote = %submission.vote,
            participant = %response.participant,
            position = %response.position,
            "Vote response recorded"
        );
        Ok(response)
    }

    /// Ask every polled participant that has not answered yet, concurrently.
    ///
    /// Replies are parsed into positions and recorded in completion order.
    /// A participant that times out or fails is reported, not an error;
    /// it simply stays unanswered.
    pub async fn poll_vote(
        &self,
        id: &SessionId,
        vote: &VoteId,
    ) -> Result<PollReport, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let (pending, question, options) = {
            let session = handle.read().await;
            let open = session.open_vote(vote)?;
            (open.pending(), open.question.clone(), open.options.clone())
        };

        let mut report = PollReport::default();
        let context = PromptContext::VotePoll {
            question,
            options: options.clone(),
        };
        let timeout = self.params.responder_timeout;

        let mut polls = FuturesUnordered::new();
        for participant in pending {
            let Some(responder) = self.responders.resolve(&participant) else {
                report
                    .failed
                    .push((participant, "no responder registered".to_string()));
                continue;
            };
            let context = &context;
            polls.push(async move {
                let result = tokio::time::timeout(timeout, responder.respond(context)).await;
                (participant, result)
            });
        }

        while let Some((participant, result)) = polls.next().await {
            match result {
                Ok(Ok(reply)) => {
                    let parsed = parse_vote_reply(&reply.statement, &options);
                    let recorded = handle.write(&permit).await.submit_vote_response(
                        vote,
                        &participant,
                        &parsed.position.to_string(),
                        &parsed.rationale,
                        parsed.confidence,
                    )
                    .map(|_| ());
                    match recorded {
                        Ok(()) => report.submitted.push(participant),
                        Err(e) => report.failed.push((participant, e.to_string())),
                    }
                }
                Ok(Err(e)) => {
                    warn!(session = %id, participant = %participant, error = %e, "Poll failed");
                    report.failed.push((participant, e.to_string()));
                }
                Err(_) => {
                    warn!(session = %id, participant = %participant, "Poll timed out");
                    report.timed_out.push(participant);
                }
            }
        }

        info!(
            session = %id,
            vote = %vote,
            submitted = report.submitted.len(),
            timed_out = report.timed_out.len(),
            failed = report.failed.len(),
            "Vote polled"
        );
        Ok(report)
    }

    /// Close the vote and resume the suspended turn. Never decides.
    pub async fn close_vote(
        &self,
        id: &SessionId,
        vote: &VoteId,
        force: bool,
    ) -> Result<VoteTally, CouncilError> {
        let handle = self.handle(id).await?;
        let permit = self.begin_write(&handle).await?;

        let tally = handle.write(&permit).await.close_vote(vote, force)?;

        info!(session = %id, vote = %vote, tally = %tally.summary(), forced = force, "Vote closed");
        self.notify(
            SessionEvent::new(SessionEventKind::VoteClosed, id)
                .with_entity(vote)
                .with_payload(json!({
                    "tally": tally.summary(),
                    "forced": tally.forced,
                    "non_responders": tally.non_responders,
                    "leading": tally.advisory.leading,
                    "rule_satisfied": tally.advisory.satisfied,
                })),
        );
        Ok(tally)
    }
}
