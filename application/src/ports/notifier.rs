//! Port for session event notification.
//!
//! Defines the [`Notifier`] trait the orchestrator calls once per state
//! transition. Delivery is best effort: `notify` is synchronous and
//! infallible, so a broken channel can never fail the operation that
//! produced the event.

use chrono::{DateTime, Utc};
use council_domain::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of state transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEventKind {
    #[serde(rename = "session.started")]
    Started,
    #[serde(rename = "session.turn.advanced")]
    TurnAdvanced,
    #[serde(rename = "session.vote.called")]
    VoteCalled,
    #[serde(rename = "session.vote.closed")]
    VoteClosed,
    #[serde(rename = "session.decision.recorded")]
    DecisionRecorded,
    #[serde(rename = "session.adjourned")]
    Adjourned,
}

impl SessionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEventKind::Started => "session.started",
            SessionEventKind::TurnAdvanced => "session.turn.advanced",
            SessionEventKind::VoteCalled => "session.vote.called",
            SessionEventKind::VoteClosed => "session.vote.closed",
            SessionEventKind::DecisionRecorded => "session.decision.recorded",
            SessionEventKind::Adjourned => "session.adjourned",
        }
    }
}

impl std::fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One state transition of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "type")]
    pub kind: SessionEventKind,
    pub session: SessionId,
    /// Id of the entity the transition is about (next speaker, vote id,
    /// decision id)
    pub entity: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Event-specific fields
    pub payload: Value,
}

impl SessionEvent {
    /// Create an event stamped with the current UTC time.
    pub fn new(kind: SessionEventKind, session: &SessionId) -> Self {
        Self {
            kind,
            session: session.clone(),
            entity: None,
            timestamp: Utc::now(),
            payload: Value::Null,
        }
    }

    pub fn with_entity(mut self, entity: impl ToString) -> Self {
        self.entity = Some(entity.to_string());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Fire-and-forget event sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &SessionEvent);
}

/// No-op implementation for tests and when notification is disabled.
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&self, _event: &SessionEvent) {}
}
