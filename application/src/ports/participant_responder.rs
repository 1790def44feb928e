//! Participant responder port
//!
//! Defines the interface the engine uses to obtain statements from
//! participants, consultants and summoned newcomers. The engine never
//! branches on what sits behind a responder; it only knows the id.

use async_trait::async_trait;
use council_domain::{Briefing, ParticipantId, SessionDigest, Signals, TranscriptEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors a responder can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponderError {
    #[error("Responder unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid reply: {0}")]
    InvalidReply(String),
}

/// Answer obtained from a consultation during the current turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationAnswer {
    pub target: ParticipantId,
    pub question: String,
    pub answer: String,
}

/// What a responder is being asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PromptContext {
    /// A main turn: the participant has the floor
    Turn {
        participant: ParticipantId,
        digest: SessionDigest,
        /// Most recent transcript entries, oldest first
        transcript_tail: Vec<TranscriptEntry>,
        /// Answers to consultations requested earlier in this turn
        consultations: Vec<ConsultationAnswer>,
    },
    /// A side query: the target sees only the question
    Consultation { question: String },
    /// Joining mid-session
    Summon {
        briefing: Briefing,
        reason: String,
        question: String,
    },
    /// An advisory poll
    VotePoll {
        question: String,
        options: Vec<String>,
    },
}

impl PromptContext {
    pub fn kind(&self) -> &'static str {
        match self {
            PromptContext::Turn { .. } => "turn",
            PromptContext::Consultation { .. } => "consultation",
            PromptContext::Summon { .. } => "summon",
            PromptContext::VotePoll { .. } => "vote_poll",
        }
    }
}

/// A responder's answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponderReply {
    pub statement: String,
    /// Signals reported explicitly; bracketed markers in `statement` are
    /// parsed by the engine as well
    pub signals: Signals,
}

impl ResponderReply {
    pub fn text(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            signals: Signals::empty(),
        }
    }

    pub fn with_signals(mut self, signals: Signals) -> Self {
        self.signals = signals;
        self
    }
}

/// Anything that can speak in a session
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ParticipantResponder: Send + Sync {
    async fn respond(&self, context: &PromptContext) -> Result<ResponderReply, ResponderError>;
}

/// Lookup of responders by id
///
/// Covers session participants as well as consultants and reserves that
/// can be consulted or summoned.
pub trait ResponderDirectory: Send + Sync {
    fn resolve(&self, id: &ParticipantId) -> Option<Arc<dyn ParticipantResponder>>;

    /// Every id this directory can resolve
    fn ids(&self) -> Vec<ParticipantId>;
}

/// In-memory directory
#[derive(Default, Clone)]
pub struct ResponderRegistry {
    responders: Vec<(ParticipantId, Arc<dyn ParticipantResponder>)>,
    index: HashMap<ParticipantId, usize>,
}

impl ResponderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the responder for `id`
    pub fn register(
        &mut self,
        id: impl Into<ParticipantId>,
        responder: Arc<dyn ParticipantResponder>,
    ) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&i) => self.responders[i].1 = responder,
            None => {
                self.index.insert(id.clone(), self.responders.len());
                self.responders.push((id, responder));
            }
        }
    }

    pub fn with(
        mut self,
        id: impl Into<ParticipantId>,
        responder: Arc<dyn ParticipantResponder>,
    ) -> Self {
        self.register(id, responder);
        self
    }

    pub fn len(&self) -> usize {
        self.responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }
}

impl ResponderDirectory for ResponderRegistry {
    fn resolve(&self, id: &ParticipantId) -> Option<Arc<dyn ParticipantResponder>> {
        self.index
            .get(id)
            .map(|&i| &self.responders[i])
            .or_else(|| self.responders.iter().find(|(known, _)| known.matches(id.as_str())))
            .map(|(_, responder)| Arc::clone(responder))
    }

    fn ids(&self) -> Vec<ParticipantId> {
        self.responders.iter().map(|(id, _)| id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl ParticipantResponder for Fixed {
        async fn respond(
            &self,
            _context: &PromptContext,
        ) -> Result<ResponderReply, ResponderError> {
            Ok(ResponderReply::text(self.0))
        }
    }

    #[tokio::test]
    async fn test_registry_resolves_case_insensitively() {
        let registry = ResponderRegistry::new()
            .with("Alice", Arc::new(Fixed("hi")))
            .with("bob", Arc::new(Fixed("yo")));

        let responder = registry.resolve(&"alice".into()).unwrap();
        let reply = responder
            .respond(&PromptContext::Consultation {
                question: "?".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reply.statement, "hi");
        assert!(registry.resolve(&"carol".into()).is_none());
        assert_eq!(registry.ids(), vec![ParticipantId::from("Alice"), ParticipantId::from("bob")]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ResponderRegistry::new();
        registry.register("a", Arc::new(Fixed("1")));
        registry.register("a", Arc::new(Fixed("2")));
        assert_eq!(registry.len(), 1);
    }
}
