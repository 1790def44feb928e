//! Read-only views of a session

use super::decision::Decision;
use super::participant::Participant;
use super::stage::Stage;
use super::transcript::TranscriptEntry;
use crate::core::ids::{ParticipantId, SessionId};
use crate::util::excerpt;
use crate::vote::{VoteId, VoteTally};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The one thing a session is doing right now
///
/// Derived from the session state; exactly one variant holds at any instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum ActiveMode {
    NotStarted,
    TurnOpen(ParticipantId),
    VoteInProgress(VoteId),
    Finished,
}

impl std::fmt::Display for ActiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveMode::NotStarted => write!(f, "not started"),
            ActiveMode::TurnOpen(id) => write!(f, "{} has the floor", id),
            ActiveMode::VoteInProgress(id) => write!(f, "vote {} open", id),
            ActiveMode::Finished => write!(f, "finished"),
        }
    }
}

/// Progress of the open vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteProgress {
    pub id: VoteId,
    pub question: String,
    pub options: Vec<String>,
    pub responded: Vec<ParticipantId>,
    pub pending: Vec<ParticipantId>,
}

/// Consistent point-in-time status for `status` queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub id: SessionId,
    pub title: String,
    pub topic: String,
    pub stage: Stage,
    pub mode: ActiveMode,
    pub participants: Vec<ParticipantId>,
    pub floor_requests: Vec<ParticipantId>,
    pub transcript_len: usize,
    pub decisions: usize,
    pub closed_votes: usize,
    pub active_vote: Option<VoteProgress>,
    pub turns_since_chair: usize,
}

/// Returned by `adjourn`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub entries: usize,
    /// Entry count per kind (`statement`, `vote_call`, ...), kinds with no
    /// entries omitted
    pub entries_by_kind: BTreeMap<String, usize>,
    pub turns: BTreeMap<ParticipantId, usize>,
    pub summoned: Vec<ParticipantId>,
    pub decisions: Vec<Decision>,
    pub votes: Vec<VoteTally>,
}

/// Everything an external record keeper needs, detached from the live session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub title: String,
    pub topic: String,
    pub agenda: Vec<String>,
    pub stage: Stage,
    pub convened_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
    pub transcript: Vec<TranscriptEntry>,
    pub decisions: Vec<Decision>,
    pub votes: Vec<VoteTally>,
}

/// Session context handed to a responder on a main turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDigest {
    pub title: String,
    pub topic: String,
    pub agenda: Vec<String>,
    pub participants: Vec<ParticipantId>,
    /// `summary_line` of every decision so far
    pub decisions: Vec<String>,
}

/// Size limits of a summon briefing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingLimits {
    pub max_decisions: usize,
    pub max_highlights: usize,
    /// Characters kept from each highlighted entry
    pub max_excerpt_chars: usize,
}

impl Default for BriefingLimits {
    fn default() -> Self {
        Self {
            max_decisions: 5,
            max_highlights: 8,
            max_excerpt_chars: 280,
        }
    }
}

/// Bounded introduction for a summoned participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub topic: String,
    pub agenda: Vec<String>,
    /// Most recent decisions, oldest first
    pub decisions: Vec<String>,
    /// `speaker: excerpt` lines of flagged statements and decisions
    pub highlights: Vec<String>,
}

impl Briefing {
    pub(crate) fn highlight(entry: &TranscriptEntry, limit: usize) -> String {
        format!("{}: {}", entry.speaker, excerpt(&entry.body, limit))
    }

    /// Plain-text rendering suitable for a prompt
    pub fn render(&self) -> String {
        let mut out = format!("Topic: {}\n", self.topic);
        if !self.agenda.is_empty() {
            out.push_str("\nAgenda:\n");
            for (i, item) in self.agenda.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, item));
            }
        }
        if !self.decisions.is_empty() {
            out.push_str("\nDecisions so far:\n");
            for d in &self.decisions {
                out.push_str(&format!("- {}\n", d));
            }
        }
        if !self.highlights.is_empty() {
            out.push_str("\nDiscussion highlights:\n");
            for h in &self.highlights {
                out.push_str(&format!("- {}\n", h));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_briefing_render_skips_empty_sections() {
        let briefing = Briefing {
            topic: "Storage".to_string(),
            agenda: vec![],
            decisions: vec!["D-20260101-001 Use X".to_string()],
            highlights: vec![],
        };
        let text = briefing.render();
        assert!(text.starts_with("Topic: Storage"));
        assert!(text.contains("- D-20260101-001 Use X"));
        assert!(!text.contains("Agenda"));
        assert!(!text.contains("highlights"));
    }

    #[test]
    fn test_active_mode_display() {
        assert_eq!(
            ActiveMode::TurnOpen("alice".into()).to_string(),
            "alice has the floor"
        );
        assert_eq!(ActiveMode::Finished.to_string(), "finished");
    }
}
