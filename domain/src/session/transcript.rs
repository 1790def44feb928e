//! Append-only session transcript
//!
//! The transcript is the audit ground truth of a session. Entries get a dense
//! sequence number on append and are never modified or removed afterwards;
//! [`Transcript`] exposes no API that could do either.

use crate::core::ids::{ParticipantId, Speaker};
use crate::policy::SelectionRule;
use crate::session::decision::DecisionId;
use crate::signal::Signals;
use crate::vote::{Confidence, Position, VoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Statement,
    ChairDirection,
    ProceduralNote,
    Summon,
    Consultation,
    VoteCall,
    VoteResponse,
    Decision,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Statement => "statement",
            EntryKind::ChairDirection => "chair_direction",
            EntryKind::ProceduralNote => "procedural_note",
            EntryKind::Summon => "summon",
            EntryKind::Consultation => "consultation",
            EntryKind::VoteCall => "vote_call",
            EntryKind::VoteResponse => "vote_response",
            EntryKind::Decision => "decision",
        }
    }

    pub const ALL: [EntryKind; 8] = [
        EntryKind::Statement,
        EntryKind::ChairDirection,
        EntryKind::ProceduralNote,
        EntryKind::Summon,
        EntryKind::Consultation,
        EntryKind::VoteCall,
        EntryKind::VoteResponse,
        EntryKind::Decision,
    ];
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured facts attached to an entry, beyond its free-text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EntryDetail {
    Direction {
        direct_to: Option<ParticipantId>,
    },
    Announcement {
        next: ParticipantId,
        rule: SelectionRule,
    },
    Consultation {
        target: ParticipantId,
        question: String,
    },
    Summon {
        participant: ParticipantId,
        reason: String,
        question: String,
    },
    VoteCall {
        vote: VoteId,
        options: Vec<String>,
        polled: Vec<ParticipantId>,
    },
    VoteResponse {
        vote: VoteId,
        position: Position,
        confidence: Confidence,
    },
    VoteClosed {
        vote: VoteId,
        forced: bool,
        non_responders: Vec<ParticipantId>,
    },
    Decision {
        decision: DecisionId,
        vote: Option<VoteId>,
    },
}

/// One atomic, timestamped, ordered fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Position in the transcript (0-based, dense)
    pub seq: usize,
    pub timestamp: DateTime<Utc>,
    pub speaker: Speaker,
    pub kind: EntryKind,
    pub body: String,
    #[serde(default, skip_serializing_if = "Signals::is_empty")]
    pub signals: Signals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EntryDetail>,
}

/// Entry content before it is sequenced
///
/// Drafts let an operation prepare several entries and commit them together,
/// so a failure half way leaves nothing behind.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub speaker: Speaker,
    pub kind: EntryKind,
    pub body: String,
    pub signals: Signals,
    pub detail: Option<EntryDetail>,
}

impl EntryDraft {
    pub fn new(speaker: Speaker, kind: EntryKind, body: impl Into<String>) -> Self {
        Self {
            speaker,
            kind,
            body: body.into(),
            signals: Signals::empty(),
            detail: None,
        }
    }

    pub fn facilitator(body: impl Into<String>) -> Self {
        Self::new(Speaker::Facilitator, EntryKind::ProceduralNote, body)
    }

    /// A side query by `by` to `target`, with the answer as body
    pub fn consultation(
        by: ParticipantId,
        target: ParticipantId,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self::new(Speaker::Participant(by), EntryKind::Consultation, answer).with_detail(
            EntryDetail::Consultation {
                target,
                question: question.into(),
            },
        )
    }

    pub fn with_signals(mut self, signals: Signals) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_detail(mut self, detail: EntryDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Append-only ordered sequence of entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence and timestamp a draft, returning the stored entry
    pub fn append(&mut self, draft: EntryDraft) -> &TranscriptEntry {
        let seq = self.entries.len();
        self.entries.push(TranscriptEntry {
            seq,
            timestamp: Utc::now(),
            speaker: draft.speaker,
            kind: draft.kind,
            body: draft.body,
            signals: draft.signals,
            detail: draft.detail,
        });
        &self.entries[seq]
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, seq: usize) -> Option<&TranscriptEntry> {
        self.entries.get(seq)
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// The last `n` entries (fewer if the transcript is shorter)
    pub fn tail(&self, n: usize) -> &[TranscriptEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Entries appended at or after `seq`
    pub fn since(&self, seq: usize) -> &[TranscriptEntry] {
        &self.entries[seq.min(self.entries.len())..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn statements(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Statement)
    }

    pub fn count_kind(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}
