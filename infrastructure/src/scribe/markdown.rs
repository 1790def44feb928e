//! Markdown minutes writer

use async_trait::async_trait;
use council_application::{Scribe, ScribeError, ScribeRecord};
use council_domain::{EntryKind, SessionSnapshot, Speaker};
use std::path::{Path, PathBuf};
use tracing::info;

/// Scribe that writes `<dir>/<session-id>.md`
#[derive(Debug, Clone)]
pub struct MarkdownScribe {
    dir: PathBuf,
}

impl MarkdownScribe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render the minutes of a session
    pub fn render(snapshot: &SessionSnapshot) -> String {
        let mut out = format!("# {}\n\n", snapshot.title);
        out.push_str(&format!("- **Topic:** {}\n", snapshot.topic));
        out.push_str(&format!(
            "- **Convened:** {}\n",
            snapshot.convened_at.format("%Y-%m-%d %H:%M UTC")
        ));
        out.push_str(&format!("- **Stage:** {}\n", snapshot.stage));
        let names: Vec<String> = snapshot
            .participants
            .iter()
            .map(|p| format!("{} ({})", p.id, p.origin))
            .collect();
        out.push_str(&format!("- **Participants:** {}\n", names.join(", ")));

        if !snapshot.agenda.is_empty() {
            out.push_str("\n## Agenda\n\n");
            for (i, item) in snapshot.agenda.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, item));
            }
        }

        out.push_str("\n## Decisions\n\n");
        if snapshot.decisions.is_empty() {
            out.push_str("_None recorded._\n");
        }
        for decision in &snapshot.decisions {
            out.push_str(&format!("- **{}** {}", decision.id, decision.text));
            if let Some(vote) = &decision.vote {
                out.push_str(&format!(" (after {})", vote));
            }
            out.push('\n');
            if let Some(rationale) = &decision.rationale {
                out.push_str(&format!("  - Rationale: {}\n", rationale));
            }
        }

        if !snapshot.votes.is_empty() {
            out.push_str("\n## Votes\n\n");
            for tally in &snapshot.votes {
                out.push_str(&format!(
                    "- **{}** {}: {}",
                    tally.vote_id,
                    tally.question,
                    tally.summary()
                ));
                if tally.forced {
                    out.push_str(" (closed early)");
                }
                out.push('\n');
            }
        }

        out.push_str("\n## Transcript\n\n");
        for entry in &snapshot.transcript {
            let speaker = match &entry.speaker {
                Speaker::Participant(id) => format!("**{}**", id),
                other => format!("_{}_", other),
            };
            match entry.kind {
                EntryKind::Statement => {
                    out.push_str(&format!("{}. {}: {}\n", entry.seq, speaker, entry.body))
                }
                kind => out.push_str(&format!(
                    "{}. {} [{}]: {}\n",
                    entry.seq,
                    speaker,
                    kind.as_str(),
                    entry.body
                )),
            }
        }
        out
    }
}

#[async_trait]
impl Scribe for MarkdownScribe {
    async fn summarize(&self, snapshot: &SessionSnapshot) -> Result<ScribeRecord, ScribeError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ScribeError::WriteFailed(format!("{}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(format!("{}.md", snapshot.id));
        tokio::fs::write(&path, Self::render(snapshot))
            .await
            .map_err(|e| ScribeError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        info!(session = %snapshot.id, path = %path.display(), "Minutes written");
        Ok(ScribeRecord {
            location: Some(path.display().to_string()),
            summary: format!(
                "{}: {} entries, {} decisions",
                snapshot.title,
                snapshot.transcript.len(),
                snapshot.decisions.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        DefaultSpeakerPolicy, ParticipantSpec, Session, SessionId, TurnResponse,
    };

    fn adjourned_snapshot() -> SessionSnapshot {
        let policy = DefaultSpeakerPolicy::default();
        let mut session = Session::convene(
            SessionId::new("s-42"),
            "Storage review",
            "Pick an engine",
            vec!["Latency".to_string()],
            vec![ParticipantSpec::new("a"), ParticipantSpec::new("b")],
        )
        .unwrap();
        session.start(None, None, &policy).unwrap();
        session
            .advance_turn(TurnResponse::new("X is fast."), &policy)
            .unwrap();
        session.decide("Use X", Some("fast"), Vec::new(), None).unwrap();
        session.adjourn(None).unwrap();
        session.snapshot()
    }

    #[test]
    fn test_render_sections() {
        let text = MarkdownScribe::render(&adjourned_snapshot());
        assert!(text.starts_with("# Storage review\n"));
        assert!(text.contains("- **Participants:** a (initial), b (initial)"));
        assert!(text.contains("1. Latency"));
        assert!(text.contains("Use X\n  - Rationale: fast"));
        assert!(text.contains("**a**: X is fast."));
        assert!(!text.contains("## Votes"));
    }

    #[tokio::test]
    async fn test_summarize_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let scribe = MarkdownScribe::new(dir.path().join("minutes"));
        let snapshot = adjourned_snapshot();

        let record = scribe.summarize(&snapshot).await.unwrap();
        let path = dir.path().join("minutes").join("s-42.md");
        assert_eq!(record.location, Some(path.display().to_string()));

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, MarkdownScribe::render(&snapshot));
    }
}
