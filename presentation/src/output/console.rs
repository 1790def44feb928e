//! Console output formatter for council sessions

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{
    EntryKind, SessionSnapshot, SessionStatus, SessionSummary, Speaker, TranscriptEntry,
    TurnDirective, VoteTally,
};

/// Formats sessions for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete session
    pub fn format(snapshot: &SessionSnapshot) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&snapshot.title));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), snapshot.topic));
        let names: Vec<String> = snapshot
            .participants
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        output.push_str(&format!(
            "{} {}\n",
            "Participants:".cyan().bold(),
            names.join(", ")
        ));
        if !snapshot.agenda.is_empty() {
            output.push_str(&format!("{}\n", "Agenda:".cyan().bold()));
            for (i, item) in snapshot.agenda.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, item));
            }
        }

        output.push_str(&Self::section_header("Transcript"));
        for entry in &snapshot.transcript {
            output.push_str(&Self::format_entry(entry));
        }

        if !snapshot.votes.is_empty() {
            output.push_str(&Self::section_header("Votes"));
            for tally in &snapshot.votes {
                output.push_str(&Self::format_tally(tally));
            }
        }

        output.push_str(&Self::section_header("Decisions"));
        if snapshot.decisions.is_empty() {
            output.push_str(&format!("{}\n", "No decisions recorded.".dimmed()));
        }
        for decision in &snapshot.decisions {
            output.push_str(&format!("  * {}\n", decision.summary_line()));
            if let Some(rationale) = &decision.rationale {
                output.push_str(&format!("    {}\n", rationale.dimmed()));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// One transcript entry, colored by who spoke and what kind it is
    pub fn format_entry(entry: &TranscriptEntry) -> String {
        let seq = format!("{:>3}", entry.seq).dimmed();
        let body = Self::indent(&entry.body, "      ");
        let body = body.trim_start();

        let speaker = match &entry.speaker {
            Speaker::Chair => "Chair".magenta().bold(),
            Speaker::Facilitator => "Facilitator".dimmed(),
            Speaker::Participant(id) => id.as_str().yellow().bold(),
        };

        match entry.kind {
            EntryKind::Statement => format!("{} {}: {}\n", seq, speaker, body),
            EntryKind::ProceduralNote => format!("{} {}\n", seq, body.dimmed()),
            EntryKind::Decision => format!("{} {} {}\n", seq, "DECISION".green().bold(), body),
            kind => {
                let tag = format!("[{}]", kind.as_str()).cyan();
                format!("{} {} {}: {}\n", seq, tag, speaker, body)
            }
        }
    }

    /// The outcome of one `next` call
    pub fn format_directive(directive: &TurnDirective) -> String {
        let mut output = format!(
            "{} {} ({})\n",
            "→".cyan(),
            directive.announcement,
            directive.rule.to_string().dimmed()
        );
        for warning in &directive.warnings {
            output.push_str(&format!("  {} {}\n", "warning:".yellow(), warning));
        }
        if let Some(prompt) = &directive.chair_prompt {
            output.push_str(&format!("  {} {}\n", "Chair:".magenta().bold(), prompt));
        }
        output
    }

    pub fn format_tally(tally: &VoteTally) -> String {
        let mut output = format!(
            "  {} {}\n",
            format!("{}", tally.vote_id).bold(),
            tally.question
        );
        for group in &tally.groups {
            let voters: Vec<String> = group
                .responses
                .iter()
                .map(|r| r.participant.to_string())
                .collect();
            output.push_str(&format!(
                "    {:<12} {:>2}  {}\n",
                group.position.to_string(),
                group.count(),
                voters.join(", ").dimmed()
            ));
        }
        if !tally.non_responders.is_empty() {
            let missing: Vec<String> = tally.non_responders.iter().map(|p| p.to_string()).collect();
            output.push_str(&format!("    {} {}\n", "No response:".yellow(), missing.join(", ")));
        }
        let advisory = &tally.advisory;
        let verdict = match (&advisory.leading, advisory.satisfied) {
            (Some(leading), true) => {
                format!("{} meets the {} rule", leading, advisory.rule).green()
            }
            (Some(leading), false) => format!(
                "{} leads with {} of {} needed under {}",
                leading,
                advisory.support,
                advisory.needed.unwrap_or_default(),
                advisory.rule
            )
            .yellow(),
            (None, _) => "no single leading option".yellow(),
        };
        output.push_str(&format!("    {}\n", verdict));
        output
    }

    pub fn format_status(status: &SessionStatus) -> String {
        let mut output = format!(
            "{} {} [{}]\n",
            "Session".cyan().bold(),
            status.title,
            status.stage
        );
        output.push_str(&format!("  {}\n", status.mode));
        if !status.floor_requests.is_empty() {
            let queue: Vec<String> = status.floor_requests.iter().map(|p| p.to_string()).collect();
            output.push_str(&format!("  Floor requests: {}\n", queue.join(", ")));
        }
        if let Some(vote) = &status.active_vote {
            output.push_str(&format!(
                "  Vote {}: {} of {} responded\n",
                vote.id,
                vote.responded.len(),
                vote.responded.len() + vote.pending.len()
            ));
        }
        output.push_str(&format!(
            "  {} entries, {} decisions\n",
            status.transcript_len, status.decisions
        ));
        output
    }

    /// Format as JSON
    pub fn format_json(snapshot: &SessionSnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the adjourn summary (concise output)
    pub fn format_summary(summary: &SessionSummary) -> String {
        let mut output = format!("{}\n\n", format!("=== {} ===", summary.title).cyan().bold());

        output.push_str(&format!("{} {}\n", "Entries:".bold(), summary.entries));
        for (kind, count) in &summary.entries_by_kind {
            output.push_str(&format!("  {:<16} {}\n", kind, count));
        }

        output.push_str(&format!("\n{}\n", "Turns:".bold()));
        for (participant, turns) in &summary.turns {
            output.push_str(&format!("  {:<16} {}\n", participant.as_str(), turns));
        }
        if !summary.summoned.is_empty() {
            let names: Vec<String> = summary.summoned.iter().map(|p| p.to_string()).collect();
            output.push_str(&format!("{} {}\n", "Summoned:".bold(), names.join(", ")));
        }

        if !summary.votes.is_empty() {
            output.push_str(&format!("\n{}\n", "Votes:".bold()));
            for tally in &summary.votes {
                output.push_str(&format!("  {} {}\n", tally.vote_id, tally.summary()));
            }
        }

        output.push_str(&format!("\n{}\n", "Decisions:".green().bold()));
        if summary.decisions.is_empty() {
            output.push_str("  (none)\n");
        }
        for decision in &summary.decisions {
            output.push_str(&format!("  * {}\n", decision.summary_line()));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, snapshot: &SessionSnapshot) -> String {
        Self::format(snapshot)
    }

    fn format_json(&self, snapshot: &SessionSnapshot) -> String {
        Self::format_json(snapshot)
    }

    fn format_summary(&self, summary: &SessionSummary) -> String {
        Self::format_summary(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{DefaultSpeakerPolicy, ParticipantSpec, Session, SessionId, TurnResponse};

    fn finished() -> (SessionSnapshot, SessionSummary) {
        colored::control::set_override(false);
        let policy = DefaultSpeakerPolicy::default();
        let mut session = Session::convene(
            SessionId::new("s"),
            "Storage review",
            "Pick an engine",
            Vec::new(),
            vec![ParticipantSpec::new("a"), ParticipantSpec::new("b")],
        )
        .unwrap();
        session.start(None, None, &policy).unwrap();
        session
            .advance_turn(TurnResponse::new("X is fast.\nAnd proven."), &policy)
            .unwrap();
        let vote = session
            .call_vote("X or Y?", vec!["X".to_string(), "Y".to_string()])
            .unwrap();
        session
            .submit_vote_response(&vote, &"a".into(), "X", "fast", Default::default())
            .unwrap();
        session.close_vote(&vote, true).unwrap();
        session.decide("Use X", None, Vec::new(), None).unwrap();
        let summary = session.adjourn(None).unwrap();
        (session.snapshot(), summary)
    }

    #[test]
    fn test_format_full_session() {
        let (snapshot, _) = finished();
        let text = ConsoleFormatter::format(&snapshot);
        assert!(text.contains("Storage review"));
        assert!(text.contains("Participants: a, b"));
        assert!(text.contains("a: X is fast.\n      And proven."));
        assert!(text.contains("No response: b"));
        assert!(text.contains("Use X (after V-001)"));
    }

    #[test]
    fn test_format_summary() {
        let (_, summary) = finished();
        let text = ConsoleFormatter::format_summary(&summary);
        assert!(text.contains("=== Storage review ==="));
        assert!(text.contains("statement"));
        assert!(text.contains("V-001 X:1 Y:0 Abstain:0"));
    }

    #[test]
    fn test_format_json_round_trips() {
        let (snapshot, _) = finished();
        let json = ConsoleFormatter::format_json(&snapshot);
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
