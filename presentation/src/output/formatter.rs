//! Output formatter trait

use council_domain::{SessionSnapshot, SessionSummary};

/// Trait for formatting a finished session
pub trait OutputFormatter {
    /// Format the complete session: header, transcript, decisions, votes
    fn format(&self, snapshot: &SessionSnapshot) -> String;

    /// Format as JSON
    fn format_json(&self, snapshot: &SessionSnapshot) -> String;

    /// Format the adjourn summary only (concise output)
    fn format_summary(&self, summary: &SessionSummary) -> String;
}
