//! Signal marker parsing.
//!
//! Pure text scanning, no I/O. Markers are bracketed, case-insensitive and
//! tolerant of `_`, `-` and repeated spaces inside the keyword:
//!
//! | Marker | Signal |
//! |--------|--------|
//! | `[YIELD]` | [`Signal::Yield`] |
//! | `[REQUEST FLOOR]`, `[FLOOR]` | [`Signal::RequestFloor`] |
//! | `[QUESTION: X]`, `[QUESTION TO X]` | [`Signal::DirectQuestion`] |
//! | `[CONSULT: X \| question]` | [`Signal::ConsultRequest`] |
//! | `[CONCERN]`, `[CONCERN: note]` | [`Signal::Concern`] |
//! | `[SUPPORT]`, `[SUPPORT: note]` | [`Signal::Support`] |
//! | `[INFO NEEDED]`, `[INFO NEEDED: detail]` | [`Signal::InfoNeeded`] |
//!
//! Unknown or malformed markers are skipped.

use super::{Signal, Signals};
use crate::core::ids::ParticipantId;
use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*([^\]:\[]+?)\s*(?::\s*([^\]]*?)\s*)?\]").expect("marker pattern is valid")
});

static QUESTION_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^question[\s_-]+to\s+(.+)$").expect("question-to pattern is valid")
});

/// Extract every recognised signal from a statement, in textual order.
///
/// # Examples
///
/// ```
/// use council_domain::signal::{parse_signals, Signal};
///
/// let signals = parse_signals("I disagree. [CONCERN: cost] [QUESTION: ops]");
/// assert_eq!(signals.len(), 2);
/// assert_eq!(signals.direct_question().unwrap().as_str(), "ops");
/// ```
pub fn parse_signals(text: &str) -> Signals {
    let mut signals = Vec::new();

    for caps in MARKER.captures_iter(text) {
        let tag = &caps[1];
        let payload = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|p| !p.is_empty());

        let signal = match QUESTION_TO.captures(tag) {
            Some(question) if payload.is_none() => {
                participant(&question[1]).map(|target| Signal::DirectQuestion { target })
            }
            _ => classify(&normalize_keyword(tag), payload),
        };

        if let Some(signal) = signal
            && !signals.contains(&signal)
        {
            signals.push(signal);
        }
    }

    Signals::new(signals)
}

/// Uppercase and collapse `_`, `-` and runs of whitespace to single spaces
fn normalize_keyword(raw: &str) -> String {
    raw.replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn classify(keyword: &str, payload: Option<&str>) -> Option<Signal> {
    match keyword {
        "YIELD" => Some(Signal::Yield),
        "REQUEST FLOOR" | "FLOOR" => Some(Signal::RequestFloor),
        "QUESTION" => payload.and_then(participant).map(|target| Signal::DirectQuestion { target }),
        "CONSULT" => payload.and_then(parse_consult),
        "CONCERN" => Some(Signal::Concern {
            note: payload.map(str::to_string),
        }),
        "SUPPORT" => Some(Signal::Support {
            note: payload.map(str::to_string),
        }),
        "INFO NEEDED" => Some(Signal::InfoNeeded {
            detail: payload.map(str::to_string),
        }),
        _ => None,
    }
}

fn parse_consult(payload: &str) -> Option<Signal> {
    let (target, question) = payload.split_once('|')?;
    let question = question.trim();
    if question.is_empty() {
        return None;
    }
    Some(Signal::ConsultRequest {
        target: participant(target)?,
        question: question.to_string(),
    })
}

fn participant(name: &str) -> Option<ParticipantId> {
    ParticipantId::try_new(name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers() {
        assert!(parse_signals("Plain statement without directives.").is_empty());
        assert!(parse_signals("").is_empty());
    }

    #[test]
    fn test_yield_and_floor() {
        let signals = parse_signals("That's all from me [YIELD] but [request_floor] later");
        assert!(signals.yields());
        assert!(signals.requests_floor());

        assert!(parse_signals("[Floor]").requests_floor());
        assert!(parse_signals("[ request - floor ]").requests_floor());
    }

    #[test]
    fn test_direct_question_forms() {
        let signals = parse_signals("What about latency? [QUESTION: ops]");
        assert_eq!(signals.direct_question().unwrap().as_str(), "ops");

        let signals = parse_signals("[question to data_eng]");
        assert_eq!(signals.direct_question().unwrap().as_str(), "data_eng");
    }

    #[test]
    fn test_question_to_reserved_name_is_ignored() {
        assert!(parse_signals("[QUESTION: Chair]").is_empty());
        assert!(parse_signals("[QUESTION:]").is_empty());
    }

    #[test]
    fn test_consult_request() {
        let signals = parse_signals("[CONSULT: legal | Can we store EU data in us-east?]");
        let consults: Vec<_> = signals.consult_requests().collect();
        assert_eq!(consults.len(), 1);
        assert_eq!(consults[0].0.as_str(), "legal");
        assert_eq!(consults[0].1, "Can we store EU data in us-east?");
    }

    #[test]
    fn test_malformed_consult_is_skipped() {
        assert!(parse_signals("[CONSULT: legal]").is_empty());
        assert!(parse_signals("[CONSULT: legal | ]").is_empty());
    }

    #[test]
    fn test_concern_support_info_with_and_without_notes() {
        let signals = parse_signals("[CONCERN] [SUPPORT: option X] [INFO_NEEDED: load numbers]");
        let collected: Vec<_> = signals.iter().cloned().collect();
        assert_eq!(
            collected,
            vec![
                Signal::Concern { note: None },
                Signal::Support {
                    note: Some("option X".to_string())
                },
                Signal::InfoNeeded {
                    detail: Some("load numbers".to_string())
                },
            ]
        );
        assert!(signals.has_highlight());
    }

    #[test]
    fn test_unknown_markers_ignored_and_order_kept() {
        let signals = parse_signals("[TODO] [SUPPORT] see [1] [YIELD]");
        let labels: Vec<_> = signals.iter().map(Signal::label).collect();
        assert_eq!(labels, vec!["support", "yield"]);
    }

    #[test]
    fn test_duplicate_markers_collapse() {
        let signals = parse_signals("[YIELD] [yield]");
        assert_eq!(signals.len(), 1);
    }
}
