//! Poll reply parsing.
//!
//! Responders answer a poll in free text. These functions extract a
//! position, a confidence level and a rationale from that text. Pure domain
//! logic, no I/O.
//!
//! # Supported Formats
//!
//! 1. **JSON** (preferred): `{"position": "X", "confidence": "high", "rationale": "..."}`
//! 2. **Labelled lines**: `POSITION: X` / `CONFIDENCE: low` / `RATIONALE: ...`
//! 3. **Bare mention**: exactly one allowed option named as a whole word
//!
//! Anything else is an abstention with medium confidence.

use super::ballot::{Confidence, Position};
use regex::Regex;

/// Structured form of a poll reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReply {
    pub position: Position,
    pub confidence: Confidence,
    pub rationale: String,
}

/// Parse a poll reply against the allowed options.
///
/// # Examples
///
/// ```
/// use council_domain::vote::{parse_vote_reply, Confidence, Position};
///
/// let options = vec!["X".to_string(), "Y".to_string()];
/// let reply = parse_vote_reply(r#"{"position": "y", "confidence": "high", "rationale": "cheaper"}"#, &options);
/// assert_eq!(reply.position, Position::Option("Y".to_string()));
/// assert_eq!(reply.confidence, Confidence::High);
///
/// let reply = parse_vote_reply("POSITION: X\nRATIONALE: proven", &options);
/// assert_eq!(reply.position, Position::Option("X".to_string()));
/// assert_eq!(reply.rationale, "proven");
/// ```
pub fn parse_vote_reply(text: &str, options: &[String]) -> VoteReply {
    if let Some(reply) = parse_json_reply(text, options) {
        return reply;
    }

    let position_line = labelled(text, &["POSITION", "VOTE", "CHOICE"]);
    let confidence = labelled(text, &["CONFIDENCE"])
        .and_then(|c| c.parse().ok())
        .unwrap_or_default();
    let rationale = labelled(text, &["RATIONALE", "REASONING", "REASON"])
        .map(str::to_string)
        .unwrap_or_else(|| text.trim().to_string());

    let position = match position_line {
        Some(raw) => resolve(raw, options).unwrap_or(Position::Abstain),
        None => single_mention(text, options).unwrap_or(Position::Abstain),
    };

    VoteReply {
        position,
        confidence,
        rationale,
    }
}

fn parse_json_reply(text: &str, options: &[String]) -> Option<VoteReply> {
    let start = text.find('{')?;
    let end = text[start..].rfind('}')?;
    let parsed: serde_json::Value = serde_json::from_str(&text[start..start + end + 1]).ok()?;

    let raw_position = ["position", "vote", "choice"]
        .iter()
        .find_map(|k| parsed.get(*k).and_then(|v| v.as_str()))?;

    let confidence = parsed
        .get("confidence")
        .and_then(|v| v.as_str())
        .and_then(|c| c.parse().ok())
        .unwrap_or_default();

    let rationale = ["rationale", "reasoning", "reason"]
        .iter()
        .find_map(|k| parsed.get(*k).and_then(|v| v.as_str()))
        .unwrap_or_default()
        .to_string();

    Some(VoteReply {
        position: resolve(raw_position, options).unwrap_or(Position::Abstain),
        confidence,
        rationale,
    })
}

/// Value of the first `LABEL: value` line matching one of `labels`
fn labelled<'a>(text: &'a str, labels: &[&str]) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let (label, value) = line.split_once(':')?;
        let label = label.trim().trim_matches(['*', '-', '#']).trim();
        labels
            .iter()
            .any(|l| l.eq_ignore_ascii_case(label))
            .then(|| value.trim().trim_start_matches('*').trim())
            .filter(|v| !v.is_empty())
    })
}

fn resolve(raw: &str, options: &[String]) -> Option<Position> {
    let raw = raw.trim().trim_matches(['"', '\'', '.', '*']).trim();
    if raw.eq_ignore_ascii_case("abstain") {
        return Some(Position::Abstain);
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(raw))
        .map(|o| Position::Option(o.clone()))
}

/// The only option mentioned as a whole word, if exactly one is
fn single_mention(text: &str, options: &[String]) -> Option<Position> {
    let mentioned: Vec<&String> = options
        .iter()
        .filter(|o| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(o)))
                .map(|re| re.is_match(text))
                .unwrap_or(false)
        })
        .collect();

    match mentioned.as_slice() {
        [only] => Some(Position::Option((*only).clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Postgres".to_string(), "SQLite".to_string()]
    }

    #[test]
    fn test_json_reply_inside_prose() {
        let text = r#"
Here is my vote:
```json
{"position": "sqlite", "confidence": "low", "rationale": "Single node is enough"}
```
"#;
        let reply = parse_vote_reply(text, &options());
        assert_eq!(reply.position, Position::Option("SQLite".to_string()));
        assert_eq!(reply.confidence, Confidence::Low);
        assert_eq!(reply.rationale, "Single node is enough");
    }

    #[test]
    fn test_json_with_unknown_option_abstains() {
        let reply = parse_vote_reply(r#"{"vote": "MySQL"}"#, &options());
        assert_eq!(reply.position, Position::Abstain);
        assert_eq!(reply.confidence, Confidence::Medium);
    }

    #[test]
    fn test_labelled_lines() {
        let text = "**Position:** Postgres\nConfidence: HIGH\nRationale: replication story";
        let reply = parse_vote_reply(text, &options());
        assert_eq!(reply.position, Position::Option("Postgres".to_string()));
        assert_eq!(reply.confidence, Confidence::High);
        assert_eq!(reply.rationale, "replication story");
    }

    #[test]
    fn test_explicit_abstain() {
        let reply = parse_vote_reply("POSITION: abstain", &options());
        assert_eq!(reply.position, Position::Abstain);
    }

    #[test]
    fn test_single_mention_fallback() {
        let reply = parse_vote_reply("I'd go with postgres here.", &options());
        assert_eq!(reply.position, Position::Option("Postgres".to_string()));
        assert_eq!(reply.rationale, "I'd go with postgres here.");
    }

    #[test]
    fn test_ambiguous_mention_abstains() {
        let reply = parse_vote_reply("Postgres or SQLite, both work.", &options());
        assert_eq!(reply.position, Position::Abstain);
    }

    #[test]
    fn test_whole_word_matching() {
        let options = vec!["X".to_string(), "Y".to_string()];
        // "Xylophone" must not count as a mention of X.
        let reply = parse_vote_reply("Xylophone aside, Y it is", &options);
        assert_eq!(reply.position, Position::Option("Y".to_string()));
    }
}
