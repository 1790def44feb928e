//! Plain-text prompts for process-backed responders
//!
//! A responder that runs an external program receives one of these on
//! stdin. Participants steer the discussion through bracketed markers,
//! so every main-turn prompt ends with the marker reference.

use council_application::PromptContext;
use council_domain::{SessionDigest, TranscriptEntry};

/// Templates for each kind of request
pub struct PromptTemplate;

impl PromptTemplate {
    /// Marker reference appended to turn and summon prompts
    pub fn signal_reference() -> &'static str {
        r#"You may add any of these markers to your reply:
[SUPPORT: note] [CONCERN: note] [INFO NEEDED: detail] [YIELD]
[QUESTION: participant]      ask a participant directly; they speak next
[REQUEST FLOOR]              ask to speak again soon
[CONSULT: name | question]   ask someone outside the discussion a question before you answer"#
    }

    pub fn render(context: &PromptContext) -> String {
        match context {
            PromptContext::Turn {
                participant,
                digest,
                transcript_tail,
                consultations,
            } => {
                let mut prompt =
                    format!("You are {} in a moderated council session.\n\n", participant);
                prompt.push_str(&Self::digest(digest));
                prompt.push_str(&Self::transcript(transcript_tail));

                if !consultations.is_empty() {
                    prompt.push_str("\nAnswers to your consultations:\n");
                    for c in consultations {
                        prompt.push_str(&format!(
                            "\n--- {} was asked: {} ---\n{}\n",
                            c.target, c.question, c.answer
                        ));
                    }
                }

                prompt.push_str(&format!(
                    "\nYou have the floor. Give your statement.\n\n{}\n",
                    Self::signal_reference()
                ));
                prompt
            }
            PromptContext::Consultation { question } => format!(
                r#"You are being consulted by a member of a council session.
Answer the question below directly and concisely.

{}
"#,
                question
            ),
            PromptContext::Summon {
                briefing,
                reason,
                question,
            } => format!(
                r#"You have been summoned to a council session already under way.
Reason: {}

{}
The Chair asks: {}

Introduce yourself briefly and answer.

{}
"#,
                reason,
                briefing.render(),
                question,
                Self::signal_reference()
            ),
            PromptContext::VotePoll { question, options } => format!(
                r#"The Chair has called an advisory vote.

Question: {}
Options: {}

Reply in this format (answer "Abstain" to abstain):
POSITION: <one of the options>
CONFIDENCE: high | medium | low
RATIONALE: <one or two sentences>
"#,
                question,
                options.join(", ")
            ),
        }
    }

    fn digest(digest: &SessionDigest) -> String {
        let mut out = format!("Session: {}\nTopic: {}\n", digest.title, digest.topic);
        if !digest.agenda.is_empty() {
            out.push_str("Agenda:\n");
            for (i, item) in digest.agenda.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, item));
            }
        }
        let names: Vec<&str> = digest.participants.iter().map(|p| p.as_str()).collect();
        out.push_str(&format!("Participants: {}\n", names.join(", ")));
        if !digest.decisions.is_empty() {
            out.push_str("Decisions so far:\n");
            for d in &digest.decisions {
                out.push_str(&format!("- {}\n", d));
            }
        }
        out
    }

    fn transcript(entries: &[TranscriptEntry]) -> String {
        if entries.is_empty() {
            return String::new();
        }
        let mut out = String::from("\nRecent transcript:\n");
        for entry in entries {
            out.push_str(&format!("[{}] {}: {}\n", entry.seq, entry.speaker, entry.body));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_application::ConsultationAnswer;
    use council_domain::Briefing;

    fn digest() -> SessionDigest {
        SessionDigest {
            title: "Storage review".to_string(),
            topic: "Pick an engine".to_string(),
            agenda: vec!["Latency".to_string()],
            participants: vec!["a".into(), "b".into()],
            decisions: Vec::new(),
        }
    }

    #[test]
    fn test_turn_prompt_includes_context_and_markers() {
        let prompt = PromptTemplate::render(&PromptContext::Turn {
            participant: "a".into(),
            digest: digest(),
            transcript_tail: Vec::new(),
            consultations: vec![ConsultationAnswer {
                target: "oracle".into(),
                question: "p99?".to_string(),
                answer: "5ms".to_string(),
            }],
        });
        assert!(prompt.starts_with("You are a in a moderated council session."));
        assert!(prompt.contains("Topic: Pick an engine"));
        assert!(prompt.contains("1. Latency"));
        assert!(prompt.contains("Participants: a, b"));
        assert!(prompt.contains("--- oracle was asked: p99? ---\n5ms"));
        assert!(prompt.contains("[REQUEST FLOOR]"));
    }

    #[test]
    fn test_consultation_prompt_is_context_free() {
        let prompt = PromptTemplate::render(&PromptContext::Consultation {
            question: "Is X safe?".to_string(),
        });
        assert!(prompt.contains("Is X safe?"));
        assert!(!prompt.contains("Topic"));
    }

    #[test]
    fn test_summon_and_vote_prompts() {
        let summon = PromptTemplate::render(&PromptContext::Summon {
            briefing: Briefing {
                topic: "Pick an engine".to_string(),
                agenda: Vec::new(),
                decisions: Vec::new(),
                highlights: vec!["a: X is fast".to_string()],
            },
            reason: "storage expertise".to_string(),
            question: "Is X safe?".to_string(),
        });
        assert!(summon.contains("Reason: storage expertise"));
        assert!(summon.contains("- a: X is fast"));
        assert!(summon.contains("The Chair asks: Is X safe?"));

        let vote = PromptTemplate::render(&PromptContext::VotePoll {
            question: "X or Y?".to_string(),
            options: vec!["X".to_string(), "Y".to_string()],
        });
        assert!(vote.contains("Options: X, Y"));
        assert!(vote.contains("POSITION:"));
    }
}
