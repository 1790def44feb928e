//! Responder that replays configured lines
//!
//! Useful for dry runs and demos: each request takes the next line, and the
//! last line repeats once the script is exhausted.

use async_trait::async_trait;
use council_application::{ParticipantResponder, PromptContext, ResponderError, ResponderReply};
use std::sync::Mutex;

/// Reply used when no lines are configured
const SILENT_REPLY: &str = "I have nothing to add. [YIELD]";

pub struct ScriptedResponder {
    lines: Vec<String>,
    cursor: Mutex<usize>,
}

impl ScriptedResponder {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: Mutex::new(0),
        }
    }

    fn next_line(&self) -> Result<String, ResponderError> {
        let mut cursor = self
            .cursor
            .lock()
            .map_err(|_| ResponderError::Unavailable("script state poisoned".to_string()))?;
        let Some(last) = self.lines.len().checked_sub(1) else {
            return Ok(SILENT_REPLY.to_string());
        };
        let line = self.lines[(*cursor).min(last)].clone();
        *cursor += 1;
        Ok(line)
    }
}

#[async_trait]
impl ParticipantResponder for ScriptedResponder {
    async fn respond(&self, _context: &PromptContext) -> Result<ResponderReply, ResponderError> {
        Ok(ResponderReply::text(self.next_line()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask() -> PromptContext {
        PromptContext::Consultation {
            question: "?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_lines_replay_then_repeat_last() {
        let responder = ScriptedResponder::new(vec!["one".to_string(), "two".to_string()]);
        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(responder.respond(&ask()).await.unwrap().statement);
        }
        assert_eq!(replies, vec!["one", "two", "two"]);
    }

    #[tokio::test]
    async fn test_empty_script_yields() {
        let responder = ScriptedResponder::new(Vec::new());
        let reply = responder.respond(&ask()).await.unwrap();
        assert_eq!(reply.statement, SILENT_REPLY);
    }
}
