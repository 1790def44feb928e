//! Scribe port
//!
//! The scribe produces the externally persisted record of a session. It is
//! called once, at adjourn; the engine never reads what it wrote.

use async_trait::async_trait;
use council_domain::SessionSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScribeError {
    #[error("Failed to write session record: {0}")]
    WriteFailed(String),

    #[error("Scribe error: {0}")]
    Other(String),
}

/// Where and what the scribe recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScribeRecord {
    /// File path, URL or other locator of the record, if any
    pub location: Option<String>,
    pub summary: String,
}

#[async_trait]
pub trait Scribe: Send + Sync {
    async fn summarize(&self, snapshot: &SessionSnapshot) -> Result<ScribeRecord, ScribeError>;
}

/// Scribe that records nothing
pub struct NoScribe;

#[async_trait]
impl Scribe for NoScribe {
    async fn summarize(&self, snapshot: &SessionSnapshot) -> Result<ScribeRecord, ScribeError> {
        Ok(ScribeRecord {
            location: None,
            summary: format!(
                "{}: {} entries, {} decisions",
                snapshot.title,
                snapshot.transcript.len(),
                snapshot.decisions.len()
            ),
        })
    }
}
