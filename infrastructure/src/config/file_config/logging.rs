//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily-rotated tracing log; none disables file logging
    pub dir: Option<String>,
    /// JSONL file receiving one line per session event
    pub events_file: Option<String>,
    /// Directory where the markdown scribe writes session minutes
    pub minutes_dir: Option<String>,
}
