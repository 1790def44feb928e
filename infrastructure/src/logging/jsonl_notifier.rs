//! JSONL file writer for session events.
//!
//! Each [`SessionEvent`] is written as one JSON object per line: the payload
//! fields merged with `type`, `session`, `entity` and `timestamp`.

use council_application::{Notifier, SessionEvent};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Notifier that appends one JSON object per event.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and
/// on `Drop`.
pub struct JsonlEventNotifier {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventNotifier {
    /// Open (or create) the file at `path` for appending.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the event file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: &SessionEvent) -> Value {
        let mut map = match &event.payload {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other.clone());
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.kind.to_string()));
        map.insert(
            "session".to_string(),
            Value::String(event.session.to_string()),
        );
        if let Some(entity) = &event.entity {
            map.insert("entity".to_string(), Value::String(entity.clone()));
        }
        map.insert(
            "timestamp".to_string(),
            Value::String(
                event
                    .timestamp
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            ),
        );
        Value::Object(map)
    }
}

impl Notifier for JsonlEventNotifier {
    fn notify(&self, event: &SessionEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventNotifier {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_application::SessionEventKind;
    use council_domain::SessionId;
    use std::io::Read;

    fn read(path: &Path) -> Vec<Value> {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let notifier = JsonlEventNotifier::new(&path).unwrap();
        let session = SessionId::new("s-1");

        notifier.notify(
            &SessionEvent::new(SessionEventKind::TurnAdvanced, &session)
                .with_entity("b")
                .with_payload(serde_json::json!({ "previous": "a", "rule": "round_robin" })),
        );
        notifier.notify(&SessionEvent::new(SessionEventKind::Adjourned, &session));
        drop(notifier);

        let lines = read(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "session.turn.advanced");
        assert_eq!(lines[0]["session"], "s-1");
        assert_eq!(lines[0]["entity"], "b");
        assert_eq!(lines[0]["previous"], "a");
        assert!(lines[0].get("timestamp").is_some());
        assert_eq!(lines[1]["type"], "session.adjourned");
        assert!(lines[1].get("entity").is_none());
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let session = SessionId::new("s");
        for _ in 0..2 {
            let notifier = JsonlEventNotifier::new(&path).unwrap();
            notifier.notify(&SessionEvent::new(SessionEventKind::Started, &session));
        }
        assert_eq!(read(&path).len(), 2);
    }

    #[test]
    fn test_non_object_payload_is_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let notifier = JsonlEventNotifier::new(&path).unwrap();
        notifier.notify(
            &SessionEvent::new(SessionEventKind::Started, &SessionId::new("s"))
                .with_payload(serde_json::json!("just a string")),
        );
        drop(notifier);
        assert_eq!(read(&path)[0]["data"], "just a string");
    }
}
