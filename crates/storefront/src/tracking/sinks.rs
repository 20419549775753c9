//! Tracking sink implementations.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use super::{PixelCall, TrackingError, TrackingSink};

/// Discards every call. Used when no pixel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl TrackingSink for NoopSink {
    fn emit(&self, _call: &PixelCall) -> Result<(), TrackingError> {
        Ok(())
    }
}

/// Writes every call to the debug log. Used when no pixel is configured but
/// debug logging is on, so pixel calls can be inspected locally.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TrackingSink for LogSink {
    fn emit(&self, call: &PixelCall) -> Result<(), TrackingError> {
        let params = serde_json::to_string(&call.params)?;
        tracing::debug!(
            method = %call.method,
            event = %call.event,
            %params,
            "Tracked"
        );
        Ok(())
    }
}

/// Keeps every call in memory, for assertions and previews.
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<PixelCall>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PixelCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Names of every call received so far, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.event).collect()
    }

    /// How many calls named `event` were received.
    #[must_use]
    pub fn count(&self, event: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.event == event)
            .count()
    }
}

impl TrackingSink for MemorySink {
    fn emit(&self, call: &PixelCall) -> Result<(), TrackingError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }
        Ok(())
    }
}

/// Line written by [`JsonlSink`].
#[derive(Serialize)]
struct PixelLine<'a> {
    pixel_id: &'a str,
    at: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    call: &'a PixelCall,
}

/// Appends calls as JSON lines to a local outbox file, tagged with the pixel ID.
///
/// Stands in for the pixel's network transport in offline runs.
#[derive(Debug)]
pub struct JsonlSink {
    pixel_id: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlSink {
    /// File name used inside the data directory.
    pub const FILE_NAME: &'static str = "pixel-events.jsonl";

    /// Open (or create) the outbox in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Transport` if the file cannot be opened.
    pub fn open(data_dir: &Path, pixel_id: impl Into<String>) -> Result<Self, TrackingError> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(Self::FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            pixel_id: pixel_id.into(),
            path,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrackingSink for JsonlSink {
    fn emit(&self, call: &PixelCall) -> Result<(), TrackingError> {
        let line = serde_json::to_string(&PixelLine {
            pixel_id: &self.pixel_id,
            at: chrono::Utc::now(),
            call,
        })?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("pixel outbox lock poisoned"))?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Map, Value};

    use super::*;
    use crate::tracking::PixelMethod;

    fn call(event: &str) -> PixelCall {
        PixelCall {
            method: PixelMethod::TrackCustom,
            event: event.to_string(),
            params: Map::new(),
        }
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(&call("A")).unwrap();
        sink.emit(&call("B")).unwrap();
        sink.emit(&call("A")).unwrap();

        assert_eq!(sink.event_names(), ["A", "B", "A"]);
        assert_eq!(sink.count("A"), 2);
        assert_eq!(sink.count("C"), 0);
    }

    #[test]
    fn test_noop_and_log_sinks_accept_calls() {
        assert!(NoopSink.emit(&call("A")).is_ok());
        assert!(LogSink.emit(&call("A")).is_ok());
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::open(dir.path(), "1234567890").unwrap();
        sink.emit(&call("ScrollDepth")).unwrap();
        sink.emit(&call("EngagementTime")).unwrap();

        let raw = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["pixel_id"], "1234567890");
        assert_eq!(lines[0]["method"], "trackCustom");
        assert_eq!(lines[1]["event"], "EngagementTime");
    }
}
