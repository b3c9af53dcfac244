//! Progress event emission.
//!
//! Lightweight, structured progress events for UI and scripted consumers of a
//! bulk run. Events go through a [`ProgressEmitter`]; the CLI writes them as
//! JSONL, tests subscribe through the [`EventBus`].

use std::collections::HashMap;
use std::io::Write;
use std::sync::{mpsc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard progress event names.
pub mod event_names {
    pub const BULK_STARTED: &str = "bulk_started";
    pub const BULK_PROGRESS: &str = "bulk_progress";
    pub const BULK_ITEM_FAILED: &str = "bulk_item_failed";
    pub const BULK_COMPLETE: &str = "bulk_complete";
}

/// Phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Bulk,
}

/// Progress counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Structured progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub event: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, Value>,
}

impl ProgressEvent {
    pub fn new(event: impl Into<String>, phase: Phase) -> Self {
        Self {
            event: event.into(),
            timestamp: Utc::now(),
            run_id: None,
            phase,
            progress: None,
            elapsed_ms: None,
            details: HashMap::new(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_progress(mut self, current: u64, total: Option<u64>) -> Self {
        self.progress = Some(Progress { current, total });
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.into(), v);
        }
        self
    }

    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Sink for progress events.
pub trait ProgressEmitter: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

impl ProgressEmitter for NoopEmitter {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Broadcast event bus supporting multiple subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    senders: Mutex<Vec<mpsc::Sender<ProgressEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        rx
    }

    /// Emit to all subscribers, dropping the ones that hung up.
    pub fn emit(&self, event: ProgressEvent) {
        if let Ok(mut senders) = self.senders.lock() {
            senders.retain(|sender| sender.send(event.clone()).is_ok());
        }
    }
}

impl ProgressEmitter for EventBus {
    fn emit(&self, event: ProgressEvent) {
        EventBus::emit(self, event);
    }
}

/// JSONL writer for progress events.
pub struct JsonlWriter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> ProgressEmitter for JsonlWriter<W> {
    fn emit(&self, event: ProgressEvent) {
        let line = event.to_jsonl();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_event_jsonl() {
        let event = ProgressEvent::new(event_names::BULK_PROGRESS, Phase::Bulk)
            .with_run_id("run-1")
            .with_progress(1, Some(3))
            .with_detail("row_id", "17");
        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"bulk_progress""#));
        assert!(json.contains(r#""phase":"bulk""#));
        assert!(json.contains(r#""current":1"#));
        assert!(!json.contains("elapsed_ms"));
    }

    #[test]
    fn test_event_bus_dispatch() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        bus.emit(ProgressEvent::new(event_names::BULK_STARTED, Phase::Bulk));
        let received = rx.recv().expect("event should be delivered");
        assert_eq!(received.event, event_names::BULK_STARTED);
    }

    #[test]
    fn test_event_bus_drops_closed_subscribers() {
        let bus = EventBus::new();
        drop(bus.subscribe());
        let rx = bus.subscribe();
        bus.emit(ProgressEvent::new(event_names::BULK_COMPLETE, Phase::Bulk));
        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(bus.senders.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_jsonl_writer_writes_lines() {
        let writer = JsonlWriter::new(Vec::new());
        writer.emit(ProgressEvent::new(event_names::BULK_STARTED, Phase::Bulk));
        writer.emit(ProgressEvent::new(event_names::BULK_COMPLETE, Phase::Bulk));
        let out = writer.writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }
}
