//! Operation console
//!
//! A bounded, leveled log of user-facing operation messages. Every entry is
//! also emitted through `tracing` so the console and the process log agree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::wallet::{ProgressEvent, ProgressObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

/// One console line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Shared console buffer; clones write to the same buffer
#[derive(Clone)]
pub struct ConsoleLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl ConsoleLog {
    /// Create a console keeping at most `capacity` entries (oldest dropped first)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => tracing::info!(target: "console", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "console", "{}", message),
            LogLevel::Error => tracing::error!(target: "console", "{}", message),
            LogLevel::Success => tracing::info!(target: "console", success = true, "{}", message),
        }

        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            timestamp: Utc::now(),
            level,
            message,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // Poisoning is ignored: entries are appended whole.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new(200)
    }
}

impl ProgressObserver for ConsoleLog {
    fn on_stage(&self, event: &ProgressEvent) {
        self.info(event.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::TransferStage;

    #[test]
    fn test_entries_keep_order_and_level() {
        let console = ConsoleLog::new(10);
        assert!(console.is_empty());

        console.info("Connecting...");
        console.success("Connected");
        console.error("Boom");

        let entries = console.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].message, "Connected");
        assert_eq!(entries[2].level, LogLevel::Error);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let console = ConsoleLog::new(2);
        console.info("one");
        console.info("two");
        console.info("three");

        let messages: Vec<String> = console.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_clones_share_buffer() {
        let console = ConsoleLog::new(5);
        let other = console.clone();
        other.warn("shared");
        assert_eq!(console.len(), 1);

        console.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_progress_events_become_info_lines() {
        let console = ConsoleLog::default();
        console.on_stage(&ProgressEvent::new("abc", TransferStage::Sign, 1, 3));

        let entries = console.entries();
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].message, "Signing public transaction...");
    }

    #[test]
    fn test_display_format() {
        let entry = LogEntry {
            timestamp: "2024-01-01T09:05:03Z".parse().unwrap(),
            level: LogLevel::Info,
            message: "hello".to_string(),
        };
        assert_eq!(entry.to_string(), "[09:05:03] hello");
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(serde_json::to_value(LogLevel::Success).unwrap(), "success");
    }
}
