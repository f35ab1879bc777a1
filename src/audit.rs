//! Audit trail
//!
//! Appends one JSON line per wallet operation start/completion and per
//! announced transfer stage. Writing never blocks or fails an operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::wallet::{ProgressEvent, ProgressObserver};

/// Entry in the audit log
#[derive(Debug, Serialize)]
struct AuditEntry {
    timestamp: DateTime<Utc>,
    entry_type: &'static str,
    operation: String,
    details: Value,
    error: Option<String>,
    duration_ms: u64,
    status: &'static str,
}

/// Writer for audit log entries
struct AuditLogWriter {
    path: PathBuf,
}

impl AuditLogWriter {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

/// JSONL audit log shared by the wallet service
#[derive(Clone)]
pub struct AuditLog {
    writer: Arc<Mutex<AuditLogWriter>>,
}

impl AuditLog {
    /// Create a new audit log
    ///
    /// # Arguments
    /// * `log_path` - Path to the audit log file (JSONL format)
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(AuditLogWriter::new(log_path.into()))),
        }
    }

    /// Record the start of an operation
    pub fn record_start(&self, operation: &str, details: Value) {
        self.append(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "operation_start",
            operation: operation.to_string(),
            details,
            error: None,
            duration_ms: 0,
            status: "pending",
        });
    }

    /// Record the outcome of an operation
    pub fn record_complete(
        &self,
        operation: &str,
        details: Value,
        error: Option<String>,
        duration_ms: u64,
    ) {
        let status = if error.is_some() { "error" } else { "success" };
        self.append(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "operation_complete",
            operation: operation.to_string(),
            details,
            error,
            duration_ms,
            status,
        });
    }

    fn append(&self, entry: AuditEntry) {
        let writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writer.write(&entry) {
            tracing::warn!(error = %e, "Failed to write audit log entry");
        }
    }
}

impl ProgressObserver for AuditLog {
    fn on_stage(&self, event: &ProgressEvent) {
        self.append(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "transfer_stage",
            operation: "transfer".to_string(),
            details: serde_json::to_value(event).unwrap_or(Value::Null),
            error: None,
            duration_ms: 0,
            status: "pending",
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::TransferStage;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn read_lines(path: &std::path::Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_logs_operation() {
        let temp_file = NamedTempFile::new().unwrap();
        let audit = AuditLog::new(temp_file.path());

        audit.record_start("transfer", json!({ "amount": 10.0, "shielded": true }));
        audit.on_stage(&ProgressEvent::new(
            "k2j3",
            TransferStage::GenerateProof,
            1,
            4,
        ));
        audit.record_complete("transfer", json!({ "id": "k2j3" }), None, 5100);

        let lines = read_lines(temp_file.path());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["entry_type"], "operation_start");
        assert_eq!(lines[1]["entry_type"], "transfer_stage");
        assert_eq!(lines[1]["details"]["stage"], "generate_proof");
        assert_eq!(lines[2]["status"], "success");
        assert_eq!(lines[2]["duration_ms"], 5100);
    }

    #[test]
    fn test_logs_failure() {
        let temp_file = NamedTempFile::new().unwrap();
        let audit = AuditLog::new(temp_file.path());

        audit.record_complete("connect", json!({}), Some("boom".to_string()), 3);

        let lines = read_lines(temp_file.path());
        assert_eq!(lines[0]["status"], "error");
        assert_eq!(lines[0]["error"], "boom");
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let audit = AuditLog::new("/nonexistent-dir/audit.jsonl");
        audit.record_start("connect", json!({}));
    }
}
