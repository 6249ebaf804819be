//! JSONL audit trail of the outcomes the binary emits.
//!
//! Each line carries:
//! - a monotonic sequence number
//! - an ISO 8601 timestamp with microsecond precision
//! - the session id shared by every line of one invocation
//! - the emitting component and the outcome record

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::commands::Outcome;
use crate::transport::{status_code, wire_record};

pub const LOG_FILE_NAME: &str = "audit.jsonl";

/// Append-only JSONL logger.
pub struct StructuredLogger {
    session_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub ts: String,
    pub session_id: String,
    pub component: String,
    pub event: Value,
}

impl StructuredLogger {
    /// Opens `<logs_dir>/audit.jsonl` for appending, creating the directory.
    pub fn new(session_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    /// Same as [`StructuredLogger::new`] with a fresh v4 session id.
    pub fn with_random_session(logs_dir: &Path) -> anyhow::Result<Self> {
        Self::new(&Uuid::new_v4().to_string(), logs_dir)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Writes one event as a single JSON line. Write errors are dropped.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            session_id: self.session_id.clone(),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    /// Records an outcome as its wire record plus the mapped status code.
    pub fn log_outcome<T: Serialize, E: Serialize>(
        &self,
        component: &str,
        outcome: &Outcome<T, E>,
    ) {
        let record = match wire_record(outcome) {
            Ok(record) => Value::Object(record),
            Err(err) => serde_json::json!({
                "state": outcome.state_name(),
                "error": err.to_string()
            }),
        };
        self.log(
            component,
            serde_json::json!({
                "type": "Outcome",
                "code": status_code(outcome),
                "record": record
            }),
        );
    }

    /// Records the start of a CLI command.
    pub fn log_command(&self, command: &str) {
        self.log(
            "Cli",
            serde_json::json!({
                "type": "Command",
                "command": command
            }),
        );
    }

    /// Records a command that hit the configured timeout.
    pub fn log_timeout(&self, command: &str, secs: u64) {
        self.log(
            "Cli",
            serde_json::json!({
                "type": "Timeout",
                "command": command,
                "secs": secs
            }),
        );
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
#[path = "tests/structured_logger_tests.rs"]
mod tests;
