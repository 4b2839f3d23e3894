use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::events::AuditEvent;

const AUDIT_FILE: &str = "actions.ndjson";

/// Default location of the audit log
fn audit_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hostadm/audit")
        .join(AUDIT_FILE)
}

/// Logger for administrative actions in ndjson format
pub struct AuditLogger {
    enabled: bool,
    max_size_bytes: u64,
    file_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a new audit logger
    ///
    /// If `enabled` is false, all log calls are no-ops.
    pub fn new(enabled: bool, max_size_bytes: u64) -> Self {
        Self::with_file_path(enabled, max_size_bytes, audit_file_path())
    }

    /// Create a logger writing to a specific file
    pub fn with_file_path(enabled: bool, max_size_bytes: u64, file_path: PathBuf) -> Self {
        let writer = if enabled {
            Self::open_writer(&file_path)
        } else {
            None
        };

        Self {
            enabled,
            max_size_bytes,
            file_path,
            writer,
        }
    }

    /// Log an administrative action
    ///
    /// Serializes the event as a single JSON line and appends to the log file.
    /// Logging failures are reported to stderr and never block administration.
    pub fn log(&mut self, event: &AuditEvent) {
        if !self.enabled {
            return;
        }

        // Ensure writer is open
        if self.writer.is_none() {
            self.writer = Self::open_writer(&self.file_path);
        }

        let writer = match self.writer.as_mut() {
            Some(w) => w,
            None => return,
        };

        // Serialize and write
        if let Ok(json) = serde_json::to_string(event) {
            if writeln!(writer, "{}", json).is_ok() {
                let _ = writer.flush();
            } else {
                // Write failed, try to reopen on next call
                self.writer = None;
            }
        }

        // Check rotation
        self.maybe_rotate();
    }

    /// Open or create the log file for appending
    fn open_writer(file_path: &Path) -> Option<BufWriter<File>> {
        // Ensure directory exists
        if let Some(dir) = file_path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                eprintln!("Failed to create audit directory: {}", e);
                return None;
            }
        }

        match OpenOptions::new().create(true).append(true).open(file_path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Failed to open audit log: {}", e);
                None
            }
        }
    }

    /// Rotate the log file if it exceeds max_size_bytes
    fn maybe_rotate(&mut self) {
        let metadata = match fs::metadata(&self.file_path) {
            Ok(m) => m,
            Err(_) => return,
        };

        if metadata.len() >= self.max_size_bytes {
            // Close current writer
            self.writer = None;

            // Rename current to .1
            let rotated = self.file_path.with_extension("ndjson.1");
            let _ = fs::rename(&self.file_path, &rotated);

            // Reopen fresh file
            self.writer = Self::open_writer(&self.file_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created_event(ts: i64, username: &str) -> AuditEvent {
        AuditEvent::UserCreated {
            ts,
            username: username.to_string(),
        }
    }

    #[test]
    fn test_disabled_logger_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test.ndjson");
        let mut logger = AuditLogger::with_file_path(false, 1024, file_path.clone());

        logger.log(&created_event(1234567890, "alice"));
        assert!(!file_path.exists());
    }

    #[test]
    fn test_ndjson_output() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test.ndjson");
        let mut logger = AuditLogger::with_file_path(true, 10_485_760, file_path.clone());

        logger.log(&created_event(1234567890, "alice"));

        let content = fs::read_to_string(&file_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["event"], "UserCreated");
        assert_eq!(parsed["username"], "alice");
    }

    #[test]
    fn test_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test.ndjson");
        // Very small limit to trigger rotation
        let mut logger = AuditLogger::with_file_path(true, 100, file_path.clone());

        for i in 0..10 {
            logger.log(&created_event(i, &format!("user-{}", i)));
        }

        let rotated = file_path.with_extension("ndjson.1");
        assert!(rotated.exists(), "Rotated file should exist");
    }
}
