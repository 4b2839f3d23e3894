use serde::Serialize;

/// One administrative action, serialized as a single ndjson line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum AuditEvent {
    /// An account was created
    UserCreated { ts: i64, username: String },

    /// An account was deleted
    UserDeleted {
        ts: i64,
        username: String,
        removed_home: bool,
        /// Path of the home archive, when one was written
        archive: Option<String>,
    },

    /// A disk usage report was generated
    ReportGenerated {
        ts: i64,
        target: String,
        format: String,
        entries: usize,
        total_size: u64,
        unit: String,
    },
}

/// Current unix timestamp for event construction
pub fn ts_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AuditEvent::UserDeleted {
            ts: 1234567890,
            username: "alice".to_string(),
            removed_home: true,
            archive: Some("/var/backups/alice.tar.gz".to_string()),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["event"], "UserDeleted");
        assert_eq!(parsed["username"], "alice");
        assert_eq!(parsed["removed_home"], true);
        assert_eq!(parsed["archive"], "/var/backups/alice.tar.gz");
    }

    #[test]
    fn test_report_event_serialization() {
        let event = AuditEvent::ReportGenerated {
            ts: 1234567890,
            target: "/var".to_string(),
            format: "csv".to_string(),
            entries: 12,
            total_size: 4096,
            unit: "M".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["event"], "ReportGenerated");
        assert_eq!(parsed["entries"], 12);
        assert_eq!(parsed["total_size"], 4096);
    }
}
