//! Core types for log collection

use chrono::{DateTime, Utc};
use ddb_common::Port;

/// One line of emulator output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub port: Port,
    pub message: String,
}

impl LogEntry {
    pub fn new(port: Port, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            port,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_keeps_line_verbatim() {
        let before = Utc::now();
        let entry = LogEntry::new(Port::new(8000), "  Port:\t8000 ");

        assert_eq!(entry.port, Port::new(8000));
        assert_eq!(entry.message, "  Port:\t8000 ");
        assert!(entry.timestamp >= before);
    }
}
