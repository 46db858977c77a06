use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One parsed line of a combined-format access log.
///
/// Entries only come out of a full grammar match; there is no partially
/// populated form. Optional fields are `None` where the log wrote `-`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub ip: String,
    /// `None` when the bracketed field could not be decoded
    pub timestamp: Option<NaiveDateTime>,
    pub method: String,
    pub endpoint: String,
    pub protocol: String,
    pub status: u16,
    pub size: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl LogEntry {
    /// 401 Unauthorized or 403 Forbidden
    pub fn is_failed_auth(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: u16) -> LogEntry {
        LogEntry {
            ip: "10.0.0.1".to_string(),
            timestamp: None,
            method: "GET".to_string(),
            endpoint: "/".to_string(),
            protocol: "HTTP/1.1".to_string(),
            status,
            size: 0,
            referer: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_failed_auth_statuses() {
        assert!(entry(401).is_failed_auth());
        assert!(entry(403).is_failed_auth());
        assert!(!entry(200).is_failed_auth());
        assert!(!entry(404).is_failed_auth());
        assert!(!entry(500).is_failed_auth());
    }
}
