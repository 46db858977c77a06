use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier of a brute force finding, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify a failed-attempt count.
    ///
    /// Total over all counts; `Low` is only reachable with a detector
    /// threshold below 10.
    pub fn from_attempts(attempts: usize) -> Self {
        if attempts >= 50 {
            Severity::Critical
        } else if attempts >= 25 {
            Severity::High
        } else if attempts >= 10 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A brute force finding, at most one per source IP and detection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub ip: String,
    /// Failed attempts inside the reported window
    pub attempts: usize,
    /// Start of the reported window
    pub first_seen: NaiveDateTime,
    /// Latest event inside the reported window
    pub last_seen: NaiveDateTime,
    /// Up to three distinct endpoints from the IP's whole failed-auth sequence
    pub endpoints: Vec<String>,
    pub severity: Severity,
}
