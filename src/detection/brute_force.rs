//! Sliding-window brute force detection
//!
//! Counts failed authentication attempts (401/403) per source IP inside a
//! forward-looking window anchored at each event, and reports the earliest
//! window that reaches the threshold.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};

use crate::models::{Attack, LogEntry, Severity};

const DEFAULT_THRESHOLD: usize = 10;
const DEFAULT_WINDOW_SECONDS: i64 = 300;
const MAX_ENDPOINTS: usize = 3;

/// Batch detector over a closed collection of parsed entries
#[derive(Debug, Clone)]
pub struct BruteForceDetector {
    /// Failed attempts inside one window needed to flag an IP
    threshold: usize,
    /// Window length measured from the anchoring event
    window: Duration,
    /// IPs exempt from detection
    whitelist: HashSet<String>,
}

impl BruteForceDetector {
    /// Create a detector with the default thresholds (10 attempts in 5 minutes)
    pub fn new() -> Self {
        BruteForceDetector {
            threshold: DEFAULT_THRESHOLD,
            window: Duration::seconds(DEFAULT_WINDOW_SECONDS),
            whitelist: HashSet::new(),
        }
    }

    /// Create with a custom threshold, window and whitelist
    pub fn with_config<I, S>(threshold: usize, window: Duration, whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BruteForceDetector {
            threshold,
            window,
            whitelist: whitelist.into_iter().map(Into::into).collect(),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn whitelist(&self) -> &HashSet<String> {
        &self.whitelist
    }

    /// Run one detection pass.
    ///
    /// Returns at most one attack per IP, sorted by attempts descending.
    /// Equal counts keep the order in which their IPs first appeared.
    pub fn detect(&self, entries: &[LogEntry]) -> Vec<Attack> {
        if entries.is_empty() {
            return Vec::new();
        }

        // Whitelist goes first so an exempt IP never reaches the status filter
        let failed: Vec<&LogEntry> = entries
            .iter()
            .filter(|e| !self.whitelist.contains(&e.ip))
            .filter(|e| e.is_failed_auth())
            .collect();

        if failed.is_empty() {
            log::info!("No failed auth attempts found");
            return Vec::new();
        }

        let mut attacks: Vec<Attack> = group_by_ip(&failed)
            .into_iter()
            .filter_map(|(ip, events)| self.scan_ip(ip, events))
            .collect();

        if attacks.is_empty() {
            log::info!("No brute force attacks detected");
            return attacks;
        }

        // Stable, so ties stay in discovery order
        attacks.sort_by(|a, b| b.attempts.cmp(&a.attempts));

        for attack in &attacks {
            log::warn!(
                "Brute force from {}: {} failed attempts between {} and {} [{}]",
                attack.ip,
                attack.attempts,
                attack.first_seen,
                attack.last_seen,
                attack.severity
            );
        }
        log::info!("Detected {} attack(s)", attacks.len());

        attacks
    }

    /// Scan one IP's failed attempts and stop at the first qualifying window.
    ///
    /// Undated attempts never enter a window but still feed the endpoint
    /// sample, after the dated ones.
    fn scan_ip(&self, ip: &str, mut events: Vec<(Option<NaiveDateTime>, &str)>) -> Option<Attack> {
        events.sort_by_key(|(timestamp, _)| (timestamp.is_none(), *timestamp));
        let timestamps: Vec<NaiveDateTime> = events.iter().filter_map(|(t, _)| *t).collect();

        // A window always holds its anchor, so the effective minimum is one
        let required = self.threshold.max(1);

        for (i, &start) in timestamps.iter().enumerate() {
            let remaining = &timestamps[i..];
            let hits = match start.checked_add_signed(self.window) {
                Some(end) => remaining.partition_point(|t| *t <= end),
                None => remaining.len(),
            };

            if hits >= required {
                return Some(Attack {
                    ip: ip.to_string(),
                    attempts: hits,
                    first_seen: start,
                    last_seen: remaining[hits - 1],
                    endpoints: distinct_endpoints(&events),
                    severity: Severity::from_attempts(hits),
                });
            }
        }

        None
    }
}

impl Default for BruteForceDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition failed attempts by IP, in order of first appearance.
fn group_by_ip<'a>(
    failed: &[&'a LogEntry],
) -> Vec<(&'a str, Vec<(Option<NaiveDateTime>, &'a str)>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<(Option<NaiveDateTime>, &str)>)> = Vec::new();

    for &entry in failed {
        let slot = *index.entry(entry.ip.as_str()).or_insert_with(|| {
            groups.push((entry.ip.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push((entry.timestamp, entry.endpoint.as_str()));
    }

    groups
}

fn distinct_endpoints(events: &[(Option<NaiveDateTime>, &str)]) -> Vec<String> {
    let mut endpoints: Vec<String> = Vec::with_capacity(MAX_ENDPOINTS);
    for (_, endpoint) in events {
        if endpoints.len() == MAX_ENDPOINTS {
            break;
        }
        if !endpoints.iter().any(|seen| seen == endpoint) {
            endpoints.push(endpoint.to_string());
        }
    }
    endpoints
}
