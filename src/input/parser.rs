//! Combined access-log line parser
//!
//! Grammar:
//! `<ip> <ident> <user> [<timestamp>] "<method> <path> <protocol>" <status> <size> "<referer>" "<user-agent>"`
//!
//! A line either matches in full or yields no entry. Timestamps that fail to
//! decode do not reject the line; the entry keeps `timestamp: None`.

use crate::models::LogEntry;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static RE_COMBINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+) \S+ \S+ \[([^\]]+)\] "(\S+) (\S+) ([^"]+)" (\d{3}) (\d+|-) "([^"]*)" "([^"]*)"$"#,
    )
    .expect("combined log regex")
});

static RE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})/([A-Za-z]{3})/(\d{4}):(\d{2}):(\d{2}):(\d{2})$").expect("timestamp regex")
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse one raw line. Returns `None` for blank or malformed input.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let caps = RE_COMBINED.captures(line)?;

    let status: u16 = caps[6].parse().ok()?;
    // The grammar guarantees digits, so a parse failure can only be overflow
    let size = match &caps[7] {
        "-" => 0,
        raw => raw.parse::<u64>().unwrap_or(u64::MAX),
    };

    Some(LogEntry {
        ip: caps[1].to_string(),
        timestamp: parse_timestamp(&caps[2]),
        method: caps[3].to_string(),
        endpoint: caps[4].to_string(),
        protocol: caps[5].to_string(),
        status,
        size,
        referer: optional_field(&caps[8]),
        user_agent: optional_field(&caps[9]),
    })
}

/// Decode `DD/Mon/YYYY:HH:MM:SS ±ZZZZ`.
///
/// Only the part before the first space is used, so the UTC offset is
/// discarded. Month abbreviations are case-sensitive.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let local = raw.split_whitespace().next()?;
    let caps = RE_TIMESTAMP.captures(local)?;

    let day: u32 = caps[1].parse().ok()?;
    let month = MONTHS.iter().position(|m| *m == &caps[2])? as u32 + 1;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let second: u32 = caps[6].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

fn optional_field(raw: &str) -> Option<String> {
    match raw {
        "-" => None,
        value => Some(value.to_string()),
    }
}
