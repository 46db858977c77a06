//! Summary statistics and the full result of one analysis run

use serde::Serialize;

use crate::detection::BruteForceDetector;
use crate::input::{LoadedLog, ParseStats};
use crate::models::{Attack, Severity};

/// Counts by severity plus the top attacker, present only when attacks exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryDetails {
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub top_attacker: String,
    pub max_attempts: usize,
}

/// Serializes to `{"total_attacks":0}` when nothing was detected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_attacks: usize,
    #[serde(flatten)]
    pub details: Option<SummaryDetails>,
}

/// Read-only reduction over detector output
pub struct SummaryReporter;

impl SummaryReporter {
    /// Summarize attacks already sorted by attempts descending.
    ///
    /// The first record is taken as the top attacker; no re-sorting happens here.
    pub fn summarize(attacks: &[Attack]) -> Summary {
        let Some(top) = attacks.first() else {
            return Summary {
                total_attacks: 0,
                details: None,
            };
        };

        let count = |severity: Severity| attacks.iter().filter(|a| a.severity == severity).count();

        Summary {
            total_attacks: attacks.len(),
            details: Some(SummaryDetails {
                critical_count: count(Severity::Critical),
                high_count: count(Severity::High),
                medium_count: count(Severity::Medium),
                low_count: count(Severity::Low),
                top_attacker: top.ip.clone(),
                max_attempts: top.attempts,
            }),
        }
    }
}

/// Everything one run produced, ready for output
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub stats: ParseStats,
    pub summary: Summary,
    pub attacks: Vec<Attack>,
}

impl AnalysisReport {
    /// Run detection over a loaded log and summarize the findings
    pub fn build(source: impl Into<String>, loaded: &LoadedLog, detector: &BruteForceDetector) -> Self {
        let attacks = detector.detect(&loaded.entries);
        let summary = SummaryReporter::summarize(&attacks);

        AnalysisReport {
            source: source.into(),
            stats: loaded.stats,
            summary,
            attacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LogSource;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn create_attack(ip: &str, attempts: usize) -> Attack {
        let ts = NaiveDate::from_ymd_opt(2026, 2, 12)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Attack {
            ip: ip.to_string(),
            attempts,
            first_seen: ts,
            last_seen: ts,
            endpoints: vec!["/login".to_string()],
            severity: Severity::from_attempts(attempts),
        }
    }

    /// 5 normal requests and 15 failed logins, 10 seconds apart
    fn sample_log_text() -> String {
        let mut text = String::new();
        for i in 0..15 {
            let stamp = format!("12/Feb/2026:10:{:02}:{:02} +0000", (i * 10) / 60, (i * 10) % 60);
            if i < 5 {
                text.push_str(&format!(
                    "10.0.0.1 - - [{}] \"GET /home HTTP/1.1\" 200 512 \"-\" \"Mozilla/5.0\"\n",
                    stamp
                ));
            }
            text.push_str(&format!(
                "203.0.113.50 - - [{}] \"POST /login HTTP/1.1\" 401 64 \"-\" \"Python/3.9\"\n",
                stamp
            ));
        }
        text
    }

    #[test]
    fn test_summary_empty() {
        let summary = SummaryReporter::summarize(&[]);
        assert_eq!(summary.total_attacks, 0);
        assert!(summary.details.is_none());
        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"total_attacks":0}"#
        );
    }

    #[test]
    fn test_summary_with_attacks() {
        let attacks = vec![
            create_attack("198.51.100.2", 60),
            create_attack("198.51.100.4", 30),
            create_attack("198.51.100.1", 12),
            create_attack("198.51.100.3", 11),
        ];
        let summary = SummaryReporter::summarize(&attacks);
        let details = summary.details.unwrap();

        assert_eq!(summary.total_attacks, 4);
        assert_eq!(details.critical_count, 1);
        assert_eq!(details.high_count, 1);
        assert_eq!(details.medium_count, 2);
        assert_eq!(details.low_count, 0);
        assert_eq!(details.top_attacker, "198.51.100.2");
        assert_eq!(details.max_attempts, 60);
    }

    #[test]
    fn test_summary_trusts_input_order() {
        let attacks = vec![create_attack("first", 12), create_attack("second", 40)];
        let summary = SummaryReporter::summarize(&attacks);
        assert_eq!(summary.details.unwrap().top_attacker, "first");
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = SummaryReporter::summarize(&[create_attack("203.0.113.50", 15)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_attacks"], 1);
        assert_eq!(json["medium_count"], 1);
        assert_eq!(json["top_attacker"], "203.0.113.50");
        assert_eq!(json["max_attempts"], 15);
    }

    #[test]
    fn test_end_to_end_report() {
        let log = LogSource::from_reader(Cursor::new(sample_log_text())).unwrap();
        assert_eq!(log.stats.parsed_count, 20);

        let report = AnalysisReport::build("sample.log", &log, &BruteForceDetector::new());
        assert_eq!(report.attacks.len(), 1);
        assert_eq!(report.attacks[0].ip, "203.0.113.50");
        assert_eq!(report.attacks[0].attempts, 15);
        assert_eq!(report.attacks[0].severity, Severity::Medium);

        let details = report.summary.details.unwrap();
        assert_eq!(details.top_attacker, "203.0.113.50");
        assert_eq!(details.max_attempts, 15);
    }

    #[test]
    fn test_report_without_failures() {
        let text: String = sample_log_text()
            .lines()
            .filter(|l| l.contains("\" 200 "))
            .map(|l| format!("{}\n", l))
            .collect();
        let log = LogSource::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(log.stats.parsed_count, 5);

        let report = AnalysisReport::build("normal.log", &log, &BruteForceDetector::new());
        assert!(report.attacks.is_empty());
        assert_eq!(report.summary.total_attacks, 0);
    }
}
