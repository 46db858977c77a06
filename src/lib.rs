pub mod config;
pub mod detection;
pub mod input;
pub mod models;
pub mod output;
pub mod report;

// Re-export commonly used types
pub use models::{Attack, LogEntry, Severity};
pub use detection::BruteForceDetector;
pub use input::{LoadedLog, LogSource, ParseStats, SourceError};
pub use report::{AnalysisReport, Summary, SummaryReporter};
pub use config::{Config, Overrides};
