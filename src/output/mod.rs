use crate::models::Attack;
use crate::report::AnalysisReport;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output handler for analysis results
pub struct OutputHandler {
    format: OutputFormat,
    writer: Box<dyn Write + Send>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Whole report, pretty-printed
    Json,
    /// One attack per line
    Jsonl,
    Console,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "jsonl" => OutputFormat::Jsonl,
            _ => OutputFormat::Console, // Default
        }
    }
}

impl OutputHandler {
    /// Create a handler writing to a file (appending) or to stdout
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Result<Self, OutputError> {
        let writer: Box<dyn Write + Send> = match file_path {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout()),
        };

        Ok(OutputHandler { format, writer })
    }

    /// Create a handler over an arbitrary writer
    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write + Send>) -> Self {
        OutputHandler { format, writer }
    }

    /// Write the result of one analysis run
    pub fn write_report(&mut self, report: &AnalysisReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(report)?;
                writeln!(self.writer, "{}", json)?;
            }
            OutputFormat::Jsonl => {
                for attack in &report.attacks {
                    let json = serde_json::to_string(attack)?;
                    writeln!(self.writer, "{}", json)?;
                }
            }
            OutputFormat::Console => self.write_console(report)?,
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_console(&mut self, report: &AnalysisReport) -> io::Result<()> {
        let rule = "=".repeat(50);
        writeln!(self.writer, "{}", rule)?;
        writeln!(self.writer, "RESULTS: {}", report.source)?;
        writeln!(self.writer, "{}", rule)?;
        writeln!(self.writer, "Total lines         : {}", report.stats.total_lines)?;
        writeln!(self.writer, "Invalid/skipped     : {}", report.stats.invalid_count)?;
        writeln!(self.writer, "Total logs analyzed : {}", report.stats.parsed_count)?;
        writeln!(self.writer, "Attacks detected    : {}", report.summary.total_attacks)?;

        if let Some(details) = &report.summary.details {
            writeln!(self.writer, "Top attacker        : {}", details.top_attacker)?;
            writeln!(self.writer, "Max attempts        : {}", details.max_attempts)?;
            writeln!(
                self.writer,
                "By severity         : CRITICAL {} / HIGH {} / MEDIUM {} / LOW {}",
                details.critical_count, details.high_count, details.medium_count, details.low_count
            )?;
            writeln!(self.writer)?;
            writeln!(self.writer, "Detailed attacks:")?;
            for attack in &report.attacks {
                writeln!(self.writer, "  {}", format_attack(attack))?;
            }
        }
        Ok(())
    }

    /// Flush any buffered output
    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One-line human readable rendering of an attack
pub fn format_attack(attack: &Attack) -> String {
    format!(
        "[{}] {} - {} attempts from {} to {} ({})",
        attack.severity,
        attack.ip,
        attack.attempts,
        attack.first_seen,
        attack.last_seen,
        attack.endpoints.join(", ")
    )
}
