use std::path::PathBuf;
use structopt::StructOpt;

use brutewatch::config::{Config, Overrides};
use brutewatch::input::LogSource;
use brutewatch::output::{OutputFormat, OutputHandler};
use brutewatch::report::AnalysisReport;

/// Brute force detection for web-server access logs
#[derive(StructOpt, Debug)]
#[structopt(name = "brutewatch", about = "Access-log brute force detector")]
pub enum Cli {
    /// Analyze a log file for brute force attacks
    Analyze {
        /// Path to access log (overrides input.file_path)
        #[structopt(short, long)]
        file: Option<PathBuf>,
        /// Path to configuration file
        #[structopt(short, long)]
        config: Option<PathBuf>,
        /// Failed attempts within the window that flag an IP
        #[structopt(short, long)]
        threshold: Option<usize>,
        /// Sliding window size in minutes
        #[structopt(short, long)]
        window: Option<i64>,
        /// IP to ignore (repeatable)
        #[structopt(long = "whitelist", number_of_values = 1)]
        whitelist: Vec<String>,
        /// Output format: console, json or jsonl
        #[structopt(long)]
        format: Option<String>,
        /// Write results to this file instead of stdout
        #[structopt(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse and display log entries from a file
    Parse {
        /// Path to access log
        #[structopt(short, long)]
        file: PathBuf,
        /// Number of entries to show
        #[structopt(short, long, default_value = "10")]
        lines: usize,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::from_args() {
        Cli::Analyze {
            file,
            config,
            threshold,
            window,
            whitelist,
            format,
            output,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::default(),
            };
            config.apply_overrides(Overrides {
                file_path: file,
                threshold,
                window_minutes: window,
                whitelist,
                format,
                output,
            });
            config.validate()?;

            let file = match config.input.file_path.clone() {
                Some(file) => file,
                None => {
                    eprintln!("No log file given; use --file or set input.file_path");
                    std::process::exit(1);
                }
            };
            if !file.exists() {
                eprintln!("File not found: {:?}", file);
                std::process::exit(1);
            }

            run_analysis(&config, file)?;
        }
        Cli::Parse { file, lines } => {
            if !file.exists() {
                eprintln!("File not found: {:?}", file);
                std::process::exit(1);
            }

            let loaded = LogSource::new(file).load()?;
            let display_count = std::cmp::min(lines, loaded.entries.len());

            println!(
                "Parsed {} of {} line(s), {} invalid (showing {}):\n",
                loaded.stats.parsed_count,
                loaded.stats.total_lines,
                loaded.stats.invalid_count,
                display_count
            );
            for entry in loaded.entries.iter().take(display_count) {
                let timestamp = entry
                    .timestamp
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {} [{}] {} {} -> {} ({} bytes)",
                    entry.ip, timestamp, entry.method, entry.endpoint, entry.status, entry.size
                );
            }
        }
        Cli::Config { output } => {
            Config::default().to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
    }

    Ok(())
}

/// Load, detect and write results
fn run_analysis(config: &Config, file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let detector = config.detection.detector()?;
    log::info!(
        "Detecting brute force attacks: threshold {} attempts in {} seconds",
        detector.threshold(),
        config.detection.window_seconds
    );

    let source = LogSource::new(file);
    let loaded = source.load()?;
    let report = AnalysisReport::build(source.path().display().to_string(), &loaded, &detector);

    let mut output_handler = OutputHandler::new(
        OutputFormat::from_str(&config.output.format),
        config.output.file_path.clone(),
    )?;
    output_handler.write_report(&report)?;
    output_handler.flush()?;

    Ok(())
}
