use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::detection::BruteForceDetector;

/// Errors raised while loading, saving or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for a brutewatch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input source configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Detection parameters
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Access log to analyze; the command line may override it
    pub file_path: Option<PathBuf>,
}

/// Sliding-window detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Failed attempts within one window needed to flag an IP
    pub threshold: usize,
    /// Window size in seconds
    pub window_seconds: i64,
    /// IPs exempt from detection
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "console", "json" or "jsonl"
    pub format: String,
    /// Output file path; stdout when absent
    pub file_path: Option<PathBuf>,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub file_path: Option<PathBuf>,
    pub threshold: Option<usize>,
    /// Window size in minutes
    pub window_minutes: Option<i64>,
    /// Added to the configured whitelist
    pub whitelist: Vec<String>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            threshold: 10,
            window_seconds: 300,
            whitelist: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Window as a duration; fails when positive but out of chrono's range
    pub fn window(&self) -> Result<chrono::Duration, ConfigError> {
        if self.window_seconds <= 0 {
            return Err(ConfigError::Invalid(
                "detection.window_seconds must be positive".to_string(),
            ));
        }
        chrono::Duration::try_seconds(self.window_seconds).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "detection.window_seconds is too large ({})",
                self.window_seconds
            ))
        })
    }

    /// Build a detector from these parameters
    pub fn detector(&self) -> Result<BruteForceDetector, ConfigError> {
        Ok(BruteForceDetector::with_config(
            self.threshold,
            self.window()?,
            self.whitelist.iter().cloned(),
        ))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "console".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply command-line values on top of the loaded file
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if overrides.file_path.is_some() {
            self.input.file_path = overrides.file_path;
        }
        if let Some(threshold) = overrides.threshold {
            self.detection.threshold = threshold;
        }
        if let Some(minutes) = overrides.window_minutes {
            // Saturated values are rejected later by validate()
            self.detection.window_seconds = minutes.saturating_mul(60);
        }
        for ip in overrides.whitelist {
            if !self.detection.whitelist.contains(&ip) {
                self.detection.whitelist.push(ip);
            }
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if overrides.output.is_some() {
            self.output.file_path = overrides.output;
        }
    }

    /// Reject values the detector cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detection.threshold == 0 {
            return Err(ConfigError::Invalid(
                "detection.threshold must be a positive integer".to_string(),
            ));
        }
        self.detection.window()?;
        match self.output.format.to_lowercase().as_str() {
            "console" | "json" | "jsonl" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "output.format must be console, json or jsonl (got '{}')",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.detection.threshold, 10);
        assert_eq!(config.detection.window_seconds, 300);
        assert!(config.detection.whitelist.is_empty());
        assert!(config.validate().is_ok());

        let detector = config.detection.detector().unwrap();
        assert_eq!(detector.threshold(), 10);
        assert_eq!(detector.window(), chrono::Duration::minutes(5));
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.detection.whitelist = vec!["10.0.0.1".to_string()];
        config.output.format = "jsonl".to_string();
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.detection.whitelist, vec!["10.0.0.1".to_string()]);
        assert_eq!(loaded.output.format, "jsonl");
        assert!(loaded.input.file_path.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [detection]
            threshold = 5
            window_seconds = 60
            whitelist = ["192.168.1.1", "192.168.1.2"]
            "#,
        )
        .unwrap();

        assert_eq!(config.detection.threshold, 5);
        assert_eq!(config.output.format, "console");
        let detector = config.detection.detector().unwrap();
        assert_eq!(detector.window(), chrono::Duration::seconds(60));
        assert!(detector.whitelist().contains("192.168.1.2"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.detection.threshold = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.detection.window_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.output.format = "xml".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_out_of_range_window_rejected() {
        let mut config = Config::default();
        config.detection.window_seconds = 200_000_000_000_000 * 60;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            config.detection.detector(),
            Err(ConfigError::Invalid(_))
        ));

        config.detection.window_seconds = i64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_window_flag_rejected_not_panicking() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            window_minutes: Some(i64::MAX),
            ..Overrides::default()
        });
        assert_eq!(config.detection.window_seconds, i64::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = Config::default();
        config.detection.whitelist = vec!["10.0.0.1".to_string()];

        config.apply_overrides(Overrides {
            file_path: Some(PathBuf::from("access.log")),
            threshold: Some(4),
            window_minutes: Some(2),
            whitelist: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
            format: Some("json".to_string()),
            output: Some(PathBuf::from("out.json")),
        });

        assert_eq!(config.input.file_path, Some(PathBuf::from("access.log")));
        assert_eq!(config.detection.threshold, 4);
        assert_eq!(config.detection.window_seconds, 120);
        assert_eq!(
            config.detection.whitelist,
            vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
        );
        assert_eq!(config.output.format, "json");
        assert_eq!(config.output.file_path, Some(PathBuf::from("out.json")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config: Config = toml::from_str(
            r#"
            [input]
            file_path = "from-file.log"

            [detection]
            threshold = 7
            window_seconds = 90
            "#,
        )
        .unwrap();
        config.apply_overrides(Overrides::default());

        assert_eq!(config.input.file_path, Some(PathBuf::from("from-file.log")));
        assert_eq!(config.detection.threshold, 7);
        assert_eq!(config.detection.window_seconds, 90);
        assert_eq!(config.output.format, "console");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
