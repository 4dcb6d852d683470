use crate::error::{FaultlineError, Result};
use crate::temporal::IntervalPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// A calendar year-month, the granularity bulletins are published at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = FaultlineError;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FaultlineError::ConfigInvalid {
            key: "period".to_string(),
            reason: format!("Invalid year-month '{}': expected YYYY-MM", s),
        };

        let (year_part, month_part) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

/// Layered configuration for the Faultline pipeline
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Path of the static fault catalog (GeoJSON)
    pub catalog_path: ConfigValue<PathBuf>,
    /// Directory bulletin files are cached in
    pub cache_dir: ConfigValue<PathBuf>,
    /// First bulletin month of the query period
    pub period_start: ConfigValue<YearMonth>,
    /// Last bulletin month of the query period
    pub period_end: ConfigValue<YearMonth>,
    /// Time window applied to the final table
    pub interval: ConfigValue<IntervalPolicy>,
    /// Fault attributes encoded as bracketed value lists, to be normalized
    pub normalize_attributes: ConfigValue<Vec<String>>,
    /// Magnitude threshold passed through to the visualizer
    pub high_mag_threshold: ConfigValue<f64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            catalog_path: ConfigValue::new(
                PathBuf::from("faults/gem_active_faults.geojson"),
                ConfigSource::Default,
            ),
            cache_dir: ConfigValue::new(PathBuf::from("earthquake_data"), ConfigSource::Default),
            period_start: ConfigValue::new(YearMonth::new(2023, 2), ConfigSource::Default),
            period_end: ConfigValue::new(YearMonth::new(2023, 3), ConfigSource::Default),
            interval: ConfigValue::new(IntervalPolicy::Full, ConfigSource::Default),
            normalize_attributes: ConfigValue::new(
                vec![
                    "average_dip".to_string(),
                    "average_rake".to_string(),
                    "lower_seis_depth".to_string(),
                    "net_slip_rate".to_string(),
                    "upper_seis_depth".to_string(),
                ],
                ConfigSource::Default,
            ),
            high_mag_threshold: ConfigValue::new(5.0, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| FaultlineError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FaultlineError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Update values from file
        if let Some(path) = file_config.catalog_path {
            self.catalog_path.update(path, ConfigSource::File);
        }

        if let Some(dir) = file_config.cache_dir {
            self.cache_dir.update(dir, ConfigSource::File);
        }

        if let Some(start) = file_config.period_start {
            self.period_start.update(start.parse()?, ConfigSource::File);
        }

        if let Some(end) = file_config.period_end {
            self.period_end.update(end.parse()?, ConfigSource::File);
        }

        if let Some(interval) = file_config.interval {
            self.interval.update(parse_interval_policy(&interval)?, ConfigSource::File);
        }

        if let Some(attributes) = file_config.normalize_attributes {
            self.normalize_attributes.update(attributes, ConfigSource::File);
        }

        if let Some(threshold) = file_config.high_mag_threshold {
            self.high_mag_threshold.update(threshold, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // FAULTLINE_CATALOG
        if let Ok(path) = env::var("FAULTLINE_CATALOG") {
            self.catalog_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // FAULTLINE_CACHE_DIR
        if let Ok(dir) = env::var("FAULTLINE_CACHE_DIR") {
            self.cache_dir.update(PathBuf::from(dir), ConfigSource::Environment);
        }

        // FAULTLINE_INTERVAL
        if let Ok(interval_str) = env::var("FAULTLINE_INTERVAL") {
            match parse_interval_policy(&interval_str) {
                Ok(policy) => self.interval.update(policy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid FAULTLINE_INTERVAL value '{}': expected full or recent-window",
                    interval_str
                ),
            }
        }

        // FAULTLINE_HIGH_MAG_THRESHOLD
        if let Ok(threshold_str) = env::var("FAULTLINE_HIGH_MAG_THRESHOLD") {
            match threshold_str.parse::<f64>() {
                Ok(threshold) => {
                    self.high_mag_threshold.update(threshold, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid FAULTLINE_HIGH_MAG_THRESHOLD value '{}': expected a number",
                    threshold_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(path) = overrides.catalog_path {
            self.catalog_path.update(path, ConfigSource::Cli);
        }

        if let Some(dir) = overrides.cache_dir {
            self.cache_dir.update(dir, ConfigSource::Cli);
        }

        if let Some(start) = overrides.period_start {
            self.period_start.update(start, ConfigSource::Cli);
        }

        if let Some(end) = overrides.period_end {
            self.period_end.update(end, ConfigSource::Cli);
        }

        if let Some(interval) = overrides.interval {
            self.interval.update(interval, ConfigSource::Cli);
        }

        if let Some(threshold) = overrides.high_mag_threshold {
            self.high_mag_threshold.update(threshold, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "catalog_path".to_string(),
            (self.catalog_path.value.display().to_string(), self.catalog_path.source),
        );

        map.insert(
            "cache_dir".to_string(),
            (self.cache_dir.value.display().to_string(), self.cache_dir.source),
        );

        map.insert(
            "period_start".to_string(),
            (self.period_start.value.to_string(), self.period_start.source),
        );

        map.insert(
            "period_end".to_string(),
            (self.period_end.value.to_string(), self.period_end.source),
        );

        map.insert(
            "interval".to_string(),
            (format!("{:?}", self.interval.value), self.interval.source),
        );

        map.insert(
            "normalize_attributes".to_string(),
            (self.normalize_attributes.value.join(", "), self.normalize_attributes.source),
        );

        map.insert(
            "high_mag_threshold".to_string(),
            (self.high_mag_threshold.value.to_string(), self.high_mag_threshold.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    catalog_path: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    period_start: Option<String>,
    period_end: Option<String>,
    interval: Option<String>,
    normalize_attributes: Option<Vec<String>>,
    high_mag_threshold: Option<f64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub period_start: Option<YearMonth>,
    pub period_end: Option<YearMonth>,
    pub interval: Option<IntervalPolicy>,
    pub high_mag_threshold: Option<f64>,
}

/// Parse interval policy from string
pub fn parse_interval_policy(s: &str) -> Result<IntervalPolicy> {
    match s.to_lowercase().as_str() {
        "full" | "full-dataset" => Ok(IntervalPolicy::Full),
        "recent-window" | "recent" => Ok(IntervalPolicy::RecentWindow),
        _ => Err(FaultlineError::ConfigInvalid {
            key: "interval".to_string(),
            reason: format!("Invalid interval policy: {}. Use full or recent-window", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.period_start.value, YearMonth::new(2023, 2));
        assert_eq!(config.period_start.source, ConfigSource::Default);
        assert_eq!(config.interval.value, IntervalPolicy::Full);
        assert_eq!(config.high_mag_threshold.value, 5.0);
        assert_eq!(config.normalize_attributes.value.len(), 5);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400); // Still CLI value
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
catalog_path = "data/faults.geojson"
period_start = "2013-01"
period_end = "2023-12"
interval = "recent-window"
normalize_attributes = ["average_dip"]
high_mag_threshold = 4.5
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.catalog_path.value, PathBuf::from("data/faults.geojson"));
        assert_eq!(config.catalog_path.source, ConfigSource::File);
        assert_eq!(config.period_start.value, YearMonth::new(2013, 1));
        assert_eq!(config.period_end.value, YearMonth::new(2023, 12));
        assert_eq!(config.interval.value, IntervalPolicy::RecentWindow);
        assert_eq!(config.normalize_attributes.value, vec!["average_dip".to_string()]);
        assert_eq!(config.high_mag_threshold.value, 4.5);
        // Unset keys stay at their defaults
        assert_eq!(config.cache_dir.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            period_start: Some(YearMonth::new(2020, 6)),
            interval: Some(IntervalPolicy::RecentWindow),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.period_start.value, YearMonth::new(2020, 6));
        assert_eq!(config.period_start.source, ConfigSource::Cli);
        assert_eq!(config.interval.value, IntervalPolicy::RecentWindow);
        // These should still be defaults
        assert_eq!(config.catalog_path.source, ConfigSource::Default);
        assert_eq!(config.high_mag_threshold.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!("2023-02".parse::<YearMonth>().unwrap(), YearMonth::new(2023, 2));
        assert!("2023-13".parse::<YearMonth>().is_err());
        assert!("202302".parse::<YearMonth>().is_err());
        assert!("nope-xx".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_parse_interval_policy() {
        assert_eq!(parse_interval_policy("full").unwrap(), IntervalPolicy::Full);
        assert_eq!(parse_interval_policy("RECENT-WINDOW").unwrap(), IntervalPolicy::RecentWindow);
        assert!(parse_interval_policy("invalid").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("catalog_path"));
        assert!(map.contains_key("period_start"));
        assert!(map.contains_key("interval"));
        assert!(map.contains_key("high_mag_threshold"));

        let (start_value, start_source) = &map["period_start"];
        assert_eq!(start_value, "2023-02");
        assert_eq!(*start_source, ConfigSource::Default);
    }
}
