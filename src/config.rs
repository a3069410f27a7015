//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tabreport.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Request validation limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Report rendering settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory report artifacts are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    "reports".to_string()
}

/// Bounds enforced by the request validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of records in one request.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Maximum length of the `id` field.
    #[serde(default = "default_max_id_length")]
    pub max_id_length: usize,

    /// Maximum length of the `name` field.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Maximum length of the `category` field.
    #[serde(default = "default_max_category_length")]
    pub max_category_length: usize,

    /// Maximum length of the `date` field.
    #[serde(default = "default_max_date_length")]
    pub max_date_length: usize,

    /// Maximum length of the report title.
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_id_length: default_max_id_length(),
            max_name_length: default_max_name_length(),
            max_category_length: default_max_category_length(),
            max_date_length: default_max_date_length(),
            max_title_length: default_max_title_length(),
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_id_length() -> usize {
    50
}

fn default_max_name_length() -> usize {
    100
}

fn default_max_category_length() -> usize {
    50
}

fn default_max_date_length() -> usize {
    50
}

fn default_max_title_length() -> usize {
    200
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the raw-data sheet in the spreadsheet workbook.
    #[serde(default = "default_true")]
    pub include_raw_data: bool,

    /// Pretty-print the JSON summary artifact.
    #[serde(default = "default_true")]
    pub pretty_json: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_raw_data: true,
            pretty_json: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".tabreport.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.clone();
        }

        if let Some(max_entries) = args.max_entries {
            self.limits.max_entries = max_entries;
        }

        if args.no_raw_data {
            self.report.include_raw_data = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output_dir, "reports");
        assert_eq!(config.limits.max_entries, 10_000);
        assert_eq!(config.limits.max_title_length, 200);
        assert!(config.report.include_raw_data);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "out"
verbose = true

[limits]
max_entries = 500
max_id_length = 20

[report]
include_raw_data = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, "out");
        assert!(config.general.verbose);
        assert_eq!(config.limits.max_entries, 500);
        assert_eq!(config.limits.max_id_length, 20);
        // Unspecified limits fall back to defaults.
        assert_eq!(config.limits.max_name_length, 100);
        assert!(!config.report.include_raw_data);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[limits]"));
        assert!(toml_str.contains("[report]"));
    }
}
