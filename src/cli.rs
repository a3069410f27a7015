//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// TabReport - statistics and report generator for tabular business records
///
/// Reads a JSON report request ({"reportTitle": ..., "data": [...]}),
/// computes descriptive statistics over the record batch, and renders
/// CSV, HTML, and JSON report artifacts.
///
/// Examples:
///   tabreport request.json
///   tabreport request.json --output-dir out --format html
///   tabreport - --format json < request.json
///   tabreport request.json --validate-only
///   tabreport --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the JSON report request, or '-' to read from stdin
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Directory to write report artifacts under
    ///
    /// Each run creates <output-dir>/<report-id>/ with the rendered files.
    /// Defaults to the config file setting or "reports".
    #[arg(short, long, value_name = "DIR", env = "TABREPORT_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Override the report title from the request
    #[arg(short, long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Artifact format(s) to render
    #[arg(long, default_value = "all", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Maximum number of records accepted in one request
    #[arg(long, value_name = "COUNT")]
    pub max_entries: Option<usize>,

    /// Skip the raw-data sheet in the spreadsheet workbook
    #[arg(long)]
    pub no_raw_data: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tabreport.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Validate the request and exit without computing anything
    #[arg(long)]
    pub validate_only: bool,

    /// Generate a default .tabreport.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Artifact format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Every artifact: CSV workbook, HTML report, and JSON summary
    #[default]
    All,
    /// CSV workbook only
    Spreadsheet,
    /// HTML report only
    Html,
    /// JSON summary only
    Json,
}

impl OutputFormat {
    pub fn wants_spreadsheet(self) -> bool {
        matches!(self, OutputFormat::All | OutputFormat::Spreadsheet)
    }

    pub fn wants_html(self) -> bool {
        matches!(self, OutputFormat::All | OutputFormat::Html)
    }

    pub fn wants_json(self) -> bool {
        matches!(self, OutputFormat::All | OutputFormat::Json)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let input = match self.input {
            Some(ref input) => input,
            None => return Err("An input file (or '-' for stdin) is required".to_string()),
        };

        if *input != PathBuf::from("-") && !input.exists() {
            return Err(format!("Input file does not exist: {}", input.display()));
        }

        if let Some(max_entries) = self.max_entries {
            if max_entries == 0 {
                return Err("Max entries must be at least 1".to_string());
            }
        }

        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err("Title cannot be blank".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
