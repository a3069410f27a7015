//! TabReport - Statistics and Report Generator for Tabular Records
//!
//! A CLI tool that ingests a JSON batch of business records, computes
//! descriptive statistics over it, and renders spreadsheet (CSV), HTML,
//! and JSON report artifacts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (I/O, config, invalid JSON, internal defect)
//!   2 - Request or record validation rejected (client error, not a retry target)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod validate;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::Config;
use models::ReportMetadata;
use report::html::format_number;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("TabReport v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the report pipeline
    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report generation failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tabreport.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".tabreport.toml");

    if path.exists() {
        eprintln!("⚠️  .tabreport.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .tabreport.toml")?;

    println!("✅ Created .tabreport.toml with default settings.");
    println!("   Edit it to customize output directory, limits, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete report pipeline. Returns exit code (0 or 2).
fn run_report(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Read and parse the request
    let input_path = args.input.clone().unwrap_or_else(|| PathBuf::from("-"));
    let raw = read_input(&input_path)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("Invalid JSON in request body")?;

    let mut request = match validate::parse_request(&value, &config.limits) {
        Ok(request) => request,
        Err(e) => {
            error!("Validation error: {}", e);
            eprintln!("\n⛔ Invalid request: {}", e);
            return Ok(2);
        }
    };

    // CLI title takes precedence over the request's, but goes through
    // the same limits as a title supplied in the request body.
    if let Some(ref title) = args.title {
        if let Err(e) = validate::validate_title(title, &config.limits) {
            error!("Validation error: {}", e);
            eprintln!("\n⛔ Invalid request: {}", e);
            return Ok(2);
        }
        request.report_title = title.clone();
    }

    if args.validate_only {
        println!(
            "✅ Request is valid: \"{}\" with {} entries.",
            request.report_title,
            request.data.len()
        );
        return Ok(0);
    }

    // Step 2: Aggregate
    println!(
        "📊 Processing report \"{}\" with {} entries",
        request.report_title,
        request.data.len()
    );

    let summary = match analysis::summarize(&request.data) {
        Ok(summary) => summary,
        Err(e) if e.is_rejection() => {
            error!("Data rejected: {}", e);
            eprintln!("\n⛔ Invalid data: {}", e);
            return Ok(2);
        }
        // InternalConsistency: a defect, not bad input.
        Err(e) => return Err(e.into()),
    };

    let generated_at = Utc::now();
    let metadata = ReportMetadata {
        report_title: request.report_title.clone(),
        report_id: report_id(&request.report_title, generated_at),
        generated_at,
        total_entries: summary.total_entries,
    };

    // Step 3: Render the requested artifacts
    let mut artifacts: Vec<(String, String)> = Vec::new();

    if args.format.wants_spreadsheet() {
        println!("📄 Generating spreadsheet...");
        for sheet in report::spreadsheet::generate_workbook(
            &request,
            &summary,
            &metadata,
            config.report.include_raw_data,
        ) {
            artifacts.push((sheet.name.to_string(), sheet.content));
        }
    }

    if args.format.wants_html() {
        println!("🌐 Generating HTML report...");
        artifacts.push((
            "report.html".to_string(),
            report::html::generate_html_report(&summary, &metadata),
        ));
    }

    if args.format.wants_json() {
        println!("🧾 Generating JSON summary...");
        let json = if config.report.pretty_json {
            serde_json::to_string_pretty(&summary)?
        } else {
            serde_json::to_string(&summary)?
        };
        artifacts.push(("summary.json".to_string(), json));
    }

    // Step 4: Write artifacts
    let out_dir = Path::new(&config.general.output_dir).join(&metadata.report_id);
    let written = report::write_artifacts(&out_dir, &artifacts)?;
    info!("Report {} written to {}", metadata.report_id, out_dir.display());

    // Print summary
    println!("\n📊 Report Summary:");
    println!(
        "   Entries: {} | Categories: {} | Months: {}",
        summary.total_entries,
        summary.category_stats.len(),
        summary.monthly_stats.len()
    );
    println!(
        "   Total: {} | Average: {} | Median: {}",
        format_number(summary.total_value),
        format_number(summary.average_value),
        format_number(summary.median_value)
    );
    println!(
        "   Range: {} to {}",
        summary.date_range.start, summary.date_range.end
    );
    for path in &written {
        println!("   💾 {}", path.display());
    }
    println!("\n✅ Report complete! Artifacts in: {}", out_dir.display());

    Ok(0)
}

/// Build the report identifier: sanitized title plus a UTC timestamp.
/// Doubles as the per-run output directory name.
fn report_id(title: &str, generated_at: chrono::DateTime<Utc>) -> String {
    let key = validate::sanitize_artifact_key(title);
    let key = if key.is_empty() { "report" } else { &key };
    format!("{}-{}", key, generated_at.format("%Y%m%dT%H%M%S"))
}

/// Read the raw request body from a file, or stdin when the path is '-'.
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read input file: {}", input.display()))
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .tabreport.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_report_id_from_title() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(report_id("Q1 Sales", at), "Q1_Sales-20240301T120000");
    }

    #[test]
    fn test_report_id_fallback_for_symbol_title() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(report_id("!!!", at), "report-20240301T120000");
    }
}
