//! HTML report generation.
//!
//! Renders the summary into a single self-contained HTML document with
//! inline CSS: overview cards, statistical measures, the category
//! breakdown, monthly trends, and the top-entries table. Every
//! user-supplied string is escaped before it reaches the markup.

use crate::models::{GroupStats, ReportMetadata, Summary};

/// Generate the complete HTML report document.
pub fn generate_html_report(summary: &Summary, metadata: &ReportMetadata) -> String {
    let mut output = String::new();

    output.push_str(&document_head(&metadata.report_title));
    output.push_str(&header_section(metadata));
    output.push_str(&overview_section(summary));
    output.push_str(&measures_section(summary));
    output.push_str(&category_section(summary));
    output.push_str(&monthly_section(summary));
    output.push_str(&top_entries_section(summary));
    output.push_str(&document_foot(metadata));

    output
}

fn document_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape_html(title),
        STYLESHEET
    )
}

fn header_section(metadata: &ReportMetadata) -> String {
    format!(
        "<header>\n<h1>{}</h1>\n<p class=\"meta\">Generated {} &middot; {} entries</p>\n</header>\n",
        escape_html(&metadata.report_title),
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        metadata.total_entries
    )
}

/// Overview cards: the basic aggregates at a glance.
fn overview_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("<section>\n<h2>Overview</h2>\n<div class=\"cards\">\n");
    section.push_str(&stat_card("Total Entries", &summary.total_entries.to_string()));
    section.push_str(&stat_card("Total Value", &format_number(summary.total_value)));
    section.push_str(&stat_card("Average", &format_number(summary.average_value)));
    section.push_str(&stat_card("Median", &format_number(summary.median_value)));
    section.push_str(&stat_card("Minimum", &format_number(summary.min_value)));
    section.push_str(&stat_card("Maximum", &format_number(summary.max_value)));
    section.push_str("</div>\n");
    section.push_str(&format!(
        "<p class=\"meta\">Date range: {} to {} &middot; {} categories &middot; {} unique ids</p>\n",
        escape_html(&summary.date_range.start),
        escape_html(&summary.date_range.end),
        summary.unique_categories.len(),
        summary.unique_ids.len()
    ));
    section.push_str("</section>\n");

    section
}

fn stat_card(label: &str, value: &str) -> String {
    format!(
        "<div class=\"card\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
        label, value
    )
}

fn measures_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("<section>\n<h2>Statistical Measures</h2>\n<table>\n");
    section.push_str("<tbody>\n");
    section.push_str(&measure_row("Standard Deviation", summary.standard_deviation));
    section.push_str(&measure_row("Variance", summary.variance));
    section.push_str(&measure_row("Quartile 1 (Q1)", summary.quartile1));
    section.push_str(&measure_row("Quartile 3 (Q3)", summary.quartile3));
    section.push_str(&measure_row(
        "Interquartile Range (IQR)",
        summary.interquartile_range,
    ));
    section.push_str("</tbody>\n</table>\n</section>\n");

    section
}

fn measure_row(label: &str, value: f64) -> String {
    format!(
        "<tr><th>{}</th><td>{}</td></tr>\n",
        label,
        format_number(value)
    )
}

fn category_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("<section>\n<h2>Category Breakdown</h2>\n<table>\n<thead>\n");
    section.push_str(
        "<tr><th>Category</th><th>Count</th><th>Sum</th><th>Average</th>\
         <th>Median</th><th>Min</th><th>Max</th><th>Std Dev</th></tr>\n",
    );
    section.push_str("</thead>\n<tbody>\n");

    for (category, stats) in &summary.category_stats {
        section.push_str(&category_row(category, stats));
    }

    section.push_str("</tbody>\n</table>\n</section>\n");

    section
}

fn category_row(category: &str, stats: &GroupStats) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape_html(category),
        stats.count,
        format_number(stats.total_value),
        format_number(stats.average_value),
        format_number(stats.median_value),
        format_number(stats.min_value),
        format_number(stats.max_value),
        format_number(stats.standard_deviation),
    )
}

fn monthly_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("<section>\n<h2>Monthly Trends</h2>\n<table>\n<thead>\n");
    section.push_str("<tr><th>Month</th><th>Count</th><th>Sum</th><th>Average</th></tr>\n");
    section.push_str("</thead>\n<tbody>\n");

    // BTreeMap iteration: months appear in ascending order.
    for (month, stats) in &summary.monthly_stats {
        section.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(month),
            stats.count,
            format_number(stats.total_value),
            format_number(stats.average_value),
        ));
    }

    section.push_str("</tbody>\n</table>\n</section>\n");

    section
}

fn top_entries_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("<section>\n<h2>Top Entries by Value</h2>\n<table>\n<thead>\n");
    section.push_str(
        "<tr><th>Rank</th><th>ID</th><th>Name</th><th>Value</th><th>Category</th><th>Date</th></tr>\n",
    );
    section.push_str("</thead>\n<tbody>\n");

    for (rank, entry) in summary.top_entries.iter().enumerate() {
        section.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            rank + 1,
            escape_html(&entry.id),
            escape_html(&entry.name),
            format_number(entry.value),
            escape_html(&entry.category),
            escape_html(&entry.date),
        ));
    }

    section.push_str("</tbody>\n</table>\n</section>\n");

    section
}

fn document_foot(metadata: &ReportMetadata) -> String {
    format!(
        "<footer>Report {} generated by TabReport</footer>\n</body>\n</html>\n",
        escape_html(&metadata.report_id)
    )
}

const STYLESHEET: &str = "\
body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:60rem;padding:0 1rem;color:#222}\
h1{margin-bottom:0.25rem}h2{border-bottom:1px solid #ddd;padding-bottom:0.25rem}\
.meta{color:#666;font-size:0.9rem}\
.cards{display:flex;flex-wrap:wrap;gap:0.75rem}\
.card{border:1px solid #ddd;border-radius:6px;padding:0.75rem 1rem;min-width:8rem}\
.card .label{display:block;color:#666;font-size:0.8rem}\
.card .value{display:block;font-size:1.3rem;font-weight:600}\
table{border-collapse:collapse;width:100%;margin:0.5rem 0}\
th,td{border:1px solid #ddd;padding:0.4rem 0.6rem;text-align:left}\
thead th{background:#f5f5f5}\
footer{margin-top:2rem;color:#999;font-size:0.8rem}";

/// Format a number with two decimal places and thousands separators
/// (en-US style), e.g. `1234.567` renders as `1,234.57`.
pub fn format_number(value: f64) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Escape the five HTML-significant characters.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize;
    use crate::models::Record;
    use chrono::Utc;

    fn record(id: &str, name: &str, value: f64, category: &str, date: &str) -> Record {
        Record {
            id: id.to_string(),
            name: name.to_string(),
            value,
            category: category.to_string(),
            date: date.to_string(),
        }
    }

    fn test_summary() -> Summary {
        let data = vec![
            record("001", "Alice", 1000.0, "Sales", "2024-01-15"),
            record("002", "Bob <script>", 2500.5, "Marketing", "2024-02-10"),
            record("003", "Carol", 1750.0, "Sales", "2024-02-20"),
        ];
        summarize(&data).unwrap()
    }

    fn test_metadata() -> ReportMetadata {
        ReportMetadata {
            report_title: "Q1 & Q2 Review".to_string(),
            report_id: "Q1_Q2_Review-20240301T120000".to_string(),
            generated_at: Utc::now(),
            total_entries: 3,
        }
    }

    #[test]
    fn test_generate_html_report_sections() {
        let html = generate_html_report(&test_summary(), &test_metadata());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>Overview</h2>"));
        assert!(html.contains("<h2>Statistical Measures</h2>"));
        assert!(html.contains("<h2>Category Breakdown</h2>"));
        assert!(html.contains("<h2>Monthly Trends</h2>"));
        assert!(html.contains("<h2>Top Entries by Value</h2>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_html_escapes_user_strings() {
        let html = generate_html_report(&test_summary(), &test_metadata());

        assert!(html.contains("Q1 &amp; Q2 Review"));
        assert!(html.contains("Bob &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_html_renders_formatted_values() {
        let html = generate_html_report(&test_summary(), &test_metadata());

        // Total is 5250.5 across the three records.
        assert!(html.contains("5,250.50"));
        assert!(html.contains("2,500.50"));
    }

    #[test]
    fn test_monthly_rows_in_order() {
        let html = generate_html_report(&test_summary(), &test_metadata());

        let jan = html.find("<td>2024-01</td>").unwrap();
        let feb = html.find("<td>2024-02</td>").unwrap();
        assert!(jan < feb);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.00");
        assert_eq!(format_number(100.0), "100.00");
        assert_eq!(format_number(1234.567), "1,234.57");
        assert_eq!(format_number(1_000_000.0), "1,000,000.00");
        assert_eq!(format_number(-1234.5), "-1,234.50");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
