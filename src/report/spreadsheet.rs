//! Spreadsheet workbook rendering.
//!
//! Renders the summary into a workbook of CSV sheets: raw data, overall
//! summary, category breakdown, and monthly trends. Sheet content and
//! ordering mirror the report layout business users already know; each
//! sheet becomes one `.csv` artifact.

use crate::models::{ReportMetadata, ReportRequest, Summary};

/// One rendered sheet: artifact file name plus CSV content.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: &'static str,
    pub content: String,
}

/// Render the complete CSV workbook.
///
/// `include_raw_data` drops the (potentially large) raw-data sheet while
/// keeping the computed sheets.
pub fn generate_workbook(
    request: &ReportRequest,
    summary: &Summary,
    metadata: &ReportMetadata,
    include_raw_data: bool,
) -> Vec<Sheet> {
    let mut sheets = Vec::with_capacity(4);

    if include_raw_data {
        sheets.push(Sheet {
            name: "data.csv",
            content: raw_data_sheet(request, summary, metadata),
        });
    }
    sheets.push(Sheet {
        name: "summary.csv",
        content: summary_sheet(summary),
    });
    sheets.push(Sheet {
        name: "categories.csv",
        content: categories_sheet(summary),
    });
    sheets.push(Sheet {
        name: "monthly.csv",
        content: monthly_sheet(summary),
    });

    sheets
}

/// Raw data sheet: request metadata prelude followed by every record in
/// caller order.
fn raw_data_sheet(request: &ReportRequest, summary: &Summary, metadata: &ReportMetadata) -> String {
    let mut sheet = String::new();

    push_row(&mut sheet, &["Report Title:", &request.report_title]);
    push_row(&mut sheet, &["Generated:", &metadata.generated_at.to_rfc3339()]);
    push_row(&mut sheet, &["Total Entries:", &summary.total_entries.to_string()]);
    push_row(
        &mut sheet,
        &[
            "Date Range:",
            &format!("{} to {}", summary.date_range.start, summary.date_range.end),
        ],
    );
    push_row(&mut sheet, &[]);
    push_row(&mut sheet, &["ID", "Name", "Value", "Category", "Date"]);

    for record in &request.data {
        push_row(
            &mut sheet,
            &[
                &record.id,
                &record.name,
                &number(record.value),
                &record.category,
                &record.date,
            ],
        );
    }

    sheet
}

/// Overall summary sheet: basic statistics, statistical measures, other
/// information, and the top-10 table.
fn summary_sheet(summary: &Summary) -> String {
    let mut sheet = String::new();

    push_row(&mut sheet, &["Summary Statistics"]);
    push_row(&mut sheet, &[]);
    push_row(&mut sheet, &["Basic Statistics"]);
    push_row(&mut sheet, &["Total Entries", &summary.total_entries.to_string()]);
    push_row(&mut sheet, &["Sum (Total Value)", &number(summary.total_value)]);
    push_row(&mut sheet, &["Average (Mean)", &number(summary.average_value)]);
    push_row(&mut sheet, &["Median", &number(summary.median_value)]);
    push_row(&mut sheet, &["Minimum Value", &number(summary.min_value)]);
    push_row(&mut sheet, &["Maximum Value", &number(summary.max_value)]);
    push_row(&mut sheet, &[]);
    push_row(&mut sheet, &["Statistical Measures"]);
    push_row(
        &mut sheet,
        &["Standard Deviation", &number(summary.standard_deviation)],
    );
    push_row(&mut sheet, &["Variance", &number(summary.variance)]);
    push_row(&mut sheet, &["Quartile 1 (Q1)", &number(summary.quartile1)]);
    push_row(&mut sheet, &["Quartile 3 (Q3)", &number(summary.quartile3)]);
    push_row(
        &mut sheet,
        &[
            "Interquartile Range (IQR)",
            &number(summary.interquartile_range),
        ],
    );
    push_row(&mut sheet, &[]);
    push_row(&mut sheet, &["Other Information"]);
    push_row(
        &mut sheet,
        &["Unique Categories", &summary.unique_categories.len().to_string()],
    );
    push_row(&mut sheet, &["Unique IDs", &summary.unique_ids.len().to_string()]);
    push_row(&mut sheet, &["Date Range Start", &summary.date_range.start]);
    push_row(&mut sheet, &["Date Range End", &summary.date_range.end]);
    push_row(&mut sheet, &[]);
    push_row(&mut sheet, &["Top 10 Entries by Value"]);
    push_row(&mut sheet, &[]);
    push_row(
        &mut sheet,
        &["Rank", "ID", "Name", "Value", "Category", "Date"],
    );

    for (rank, entry) in summary.top_entries.iter().enumerate() {
        push_row(
            &mut sheet,
            &[
                &(rank + 1).to_string(),
                &entry.id,
                &entry.name,
                &number(entry.value),
                &entry.category,
                &entry.date,
            ],
        );
    }

    sheet
}

/// Category breakdown sheet: one row per category.
fn categories_sheet(summary: &Summary) -> String {
    let mut sheet = String::new();

    push_row(&mut sheet, &["Category Breakdown"]);
    push_row(&mut sheet, &[]);
    push_row(
        &mut sheet,
        &[
            "Category", "Count", "Sum", "Average", "Median", "Min", "Max", "Std Dev", "Variance",
        ],
    );

    for (category, stats) in &summary.category_stats {
        push_row(
            &mut sheet,
            &[
                category,
                &stats.count.to_string(),
                &number(stats.total_value),
                &number(stats.average_value),
                &number(stats.median_value),
                &number(stats.min_value),
                &number(stats.max_value),
                &number(stats.standard_deviation),
                &number(stats.variance),
            ],
        );
    }

    sheet
}

/// Monthly trends sheet, rows in ascending month order.
fn monthly_sheet(summary: &Summary) -> String {
    let mut sheet = String::new();

    push_row(&mut sheet, &["Monthly Trends"]);
    push_row(&mut sheet, &[]);
    push_row(&mut sheet, &["Month", "Count", "Sum", "Average"]);

    for (month, stats) in &summary.monthly_stats {
        push_row(
            &mut sheet,
            &[
                month,
                &stats.count.to_string(),
                &number(stats.total_value),
                &number(stats.average_value),
            ],
        );
    }

    sheet
}

/// Fixed two-decimal rendering, so spreadsheet cells agree with the
/// HTML report's formatting (minus the thousands separators, which
/// would force quoting in CSV).
fn number(value: f64) -> String {
    format!("{:.2}", value)
}

/// Append one CSV row with RFC 4180 quoting.
fn push_row(sheet: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            sheet.push(',');
        }
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            sheet.push('"');
            sheet.push_str(&field.replace('"', "\"\""));
            sheet.push('"');
        } else {
            sheet.push_str(field);
        }
    }
    sheet.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize;
    use crate::models::Record;
    use chrono::Utc;

    fn request() -> ReportRequest {
        ReportRequest {
            report_title: "Q1 Sales".to_string(),
            data: vec![
                Record {
                    id: "001".to_string(),
                    name: "Alice, Anna".to_string(),
                    value: 100.0,
                    category: "Sales".to_string(),
                    date: "2024-01-15".to_string(),
                },
                Record {
                    id: "002".to_string(),
                    name: "Bob".to_string(),
                    value: 200.0,
                    category: "Marketing".to_string(),
                    date: "2024-02-10".to_string(),
                },
            ],
        }
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            report_title: "Q1 Sales".to_string(),
            report_id: "Q1_Sales-20240101T000000".to_string(),
            generated_at: Utc::now(),
            total_entries: 2,
        }
    }

    #[test]
    fn test_workbook_sheet_set() {
        let request = request();
        let summary = summarize(&request.data).unwrap();
        let sheets = generate_workbook(&request, &summary, &metadata(), true);

        let names: Vec<&str> = sheets.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["data.csv", "summary.csv", "categories.csv", "monthly.csv"]
        );
    }

    #[test]
    fn test_workbook_without_raw_data() {
        let request = request();
        let summary = summarize(&request.data).unwrap();
        let sheets = generate_workbook(&request, &summary, &metadata(), false);

        assert!(sheets.iter().all(|s| s.name != "data.csv"));
        assert_eq!(sheets.len(), 3);
    }

    #[test]
    fn test_raw_data_sheet_quotes_commas() {
        let request = request();
        let summary = summarize(&request.data).unwrap();
        let sheet = raw_data_sheet(&request, &summary, &metadata());

        assert!(sheet.contains("\"Alice, Anna\""));
        assert!(sheet.contains("Report Title:,Q1 Sales"));
        assert!(sheet.contains("ID,Name,Value,Category,Date"));
    }

    #[test]
    fn test_summary_sheet_contents() {
        let request = request();
        let summary = summarize(&request.data).unwrap();
        let sheet = summary_sheet(&summary);

        assert!(sheet.contains("Sum (Total Value),300.00"));
        assert!(sheet.contains("Average (Mean),150.00"));
        assert!(sheet.contains("Date Range Start,2024-01-15"));
        assert!(sheet.contains("Top 10 Entries by Value"));
        // Top entry is Bob at 200.
        assert!(sheet.contains("1,002,Bob,200.00,Marketing,2024-02-10"));
    }

    #[test]
    fn test_computed_cells_use_fixed_precision() {
        let data = vec![
            Record {
                id: "001".to_string(),
                name: "Alice".to_string(),
                value: 100.0,
                category: "Sales".to_string(),
                date: "2024-01-01".to_string(),
            },
            Record {
                id: "002".to_string(),
                name: "Bob".to_string(),
                value: 100.0,
                category: "Sales".to_string(),
                date: "2024-01-02".to_string(),
            },
            Record {
                id: "003".to_string(),
                name: "Carol".to_string(),
                value: 50.0,
                category: "Sales".to_string(),
                date: "2024-01-03".to_string(),
            },
        ];
        let summary = summarize(&data).unwrap();
        let sheet = summary_sheet(&summary);

        // Mean of [100, 100, 50] is a repeating decimal; it renders at
        // the same precision the HTML report uses.
        assert!(sheet.contains("Average (Mean),83.33"));
        assert!(!sheet.contains("83.33333"));
    }

    #[test]
    fn test_categories_sheet_one_row_per_category() {
        let request = request();
        let summary = summarize(&request.data).unwrap();
        let sheet = categories_sheet(&summary);

        let lines: Vec<&str> = sheet.lines().collect();
        // Title, blank, header, then one row per category.
        assert_eq!(lines.len(), 3 + summary.category_stats.len());
        assert!(sheet.contains("Marketing,1,200.00,200.00,200.00,200.00,200.00,0.00,0.00"));
    }

    #[test]
    fn test_monthly_sheet_ascending() {
        let request = request();
        let summary = summarize(&request.data).unwrap();
        let sheet = monthly_sheet(&summary);

        let jan = sheet.find("2024-01").unwrap();
        let feb = sheet.find("2024-02").unwrap();
        assert!(jan < feb);
    }

    #[test]
    fn test_push_row_escapes_quotes() {
        let mut out = String::new();
        push_row(&mut out, &["a", "say \"hi\"", "c"]);
        assert_eq!(out, "a,\"say \"\"hi\"\"\",c\n");
    }
}
