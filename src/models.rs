//! Data models for the report generator.
//!
//! This module contains all the core data structures used throughout
//! the application for representing input records, the computed
//! statistical summary, and report metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single input row of tabular business data.
///
/// Records are externally owned and immutable to the aggregation core;
/// the aggregator only ever sorts its own clones of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-defined identifier. Not required to be unique.
    pub id: String,
    /// Display label.
    pub name: String,
    /// The measured quantity. Always finite in a valid record.
    pub value: f64,
    /// Grouping key. Non-empty after trimming.
    pub category: String,
    /// Date string in `YYYY-MM-DD` form. Only the `YYYY-MM` prefix is
    /// used for grouping; lexical order equals chronological order.
    pub date: String,
}

impl Record {
    /// Returns the `YYYY-MM` monthly grouping key for this record: the
    /// first seven characters of `date`, or the whole string if shorter.
    /// Character-based so arbitrary non-blank dates never split a UTF-8
    /// sequence.
    pub fn month_key(&self) -> &str {
        let end = self
            .date
            .char_indices()
            .nth(7)
            .map_or(self.date.len(), |(i, _)| i);
        &self.date[..end]
    }
}

/// A validated report request: a title plus the record batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Title displayed at the top of every rendered artifact.
    pub report_title: String,
    /// The record batch, in caller order.
    pub data: Vec<Record>,
}

/// Lexical min/max of the `date` strings across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Per-category statistical subtotals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub count: usize,
    pub total_value: f64,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub median_value: f64,
    /// Population variance (divisor = count).
    pub variance: f64,
    pub standard_deviation: f64,
    /// Member records, sorted by value descending. Ties keep their
    /// relative input order.
    pub entries: Vec<Record>,
}

/// Per-month subtotals. No order statistics at month granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthStats {
    pub count: usize,
    pub total_value: f64,
    pub average_value: f64,
}

/// The complete computed statistical result for a batch of records.
///
/// Constructed once, atomically, by [`crate::analysis::summarize`] and
/// never mutated after return. Renderers read it, nothing writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_entries: usize,
    pub total_value: f64,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub median_value: f64,
    /// Population variance (divisor = `total_entries`).
    pub variance: f64,
    pub standard_deviation: f64,
    /// Nearest-rank quartile at index `floor(n * 0.25)` of the sorted values.
    pub quartile1: f64,
    /// Nearest-rank quartile at index `floor(n * 0.75)` of the sorted values.
    pub quartile3: f64,
    pub interquartile_range: f64,
    /// Distinct category values, ascending lexical order.
    pub unique_categories: Vec<String>,
    /// Distinct id values, ascending lexical order.
    pub unique_ids: Vec<String>,
    pub date_range: DateRange,
    /// One entry per category seen in the input.
    pub category_stats: BTreeMap<String, GroupStats>,
    /// One entry per `YYYY-MM` key, iterating in ascending key order.
    pub monthly_stats: BTreeMap<String, MonthStats>,
    /// Up to 10 records sorted by value descending; ties keep input order.
    pub top_entries: Vec<Record>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Report title from the request.
    pub report_title: String,
    /// Identifier of the report run; doubles as the output directory name.
    pub report_id: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the batch.
    pub total_entries: usize,
}
