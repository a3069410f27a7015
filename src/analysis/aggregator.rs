//! The statistics aggregation engine.
//!
//! This module turns an ordered batch of [`Record`]s into a validated,
//! internally consistent [`Summary`]: grand totals, per-category and
//! per-month breakdowns, order statistics, dispersion, and a stable
//! top-10 ranking. Aggregation is a pure, synchronous function of its
//! input: it either returns a complete Summary or fails on the first
//! invalid record with no partial result observable.

use crate::models::{DateRange, GroupStats, MonthStats, Record, Summary};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Maximum number of records ranked into `top_entries`.
const TOP_ENTRIES: usize = 10;

/// Failure taxonomy for the aggregation core.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The whole input has the wrong shape: empty batch.
    #[error("Data must be a non-empty array")]
    InvalidInput,

    /// One record's field failed validation. Carries the record's
    /// position in the batch and the offending field name.
    #[error("Entry {index}: {message}")]
    InvalidField {
        index: usize,
        field: &'static str,
        message: String,
    },

    /// A derived invariant was violated. Indicates a defect in the
    /// accumulation logic itself rather than bad input.
    #[error("{0}")]
    InternalConsistency(String),
}

impl AggregateError {
    /// True for failures callers should surface as a client-facing
    /// rejection rather than an internal defect.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AggregateError::InvalidInput | AggregateError::InvalidField { .. }
        )
    }
}

/// Running per-category accumulator, finalized into [`GroupStats`].
#[derive(Debug)]
struct GroupAccumulator {
    count: usize,
    total_value: f64,
    min_value: f64,
    max_value: f64,
    entries: Vec<Record>,
}

impl GroupAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            total_value: 0.0,
            min_value: f64::INFINITY,
            max_value: f64::NEG_INFINITY,
            entries: Vec::new(),
        }
    }

    fn observe(&mut self, record: &Record) {
        self.count += 1;
        self.total_value += record.value;
        self.min_value = self.min_value.min(record.value);
        self.max_value = self.max_value.max(record.value);
        self.entries.push(record.clone());
    }

    fn finalize(mut self, category: &str) -> Result<GroupStats, AggregateError> {
        if self.count == 0 {
            return Err(AggregateError::InternalConsistency(format!(
                "Category {} has zero count",
                category
            )));
        }

        let average_value = self.total_value / self.count as f64;

        let mut sorted_values: Vec<f64> = self.entries.iter().map(|e| e.value).collect();
        sorted_values.sort_by(f64::total_cmp);
        let median_value = median_of_sorted(&sorted_values);
        let variance = population_variance(&sorted_values, average_value);

        // Stable: ties keep their relative input order.
        self.entries
            .sort_by(|a, b| b.value.total_cmp(&a.value));

        Ok(GroupStats {
            count: self.count,
            total_value: self.total_value,
            average_value,
            min_value: resolve_sentinel(self.min_value),
            max_value: resolve_sentinel(self.max_value),
            median_value,
            variance,
            standard_deviation: variance.sqrt(),
            entries: self.entries,
        })
    }
}

/// Running per-month accumulator, finalized into [`MonthStats`].
#[derive(Debug)]
struct MonthAccumulator {
    count: usize,
    total_value: f64,
}

impl MonthAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            total_value: 0.0,
        }
    }

    fn observe(&mut self, value: f64) {
        self.count += 1;
        self.total_value += value;
    }

    fn finalize(self, month: &str) -> Result<MonthStats, AggregateError> {
        if self.count == 0 {
            return Err(AggregateError::InternalConsistency(format!(
                "Month {} has zero count",
                month
            )));
        }

        Ok(MonthStats {
            count: self.count,
            total_value: self.total_value,
            average_value: self.total_value / self.count as f64,
        })
    }
}

/// Compute the complete statistical summary for a batch of records.
///
/// The caller's slice is never reordered; every sort happens on an owned
/// working copy, and `top_entries` / per-category `entries` hold clones
/// of the input records.
///
/// Fails with [`AggregateError::InvalidInput`] on an empty batch and
/// [`AggregateError::InvalidField`] on the first record whose `value` is
/// not finite or whose `category`/`date` is blank. No partial summary is
/// ever returned.
pub fn summarize(records: &[Record]) -> Result<Summary, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::InvalidInput);
    }

    let total_entries = records.len();
    let mut total_value = 0.0;
    let mut min_value = f64::INFINITY;
    let mut max_value = f64::NEG_INFINITY;
    let mut unique_categories: BTreeSet<String> = BTreeSet::new();
    let mut unique_ids: BTreeSet<String> = BTreeSet::new();
    let mut category_groups: BTreeMap<String, GroupAccumulator> = BTreeMap::new();
    let mut month_groups: BTreeMap<String, MonthAccumulator> = BTreeMap::new();
    let mut date_start: Option<String> = None;
    let mut date_end: Option<String> = None;

    // Pass 1: per-record validation + single-pass accumulation.
    for (index, record) in records.iter().enumerate() {
        validate_record(index, record)?;

        let value = record.value;
        total_value += value;
        min_value = min_value.min(value);
        max_value = max_value.max(value);

        unique_categories.insert(record.category.clone());
        unique_ids.insert(record.id.clone());

        category_groups
            .entry(record.category.clone())
            .or_insert_with(GroupAccumulator::new)
            .observe(record);

        month_groups
            .entry(record.month_key().to_string())
            .or_insert_with(MonthAccumulator::new)
            .observe(value);

        // Plain lexical comparison: YYYY-MM-DD sorts chronologically.
        if date_start.as_deref().is_none_or(|s| record.date.as_str() < s) {
            date_start = Some(record.date.clone());
        }
        if date_end.as_deref().is_none_or(|e| record.date.as_str() > e) {
            date_end = Some(record.date.clone());
        }
    }

    let average_value = total_value / total_entries as f64;

    // Pass 2: global order statistics over a sorted copy of the values.
    let mut sorted_values: Vec<f64> = records.iter().map(|r| r.value).collect();
    sorted_values.sort_by(f64::total_cmp);

    let median_value = median_of_sorted(&sorted_values);

    // Nearest-rank quartiles: direct indexing at floor(n * p), without
    // interpolation. Downstream consumers depend on these exact values.
    let q1_index = (total_entries as f64 * 0.25).floor() as usize;
    let q3_index = (total_entries as f64 * 0.75).floor() as usize;
    let quartile1 = sorted_values.get(q1_index).copied().unwrap_or(0.0);
    let quartile3 = sorted_values.get(q3_index).copied().unwrap_or(0.0);

    // Pass 3: population variance (divisor = n, not n - 1).
    let variance = population_variance(&sorted_values, average_value);

    // Pass 4: per-group finalization.
    let mut category_stats: BTreeMap<String, GroupStats> = BTreeMap::new();
    for (category, accumulator) in category_groups {
        let stats = accumulator.finalize(&category)?;
        category_stats.insert(category, stats);
    }

    let mut monthly_stats: BTreeMap<String, MonthStats> = BTreeMap::new();
    for (month, accumulator) in month_groups {
        let stats = accumulator.finalize(&month)?;
        monthly_stats.insert(month, stats);
    }

    // Ranking works on an owned copy so the caller's slice stays untouched.
    let mut top_entries: Vec<Record> = records.to_vec();
    top_entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    top_entries.truncate(TOP_ENTRIES);

    let date_range = match (date_start, date_end) {
        (Some(start), Some(end)) => DateRange { start, end },
        // Unreachable: the loop above ran at least once.
        _ => {
            return Err(AggregateError::InternalConsistency(
                "date range was never established".to_string(),
            ))
        }
    };

    Ok(Summary {
        total_entries,
        total_value,
        average_value,
        min_value: resolve_sentinel(min_value),
        max_value: resolve_sentinel(max_value),
        median_value,
        variance,
        standard_deviation: variance.sqrt(),
        quartile1,
        quartile3,
        interquartile_range: quartile3 - quartile1,
        unique_categories: unique_categories.into_iter().collect(),
        unique_ids: unique_ids.into_iter().collect(),
        date_range,
        category_stats,
        monthly_stats,
        top_entries,
    })
}

/// Defense-in-depth checks on the three semantically risky fields.
/// `id` and `name` are guaranteed present by the upstream validator.
fn validate_record(index: usize, record: &Record) -> Result<(), AggregateError> {
    if !record.value.is_finite() {
        return Err(AggregateError::InvalidField {
            index,
            field: "value",
            message: format!("value must be a valid number, got {}", record.value),
        });
    }
    if record.category.trim().is_empty() {
        return Err(AggregateError::InvalidField {
            index,
            field: "category",
            message: "category must be a non-empty string".to_string(),
        });
    }
    if record.date.trim().is_empty() {
        return Err(AggregateError::InvalidField {
            index,
            field: "date",
            message: "date must be a non-empty string".to_string(),
        });
    }
    Ok(())
}

/// Median of an ascending-sorted slice: the exact middle element for an
/// odd count, the average of the two middle elements for an even count.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Mean of squared deviations from the mean, divisor = len.
fn population_variance(values: &[f64], mean: f64) -> f64 {
    let sum_of_squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    sum_of_squares / values.len() as f64
}

/// Resolve a never-updated min/max sentinel to the defined 0.0 fallback.
/// Only reachable if the non-empty-input invariant is somehow violated.
fn resolve_sentinel(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
