//! Request validation.
//!
//! Validates an untyped JSON report request before the aggregation core
//! runs. Working on `serde_json::Value` rather than typed structs keeps
//! the error messages field-precise ("Entry 3: value must be a number")
//! instead of opaque deserialization failures. On success the request is
//! converted into a typed [`ReportRequest`].

use crate::config::LimitsConfig;
use crate::models::{Record, ReportRequest};
use serde_json::Value;
use thiserror::Error;

/// A rejected report request. All variants map to a client-facing
/// rejection; none indicate an internal defect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Required top-level fields are absent.
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    /// The request shape or title is invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// One entry of the data array is invalid.
    #[error("Entry {index}: {message}")]
    InvalidEntry { index: usize, message: String },
}

/// Validate a raw JSON request and convert it into a typed [`ReportRequest`].
///
/// Enforces the upstream contract the aggregation core relies on:
/// 1..=`max_entries` records, bounded non-empty string fields, a finite
/// non-negative `value`, and a `YYYY-MM-DD` shaped `date`.
pub fn parse_request(value: &Value, limits: &LimitsConfig) -> Result<ReportRequest, ValidationError> {
    let object = value.as_object().ok_or_else(|| {
        ValidationError::InvalidRequest("request body must be a JSON object".to_string())
    })?;

    let missing: Vec<&str> = ["data", "reportTitle"]
        .into_iter()
        .filter(|field| object.get(*field).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing.join(", ")));
    }

    let title = object["reportTitle"].as_str().ok_or_else(|| {
        ValidationError::InvalidRequest("reportTitle must be a string".to_string())
    })?;
    validate_title(title, limits)?;

    let entries = object["data"]
        .as_array()
        .ok_or_else(|| ValidationError::InvalidRequest("data must be an array".to_string()))?;
    if entries.is_empty() {
        return Err(ValidationError::InvalidRequest(
            "data array cannot be empty".to_string(),
        ));
    }
    if entries.len() > limits.max_entries {
        return Err(ValidationError::InvalidRequest(format!(
            "data array cannot exceed {} entries",
            limits.max_entries
        )));
    }

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        records.push(parse_entry(index, entry, limits)?);
    }

    Ok(ReportRequest {
        report_title: title.to_string(),
        data: records,
    })
}

/// Validate a report title against the configured limits.
///
/// Applies to the request's own title and to any title supplied through
/// other channels (e.g. a CLI override), so both go through the same
/// bounds.
pub fn validate_title(title: &str, limits: &LimitsConfig) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::InvalidRequest(
            "reportTitle cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > limits.max_title_length {
        return Err(ValidationError::InvalidRequest(format!(
            "reportTitle exceeds maximum length of {} characters",
            limits.max_title_length
        )));
    }
    Ok(())
}

/// Validate a single data entry and convert it into a [`Record`].
fn parse_entry(index: usize, entry: &Value, limits: &LimitsConfig) -> Result<Record, ValidationError> {
    let object = entry
        .as_object()
        .ok_or_else(|| entry_error(index, "must be an object".to_string()))?;

    let missing: Vec<&str> = ["id", "name", "value", "category", "date"]
        .into_iter()
        .filter(|field| object.get(*field).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(entry_error(
            index,
            format!("Missing required fields: {}", missing.join(", ")),
        ));
    }

    let id = string_field(index, object, "id", limits.max_id_length)?;
    let name = string_field(index, object, "name", limits.max_name_length)?;
    let category = string_field(index, object, "category", limits.max_category_length)?;
    let date = string_field(index, object, "date", limits.max_date_length)?;

    let value = object["value"]
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| entry_error(index, "value must be a number".to_string()))?;
    if value < 0.0 {
        return Err(entry_error(index, "value must be at least 0".to_string()));
    }

    if !is_date_shaped(&date) {
        return Err(entry_error(
            index,
            "date must be in YYYY-MM-DD format".to_string(),
        ));
    }

    Ok(Record {
        id,
        name,
        value,
        category,
        date,
    })
}

/// Extract a non-empty, length-bounded string field from an entry.
fn string_field(
    index: usize,
    object: &serde_json::Map<String, Value>,
    field: &str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let value = object[field]
        .as_str()
        .ok_or_else(|| entry_error(index, format!("{} must be a string", field)))?;

    if value.trim().is_empty() {
        return Err(entry_error(index, format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_length {
        return Err(entry_error(
            index,
            format!("{} exceeds maximum length of {} characters", field, max_length),
        ));
    }

    Ok(value.to_string())
}

fn entry_error(index: usize, message: String) -> ValidationError {
    ValidationError::InvalidEntry { index, message }
}

/// True if the string has the `YYYY-MM-DD` shape (digits and dashes in
/// place; calendar validity is not checked, matching upstream behavior).
fn is_date_shaped(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Sanitize a report title into a filesystem-safe artifact key.
///
/// Dots and any character outside `[a-zA-Z0-9_-]` become underscores,
/// runs of underscores collapse, and leading/trailing underscores are
/// trimmed.
pub fn sanitize_artifact_key(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_underscore = false;

    for ch in input.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '-' {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if !last_was_underscore {
                out.push('_');
            }
            last_was_underscore = true;
        } else {
            out.push(mapped);
            last_was_underscore = false;
        }
    }

    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    fn valid_request() -> Value {
        json!({
            "reportTitle": "Q1 Sales",
            "data": [
                { "id": "001", "name": "Alice", "value": 100, "category": "Sales", "date": "2024-01-01" },
                { "id": "002", "name": "Bob", "value": 200.5, "category": "Marketing", "date": "2024-01-02" }
            ]
        })
    }

    #[test]
    fn test_parse_valid_request() {
        let request = parse_request(&valid_request(), &limits()).unwrap();

        assert_eq!(request.report_title, "Q1 Sales");
        assert_eq!(request.data.len(), 2);
        assert_eq!(request.data[0].id, "001");
        assert_eq!(request.data[1].value, 200.5);
    }

    #[test]
    fn test_missing_top_level_fields() {
        let err = parse_request(&json!({}), &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: data, reportTitle"
        );
    }

    #[test]
    fn test_empty_title() {
        let value = json!({ "reportTitle": "   ", "data": [] });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "reportTitle cannot be empty");
    }

    #[test]
    fn test_validate_title_standalone() {
        assert!(validate_title("Q1 Sales", &limits()).is_ok());

        let err = validate_title(&"x".repeat(201), &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reportTitle exceeds maximum length of 200 characters"
        );

        let err = validate_title("  ", &limits()).unwrap_err();
        assert_eq!(err.to_string(), "reportTitle cannot be empty");
    }

    #[test]
    fn test_title_too_long() {
        let value = json!({ "reportTitle": "x".repeat(201), "data": [] });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert!(err.to_string().contains("maximum length of 200"));
    }

    #[test]
    fn test_data_not_an_array() {
        let value = json!({ "reportTitle": "T", "data": "nope" });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "data must be an array");
    }

    #[test]
    fn test_empty_data_array() {
        let value = json!({ "reportTitle": "T", "data": [] });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "data array cannot be empty");
    }

    #[test]
    fn test_too_many_entries() {
        let small = LimitsConfig {
            max_entries: 1,
            ..LimitsConfig::default()
        };
        let err = parse_request(&valid_request(), &small).unwrap_err();
        assert_eq!(err.to_string(), "data array cannot exceed 1 entries");
    }

    #[test]
    fn test_entry_missing_fields() {
        let value = json!({
            "reportTitle": "T",
            "data": [ { "value": 100, "date": "2024-01-01" } ]
        });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Entry 0: Missing required fields: id, name, category"
        );
    }

    #[test]
    fn test_entry_value_not_a_number() {
        let value = json!({
            "reportTitle": "T",
            "data": [
                { "id": "001", "name": "Alice", "value": "invalid", "category": "Sales", "date": "2024-01-01" }
            ]
        });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Entry 0: value must be a number");
    }

    #[test]
    fn test_entry_negative_value() {
        let value = json!({
            "reportTitle": "T",
            "data": [
                { "id": "001", "name": "Alice", "value": -5, "category": "Sales", "date": "2024-01-01" }
            ]
        });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Entry 0: value must be at least 0");
    }

    #[test]
    fn test_entry_bad_date_shape() {
        let value = json!({
            "reportTitle": "T",
            "data": [
                { "id": "001", "name": "Alice", "value": 1, "category": "Sales", "date": "01/15/2024" }
            ]
        });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Entry 0: date must be in YYYY-MM-DD format");
    }

    #[test]
    fn test_entry_id_too_long() {
        let value = json!({
            "reportTitle": "T",
            "data": [
                { "id": "x".repeat(51), "name": "Alice", "value": 1, "category": "Sales", "date": "2024-01-01" }
            ]
        });
        let err = parse_request(&value, &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Entry 0: id exceeds maximum length of 50 characters"
        );
    }

    #[test]
    fn test_is_date_shaped() {
        assert!(is_date_shaped("2024-01-15"));
        assert!(!is_date_shaped("2024-1-15"));
        assert!(!is_date_shaped("2024/01/15"));
        assert!(!is_date_shaped("2024-01-15T00"));
    }

    #[test]
    fn test_sanitize_replaces_spaces() {
        assert_eq!(sanitize_artifact_key("hello world"), "hello_world");
    }

    #[test]
    fn test_sanitize_removes_invalid_characters() {
        assert_eq!(sanitize_artifact_key("test@file#name"), "test_file_name");
        assert_eq!(sanitize_artifact_key("file!name"), "file_name");
    }

    #[test]
    fn test_sanitize_collapses_underscores() {
        assert_eq!(sanitize_artifact_key("test___name"), "test_name");
    }

    #[test]
    fn test_sanitize_trims_underscores() {
        assert_eq!(sanitize_artifact_key("_test_"), "test");
    }

    #[test]
    fn test_sanitize_replaces_dots() {
        assert_eq!(sanitize_artifact_key("Node.js"), "Node_js");
        assert_eq!(
            sanitize_artifact_key("test-name_123.file"),
            "test-name_123_file"
        );
    }
}
