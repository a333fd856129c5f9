//! SQL type inference over sampled CSV values

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::values::is_numeric_literal;

/// Rows read up front to infer column types.
pub const SAMPLE_ROWS: usize = 1000;

/// Values examined by the date check.
const DATE_SAMPLE: usize = 100;

/// Types offered when a column's type is chosen by hand.
pub const TYPE_CHOICES: [&str; 6] = [
    "VARCHAR(255)",
    "INT",
    "DECIMAL(10,2)",
    "DATETIME",
    "TEXT",
    "BOOLEAN",
];

const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?\d+$").expect("valid integer regex"));

pub fn is_integer_literal(value: &str) -> bool {
    INTEGER_RE.is_match(value)
}

pub fn is_boolean_literal(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// Whether `value` parses as a date or date-time in one of the accepted
/// layouts, including RFC 3339.
pub fn is_date_like(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
}

/// Pick a SQL type for a column from sampled values.
///
/// Blank values are ignored. Integers give `INT`, other numbers
/// `DECIMAL(10,2)`, `true`/`false` gives `BOOLEAN`, dates give `DATETIME`;
/// anything else is text sized by its longest value.
pub fn infer_sql_type<S: AsRef<str>>(values: &[S]) -> &'static str {
    let present: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .collect();

    if present.is_empty() {
        return "VARCHAR(50)";
    }
    if present.iter().all(|v| is_integer_literal(v)) {
        return "INT";
    }
    if present.iter().all(|v| is_numeric_literal(v)) {
        return "DECIMAL(10,2)";
    }
    if present.iter().all(|v| is_boolean_literal(v)) {
        return "BOOLEAN";
    }
    if present.iter().take(DATE_SAMPLE).all(|v| is_date_like(v)) {
        return "DATETIME";
    }

    let max_len = present.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    match max_len {
        0..=50 => "VARCHAR(50)",
        51..=255 => "VARCHAR(255)",
        _ => "TEXT",
    }
}
