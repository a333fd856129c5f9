//! Normalization of raw SQL values into embeddable literals
//!
//! Values pulled out of dirty dumps are reduced to one of three shapes:
//! `NULL`, a bare numeric literal, or a single-quoted string. Quotes inside
//! strings are stripped rather than escaped, so `O'Connor` becomes
//! `'OConnor'`. That alters the data but guarantees the literal can never
//! break out of its `VALUES (...)` slot.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest string literal emitted, in characters.
pub const MAX_TEXT_CHARS: usize = 65_535;

/// Type names treated as numeric when deciding whether to quote.
const NUMERIC_TYPE_MARKERS: [&str; 5] = ["INT", "DECIMAL", "FLOAT", "REAL", "NUMERIC"];

static NUMERIC_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)$").expect("valid numeric literal regex"));

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// A single SQL value after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    /// Numeric literal, emitted without quotes.
    Number(String),
    /// String literal content, without the surrounding quotes.
    Text(String),
}

impl SqlValue {
    /// Classify and clean one raw field from a value tuple.
    ///
    /// `column_type` is the SQL type of the destination column, when known.
    /// Numeric values are only left bare when the column type is numeric, or
    /// when no type is known at all.
    pub fn sanitize(raw: &str, column_type: Option<&str>) -> SqlValue {
        let value = raw.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("NULL") {
            return SqlValue::Null;
        }

        let value = strip_matching_quotes(value);

        let numeric_allowed = match column_type {
            Some(ty) => is_numeric_type(ty),
            None => true,
        };
        if numeric_allowed && is_numeric_literal(value) {
            return SqlValue::Number(value.to_string());
        }

        SqlValue::Text(clean_text(value))
    }

    /// Keep `raw` as text, trimmed, with `NULL` for blank input.
    ///
    /// Unlike [`SqlValue::sanitize`], quotes are kept and escaped on display.
    pub fn text_or_null(raw: &str) -> SqlValue {
        let value = raw.trim();
        if value.is_empty() {
            SqlValue::Null
        } else {
            SqlValue::Text(value.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    /// Render as a SQL literal. Any single quote still present in text is
    /// doubled; sanitized text never contains one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Number(n) => f.write_str(n),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// Sanitize a raw value and render it as a SQL literal.
///
/// ```ignore
/// assert_eq!(sanitize("42", Some("INT")), "42");
/// assert_eq!(sanitize("42", Some("VARCHAR(10)")), "'42'");
/// assert_eq!(sanitize("", None), "NULL");
/// ```
pub fn sanitize(raw: &str, column_type: Option<&str>) -> String {
    SqlValue::sanitize(raw, column_type).to_string()
}

/// Whether `s` is an optionally signed integer or decimal literal.
pub fn is_numeric_literal(s: &str) -> bool {
    NUMERIC_LITERAL_RE.is_match(s)
}

/// Whether a SQL type name denotes a numeric column.
pub fn is_numeric_type(sql_type: &str) -> bool {
    let upper = sql_type.to_ascii_uppercase();
    NUMERIC_TYPE_MARKERS.iter().any(|m| upper.contains(m))
}

/// Remove one layer of matching single or double quotes.
fn strip_matching_quotes(value: &str) -> &str {
    for q in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn is_stripped_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x08 | 0x0E..=0x1F | 0x7F | 0x80..=0x9F)
}

/// Clean string content: control characters out, whitespace collapsed,
/// length capped, quote characters removed.
fn clean_text(value: &str) -> String {
    let without_controls: String = value
        .chars()
        .filter(|c| !is_stripped_control(*c))
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .collect();

    let collapsed = WHITESPACE_RUN_RE.replace_all(&without_controls, " ");
    let trimmed = collapsed.trim();

    let truncated: String = trimmed.chars().take(MAX_TEXT_CHARS).collect();
    truncated.replace(['\'', '"'], "")
}
