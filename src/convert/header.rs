//! Header-row detection for CSV files

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Csv2SqlError;
use crate::util::decode_lossy;

/// Substrings that only show up in data: emails, URLs, domains, profiles.
const DATA_INDICATORS: [&str; 9] = [
    "@",
    "http://",
    "https://",
    ".com",
    ".net",
    ".org",
    "linkedin.com",
    "/in/",
    "www.",
];

/// Whether `first_line` looks like a header row.
///
/// A line containing any data indicator is taken to be a data row, so the
/// file is treated as headerless.
pub fn detect_header(first_line: &str) -> bool {
    let line = first_line.trim_start_matches('\u{feff}').trim().to_lowercase();
    let matches = DATA_INDICATORS
        .iter()
        .filter(|indicator| line.contains(*indicator))
        .count();
    tracing::debug!(matches, "header detection indicators");
    matches == 0
}

/// First line of a file, decoded leniently. Empty for an empty file.
pub fn read_first_line(path: &Path) -> Result<String, Csv2SqlError> {
    let file = File::open(path).map_err(|e| Csv2SqlError::CsvReadError {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut bytes)
        .map_err(|e| Csv2SqlError::CsvReadError {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
    Ok(decode_lossy(bytes))
}

/// Run [`detect_header`] on the first line of `path`.
pub fn file_has_header(path: &Path) -> Result<bool, Csv2SqlError> {
    let first = read_first_line(path)?;
    let has_header = detect_header(&first);
    if !has_header {
        tracing::info!(path = %path.display(), "CSV has no header row; column names will be generated");
    }
    Ok(has_header)
}
