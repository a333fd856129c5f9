//! Shared utility helpers.

use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::error::Csv2SqlError;

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Decode raw bytes as UTF-8, falling back to Windows-1252.
///
/// Scraped dumps are frequently saved from spreadsheet tools in a legacy code
/// page. Windows-1252 maps every byte, so this never fails; undefined bytes
/// come through as replacement characters.
pub fn decode_lossy(bytes: Vec<u8>) -> String {
    let bytes = match bytes.strip_prefix(b"\xEF\xBB\xBF") {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            decoded.into_owned()
        }
    }
}

/// Decode one CSV field with the same UTF-8 / Windows-1252 policy as
/// [`decode_lossy`].
pub fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}

/// Read a whole text file with [`decode_lossy`].
pub fn read_text_file(path: &Path) -> Result<String, Csv2SqlError> {
    if !path.exists() {
        return Err(Csv2SqlError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|e| Csv2SqlError::SqlFileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(decode_lossy(bytes))
}

/// Size of a file in megabytes, or 0.0 when it cannot be read.
pub fn file_size_mb(path: &Path) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

/// Percentage of `ok` out of `ok + failed`, 100 when nothing was attempted.
pub fn success_rate(ok: usize, failed: usize) -> f64 {
    let total = ok + failed;
    if total == 0 {
        100.0
    } else {
        ok as f64 * 100.0 / total as f64
    }
}
