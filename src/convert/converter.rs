//! CSV to SQL conversion
//!
//! The file is profiled once from a sample (header detection, type
//! inference, LinkedIn URL columns), then streamed record by record into
//! `INSERT` statements. Broken records are counted and skipped.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use csv::{ByteRecord, ReaderBuilder};

use super::header::file_has_header;
use super::names::{
    dedupe_names, extract_name_from_linkedin_url, is_name_column, is_valid_table_name,
    normalize_col_name, sanitize_column_names, sanitize_person_name, table_name_from_path,
};
use super::types::{infer_sql_type, is_boolean_literal, SAMPLE_ROWS};
use crate::error::Csv2SqlError;
use crate::progress;
use crate::repair::{render_create_table, Column};
use crate::util::{decode_field, success_rate};
use crate::values::{is_numeric_literal, is_numeric_type, SqlValue};

/// Records per processing chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Errors kept verbatim in the result and the SQL footer.
const MAX_RECORDED_ERRORS: usize = 5;

/// Leading values inspected for LinkedIn profile URLs.
const LINKEDIN_PROBE_VALUES: usize = 10;

const LINKEDIN_MARKER: &str = "linkedin.com/in/";

/// Type of the name column derived from a LinkedIn URL column.
const LINKEDIN_NAME_TYPE: &str = "VARCHAR(255)";

/// What a sampled read of a CSV file revealed.
#[derive(Debug, Clone)]
pub struct CsvProfile {
    pub path: PathBuf,
    pub has_header: bool,
    /// Header names, or `col_<i>` for headerless files.
    pub source_columns: Vec<String>,
    /// Up to [`SAMPLE_ROWS`] decoded records.
    pub sample: Vec<Vec<String>>,
    pub inferred_types: Vec<String>,
    /// Source positions whose values look like LinkedIn profile URLs.
    pub linkedin_candidates: Vec<usize>,
}

impl CsvProfile {
    /// Sampled values of one column, including blanks.
    pub fn column_values(&self, index: usize) -> Vec<&str> {
        self.sample
            .iter()
            .map(|row| row.get(index).map_or("", String::as_str))
            .collect()
    }

    /// First `n` non-blank sampled values of one column.
    pub fn examples(&self, index: usize, n: usize) -> Vec<&str> {
        self.column_values(index)
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .take(n)
            .collect()
    }
}

/// Output settings for one source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedColumn {
    pub source_index: usize,
    pub source_name: String,
    pub name: String,
    pub sql_type: String,
    pub excluded: bool,
}

/// Extra column holding names extracted from a LinkedIn URL column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedinColumn {
    pub source_index: usize,
    pub name: String,
}

/// Mapping from CSV columns to table columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnPlan {
    pub columns: Vec<PlannedColumn>,
    pub linkedin: Vec<LinkedinColumn>,
}

impl ColumnPlan {
    /// Sanitized names and inferred types for every source column.
    pub fn automatic(profile: &CsvProfile) -> Self {
        let names = sanitize_column_names(&profile.source_columns);
        let columns = profile
            .source_columns
            .iter()
            .zip(names)
            .enumerate()
            .map(|(i, (source, name))| PlannedColumn {
                source_index: i,
                source_name: source.clone(),
                name,
                sql_type: profile
                    .inferred_types
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| "TEXT".to_string()),
                excluded: false,
            })
            .collect();
        Self {
            columns,
            linkedin: Vec::new(),
        }
    }

    pub fn included(&self) -> impl Iterator<Item = &PlannedColumn> {
        self.columns.iter().filter(|c| !c.excluded)
    }

    pub fn included_mut(&mut self) -> impl Iterator<Item = &mut PlannedColumn> {
        self.columns.iter_mut().filter(|c| !c.excluded)
    }

    /// Mark source columns as excluded. Unknown positions are ignored.
    pub fn exclude(&mut self, source_indices: &[usize]) {
        for column in &mut self.columns {
            if source_indices.contains(&column.source_index) {
                column.excluded = true;
            }
        }
    }

    /// Add a `<column>_name` column derived from a LinkedIn URL column.
    pub fn add_linkedin(&mut self, source_index: usize) {
        let Some(source) = self.columns.get(source_index) else {
            return;
        };
        if self.linkedin.iter().any(|l| l.source_index == source_index) {
            return;
        }
        let name = format!("{}_name", normalize_col_name(&source.source_name));
        self.linkedin.push(LinkedinColumn { source_index, name });
    }

    /// Table columns in output order: included source columns, then
    /// LinkedIn-derived columns. Names are made unique.
    pub fn output_columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .included()
            .map(|c| Column::new(c.name.clone(), c.sql_type.clone()))
            .chain(
                self.linkedin
                    .iter()
                    .map(|l| Column::new(l.name.clone(), LINKEDIN_NAME_TYPE)),
            )
            .collect();
        let unique = dedupe_names(columns.iter().map(|c| c.name.clone()).collect());
        for (column, name) in columns.iter_mut().zip(unique) {
            column.name = name;
        }
        columns
    }
}

fn csv_reader(path: &Path, has_header: bool) -> Result<csv::Reader<File>, Csv2SqlError> {
    ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Csv2SqlError::CsvReadError {
            path: path.to_path_buf(),
            source: e,
        })
}

fn decode_record(record: &ByteRecord) -> Vec<String> {
    record.iter().map(decode_field).collect()
}

/// Read the header and a sample of records from `path`.
pub fn analyze_csv(path: &Path) -> Result<CsvProfile, Csv2SqlError> {
    if !path.exists() {
        return Err(Csv2SqlError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let has_header = file_has_header(path)?;
    let mut reader = csv_reader(path, has_header)?;

    let headers: Option<Vec<String>> = if has_header {
        let record = reader.byte_headers().map_err(|e| Csv2SqlError::CsvReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut names = decode_record(record);
        if let Some(first) = names.first_mut() {
            *first = first.trim_start_matches('\u{feff}').to_string();
        }
        Some(names)
    } else {
        None
    };

    let mut sample = Vec::new();
    for result in reader.byte_records().take(SAMPLE_ROWS) {
        match result {
            Ok(record) => sample.push(decode_record(&record)),
            Err(err) => tracing::debug!(error = %err, "skipping unreadable sample record"),
        }
    }

    let source_columns = headers.unwrap_or_else(|| {
        let width = sample.first().map_or(0, Vec::len);
        (0..width).map(|i| format!("col_{}", i)).collect()
    });

    let mut profile = CsvProfile {
        path: path.to_path_buf(),
        has_header,
        source_columns,
        sample,
        inferred_types: Vec::new(),
        linkedin_candidates: Vec::new(),
    };

    profile.inferred_types = (0..profile.source_columns.len())
        .map(|i| infer_sql_type(&profile.column_values(i)).to_string())
        .collect();
    profile.linkedin_candidates = (0..profile.source_columns.len())
        .filter(|&i| {
            profile
                .examples(i, LINKEDIN_PROBE_VALUES)
                .iter()
                .any(|v| v.to_lowercase().contains(LINKEDIN_MARKER))
        })
        .collect();

    tracing::info!(
        path = %path.display(),
        columns = profile.source_columns.len(),
        sampled = profile.sample.len(),
        has_header,
        "analyzed CSV"
    );
    Ok(profile)
}

/// Number of data records in the file, header excluded.
pub fn count_data_rows(path: &Path, has_header: bool) -> Result<usize, Csv2SqlError> {
    let mut reader = csv_reader(path, has_header)?;
    Ok(reader.byte_records().count())
}

/// Render one CSV field for a column of `sql_type` named `column_name`.
///
/// Name columns are reduced to ASCII slugs, numeric and boolean columns keep
/// well-formed values bare, everything else becomes a quoted string with
/// embedded quotes doubled.
pub fn escape_csv_value(raw: &str, column_name: &str, sql_type: &str) -> SqlValue {
    let value = raw.trim();
    if value.is_empty() {
        return SqlValue::Null;
    }
    if is_name_column(column_name) {
        return sanitize_person_name(value).map_or(SqlValue::Null, SqlValue::Text);
    }
    if sql_type.eq_ignore_ascii_case("BOOLEAN") && is_boolean_literal(value) {
        return SqlValue::Number(value.to_ascii_uppercase());
    }
    if is_numeric_type(sql_type) && is_numeric_literal(value) {
        return SqlValue::Number(value.to_string());
    }
    SqlValue::Text(value.to_string())
}

/// Settings for [`convert_csv`].
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub csv_path: PathBuf,
    /// Defaults to a name derived from the file name.
    pub table_name: Option<String>,
    /// Defaults to `<stem>_insert_statements.sql` beside the CSV.
    pub output_path: Option<PathBuf>,
    pub chunk_size: usize,
    pub max_rows: Option<usize>,
    /// Column mapping; automatic when absent.
    pub plan: Option<ColumnPlan>,
    pub show_progress: bool,
}

impl ConvertOptions {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            table_name: None,
            output_path: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_rows: None,
            plan: None,
            show_progress: false,
        }
    }
}

/// Outcome of a conversion run.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub sql_path: PathBuf,
    pub table_name: String,
    pub columns: Vec<Column>,
    pub processed_rows: usize,
    pub error_count: usize,
    pub chunks: usize,
    /// First few row errors.
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

impl ConversionResult {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.processed_rows, self.error_count)
    }

    pub fn rows_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed_rows as f64 / secs
        } else {
            self.processed_rows as f64
        }
    }
}

/// `<stem>_insert_statements.sql` in the CSV's directory.
pub fn default_output_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    csv_path.with_file_name(format!("{}_insert_statements.sql", stem))
}

struct RowErrors {
    count: usize,
    kept: Vec<String>,
}

impl RowErrors {
    fn record(&mut self, message: String) {
        self.count += 1;
        tracing::warn!(error = %message, "skipping CSV record");
        if self.kept.len() < MAX_RECORDED_ERRORS {
            self.kept.push(message.replace(['\n', '\r'], " "));
        }
    }
}

/// Convert a CSV file into a SQL script.
///
/// # Errors
/// Missing input, an unreadable header, an invalid table name and output
/// write failures abort the run. Broken records are only counted.
pub fn convert_csv(options: &ConvertOptions) -> Result<ConversionResult> {
    let started = Instant::now();
    let csv_path = &options.csv_path;

    let profile = analyze_csv(csv_path)
        .with_context(|| format!("Failed to analyze CSV: {}", csv_path.display()))?;
    let plan = options
        .plan
        .clone()
        .unwrap_or_else(|| ColumnPlan::automatic(&profile));

    let table_name = options
        .table_name
        .clone()
        .unwrap_or_else(|| table_name_from_path(csv_path));
    if !is_valid_table_name(&table_name) {
        return Err(Csv2SqlError::InvalidTableName { name: table_name }.into());
    }

    let sql_path = options
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(csv_path));
    let columns = plan.output_columns();

    tracing::info!(
        csv = %csv_path.display(),
        output = %sql_path.display(),
        table = %table_name,
        "starting CSV conversion"
    );

    let write_err = |e: std::io::Error| Csv2SqlError::OutputWriteError {
        path: sql_path.clone(),
        source: e,
    };

    let file = File::create(&sql_path).map_err(write_err)?;
    let mut out = BufWriter::new(file);

    write!(
        out,
        "-- SQL file generated from: {}\n-- Generated at: {}\n",
        csv_path.display(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
    .map_err(write_err)?;
    if !profile.has_header {
        writeln!(out, "-- Source has no header row; column names were generated").map_err(write_err)?;
    }
    write!(
        out,
        "\n-- Create table {}\n{}\n",
        table_name,
        render_create_table(&table_name, &columns)
    )
    .map_err(write_err)?;

    let insert_prefix = format!(
        "INSERT INTO {} ({}) VALUES",
        table_name,
        columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let included: Vec<&PlannedColumn> = plan.included().collect();
    let chunk_size = options.chunk_size.max(1);
    let expected_fields = profile.source_columns.len();

    let mut reader = csv_reader(csv_path, profile.has_header)?;
    let pb = progress::spinner("Converting rows", options.show_progress);
    let mut processed_rows = 0usize;
    let mut chunks = 0usize;
    let mut errors = RowErrors {
        count: 0,
        kept: Vec::new(),
    };
    let mut record = ByteRecord::new();
    let mut record_no = 0usize;

    loop {
        if options.max_rows.is_some_and(|max| processed_rows >= max) {
            break;
        }
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) => {
                record_no += 1;
                if record_no % chunk_size == 1 || chunk_size == 1 {
                    chunks += 1;
                }
                errors.record(format!("Chunk {}, record {}: {}", chunks.max(1), record_no, err));
                // An I/O error leaves the reader unusable.
                if matches!(err.kind(), csv::ErrorKind::Io(_)) {
                    break;
                }
                continue;
            }
        }

        record_no += 1;
        if record_no % chunk_size == 1 || chunk_size == 1 {
            chunks += 1;
            if chunks % 10 == 0 {
                tracing::info!(chunks, processed_rows, errors = errors.count, "conversion progress");
            }
        }

        if record.len() != expected_fields {
            errors.record(format!(
                "Chunk {}, record {}: expected {} fields, found {}",
                chunks,
                record_no,
                expected_fields,
                record.len()
            ));
            continue;
        }

        let fields = decode_record(&record);
        let values: Vec<String> = included
            .iter()
            .map(|c| {
                let raw = fields.get(c.source_index).map_or("", String::as_str);
                escape_csv_value(raw, &c.name, &c.sql_type).to_string()
            })
            .chain(plan.linkedin.iter().map(|l| {
                fields
                    .get(l.source_index)
                    .and_then(|url| extract_name_from_linkedin_url(url))
                    .map_or(SqlValue::Null, SqlValue::Text)
                    .to_string()
            }))
            .collect();

        writeln!(out, "{} ({});", insert_prefix, values.join(", ")).map_err(write_err)?;
        processed_rows += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let rate = success_rate(processed_rows, errors.count);
    write!(
        out,
        "\n-- CONVERSION STATISTICS\n\
         -- Rows processed successfully: {}\n\
         -- Errors/skipped rows: {}\n\
         -- Success rate: {:.2}%\n\
         -- Chunks processed: {}\n",
        processed_rows, errors.count, rate, chunks
    )
    .map_err(write_err)?;
    if !errors.kept.is_empty() {
        writeln!(out, "\n-- FIRST {} ERRORS:", errors.kept.len()).map_err(write_err)?;
        for (i, message) in errors.kept.iter().enumerate() {
            writeln!(out, "-- Error {}: {}", i + 1, message).map_err(write_err)?;
        }
    }
    write!(out, "\nCOMMIT;\n").map_err(write_err)?;
    out.flush().map_err(write_err)?;

    tracing::info!(
        processed_rows,
        errors = errors.count,
        success_rate = %format!("{:.2}", rate),
        "conversion finished"
    );

    Ok(ConversionResult {
        sql_path,
        table_name,
        columns,
        processed_rows,
        error_count: errors.count,
        chunks,
        errors: errors.kept,
        elapsed: started.elapsed(),
    })
}

/// Append INSERTs for `table_columns` to `output`, reading values from the
/// CSV column whose normalized header matches each table column.
///
/// Table columns without a matching CSV column get `NULL`.
pub fn append_inserts_from_csv(
    csv_path: &Path,
    table_name: &str,
    table_columns: &[String],
    output: &Path,
) -> Result<CsvAppendReport, Csv2SqlError> {
    let mut reader = csv_reader(csv_path, true)?;
    let headers = decode_record(reader.byte_headers().map_err(|e| Csv2SqlError::CsvReadError {
        path: csv_path.to_path_buf(),
        source: e,
    })?);

    let mapping: Vec<Option<usize>> = table_columns
        .iter()
        .map(|column| {
            let key = normalize_col_name(column);
            headers
                .iter()
                .rposition(|h| normalize_col_name(h.trim_start_matches('\u{feff}')) == key)
        })
        .collect();

    let write_err = |e: std::io::Error| Csv2SqlError::OutputWriteError {
        path: output.to_path_buf(),
        source: e,
    };
    let file = OpenOptions::new().append(true).create(true).open(output).map_err(write_err)?;
    let mut out = BufWriter::new(file);

    let prefix = format!("INSERT INTO {} ({}) VALUES", table_name, table_columns.join(", "));
    let mut report = CsvAppendReport {
        mapping: table_columns
            .iter()
            .zip(&mapping)
            .map(|(t, m)| (t.clone(), m.map(|i| headers[i].clone())))
            .collect(),
        rows_written: 0,
        rows_skipped: 0,
    };

    for result in reader.byte_records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "skipping CSV record");
                report.rows_skipped += 1;
                continue;
            }
        };
        let values: Vec<String> = mapping
            .iter()
            .map(|m| {
                m.and_then(|i| record.get(i))
                    .map_or(SqlValue::Null, |bytes| SqlValue::text_or_null(&decode_field(bytes)))
                    .to_string()
            })
            .collect();
        writeln!(out, "{} ({});", prefix, values.join(", ")).map_err(write_err)?;
        report.rows_written += 1;
    }
    out.flush().map_err(write_err)?;

    tracing::info!(rows = report.rows_written, skipped = report.rows_skipped, "appended INSERTs from CSV");
    Ok(report)
}

/// Outcome of [`append_inserts_from_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvAppendReport {
    /// Each table column with the CSV header it was read from.
    pub mapping: Vec<(String, Option<String>)>,
    pub rows_written: usize,
    pub rows_skipped: usize,
}
