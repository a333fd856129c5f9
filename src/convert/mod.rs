//! CSV to SQL conversion
//!
//! [`analyze_csv`] profiles a file, [`ColumnPlan`] maps its columns onto a
//! table and [`convert_csv`] streams the records into a SQL script.
//! [`run_csv_wizard`] drives the same steps interactively.

mod converter;
mod header;
mod names;
mod types;
mod wizard;

pub use converter::{
    analyze_csv, append_inserts_from_csv, convert_csv, count_data_rows, default_output_path,
    escape_csv_value, ColumnPlan, ConversionResult, ConvertOptions, CsvAppendReport, CsvProfile,
    LinkedinColumn, PlannedColumn, DEFAULT_CHUNK_SIZE,
};
pub use header::{detect_header, file_has_header, read_first_line};
pub use names::{
    dedupe_names, extract_name_from_linkedin_url, is_name_column, is_valid_table_name,
    normalize_col_name, random_table_name, sanitize_column_name, sanitize_column_names,
    sanitize_person_name, table_name_from_path,
};
pub use types::{infer_sql_type, is_boolean_literal, is_date_like, is_integer_literal, SAMPLE_ROWS, TYPE_CHOICES};
pub use wizard::{discover_csv_files, exclusion_hints, output_preview, run_csv_wizard};
