//! SQL file repair
//!
//! Reads a broken or partial dump, lets the user edit its schema, rebuilds
//! every INSERT against the edited table and writes `<stem>_corrected.sql`
//! next to the input.

mod reconstruct;
mod schema;
mod wizard;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::convert::{append_inserts_from_csv, CsvAppendReport};
use crate::error::Csv2SqlError;
use crate::interact::{ask_tuple_limit, Prompter};
use crate::progress;
use crate::sink::{offer_sink, SinkCapabilities, SinkReport};
use crate::util::{file_size_mb, read_text_file};

pub use reconstruct::{reconstruct, scan_statements, ReconstructOptions, Reconstructed, ScannedSql};
pub use schema::{
    apply_edits, parse_schema, remove_columns, render_create_table, Column, ColumnChange,
    ParsedSchema, SchemaEdit, SchemaSource, DEFAULT_COLUMN_TYPE, DEFAULT_TABLE_NAME,
};
pub use wizard::{run_schema_wizard, EditState};

/// Settings for [`repair_sql`].
#[derive(Debug, Clone)]
pub struct RepairOptions {
    pub sql_path: PathBuf,
    /// Bare tuples to rebuild, 0 = all. Asked interactively when absent.
    pub max_tuples: Option<usize>,
    /// Defaults to [`corrected_path_for`].
    pub output_path: Option<PathBuf>,
    pub show_progress: bool,
    pub capabilities: SinkCapabilities,
}

impl RepairOptions {
    pub fn new(sql_path: impl Into<PathBuf>) -> Self {
        Self {
            sql_path: sql_path.into(),
            max_tuples: None,
            output_path: None,
            show_progress: false,
            capabilities: SinkCapabilities::detect(),
        }
    }
}

/// What a repair run produced.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub output_path: PathBuf,
    pub edit: SchemaEdit,
    pub existing_inserts: usize,
    pub tuples_found: usize,
    pub tuples_processed: usize,
    pub padded_tuples: usize,
    pub csv_append: Option<CsvAppendReport>,
    pub sink: Option<SinkReport>,
}

/// `<stem>_corrected.sql` in the input's directory.
pub fn corrected_path_for(sql_path: &Path) -> PathBuf {
    let stem = sql_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    sql_path.with_file_name(format!("{}_corrected.sql", stem))
}

/// Full corrected script: header comments, schema, rebuilt INSERTs.
pub fn render_corrected_sql(source: &Path, edit: &SchemaEdit, statements: &[String]) -> String {
    let mut sql = format!(
        "-- SQL file corrected/generated by rust-csv2sql\n-- Source: {}\n-- Generated at: {}\n\n",
        source.display(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    sql.push_str(&render_create_table(&edit.table_name, &edit.columns));
    sql.push_str("\n-- INSERT statements (existing and extracted from VALUES)\n");
    for statement in statements {
        sql.push_str(statement);
        sql.push('\n');
    }
    sql
}

/// Repair the SQL file named in `options`, interactively.
///
/// # Errors
/// A missing or empty input, a file without any column source, prompt
/// failures and output write errors abort the repair. Sink failures are
/// reported through the prompter.
pub fn repair_sql(options: &RepairOptions, prompter: &mut dyn Prompter) -> Result<RepairOutcome> {
    let sql_path = &options.sql_path;
    let sql_text = read_text_file(sql_path)?;
    prompter.say(&format!(
        "Read {} ({:.2} MB)",
        sql_path.display(),
        file_size_mb(sql_path)
    ));

    let schema = parse_schema(&sql_text)
        .with_context(|| format!("Cannot repair {}", sql_path.display()))?;
    let edit = run_schema_wizard(schema, prompter)?;

    let scanned = scan_statements(&sql_text);
    let max_tuples = match options.max_tuples {
        Some(limit) => limit,
        None if scanned.bare_tuple_count() > 0 => ask_tuple_limit(prompter, scanned.bare_tuple_count())?,
        None => 0,
    };

    let pb = progress::spinner("Rebuilding INSERT statements", options.show_progress);
    let rebuilt = scanned.render(&ReconstructOptions {
        table_name: edit.table_name.clone(),
        column_names: edit.column_names(),
        max_tuples,
        retained_indices: Some(edit.retained_indices.clone()),
        column_types: Some(edit.column_types()),
    });
    pb.finish_and_clear();

    let output_path = options
        .output_path
        .clone()
        .unwrap_or_else(|| corrected_path_for(sql_path));
    let corrected = render_corrected_sql(sql_path, &edit, &rebuilt.statements);
    std::fs::write(&output_path, corrected).map_err(|e| Csv2SqlError::OutputWriteError {
        path: output_path.clone(),
        source: e,
    })?;

    tracing::info!(
        output = %output_path.display(),
        statements = rebuilt.statements.len(),
        "wrote corrected SQL"
    );
    prompter.say(&format!(
        "Corrected file: {} ({:.2} MB)",
        output_path.display(),
        file_size_mb(&output_path)
    ));
    prompter.say(&format!(
        "INSERT statements: {} existing, {} of {} VALUES tuples rebuilt",
        rebuilt.existing_inserts, rebuilt.tuples_processed, rebuilt.tuples_found
    ));
    if rebuilt.padded_tuples > 0 {
        prompter.say(&format!(
            "{} tuples had missing values filled with NULL",
            rebuilt.padded_tuples
        ));
    }

    let csv_append = if rebuilt.is_empty() {
        offer_csv_append(prompter, &edit, &output_path)?
    } else {
        None
    };

    let sink = offer_sink(
        prompter,
        &output_path,
        &edit.table_name,
        options.capabilities,
        options.show_progress,
    )?;

    Ok(RepairOutcome {
        output_path,
        existing_inserts: rebuilt.existing_inserts,
        tuples_found: rebuilt.tuples_found,
        tuples_processed: rebuilt.tuples_processed,
        padded_tuples: rebuilt.padded_tuples,
        edit,
        csv_append,
        sink,
    })
}

fn offer_csv_append(
    prompter: &mut dyn Prompter,
    edit: &SchemaEdit,
    output_path: &Path,
) -> Result<Option<CsvAppendReport>> {
    prompter.say("No INSERT statements or VALUES tuples were found.");
    if !prompter.confirm("Generate INSERT statements from a CSV file?", false)? {
        return Ok(None);
    }

    let csv_path = PathBuf::from(prompter.ask("Path to the CSV file", None)?);
    if !csv_path.is_file() {
        prompter.say(&format!("File not found: {}", csv_path.display()));
        return Ok(None);
    }

    match append_inserts_from_csv(&csv_path, &edit.table_name, &edit.column_names(), output_path) {
        Ok(report) => {
            for (column, source) in &report.mapping {
                match source {
                    Some(source) => prompter.say(&format!("  {} <- {}", column, source)),
                    None => prompter.say(&format!("  {} <- (no matching CSV column, NULL)", column)),
                }
            }
            prompter.say(&format!("Appended {} INSERT statements.", report.rows_written));
            Ok(Some(report))
        }
        Err(err) => {
            prompter.say(&format!("Could not generate INSERTs from the CSV: {}", err));
            Ok(None)
        }
    }
}
