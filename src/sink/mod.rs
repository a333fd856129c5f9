//! Relational sinks that execute generated SQL scripts
//!
//! A script is split into DDL (`CREATE`/`DROP TABLE`) and `INSERT INTO`
//! statements. DDL runs first, then INSERTs in batches, each batch committed
//! on its own. A failing statement of either kind is counted and skipped;
//! only connection, commit and row-count failures stop a load.

mod sqlite;

#[cfg(feature = "postgres")]
mod pg;

use std::path::Path;

use anyhow::Result;

use crate::error::Csv2SqlError;
use crate::interact::{ask_sqlite_limit, Prompter};
use crate::progress;
use crate::util::{starts_with_ci, success_rate};

pub use sqlite::{load_sql_file_into_sqlite, sqlite_path_for, SqliteSink};

#[cfg(feature = "postgres")]
pub use pg::{load_sql_file_into_postgres, test_connection, PgCredentials, PostgresSink};

/// INSERT statements committed per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Statement errors reported individually before the rest are suppressed.
const MAX_REPORTED_ERRORS: usize = 5;

/// Longest error message kept per failed statement.
const MAX_ERROR_CHARS: usize = 80;

/// A database that can run generated statements.
pub trait RelationalSink {
    /// Run one statement inside the current transaction, opening one if needed.
    fn execute(&mut self, sql: &str) -> Result<(), Csv2SqlError>;

    /// Commit the current transaction, if any.
    fn commit(&mut self) -> Result<(), Csv2SqlError>;

    fn count_rows(&mut self, table_name: &str) -> Result<u64, Csv2SqlError>;

    /// Human-readable target description.
    fn describe(&self) -> String;
}

/// Which optional sinks this build supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinkCapabilities {
    pub postgres: bool,
}

impl SinkCapabilities {
    /// Capabilities compiled into this binary.
    pub fn detect() -> Self {
        Self {
            postgres: cfg!(feature = "postgres"),
        }
    }
}

/// Sink chosen from the database menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Sqlite,
    Postgres,
    None,
}

/// Show the database menu. Choosing PostgreSQL in a build without it
/// reports that and yields [`SinkKind::None`].
pub fn ask_sink_kind(prompter: &mut dyn Prompter, capabilities: SinkCapabilities) -> Result<SinkKind> {
    let postgres_label = if capabilities.postgres {
        "PostgreSQL - connect to a server".to_string()
    } else {
        "PostgreSQL [unavailable] - rebuild with the `postgres` feature".to_string()
    };
    let choices = vec![
        "SQLite - create a local .db file".to_string(),
        postgres_label,
        "None - keep only the SQL file".to_string(),
    ];

    match prompter.select("Select a database to load the data into:", &choices, 0)? {
        0 => Ok(SinkKind::Sqlite),
        1 if capabilities.postgres => Ok(SinkKind::Postgres),
        1 => {
            prompter.say(&Csv2SqlError::PostgresUnavailable.to_string());
            Ok(SinkKind::None)
        }
        _ => Ok(SinkKind::None),
    }
}

/// Statements of a script, grouped by kind, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptStatements {
    pub ddl: Vec<String>,
    pub inserts: Vec<String>,
}

/// Split a SQL script on `;` outside string literals, dropping `--`
/// comments. Statements other than table DDL and INSERTs are ignored.
pub fn split_script(sql: &str) -> ScriptStatements {
    let mut script = ScriptStatements::default();
    let mut ignored = 0usize;

    for statement in split_statements(sql) {
        if starts_with_ci(&statement, "INSERT INTO") {
            script.inserts.push(statement);
        } else if starts_with_ci(&statement, "CREATE TABLE") || starts_with_ci(&statement, "DROP TABLE") {
            script.ddl.push(statement);
        } else {
            ignored += 1;
        }
    }

    tracing::debug!(
        ddl = script.ddl.len(),
        inserts = script.inserts.len(),
        ignored,
        "split SQL script"
    );
    script
}

fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            ';' => {
                push_statement(&mut statements, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// Settings for [`load_script`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Table counted after loading.
    pub table_name: String,
    /// INSERTs to run, 0 = all.
    pub max_inserts: usize,
    pub batch_size: usize,
    pub show_progress: bool,
}

impl LoadOptions {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            max_inserts: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: false,
        }
    }
}

/// Outcome of loading a script into a sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkReport {
    pub ddl_executed: usize,
    pub ddl_failed: usize,
    /// INSERTs present in the script, before the limit.
    pub inserts_found: usize,
    pub inserts_executed: usize,
    /// Failed INSERTs.
    pub failed: usize,
    /// Rows in the target table after loading.
    pub row_count: u64,
    /// First few statement errors, DDL and INSERT alike.
    pub errors: Vec<String>,
}

impl SinkReport {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.inserts_executed, self.failed)
    }

    /// Total failed statements.
    pub fn total_failed(&self) -> usize {
        self.ddl_failed + self.failed
    }

    fn record_failure(&mut self, position: usize, err: &Csv2SqlError) {
        let failures = self.total_failed();
        if failures <= MAX_REPORTED_ERRORS {
            let message: String = err.to_string().chars().take(MAX_ERROR_CHARS).collect();
            tracing::warn!(statement = position, error = %message, "statement failed");
            self.errors.push(format!("statement {}: {}", position, message));
        } else if failures == MAX_REPORTED_ERRORS + 1 {
            tracing::warn!("further statement errors suppressed");
        }
    }
}

/// Execute `script` against `sink`.
///
/// # Errors
/// Commit failures and the final row count are fatal. A failing DDL or
/// INSERT statement is only counted.
pub fn load_script(
    sink: &mut dyn RelationalSink,
    script: &ScriptStatements,
    options: &LoadOptions,
) -> Result<SinkReport, Csv2SqlError> {
    let mut report = SinkReport {
        inserts_found: script.inserts.len(),
        ..Default::default()
    };

    for (i, statement) in script.ddl.iter().enumerate() {
        match sink.execute(statement) {
            Ok(()) => report.ddl_executed += 1,
            Err(err) => {
                report.ddl_failed += 1;
                report.record_failure(i + 1, &err);
            }
        }
    }
    sink.commit()?;

    let limit = match options.max_inserts {
        0 => script.inserts.len(),
        n => n.min(script.inserts.len()),
    };
    if limit < script.inserts.len() {
        tracing::warn!(limit, total = script.inserts.len(), "limiting INSERT statements");
    }
    tracing::info!(
        target = %sink.describe(),
        ddl = report.ddl_executed,
        inserts = limit,
        "loading script"
    );

    let inserts = &script.inserts[..limit];
    let pb = progress::bar(inserts.len() as u64, "Inserting rows", options.show_progress);
    for (batch_no, batch) in inserts.chunks(options.batch_size.max(1)).enumerate() {
        for (i, statement) in batch.iter().enumerate() {
            match sink.execute(statement) {
                Ok(()) => report.inserts_executed += 1,
                Err(err) => {
                    let position = script.ddl.len() + batch_no * options.batch_size.max(1) + i + 1;
                    report.failed += 1;
                    report.record_failure(position, &err);
                }
            }
        }
        sink.commit()?;
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();

    if report.total_failed() > 0 {
        tracing::warn!(
            ddl_failed = report.ddl_failed,
            inserts_failed = report.failed,
            "some statements failed"
        );
    }

    report.row_count = sink.count_rows(&options.table_name)?;
    Ok(report)
}

/// Ask which database to load `sql_path` into and run the load.
///
/// Load failures are reported through the prompter; only prompt failures
/// are returned as errors.
pub fn offer_sink(
    prompter: &mut dyn Prompter,
    sql_path: &Path,
    table_name: &str,
    capabilities: SinkCapabilities,
    show_progress: bool,
) -> Result<Option<SinkReport>> {
    match ask_sink_kind(prompter, capabilities)? {
        SinkKind::Sqlite => {
            let max_inserts = ask_sqlite_limit(prompter)?;
            match load_sql_file_into_sqlite(sql_path, table_name, max_inserts, show_progress) {
                Ok((db_path, report)) => {
                    report_load(prompter, &report);
                    prompter.say(&format!("SQLite database ready: {}", db_path.display()));
                    Ok(Some(report))
                }
                Err(err) => {
                    prompter.say(&format!("Could not create the SQLite database: {}", err));
                    Ok(None)
                }
            }
        }
        SinkKind::Postgres => offer_postgres(prompter, sql_path, table_name, show_progress),
        SinkKind::None => {
            prompter.say("Only the SQL file was generated.");
            Ok(None)
        }
    }
}

#[cfg(feature = "postgres")]
fn offer_postgres(
    prompter: &mut dyn Prompter,
    sql_path: &Path,
    table_name: &str,
    show_progress: bool,
) -> Result<Option<SinkReport>> {
    let credentials = PgCredentials::ask(prompter)?;
    if let Err(err) = test_connection(&credentials) {
        prompter.say(&format!("Could not connect to PostgreSQL: {}", err));
        return Ok(None);
    }
    prompter.say("Connected to PostgreSQL.");

    let max_inserts = if prompter.confirm("Limit the number of rows for testing?", false)? {
        prompter.ask_number("Maximum number of rows", Some(1000), 1..=usize::MAX)?
    } else {
        0
    };

    match load_sql_file_into_postgres(sql_path, table_name, &credentials, max_inserts, show_progress) {
        Ok(report) => {
            report_load(prompter, &report);
            prompter.say(&format!("PostgreSQL table ready: {} on {}", table_name, credentials.endpoint()));
            Ok(Some(report))
        }
        Err(err) => {
            prompter.say(&format!("Could not load into PostgreSQL: {}", err));
            Ok(None)
        }
    }
}

#[cfg(not(feature = "postgres"))]
fn offer_postgres(
    prompter: &mut dyn Prompter,
    _sql_path: &Path,
    _table_name: &str,
    _show_progress: bool,
) -> Result<Option<SinkReport>> {
    prompter.say(&Csv2SqlError::PostgresUnavailable.to_string());
    Ok(None)
}

fn report_load(prompter: &mut dyn Prompter, report: &SinkReport) {
    if report.ddl_failed > 0 {
        prompter.say(&format!("{} table statements failed", report.ddl_failed));
    }
    if report.failed > 0 {
        prompter.say(&format!(
            "{} INSERT statements failed ({:.2}% succeeded)",
            report.failed,
            report.success_rate()
        ));
    }
    for error in &report.errors {
        prompter.say(&format!("  {}", error));
    }
    prompter.say(&format!("Rows in table: {}", report.row_count));
}
