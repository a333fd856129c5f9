//! SQLite sink backed by `rusqlite`

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::{load_script, split_script, LoadOptions, RelationalSink, SinkReport};
use crate::error::Csv2SqlError;
use crate::util::{file_size_mb, read_text_file};

pub struct SqliteSink {
    conn: Connection,
    label: String,
}

impl SqliteSink {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, Csv2SqlError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            label: path.display().to_string(),
        })
    }

    pub fn in_memory() -> Result<Self, Csv2SqlError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            label: ":memory:".to_string(),
        })
    }

    /// Commit anything pending and close the connection.
    pub fn close(mut self) -> Result<(), Csv2SqlError> {
        self.commit()?;
        self.conn.close().map_err(|(_, err)| err.into())
    }
}

impl RelationalSink for SqliteSink {
    fn execute(&mut self, sql: &str) -> Result<(), Csv2SqlError> {
        // SQLite may roll back on its own (SQLITE_FULL, BUSY), so ask the connection.
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Csv2SqlError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn count_rows(&mut self, table_name: &str) -> Result<u64, Csv2SqlError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table_name), [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn describe(&self) -> String {
        format!("SQLite database {}", self.label)
    }
}

/// Database file written for a SQL script: same directory and stem, `.db`.
pub fn sqlite_path_for(sql_path: &Path) -> PathBuf {
    sql_path.with_extension("db")
}

/// Load a generated SQL file into `<stem>.db` beside it.
///
/// A failed load removes the partially written database file.
pub fn load_sql_file_into_sqlite(
    sql_path: &Path,
    table_name: &str,
    max_inserts: usize,
    show_progress: bool,
) -> Result<(PathBuf, SinkReport), Csv2SqlError> {
    let script = split_script(&read_text_file(sql_path)?);
    let db_path = sqlite_path_for(sql_path);
    tracing::info!(path = %db_path.display(), "creating SQLite database");

    let options = LoadOptions {
        max_inserts,
        show_progress,
        ..LoadOptions::new(table_name)
    };
    let load = || -> Result<SinkReport, Csv2SqlError> {
        let mut sink = SqliteSink::open(&db_path)?;
        let report = load_script(&mut sink, &script, &options)?;
        sink.close()?;
        Ok(report)
    };

    match load() {
        Ok(report) => {
            tracing::info!(
                rows = report.row_count,
                size_mb = %format!("{:.2}", file_size_mb(&db_path)),
                "SQLite database created"
            );
            Ok((db_path, report))
        }
        Err(err) => {
            if db_path.exists() {
                if let Err(remove_err) = std::fs::remove_file(&db_path) {
                    tracing::warn!(error = %remove_err, "could not remove partial database");
                }
            }
            Err(err)
        }
    }
}
