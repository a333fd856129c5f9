//! Error types for rust-csv2sql

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a conversion or repair run.
///
/// Row-level problems (a bad CSV record, a tuple with the wrong arity, a
/// statement rejected by a sink) are never raised through this type; they are
/// counted and reported in the run's result instead.
#[derive(Error, Debug)]
pub enum Csv2SqlError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV file: {path}")]
    CsvReadError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write output to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The SQL input is empty")]
    EmptySqlInput,

    #[error("Could not detect column names: {message}")]
    NoColumnSource { message: String },

    #[error("Invalid table name '{name}': must start with a letter and contain only letters, digits and underscores")]
    InvalidTableName { name: String },

    #[error("Input closed while waiting for an answer to: {question}")]
    PromptClosed { question: String },

    #[error("Database sink error: {message}")]
    SinkError { message: String },

    #[error("PostgreSQL support is not available in this build (enable the `postgres` feature)")]
    PostgresUnavailable,
}

impl From<rusqlite::Error> for Csv2SqlError {
    fn from(err: rusqlite::Error) -> Self {
        Csv2SqlError::SinkError {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<postgres::Error> for Csv2SqlError {
    fn from(err: postgres::Error) -> Self {
        Csv2SqlError::SinkError {
            message: err.to_string(),
        }
    }
}
