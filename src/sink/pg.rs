//! PostgreSQL sink backed by the synchronous `postgres` client

use std::path::Path;

use anyhow::Result;
use postgres::{Client, Config, NoTls};

use super::{load_script, split_script, LoadOptions, RelationalSink, SinkReport};
use crate::error::Csv2SqlError;
use crate::interact::Prompter;
use crate::util::read_text_file;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;

/// Connection settings collected interactively.
#[derive(Clone)]
pub struct PgCredentials {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for PgCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl PgCredentials {
    pub fn ask(prompter: &mut dyn Prompter) -> Result<Self> {
        prompter.say("PostgreSQL connection settings");
        let host = prompter.ask("Host", Some(DEFAULT_HOST))?;
        let port = prompter.ask_number("Port", Some(DEFAULT_PORT as usize), 1..=u16::MAX as usize)?;
        let database = prompter.ask("Database name", None)?;
        let user = prompter.ask("User", None)?;
        let password = prompter.ask("Password", Some(""))?;
        Ok(Self {
            host,
            port: port as u16,
            database,
            user,
            password,
        })
    }

    fn config(&self) -> Config {
        let mut config = Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&self.user)
            .password(&self.password);
        config
    }

    /// `host:port/database`
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Open and close a connection to check the credentials.
pub fn test_connection(credentials: &PgCredentials) -> Result<(), Csv2SqlError> {
    let client = credentials.config().connect(NoTls)?;
    client.close()?;
    Ok(())
}

pub struct PostgresSink {
    client: Client,
    endpoint: String,
    in_transaction: bool,
}

impl PostgresSink {
    pub fn connect(credentials: &PgCredentials) -> Result<Self, Csv2SqlError> {
        Ok(Self {
            client: credentials.config().connect(NoTls)?,
            endpoint: credentials.endpoint(),
            in_transaction: false,
        })
    }
}

impl RelationalSink for PostgresSink {
    /// Each statement runs under a savepoint so that one failure does not
    /// abort the rest of the batch.
    fn execute(&mut self, sql: &str) -> Result<(), Csv2SqlError> {
        if !self.in_transaction {
            self.client.batch_execute("BEGIN")?;
            self.in_transaction = true;
        }
        self.client.batch_execute("SAVEPOINT csv2sql_stmt")?;
        match self.client.batch_execute(sql) {
            Ok(()) => {
                self.client.batch_execute("RELEASE SAVEPOINT csv2sql_stmt")?;
                Ok(())
            }
            Err(err) => {
                self.client.batch_execute("ROLLBACK TO SAVEPOINT csv2sql_stmt")?;
                Err(err.into())
            }
        }
    }

    fn commit(&mut self) -> Result<(), Csv2SqlError> {
        if self.in_transaction {
            self.client.batch_execute("COMMIT")?;
            self.in_transaction = false;
        }
        Ok(())
    }

    fn count_rows(&mut self, table_name: &str) -> Result<u64, Csv2SqlError> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: i64 = self.client.query_one(query.as_str(), &[])?.get(0);
        Ok(count.max(0) as u64)
    }

    fn describe(&self) -> String {
        format!("PostgreSQL {}", self.endpoint)
    }
}

/// Load a generated SQL file into the database named by `credentials`.
pub fn load_sql_file_into_postgres(
    sql_path: &Path,
    table_name: &str,
    credentials: &PgCredentials,
    max_inserts: usize,
    show_progress: bool,
) -> Result<SinkReport, Csv2SqlError> {
    let script = split_script(&read_text_file(sql_path)?);
    let mut sink = PostgresSink::connect(credentials)?;
    let options = LoadOptions {
        max_inserts,
        show_progress,
        ..LoadOptions::new(table_name)
    };
    let report = load_script(&mut sink, &script, &options)?;
    sink.commit()?;
    Ok(report)
}
