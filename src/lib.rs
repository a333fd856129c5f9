//! rust-csv2sql: turn CSV exports and broken SQL dumps into loadable SQL
//!
//! This library converts CSV files into `CREATE TABLE` + `INSERT` scripts,
//! repairs SQL dumps whose schema or value tuples need editing, and can load
//! the resulting scripts into SQLite or PostgreSQL.

pub mod convert;
pub mod error;
pub mod interact;
pub mod progress;
pub mod repair;
pub mod sink;
pub mod util;
pub mod values;

use std::path::PathBuf;

use anyhow::Result;

pub use convert::{convert_csv, run_csv_wizard, ConversionResult, ConvertOptions};
pub use error::Csv2SqlError;
pub use interact::{MainMenuChoice, Prompter, ScriptedPrompter, TerminalPrompter};
pub use repair::{repair_sql, RepairOptions, RepairOutcome};
pub use sink::{offer_sink, SinkCapabilities, SinkReport};

/// Directories searched for CSV files by the interactive converter.
pub fn default_search_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("."), PathBuf::from("..")]
}

/// Run the interactive main menu until the user exits.
///
/// Errors inside one conversion or repair are reported and the menu is shown
/// again; a closed prompt ends the loop with an error.
pub fn run_menu(
    prompter: &mut dyn Prompter,
    search_dirs: &[PathBuf],
    capabilities: SinkCapabilities,
    show_progress: bool,
) -> Result<()> {
    loop {
        let outcome = match interact::ask_main_menu(prompter)? {
            MainMenuChoice::ConvertCsv => run_csv_flow(prompter, search_dirs, capabilities, show_progress),
            MainMenuChoice::RepairSql => run_repair_flow(prompter, capabilities, show_progress),
            MainMenuChoice::Exit => {
                prompter.say("Goodbye.");
                return Ok(());
            }
        };

        if let Err(err) = outcome {
            if is_prompt_closed(&err) {
                return Err(err);
            }
            tracing::error!(error = %err, "operation failed");
            prompter.say(&format!("Error: {:#}", err));
        }
    }
}

fn run_csv_flow(
    prompter: &mut dyn Prompter,
    search_dirs: &[PathBuf],
    capabilities: SinkCapabilities,
    show_progress: bool,
) -> Result<()> {
    if let Some(result) = run_csv_wizard(prompter, search_dirs, show_progress)? {
        offer_sink(
            prompter,
            &result.sql_path,
            &result.table_name,
            capabilities,
            show_progress,
        )?;
    }
    Ok(())
}

fn run_repair_flow(
    prompter: &mut dyn Prompter,
    capabilities: SinkCapabilities,
    show_progress: bool,
) -> Result<()> {
    let path = prompter.ask("Path to the SQL file to repair", None)?;
    let options = RepairOptions {
        show_progress,
        capabilities,
        ..RepairOptions::new(path)
    };
    repair_sql(&options, prompter)?;
    Ok(())
}

fn is_prompt_closed(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Csv2SqlError>(),
        Some(Csv2SqlError::PromptClosed { .. })
    )
}
