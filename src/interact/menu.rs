//! Menus and preset limit questions shared by the interactive flows

use anyhow::Result;

use super::Prompter;

/// Tuple counts at or below this are processed without asking.
pub const SMALL_INPUT_THRESHOLD: usize = 100;

/// Top-level menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuChoice {
    ConvertCsv,
    RepairSql,
    Exit,
}

/// Show the main menu and return the chosen action.
pub fn ask_main_menu(prompter: &mut dyn Prompter) -> Result<MainMenuChoice> {
    let choices = vec![
        "Convert CSV to SQL - main conversion flow".to_string(),
        "Repair an existing SQL file - edit schema and rebuild INSERTs".to_string(),
        "Exit".to_string(),
    ];
    let picked = prompter.select("Select an option:", &choices, 0)?;
    Ok(match picked {
        0 => MainMenuChoice::ConvertCsv,
        1 => MainMenuChoice::RepairSql,
        _ => MainMenuChoice::Exit,
    })
}

/// Ask how many bare value tuples to rebuild. Returns 0 for "all".
pub fn ask_tuple_limit(prompter: &mut dyn Prompter, total: usize) -> Result<usize> {
    prompter.say(&format!("Detected {} VALUES tuples in the file", total));
    if total <= SMALL_INPUT_THRESHOLD {
        prompter.say("The file is small, processing every tuple.");
        return Ok(0);
    }

    let choices = vec![
        "Quick sample (100 tuples)".to_string(),
        "Medium (10,000 tuples)".to_string(),
        "The whole file".to_string(),
        "Custom (you choose how many)".to_string(),
    ];
    match prompter.select("Processing options:", &choices, 2)? {
        0 => Ok(100),
        1 => Ok(10_000),
        2 => Ok(0),
        _ => prompter.ask_number(
            &format!("How many tuples to process? (1 to {})", total),
            Some(1000.min(total)),
            1..=total,
        ),
    }
}

/// Ask how many INSERT statements to migrate into SQLite. Returns 0 for "all".
pub fn ask_sqlite_limit(prompter: &mut dyn Prompter) -> Result<usize> {
    let choices = vec![
        "Quick sample (100 rows)".to_string(),
        "Medium (500 rows)".to_string(),
        "Large (5,000 rows)".to_string(),
        "The whole file".to_string(),
        "Custom (you choose how many)".to_string(),
    ];
    match prompter.select("SQLite migration options:", &choices, 3)? {
        0 => Ok(100),
        1 => Ok(500),
        2 => Ok(5_000),
        3 => Ok(0),
        _ => prompter.ask_number("How many rows to migrate to SQLite?", Some(500), 1..=usize::MAX),
    }
}

/// Ask how many CSV rows to convert. `None` means every row.
pub fn ask_csv_row_limit(prompter: &mut dyn Prompter, total_rows: usize) -> Result<Option<usize>> {
    let choices = vec![
        "Small sample (100 rows)".to_string(),
        "Medium sample (5,000 rows)".to_string(),
        "Large sample (50,000 rows)".to_string(),
        format!("Whole file ({} rows)", total_rows),
        "Custom amount".to_string(),
    ];
    match prompter.select("How many rows do you want to convert?", &choices, 3)? {
        0 => Ok(Some(100)),
        1 => Ok(Some(5_000)),
        2 => Ok(Some(50_000)),
        3 => Ok(None),
        _ => prompter
            .ask_number("Number of rows", Some(1000), 1..=usize::MAX)
            .map(Some),
    }
}
