//! Interactive CSV conversion flow

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::converter::{analyze_csv, convert_csv, count_data_rows, ColumnPlan, ConversionResult, ConvertOptions, CsvProfile};
use super::names::{dedupe_names, is_valid_table_name, random_table_name, sanitize_column_name, table_name_from_path};
use super::types::TYPE_CHOICES;
use crate::interact::{ask_csv_row_limit, Prompter, SMALL_INPUT_THRESHOLD};
use crate::util::file_size_mb;

/// Sample values shown per column in the preview.
const PREVIEW_EXAMPLES: usize = 3;

/// INSERT lines shown after conversion.
const PREVIEW_INSERTS: usize = 2;

/// Header fragments that mark columns commonly left out of a table.
const EXCLUSION_HINTS: [(&str, &[&str]); 4] = [
    ("ID/Key", &["id", "key", "pk", "primary"]),
    ("Timestamp", &["created", "updated", "modified", "timestamp", "date_created"]),
    ("Auto", &["auto", "increment", "serial"]),
    ("Calculated", &["calculated", "computed", "derived"]),
];

/// `*.csv` files in each of `dirs`, sorted, without duplicates.
pub fn discover_csv_files(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in dirs {
        let pattern = dir.join("*.csv");
        let Some(pattern) = pattern.to_str() else {
            continue;
        };
        match glob::glob(pattern) {
            Ok(paths) => files.extend(paths.flatten().filter(|p| p.is_file())),
            Err(err) => tracing::debug!(pattern, error = %err, "invalid glob pattern"),
        }
    }
    files.sort();
    files.dedup();
    files
}

/// Hint labels for a column name, e.g. `"ID/Key, Timestamp"`.
pub fn exclusion_hints(column: &str) -> Vec<&'static str> {
    let lower = column.to_lowercase();
    EXCLUSION_HINTS
        .iter()
        .filter(|(_, fragments)| fragments.iter().any(|f| lower.contains(f)))
        .map(|(label, _)| *label)
        .collect()
}

/// How much of the column plan the user reviews by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Customization {
    Automatic,
    Names,
    NamesAndTypes,
}

/// Walk the user through converting one CSV file.
///
/// Returns `None` when the user cancels or picks a missing file.
pub fn run_csv_wizard(
    prompter: &mut dyn Prompter,
    search_dirs: &[PathBuf],
    show_progress: bool,
) -> Result<Option<ConversionResult>> {
    let Some(csv_path) = choose_csv_file(prompter, search_dirs)? else {
        return Ok(None);
    };

    let profile = analyze_csv(&csv_path)?;
    show_preview(prompter, &profile);
    if profile.source_columns.is_empty() {
        prompter.say("The file has no columns to convert.");
        return Ok(None);
    }

    let mut plan = ColumnPlan::automatic(&profile);
    offer_linkedin(prompter, &profile, &mut plan)?;
    let table_name = choose_table_name(prompter, &csv_path)?;
    choose_exclusions(prompter, &mut plan)?;

    match choose_customization(prompter)? {
        Customization::Automatic => {}
        Customization::Names => review_columns(prompter, &mut plan, false)?,
        Customization::NamesAndTypes => review_columns(prompter, &mut plan, true)?,
    }
    dedupe_plan(&mut plan);

    show_summary(prompter, &table_name, &plan);
    if !prompter.confirm("Proceed with the conversion?", true)? {
        prompter.say("Conversion cancelled.");
        return Ok(None);
    }

    let total_rows = count_data_rows(&csv_path, profile.has_header)?;
    let max_rows = if total_rows > SMALL_INPUT_THRESHOLD {
        ask_csv_row_limit(prompter, total_rows)?
    } else {
        None
    };

    let options = ConvertOptions {
        table_name: Some(table_name),
        max_rows,
        plan: Some(plan),
        show_progress,
        ..ConvertOptions::new(&csv_path)
    };
    let result = convert_csv(&options)?;
    show_result(prompter, &result);
    show_output_preview(prompter, &result.sql_path);
    Ok(Some(result))
}

fn choose_csv_file(prompter: &mut dyn Prompter, search_dirs: &[PathBuf]) -> Result<Option<PathBuf>> {
    let found = discover_csv_files(search_dirs);
    let path = if found.is_empty() {
        prompter.say("No CSV files found nearby.");
        PathBuf::from(prompter.ask("Path to the CSV file", None)?)
    } else {
        let mut choices: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
        choices.push("Enter a path manually".to_string());
        let picked = prompter.select("Select the CSV file to convert:", &choices, 0)?;
        match found.get(picked) {
            Some(path) => path.clone(),
            None => PathBuf::from(prompter.ask("Path to the CSV file", None)?),
        }
    };

    if !path.is_file() {
        prompter.say(&format!("File not found: {}", path.display()));
        return Ok(None);
    }
    Ok(Some(path))
}

fn show_preview(prompter: &mut dyn Prompter, profile: &CsvProfile) {
    prompter.say(&format!("File: {}", profile.path.display()));
    if profile.has_header {
        prompter.say("Header row detected.");
    } else {
        prompter.say("No header row detected; columns are named col_0, col_1, ...");
    }
    prompter.say(&format!(
        "{} columns, {} sample rows",
        profile.source_columns.len(),
        profile.sample.len()
    ));
    for (i, column) in profile.source_columns.iter().enumerate() {
        let examples = profile.examples(i, PREVIEW_EXAMPLES).join(", ");
        prompter.say(&format!(
            "  {}. {} [{}] e.g. {}",
            i + 1,
            column,
            profile.inferred_types.get(i).map_or("TEXT", String::as_str),
            examples
        ));
    }
}

fn offer_linkedin(prompter: &mut dyn Prompter, profile: &CsvProfile, plan: &mut ColumnPlan) -> Result<()> {
    for &index in &profile.linkedin_candidates {
        let question = format!(
            "Column '{}' holds LinkedIn profile URLs. Add a column with the names extracted from them?",
            profile.source_columns[index]
        );
        if prompter.confirm(&question, true)? {
            plan.add_linkedin(index);
        }
    }
    Ok(())
}

fn choose_table_name(prompter: &mut dyn Prompter, csv_path: &Path) -> Result<String> {
    let suggested = table_name_from_path(csv_path);
    let choices = vec![
        format!("Use the suggested name '{}'", suggested),
        "Enter a custom name".to_string(),
        "Generate a random name".to_string(),
    ];
    let name = match prompter.select("Table name:", &choices, 0)? {
        0 => suggested,
        1 => loop {
            let answer = prompter.ask("Table name", Some(&suggested))?.to_lowercase();
            if is_valid_table_name(&answer) {
                break answer;
            }
            prompter.say("Use letters, digits and underscores, starting with a letter.");
        },
        _ => random_table_name(),
    };
    prompter.say(&format!("Table: {}", name));
    Ok(name)
}

fn choose_exclusions(prompter: &mut dyn Prompter, plan: &mut ColumnPlan) -> Result<()> {
    if !prompter.confirm("Exclude any columns from the table?", false)? {
        return Ok(());
    }

    let choices: Vec<String> = plan
        .columns
        .iter()
        .map(|c| {
            let hints = exclusion_hints(&c.source_name);
            if hints.is_empty() {
                c.source_name.clone()
            } else {
                format!("{} ({})", c.source_name, hints.join(", "))
            }
        })
        .collect();

    loop {
        let picked = prompter.multi_select("Select the columns to exclude:", &choices)?;
        if picked.len() == plan.columns.len() {
            prompter.say("At least one column must remain.");
            continue;
        }
        let source_indices: Vec<usize> = picked.iter().map(|&i| plan.columns[i].source_index).collect();
        plan.exclude(&source_indices);
        prompter.say(&format!("Excluded {} columns.", picked.len()));
        return Ok(());
    }
}

fn choose_customization(prompter: &mut dyn Prompter) -> Result<Customization> {
    let choices = vec![
        "Automatic - sanitized names and inferred types".to_string(),
        "Review column names".to_string(),
        "Review column names and types".to_string(),
    ];
    Ok(match prompter.select("Column customization:", &choices, 0)? {
        0 => Customization::Automatic,
        1 => Customization::Names,
        _ => Customization::NamesAndTypes,
    })
}

fn review_columns(prompter: &mut dyn Prompter, plan: &mut ColumnPlan, with_types: bool) -> Result<()> {
    for column in plan.included_mut() {
        let answer = prompter.ask(&format!("Name for '{}'", column.source_name), Some(&column.name))?;
        column.name = sanitize_column_name(&answer, column.source_index);

        if with_types {
            let mut choices = vec![format!("Keep {}", column.sql_type)];
            choices.extend(TYPE_CHOICES.iter().map(|t| t.to_string()));
            let picked = prompter.select(&format!("Type for '{}'", column.name), &choices, 0)?;
            if let Some(sql_type) = picked.checked_sub(1).and_then(|i| TYPE_CHOICES.get(i)) {
                column.sql_type = sql_type.to_string();
            }
        }
    }
    Ok(())
}

fn dedupe_plan(plan: &mut ColumnPlan) {
    let names = dedupe_names(plan.included().map(|c| c.name.clone()).collect());
    for (column, name) in plan.included_mut().zip(names) {
        if column.name != name {
            tracing::info!(from = %column.name, to = %name, "renamed duplicate column");
            column.name = name;
        }
    }
}

fn show_summary(prompter: &mut dyn Prompter, table_name: &str, plan: &ColumnPlan) {
    prompter.say(&format!("Table {} will have these columns:", table_name));
    for column in plan.output_columns() {
        prompter.say(&format!("  {} {}", column.name, column.sql_type));
    }
    let excluded: Vec<&str> = plan
        .columns
        .iter()
        .filter(|c| c.excluded)
        .map(|c| c.source_name.as_str())
        .collect();
    if !excluded.is_empty() {
        prompter.say(&format!("Excluded: {}", excluded.join(", ")));
    }
}

fn show_result(prompter: &mut dyn Prompter, result: &ConversionResult) {
    prompter.say("Conversion complete.");
    prompter.say(&format!("  Rows converted: {}", result.processed_rows));
    prompter.say(&format!("  Errors/skipped rows: {}", result.error_count));
    prompter.say(&format!("  Success rate: {:.2}%", result.success_rate()));
    prompter.say(&format!(
        "  Time: {:.2}s ({:.0} rows/s)",
        result.elapsed.as_secs_f64(),
        result.rows_per_second()
    ));
    prompter.say(&format!(
        "  Output: {} ({:.2} MB)",
        result.sql_path.display(),
        file_size_mb(&result.sql_path)
    ));
    for error in &result.errors {
        prompter.say(&format!("  {}", error));
    }
}

/// The `CREATE TABLE` block and the first INSERT lines of a generated file.
pub fn output_preview(sql: &str) -> Vec<String> {
    let mut preview = Vec::new();
    let mut in_create = false;
    for line in sql.lines() {
        if line.starts_with("CREATE TABLE") {
            in_create = true;
        }
        if in_create {
            preview.push(line.to_string());
            in_create = !line.starts_with(");");
        }
    }
    preview.extend(
        sql.lines()
            .filter(|l| l.starts_with("INSERT INTO"))
            .take(PREVIEW_INSERTS)
            .map(str::to_string),
    );
    preview
}

fn show_output_preview(prompter: &mut dyn Prompter, sql_path: &Path) {
    match std::fs::read_to_string(sql_path) {
        Ok(sql) => {
            prompter.say("Preview:");
            for line in output_preview(&sql) {
                prompter.say(&format!("  {}", line));
            }
        }
        Err(err) => tracing::warn!(path = %sql_path.display(), error = %err, "cannot read output for preview"),
    }
}
