//! Interactive schema editing as an explicit state machine
//!
//! ```text
//! Loaded -> ColumnsSelected -> ColumnsEdited -> TableNamed -> Confirmed
//!   ^                                               |
//!   +------------------ declined -------------------+
//! ```
//!
//! Each state owns everything the next step needs, so a flow can be driven
//! one step at a time from a [`ScriptedPrompter`](crate::interact::ScriptedPrompter).

use std::collections::BTreeSet;

use anyhow::Result;

use super::schema::{apply_edits, ColumnChange, ParsedSchema, SchemaEdit};
use crate::interact::Prompter;

/// Characters that cannot appear in an unquoted table name.
const FORBIDDEN_NAME_CHARS: [char; 6] = [';', '(', ')', ',', '\'', '"'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    /// Schema parsed, nothing edited yet.
    Loaded(ParsedSchema),
    /// Columns to delete chosen.
    ColumnsSelected {
        schema: ParsedSchema,
        removed: BTreeSet<usize>,
    },
    /// Surviving columns renamed/retyped.
    ColumnsEdited {
        schema: ParsedSchema,
        removed: BTreeSet<usize>,
        changes: Vec<ColumnChange>,
    },
    /// Table name chosen, waiting for confirmation.
    TableNamed { schema: ParsedSchema, edit: SchemaEdit },
    /// Final edit accepted.
    Confirmed(SchemaEdit),
}

impl EditState {
    pub fn new(schema: ParsedSchema) -> Self {
        EditState::Loaded(schema)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, EditState::Confirmed(_))
    }

    /// Run the prompt belonging to the current state and return the next one.
    ///
    /// `Confirmed` is terminal and returns itself.
    pub fn advance(self, prompter: &mut dyn Prompter) -> Result<EditState> {
        match self {
            EditState::Loaded(schema) => select_removals(schema, prompter),
            EditState::ColumnsSelected { schema, removed } => {
                edit_columns(schema, removed, prompter)
            }
            EditState::ColumnsEdited {
                schema,
                removed,
                changes,
            } => name_table(schema, removed, changes, prompter),
            EditState::TableNamed { schema, edit } => confirm_edit(schema, edit, prompter),
            confirmed @ EditState::Confirmed(_) => Ok(confirmed),
        }
    }
}

/// Drive the editing flow until the user confirms.
pub fn run_schema_wizard(schema: ParsedSchema, prompter: &mut dyn Prompter) -> Result<SchemaEdit> {
    let mut state = EditState::new(schema);
    loop {
        state = match state.advance(prompter)? {
            EditState::Confirmed(edit) => return Ok(edit),
            next => next,
        };
    }
}

fn select_removals(schema: ParsedSchema, prompter: &mut dyn Prompter) -> Result<EditState> {
    prompter.say(&format!("Detected schema: {}", schema.table_name));
    let choices: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("{} ({})", c.name, c.sql_type))
        .collect();
    let picked = prompter.multi_select("Select the columns to delete:", &choices)?;

    if picked.len() == schema.columns.len() {
        prompter.say("At least one column must remain.");
        return Ok(EditState::Loaded(schema));
    }

    let removed: BTreeSet<usize> = picked.into_iter().collect();
    prompter.say(&format!(
        "Columns to keep: {}",
        schema.columns.len() - removed.len()
    ));
    Ok(EditState::ColumnsSelected { schema, removed })
}

fn edit_columns(
    schema: ParsedSchema,
    removed: BTreeSet<usize>,
    prompter: &mut dyn Prompter,
) -> Result<EditState> {
    prompter.say("Rename each column or press enter to keep it.");

    let mut changes = Vec::new();
    let mut taken: Vec<String> = Vec::new();
    for (_, column) in schema
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
    {
        let name = loop {
            let name = prompter.ask(
                &format!("Name for column '{}'", column.name),
                Some(&column.name),
            )?;
            if taken.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                prompter.say(&format!("'{}' is already used by another column.", name));
                continue;
            }
            break name;
        };
        taken.push(name.clone());
        let sql_type = prompter.ask(&format!("SQL type for '{}'", name), Some(&column.sql_type))?;
        changes.push(ColumnChange {
            name: (name != column.name).then_some(name),
            sql_type: (sql_type != column.sql_type).then_some(sql_type),
        });
    }

    Ok(EditState::ColumnsEdited {
        schema,
        removed,
        changes,
    })
}

fn name_table(
    schema: ParsedSchema,
    removed: BTreeSet<usize>,
    changes: Vec<ColumnChange>,
    prompter: &mut dyn Prompter,
) -> Result<EditState> {
    let table_name = prompter.ask("Table name", Some(&schema.table_name))?;
    if table_name.contains(char::is_whitespace) || table_name.contains(FORBIDDEN_NAME_CHARS) {
        prompter.say(&format!("'{}' is not usable as a table name.", table_name));
        return Ok(EditState::ColumnsEdited {
            schema,
            removed,
            changes,
        });
    }

    let edit = apply_edits(&schema, &removed, &changes, Some(&table_name));
    Ok(EditState::TableNamed { schema, edit })
}

fn confirm_edit(
    schema: ParsedSchema,
    edit: SchemaEdit,
    prompter: &mut dyn Prompter,
) -> Result<EditState> {
    prompter.say(&format!("Table: {}", edit.table_name));
    for (i, column) in edit.columns.iter().enumerate() {
        prompter.say(&format!("  {}. {} {}", i + 1, column.name, column.sql_type));
    }
    if !edit.removed_indices.is_empty() {
        prompter.say(&format!("Deleted columns: {}", edit.removed_indices.len()));
    }

    if prompter.confirm("Is this schema correct?", true)? {
        Ok(EditState::Confirmed(edit))
    } else {
        prompter.say("Starting the schema edit again.");
        Ok(EditState::Loaded(schema))
    }
}
