//! Table schema detection, editing and rendering
//!
//! A schema is read from the first `CREATE TABLE` block in the text. Files
//! that only carry value tuples can still be repaired when one of their first
//! lines is a parenthesized list of quoted column names:
//!
//! ```sql
//! (`id`, `domain`, `company_name`)
//! (1001, 'teledyne.com', 'Teledyne'),
//! ```

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Csv2SqlError;
use crate::values::{retained_indices, tokenize_tuple};

/// Table name used when the input has no `CREATE TABLE`.
pub const DEFAULT_TABLE_NAME: &str = "imported_data";

/// Column type used for columns discovered from a value header.
pub const DEFAULT_COLUMN_TYPE: &str = "VARCHAR(255)";

/// Type given to `CREATE TABLE` entries that only carry a name.
const UNTYPED_COLUMN_TYPE: &str = "TEXT";

/// How many leading lines are searched for a value header.
const HEADER_SEARCH_LINES: usize = 10;

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?([`"\[]?[\w.]+[`"\]]?)\s*\("#)
        .expect("valid CREATE TABLE regex")
});

static BRACKET_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\s*\[").expect("valid bracket header regex"));

/// One column of a table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// Where a parsed schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    CreateTable,
    ValuesHeader,
}

/// Result of [`parse_schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSchema {
    pub table_name: String,
    pub columns: Vec<Column>,
    pub source: SchemaSource,
}

/// Outcome of editing a schema: the new table and columns, plus the mapping
/// back to original column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEdit {
    pub table_name: String,
    pub columns: Vec<Column>,
    /// Original positions that were deleted.
    pub removed_indices: BTreeSet<usize>,
    /// Original positions that survived, ascending. Entry `i` is the source
    /// position of `columns[i]`.
    pub retained_indices: Vec<usize>,
}

impl SchemaEdit {
    /// An edit that keeps everything as parsed.
    pub fn unchanged(schema: &ParsedSchema) -> Self {
        Self {
            table_name: schema.table_name.clone(),
            columns: schema.columns.clone(),
            removed_indices: BTreeSet::new(),
            retained_indices: (0..schema.columns.len()).collect(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_types(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.sql_type.clone()).collect()
    }
}

/// Parse the table name and column list out of SQL text.
///
/// # Errors
/// Returns [`Csv2SqlError::EmptySqlInput`] for blank input and
/// [`Csv2SqlError::NoColumnSource`] when neither a `CREATE TABLE` nor a
/// quoted header line is present.
pub fn parse_schema(sql_text: &str) -> Result<ParsedSchema, Csv2SqlError> {
    if sql_text.trim().is_empty() {
        return Err(Csv2SqlError::EmptySqlInput);
    }

    if let Some(caps) = CREATE_TABLE_RE.captures(sql_text) {
        let table_name = strip_identifier_quotes(&caps[1]);
        let open_end = caps.get(0).map_or(0, |m| m.end());
        let body = balanced_body(&sql_text[open_end..]);
        let columns = parse_column_definitions(body);
        if columns.is_empty() {
            return Err(Csv2SqlError::NoColumnSource {
                message: format!("CREATE TABLE {} has no column definitions", table_name),
            });
        }
        tracing::info!(table = %table_name, columns = columns.len(), "detected CREATE TABLE");
        return Ok(ParsedSchema {
            table_name,
            columns,
            source: SchemaSource::CreateTable,
        });
    }

    parse_values_header(sql_text)
}

/// Infer column names from a leading `(`col1`, `col2`, ...)` line.
fn parse_values_header(sql_text: &str) -> Result<ParsedSchema, Csv2SqlError> {
    let header = sql_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADER_SEARCH_LINES)
        .find(|l| l.starts_with('(') && (l.contains('`') || BRACKET_HEADER_RE.is_match(l)))
        .ok_or_else(|| Csv2SqlError::NoColumnSource {
            message: "the file must start with the column names in parentheses, like (`col1`, `col2`, ...)"
                .to_string(),
        })?;

    let inner = header.trim_start_matches('(');
    let inner = match inner.find(')') {
        Some(end) => &inner[..end],
        None => inner,
    };

    let columns: Vec<Column> = inner
        .split(',')
        .map(strip_identifier_quotes)
        .filter(|name| !name.is_empty())
        .map(|name| Column::new(name, DEFAULT_COLUMN_TYPE))
        .collect();

    if columns.is_empty() {
        return Err(Csv2SqlError::NoColumnSource {
            message: "the column header line is empty".to_string(),
        });
    }

    tracing::info!(columns = columns.len(), "detected columns from VALUES header");
    Ok(ParsedSchema {
        table_name: DEFAULT_TABLE_NAME.to_string(),
        columns,
        source: SchemaSource::ValuesHeader,
    })
}

/// Text between an already-consumed `(` and its matching `)`.
///
/// Quoted sections and `--` line comments are skipped. Unbalanced input
/// yields the rest of the text.
fn balanced_body(after_open: &str) -> &str {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    for (i, c) in after_open.char_indices() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '-') if after_open[i..].starts_with("--") => in_comment = true,
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return &after_open[..i];
                }
            }
            _ => {}
        }
    }
    after_open
}

/// Split a `CREATE TABLE` body into columns.
fn parse_column_definitions(body: &str) -> Vec<Column> {
    let without_comments: Vec<&str> = body
        .lines()
        .map(|l| strip_line_comment(l).trim())
        .filter(|l| !l.is_empty())
        .collect();

    tokenize_tuple(&without_comments.join("\n"))
        .into_iter()
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let name = parts.next()?;
            let sql_type = parts.collect::<Vec<_>>().join(" ");
            let sql_type = if sql_type.is_empty() {
                UNTYPED_COLUMN_TYPE.to_string()
            } else {
                sql_type
            };
            Some(Column::new(name, sql_type))
        })
        .collect()
}

/// `line` up to a `--` that is not inside a quoted section.
fn strip_line_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '-') if line[i..].starts_with("--") => return &line[..i],
            (None, '\'' | '"' | '`') => quote = Some(c),
            _ => {}
        }
    }
    line
}

fn strip_identifier_quotes(ident: &str) -> String {
    ident
        .trim()
        .trim_matches(|c| c == '`' || c == '"' || c == '\'' || c == '[' || c == ']')
        .to_string()
}

/// Drop the columns at `removed` positions.
///
/// Returns the surviving columns in original order together with their
/// original positions.
pub fn remove_columns(columns: &[Column], removed: &BTreeSet<usize>) -> (Vec<Column>, Vec<usize>) {
    let retained = retained_indices(columns.len(), removed);
    let kept = retained.iter().map(|&i| columns[i].clone()).collect();
    (kept, retained)
}

/// Rename and/or retype of one surviving column. `None` keeps the original.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnChange {
    pub name: Option<String>,
    pub sql_type: Option<String>,
}

/// Apply deletions, per-column changes and a table rename to `schema`.
///
/// `changes[i]` applies to the i-th surviving column. Removed positions past
/// the end of the column list are ignored.
pub fn apply_edits(
    schema: &ParsedSchema,
    removed: &BTreeSet<usize>,
    changes: &[ColumnChange],
    table_name: Option<&str>,
) -> SchemaEdit {
    let removed: BTreeSet<usize> = removed
        .iter()
        .copied()
        .filter(|&i| i < schema.columns.len())
        .collect();
    let (kept, retained) = remove_columns(&schema.columns, &removed);

    let columns = kept
        .into_iter()
        .enumerate()
        .map(|(i, column)| match changes.get(i) {
            Some(change) => Column {
                name: change.name.clone().unwrap_or(column.name),
                sql_type: change.sql_type.clone().unwrap_or(column.sql_type),
            },
            None => column,
        })
        .collect();

    SchemaEdit {
        table_name: table_name.unwrap_or(&schema.table_name).to_string(),
        columns,
        removed_indices: removed,
        retained_indices: retained,
    }
}

/// Render `DROP TABLE IF EXISTS` followed by `CREATE TABLE`.
pub fn render_create_table(table_name: &str, columns: &[Column]) -> String {
    let mut sql = format!(
        "DROP TABLE IF EXISTS {name};\n\nCREATE TABLE {name} (\n",
        name = table_name
    );
    let definitions: Vec<String> = columns
        .iter()
        .map(|c| format!("    {} {}", c.name, c.sql_type))
        .collect();
    sql.push_str(&definitions.join(",\n"));
    if !definitions.is_empty() {
        sql.push('\n');
    }
    sql.push_str(");\n");
    sql
}
