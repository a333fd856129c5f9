//! Rebuilding INSERT statements from raw SQL text
//!
//! Two kinds of lines carry data:
//!
//! - complete `INSERT INTO ... VALUES (...)` statements, which are re-targeted
//!   to the edited table and column list without touching their values;
//! - bare value tuples such as `(1001, 'acme.com', 'ACME'),`, which are
//!   tokenized, projected onto the retained columns and sanitized.
//!
//! A bare tuple is recognized by a leading integer field. Tuples whose first
//! column is not numeric are not detected.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::starts_with_ci;
use crate::values::{project, sanitize, strip_tuple_parens, tokenize_tuple};

static INSERT_VALUES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)VALUES\s*(\(.*\))").expect("valid VALUES regex"));

static BARE_TUPLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\s*\d+\s*,").expect("valid bare tuple regex"));

/// Progress is logged every this many rebuilt tuples.
const LOG_EVERY: usize = 100;

/// Data-bearing lines found in a SQL text, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedSql {
    /// The `(...)` value block of each existing INSERT statement.
    pub insert_value_blocks: Vec<String>,
    /// Each bare value tuple, parentheses kept, trailing `,`/`;` removed.
    pub bare_tuples: Vec<String>,
}

/// Target table description for [`ScannedSql::render`].
#[derive(Debug, Clone, Default)]
pub struct ReconstructOptions {
    pub table_name: String,
    pub column_names: Vec<String>,
    /// Maximum number of bare tuples to rebuild, 0 = unlimited.
    pub max_tuples: usize,
    /// Original positions to keep from each bare tuple, in output order.
    /// When absent, bare tuples are copied verbatim.
    pub retained_indices: Option<Vec<usize>>,
    /// SQL type of each output column, used to decide quoting.
    pub column_types: Option<Vec<String>>,
}

/// Rebuilt statements plus counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstructed {
    pub statements: Vec<String>,
    /// Statements derived from existing INSERTs.
    pub existing_inserts: usize,
    /// Bare tuples found in the input.
    pub tuples_found: usize,
    /// Bare tuples rebuilt after applying the limit.
    pub tuples_processed: usize,
    /// Rebuilt tuples that had fewer fields than the projection needed.
    pub padded_tuples: usize,
}

impl Reconstructed {
    /// Newline-joined statements, empty when nothing matched.
    pub fn to_sql(&self) -> String {
        self.statements.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Classify every line of `sql_text`.
pub fn scan_statements(sql_text: &str) -> ScannedSql {
    let mut scanned = ScannedSql::default();

    for line in sql_text.lines() {
        let stripped = line.trim();

        if starts_with_ci(stripped, "INSERT INTO") {
            if let Some(caps) = INSERT_VALUES_RE.captures(stripped) {
                scanned.insert_value_blocks.push(caps[1].to_string());
            }
            continue;
        }

        if BARE_TUPLE_RE.is_match(stripped) {
            let cleaned = stripped.trim_end_matches([',', ';']).trim_end();
            scanned.bare_tuples.push(cleaned.to_string());
        }
    }

    tracing::info!(
        existing_inserts = scanned.insert_value_blocks.len(),
        bare_tuples = scanned.bare_tuples.len(),
        "scanned SQL text"
    );
    scanned
}

impl ScannedSql {
    pub fn bare_tuple_count(&self) -> usize {
        self.bare_tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insert_value_blocks.is_empty() && self.bare_tuples.is_empty()
    }

    /// Emit canonical INSERT statements: existing INSERTs first, then bare
    /// tuples, each group in source order.
    pub fn render(&self, options: &ReconstructOptions) -> Reconstructed {
        let columns = options.column_names.join(", ");
        let prefix = format!("INSERT INTO {} ({}) VALUES ", options.table_name, columns);

        let mut statements: Vec<String> = self
            .insert_value_blocks
            .iter()
            .map(|block| format!("{}{};", prefix, block))
            .collect();
        let existing_inserts = statements.len();

        let limit = if options.max_tuples == 0 {
            self.bare_tuples.len()
        } else {
            options.max_tuples.min(self.bare_tuples.len())
        };
        if limit < self.bare_tuples.len() {
            tracing::warn!(
                processing = limit,
                found = self.bare_tuples.len(),
                "limiting rebuilt VALUES tuples"
            );
        }

        let retained = options.retained_indices.as_deref().filter(|r| !r.is_empty());
        let types = options.column_types.as_deref().unwrap_or(&[]);
        let mut padded_tuples = 0;

        for (i, block) in self.bare_tuples.iter().take(limit).enumerate() {
            let statement = match retained {
                Some(retained) => {
                    let fields = tokenize_tuple(strip_tuple_parens(block));
                    if retained.iter().any(|&idx| idx >= fields.len()) {
                        padded_tuples += 1;
                    }
                    let values: Vec<String> = project(&fields, retained)
                        .into_iter()
                        .enumerate()
                        .map(|(col, raw)| sanitize(raw, types.get(col).map(String::as_str)))
                        .collect();
                    format!("{}({});", prefix, values.join(", "))
                }
                None => format!("{}{};", prefix, block),
            };
            statements.push(statement);

            if (i + 1) % LOG_EVERY == 0 {
                tracing::debug!(processed = i + 1, "rebuilt VALUES tuples");
            }
        }

        if padded_tuples > 0 {
            tracing::warn!(padded_tuples, "some tuples were short and padded with NULL");
        }

        Reconstructed {
            statements,
            existing_inserts,
            tuples_found: self.bare_tuples.len(),
            tuples_processed: limit,
            padded_tuples,
        }
    }
}

/// Scan `sql_text` and rebuild its statements in one step.
pub fn reconstruct(sql_text: &str, options: &ReconstructOptions) -> String {
    scan_statements(sql_text).render(options).to_sql()
}
