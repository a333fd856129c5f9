//! Splitting of SQL value tuples into raw fields
//!
//! Dumps produced by scrapers and spreadsheet exports are rarely valid SQL,
//! so this is a best-effort scanner rather than a grammar: it never fails and
//! returns whatever fields it managed to accumulate.
//!
//! ```text
//! 1001, 'acme.com', '{"a": 1, "b": 2}', (3, 4)
//! ^^^^  ^^^^^^^^^^  ^^^^^^^^^^^^^^^^^^  ^^^^^^
//! ```
//!
//! Commas only split at the top level: outside quotes and outside any
//! `{...}` or `(...)` nesting.

/// Quote context of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    None,
    Single,
    Double,
}

impl QuoteState {
    fn for_char(c: char) -> Self {
        match c {
            '\'' => QuoteState::Single,
            '"' => QuoteState::Double,
            _ => QuoteState::None,
        }
    }
}

/// Split the interior of a parenthesized tuple into its top-level fields.
///
/// The outer parentheses must already be removed (see [`strip_tuple_parens`]).
/// Each field is trimmed. A quote preceded by a backslash does not change the
/// quote state; this is a heuristic and does not understand doubled `''`
/// escapes.
pub fn tokenize_tuple(interior: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quote = QuoteState::None;
    let mut brace_depth: usize = 0;
    let mut paren_depth: usize = 0;
    let mut prev: Option<char> = None;

    for c in interior.chars() {
        let escaped = prev == Some('\\');
        prev = Some(c);

        match c {
            '\'' | '"' if !escaped => {
                let state = QuoteState::for_char(c);
                if quote == QuoteState::None {
                    quote = state;
                } else if quote == state {
                    quote = QuoteState::None;
                }
            }
            '{' if quote == QuoteState::None => brace_depth += 1,
            '}' if quote == QuoteState::None => brace_depth = brace_depth.saturating_sub(1),
            '(' if quote == QuoteState::None => paren_depth += 1,
            ')' if quote == QuoteState::None => paren_depth = paren_depth.saturating_sub(1),
            ',' if quote == QuoteState::None && brace_depth == 0 && paren_depth == 0 => {
                fields.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }

        current.push(c);
    }

    let last = current.trim();
    if !last.is_empty() {
        fields.push(last.to_string());
    }

    fields
}

/// Remove one pair of enclosing parentheses from a value block.
///
/// Trailing statement punctuation (`,` or `;`) left over from multi-row
/// `VALUES` lists is dropped first. Blocks without enclosing parentheses are
/// returned trimmed.
pub fn strip_tuple_parens(block: &str) -> &str {
    let block = block.trim().trim_end_matches([',', ';']).trim_end();
    match block.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => inner,
        None => block,
    }
}
