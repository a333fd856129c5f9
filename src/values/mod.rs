//! SQL value tuple handling: tokenizing, sanitizing and projecting

mod projector;
mod sanitizer;
mod tokenizer;

pub use projector::{project, retained_indices, MISSING_VALUE};
pub use sanitizer::{
    is_numeric_literal, is_numeric_type, sanitize, SqlValue, MAX_TEXT_CHARS,
};
pub use tokenizer::{strip_tuple_parens, tokenize_tuple};
