//! Unit tests for value tokenizing, sanitizing and projection

use rust_csv2sql::values::{project, sanitize, strip_tuple_parens, tokenize_tuple, SqlValue};

// ============================================================================
// Tokenizer
// ============================================================================

#[test]
fn test_tokenize_scraped_row() {
    let block = "(1001, 'teledyne.com', 'Teledyne, Inc', '{\"tags\": [1, 2]}', NULL),";
    let fields = tokenize_tuple(strip_tuple_parens(block));
    assert_eq!(
        fields,
        vec![
            "1001",
            "'teledyne.com'",
            "'Teledyne, Inc'",
            "'{\"tags\": [1, 2]}'",
            "NULL"
        ]
    );
}

#[test]
fn test_tokenize_nested_parens_and_braces() {
    let fields = tokenize_tuple("1, point(3, 4), {a, b}, 'x'");
    assert_eq!(fields, vec!["1", "point(3, 4)", "{a, b}", "'x'"]);
}

#[test]
fn test_tokenize_other_quote_kind_inside_string() {
    let fields = tokenize_tuple("'say \"hi, there\"', \"it's, ok\"");
    assert_eq!(fields, vec!["'say \"hi, there\"'", "\"it's, ok\""]);
}

#[test]
fn test_tokenize_unbalanced_closers_do_not_underflow() {
    let fields = tokenize_tuple("a), b}, c");
    assert_eq!(fields, vec!["a)", "b}", "c"]);
}

#[test]
fn test_strip_tuple_parens_variants() {
    assert_eq!(strip_tuple_parens("(1, 'a');"), "1, 'a'");
    assert_eq!(strip_tuple_parens("  (1, 'a'),  "), "1, 'a'");
    assert_eq!(strip_tuple_parens("1, 'a'"), "1, 'a'");
}

// ============================================================================
// Sanitizer
// ============================================================================

#[test]
fn test_sanitize_by_column_type() {
    assert_eq!(sanitize("99.99", Some("DECIMAL(10,2)")), "99.99");
    assert_eq!(sanitize("99.99", Some("VARCHAR(255)")), "'99.99'");
    assert_eq!(sanitize("'007'", Some("INT")), "007");
    assert_eq!(sanitize("NULL", Some("INT")), "NULL");
}

#[test]
fn test_sanitized_text_never_contains_quotes() {
    for raw in ["'O'Brien'", "\"quoted\"", "it''s", "a'b\"c"] {
        let rendered = sanitize(raw, Some("TEXT"));
        let inner = &rendered[1..rendered.len() - 1];
        assert!(!inner.contains('\''), "{} -> {}", raw, rendered);
        assert!(!inner.contains('"'), "{} -> {}", raw, rendered);
    }
}

#[test]
fn test_text_or_null_escapes_on_display() {
    assert_eq!(SqlValue::text_or_null("O'Hara").to_string(), "'O''Hara'");
    assert!(SqlValue::text_or_null("   ").is_null());
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_project_reorders_and_pads() {
    let tuple = vec!["1".to_string(), "'a'".to_string(), "'b'".to_string()];
    assert_eq!(project(&tuple, &[2, 0]), vec!["'b'", "1"]);
    assert_eq!(project(&tuple, &[0, 5]), vec!["1", "NULL"]);
}
