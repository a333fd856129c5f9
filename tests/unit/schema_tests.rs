//! Unit tests for schema parsing, editing and statement reconstruction

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use rust_csv2sql::repair::{
    apply_edits, parse_schema, reconstruct, render_create_table, scan_statements, Column,
    ColumnChange, ReconstructOptions, SchemaSource,
};
use rust_csv2sql::Csv2SqlError;

#[test]
fn test_parse_create_table_with_nested_types() {
    let sql = "CREATE TABLE IF NOT EXISTS [dbo.leads] (\n\
               \x20 id BIGINT NOT NULL,\n\
               \x20 price NUMERIC(12, 4) DEFAULT 0,\n\
               \x20 label VARCHAR(20)\n\
               );\nINSERT INTO leads VALUES (1, 2.5, 'x');";
    let schema = parse_schema(sql).unwrap();
    assert_eq!(schema.table_name, "dbo.leads");
    assert_eq!(schema.source, SchemaSource::CreateTable);
    assert_eq!(
        schema.columns,
        vec![
            Column::new("id", "BIGINT NOT NULL"),
            Column::new("price", "NUMERIC(12, 4) DEFAULT 0"),
            Column::new("label", "VARCHAR(20)"),
        ]
    );
}

#[test]
fn test_parse_bracket_header_fallback() {
    let schema = parse_schema("([id], [name])\n(1, 'a')").unwrap();
    assert_eq!(schema.source, SchemaSource::ValuesHeader);
    assert_eq!(schema.table_name, "imported_data");
    assert_eq!(
        schema.columns,
        vec![Column::new("id", "VARCHAR(255)"), Column::new("name", "VARCHAR(255)")]
    );
}

#[test]
fn test_header_beyond_search_window_is_not_found() {
    let mut sql = String::new();
    for i in 0..10 {
        sql.push_str(&format!("-- note {}\n", i));
    }
    sql.push_str("(`id`)\n(1)\n");
    let err = parse_schema(&sql).unwrap_err();
    assert!(matches!(err, Csv2SqlError::NoColumnSource { .. }));
}

#[test]
fn test_edit_then_render() {
    let schema = parse_schema("CREATE TABLE t (a INT, b TEXT, c TEXT)").unwrap();
    let removed = BTreeSet::from([0]);
    let changes = vec![
        ColumnChange {
            name: Some("body".to_string()),
            sql_type: None,
        },
        ColumnChange {
            name: None,
            sql_type: Some("VARCHAR(10)".to_string()),
        },
    ];
    let edit = apply_edits(&schema, &removed, &changes, Some("posts"));
    assert_eq!(
        render_create_table(&edit.table_name, &edit.columns),
        "DROP TABLE IF EXISTS posts;\n\nCREATE TABLE posts (\n    body TEXT,\n    c VARCHAR(10)\n);\n"
    );
    assert_eq!(edit.retained_indices, vec![1, 2]);
}

#[test]
fn test_reconstruct_after_column_removal() {
    let sql = "(1, 'acme.com', 'ACME', 'tech'),\n(2, 'globex.com', 'Globex', 'finance');";
    let options = ReconstructOptions {
        table_name: "companies".to_string(),
        column_names: vec!["id".to_string(), "sector".to_string()],
        retained_indices: Some(vec![0, 3]),
        column_types: Some(vec!["INT".to_string(), "TEXT".to_string()]),
        ..Default::default()
    };
    assert_eq!(
        reconstruct(sql, &options),
        "INSERT INTO companies (id, sector) VALUES (1, 'tech');\n\
         INSERT INTO companies (id, sector) VALUES (2, 'finance');"
    );
}

#[test]
fn test_empty_retained_list_passes_tuples_through() {
    let options = ReconstructOptions {
        table_name: "t".to_string(),
        column_names: vec!["a".to_string()],
        retained_indices: Some(Vec::new()),
        ..Default::default()
    };
    assert_eq!(
        reconstruct("(1, 'x')", &options),
        "INSERT INTO t (a) VALUES (1, 'x');"
    );
}

#[test]
fn test_scan_ignores_non_numeric_tuples() {
    let scanned = scan_statements("('a', 1),\n(`id`, `x`)\n  (7 , 'ok'),\n");
    assert_eq!(scanned.bare_tuples, vec!["(7 , 'ok')"]);
    assert!(scanned.insert_value_blocks.is_empty());
}

#[test]
fn test_no_data_yields_empty_output() {
    let options = ReconstructOptions {
        table_name: "t".to_string(),
        column_names: vec!["a".to_string()],
        ..Default::default()
    };
    assert_eq!(reconstruct("CREATE TABLE t (a INT);\n-- nothing else", &options), "");
}
