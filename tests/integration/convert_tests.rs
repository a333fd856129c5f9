//! Integration tests for CSV conversion

use pretty_assertions::assert_eq;
use rust_csv2sql::convert::{analyze_csv, convert_csv, ColumnPlan, ConvertOptions};
use rust_csv2sql::Csv2SqlError;

use crate::common::{insert_lines, TestContext};

const LEADS_COLUMNS: &str =
    "full_name, email, company, employees, revenue, active, linkedin_profile, signup_date";

#[test]
fn test_profile_of_leads_fixture() {
    let ctx = TestContext::with_fixture("leads.csv");
    let profile = analyze_csv(&ctx.path("leads.csv")).unwrap();

    assert!(profile.has_header);
    assert_eq!(profile.source_columns[6], "LinkedIn Profile");
    assert_eq!(
        profile.inferred_types,
        vec![
            "VARCHAR(50)",
            "VARCHAR(50)",
            "VARCHAR(50)",
            "INT",
            "DECIMAL(10,2)",
            "BOOLEAN",
            "VARCHAR(50)",
            "DATETIME"
        ]
    );
    assert_eq!(profile.linkedin_candidates, vec![6]);
}

#[test]
fn test_convert_leads_fixture() {
    let ctx = TestContext::with_fixture("leads.csv");
    let result = convert_csv(&ConvertOptions::new(ctx.path("leads.csv"))).unwrap();

    assert_eq!(result.table_name, "leads");
    assert_eq!(result.processed_rows, 4);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert!((result.success_rate() - 80.0).abs() < 1e-9);

    let sql = ctx.read("leads_insert_statements.sql");
    assert!(sql.starts_with("-- SQL file generated from: "));
    assert!(sql.contains(
        "CREATE TABLE leads (\n    full_name VARCHAR(50),\n    email VARCHAR(50),\n    company VARCHAR(50),\n    \
         employees INT,\n    revenue DECIMAL(10,2),\n    active BOOLEAN,\n    linkedin_profile VARCHAR(50),\n    \
         signup_date DATETIME\n);"
    ));

    let prefix = format!("INSERT INTO leads ({}) VALUES ", LEADS_COLUMNS);
    let values: Vec<&str> = insert_lines(&sql)
        .into_iter()
        .map(|l| l.strip_prefix(prefix.as_str()).unwrap())
        .collect();
    assert_eq!(
        values,
        vec![
            "('jose-perez', 'jose@acme.com', 'Acme Inc', 120, 1500.50, TRUE, 'https://www.linkedin.com/in/jose-perez-1a2b3c', '2024-01-15');",
            "('ann-oneil', 'ann@globex.com', 'Globex, Corp', 45, 980.00, FALSE, 'https://linkedin.com/in/ann-oneil', '2024-02-01');",
            "('bjorn-agren', 'bjorn@initech.se', 'Initech', 7, NULL, TRUE, NULL, '2023-12-31');",
            "(NULL, 'bruce@example.com', 'Golden Harvest', 300, 2500.75, FALSE, 'https://linkedin.com/in/bruce-lee-99', '2024-03-10');",
        ]
    );

    assert!(sql.contains("-- Rows processed successfully: 4\n-- Errors/skipped rows: 1\n-- Success rate: 80.00%\n-- Chunks processed: 1\n"));
    assert!(sql.contains("-- FIRST 1 ERRORS:\n-- Error 1: Chunk 1, record 4: expected 8 fields, found 2\n"));
    assert!(sql.ends_with("\nCOMMIT;\n"));
}

#[test]
fn test_convert_with_custom_plan() {
    let ctx = TestContext::with_fixture("leads.csv");
    let csv = ctx.path("leads.csv");
    let profile = analyze_csv(&csv).unwrap();

    let mut plan = ColumnPlan::automatic(&profile);
    plan.exclude(&[1, 2, 3, 4, 5, 7]);
    plan.add_linkedin(6);

    let options = ConvertOptions {
        table_name: Some("people".to_string()),
        output_path: Some(ctx.path("people.sql")),
        max_rows: Some(2),
        plan: Some(plan),
        ..ConvertOptions::new(&csv)
    };
    let result = convert_csv(&options).unwrap();
    assert_eq!(result.processed_rows, 2);

    let sql = ctx.read("people.sql");
    assert_eq!(
        insert_lines(&sql),
        vec![
            "INSERT INTO people (full_name, linkedin_profile, linkedin_profile_name) VALUES ('jose-perez', 'https://www.linkedin.com/in/jose-perez-1a2b3c', 'jose perez');",
            "INSERT INTO people (full_name, linkedin_profile, linkedin_profile_name) VALUES ('ann-oneil', 'https://linkedin.com/in/ann-oneil', 'ann oneil');",
        ]
    );
}

#[test]
fn test_convert_headerless_file() {
    let ctx = TestContext::with_fixture("contacts_no_header.csv");
    let result = convert_csv(&ConvertOptions::new(ctx.path("contacts_no_header.csv"))).unwrap();
    assert_eq!(result.table_name, "contacts_no_header");
    assert_eq!(result.processed_rows, 2);

    let sql = ctx.read("contacts_no_header_insert_statements.sql");
    assert!(sql.contains("-- Source has no header row"));
    assert_eq!(
        insert_lines(&sql),
        vec![
            "INSERT INTO contacts_no_header (col_0, col_1, col_2) VALUES ('maria@example.com', 'Maria', 'https://linkedin.com/in/maria-garcia-5521');",
            "INSERT INTO contacts_no_header (col_0, col_1, col_2) VALUES ('li@example.com', 'Li', NULL);",
        ]
    );
}

#[test]
fn test_convert_decodes_windows_1252() {
    let ctx = TestContext::new();
    let path = ctx.path("legacy.csv");
    std::fs::write(&path, b"city,first_name\nM\xfcnchen,J\xfcrgen\n").unwrap();

    convert_csv(&ConvertOptions::new(&path)).unwrap();
    let sql = ctx.read("legacy_insert_statements.sql");
    assert_eq!(
        insert_lines(&sql),
        vec!["INSERT INTO legacy (city, first_name) VALUES ('München', 'jurgen');"]
    );
}

#[test]
fn test_convert_missing_file() {
    let ctx = TestContext::new();
    let err = convert_csv(&ConvertOptions::new(ctx.path("nope.csv"))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Csv2SqlError>(),
        Some(Csv2SqlError::FileNotFound { .. })
    ));
    assert!(!ctx.path("nope_insert_statements.sql").exists());
}
