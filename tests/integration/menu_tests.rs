//! Integration tests for the interactive menu and CSV wizard

use rust_csv2sql::{run_menu, ScriptedPrompter, SinkCapabilities};

use crate::common::{insert_lines, TestContext};

#[test]
fn test_menu_converts_csv_and_loads_sqlite() {
    let ctx = TestContext::with_fixture("leads.csv");
    let mut prompter = ScriptedPrompter::new([
        "1", // convert CSV
        "",  // leads.csv
        "n", // no LinkedIn names
        "",  // suggested table name
        "",  // no exclusions
        "",  // automatic
        "",  // proceed
        "1", // SQLite
        "",  // whole file
        "3", // exit
    ]);

    run_menu(&mut prompter, &[ctx.dir.clone()], SinkCapabilities::default(), false).unwrap();
    assert_eq!(prompter.remaining(), 0);

    assert_eq!(insert_lines(&ctx.read("leads_insert_statements.sql")).len(), 4);
    assert!(ctx.path("leads_insert_statements.db").exists());
    assert!(prompter.transcript().iter().any(|l| l == "Rows in table: 4"));
}

#[test]
fn test_menu_postgres_unavailable_falls_back() {
    let ctx = TestContext::with_fixture("values_only_dump.sql");
    let path = ctx.path("values_only_dump.sql");
    let mut prompter = ScriptedPrompter::new(vec![
        "2".to_string(),
        path.display().to_string(),
        String::new(), // keep every column
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        "2".to_string(), // PostgreSQL
        "3".to_string(), // exit
    ]);

    run_menu(&mut prompter, &[ctx.dir.clone()], SinkCapabilities { postgres: false }, false).unwrap();
    assert_eq!(prompter.remaining(), 0);
    assert!(prompter
        .transcript()
        .iter()
        .any(|l| l.contains("PostgreSQL support is not available")));
    assert!(!ctx.path("values_only_dump_corrected.db").exists());
}
