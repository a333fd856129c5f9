//! Integration tests for loading generated scripts into SQLite

use pretty_assertions::assert_eq;
use rust_csv2sql::convert::{convert_csv, ConvertOptions};
use rust_csv2sql::repair::{repair_sql, RepairOptions};
use rust_csv2sql::sink::{
    load_script, load_sql_file_into_sqlite, split_script, LoadOptions, RelationalSink, SqliteSink,
};
use rust_csv2sql::{ScriptedPrompter, SinkCapabilities};

use crate::common::TestContext;

#[test]
fn test_converted_csv_loads_into_sqlite() {
    let ctx = TestContext::with_fixture("leads.csv");
    let result = convert_csv(&ConvertOptions::new(ctx.path("leads.csv"))).unwrap();

    let (db_path, report) = load_sql_file_into_sqlite(&result.sql_path, "leads", 0, false).unwrap();
    assert_eq!(db_path, ctx.path("leads_insert_statements.db"));
    assert_eq!(report.ddl_executed, 2);
    assert_eq!(report.inserts_executed, 4);
    assert_eq!(report.failed, 0);
    assert_eq!(report.row_count, 4);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let company: String = conn
        .query_row(
            "SELECT company FROM leads WHERE email = 'ann@globex.com'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(company, "Globex, Corp");
}

#[test]
fn test_sqlite_limit_applies_to_inserts_only() {
    let ctx = TestContext::with_fixture("leads.csv");
    let result = convert_csv(&ConvertOptions::new(ctx.path("leads.csv"))).unwrap();

    let (_, report) = load_sql_file_into_sqlite(&result.sql_path, "leads", 3, false).unwrap();
    assert_eq!(report.inserts_found, 4);
    assert_eq!(report.inserts_executed, 3);
    assert_eq!(report.row_count, 3);
}

#[test]
fn test_repaired_dump_loads_with_one_failure() {
    let ctx = TestContext::with_fixture("companies_dump.sql");
    let mut prompter = ScriptedPrompter::new([
        "2, 5", "", "", "", "", "", "", "", "",
        "1", // SQLite
        "4", // whole file
    ]);
    let options = RepairOptions {
        capabilities: SinkCapabilities { postgres: false },
        ..RepairOptions::new(ctx.path("companies_dump.sql"))
    };

    let outcome = repair_sql(&options, &mut prompter).unwrap();
    assert_eq!(prompter.remaining(), 0);

    // the original INSERT keeps all five values and no longer fits the table
    let report = outcome.sink.unwrap();
    assert_eq!(report.inserts_found, 5);
    assert_eq!(report.inserts_executed, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.row_count, 4);
    assert!((report.success_rate() - 80.0).abs() < 1e-9);
    assert!(ctx.path("companies_dump_corrected.db").exists());
}

#[test]
fn test_load_without_table_removes_database() {
    let ctx = TestContext::new();
    // the broken CREATE is counted, then counting rows in the missing table fails
    let sql = ctx.write_file("broken.sql", "CREATE TABLE t (a INT;\nINSERT INTO t (a) VALUES (1);\n");

    let err = load_sql_file_into_sqlite(&sql, "t", 0, false).unwrap_err();
    assert!(err.to_string().starts_with("Database sink error"));
    assert!(!ctx.path("broken.db").exists());
}

#[test]
fn test_in_memory_batches_commit_independently() {
    let mut script = split_script("CREATE TABLE t (id INTEGER PRIMARY KEY);");
    for id in [1, 2, 2, 3, 3, 4] {
        script.inserts.push(format!("INSERT INTO t (id) VALUES ({})", id));
    }

    let mut sink = SqliteSink::in_memory().unwrap();
    let options = LoadOptions {
        batch_size: 2,
        ..LoadOptions::new("t")
    };
    let report = load_script(&mut sink, &script, &options).unwrap();
    assert_eq!(report.inserts_executed, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(sink.count_rows("t").unwrap(), 4);
    assert!(sink.describe().contains(":memory:"));
}
