//! Integration tests for the SQL repair workflow

use pretty_assertions::assert_eq;
use rust_csv2sql::repair::{repair_sql, RepairOptions};
use rust_csv2sql::{ScriptedPrompter, SinkCapabilities};

use crate::common::{insert_lines, TestContext};

fn options(ctx: &TestContext, name: &str) -> RepairOptions {
    RepairOptions {
        capabilities: SinkCapabilities { postgres: false },
        ..RepairOptions::new(ctx.path(name))
    }
}

#[test]
fn test_repair_companies_dump() {
    let ctx = TestContext::with_fixture("companies_dump.sql");
    let mut prompter = ScriptedPrompter::new([
        "2, 5", // delete domain and notes
        "", "", // id
        "name", "", // company_name -> name
        "", "", // revenue
        "",  // table name
        "",  // confirm
        "3", // no database
    ]);

    let outcome = repair_sql(&options(&ctx, "companies_dump.sql"), &mut prompter).unwrap();
    assert_eq!(prompter.remaining(), 0);
    assert_eq!(outcome.edit.retained_indices, vec![0, 2, 3]);
    assert_eq!(outcome.existing_inserts, 1);
    assert_eq!(outcome.tuples_found, 4);
    assert_eq!(outcome.padded_tuples, 1);

    let sql = ctx.read("companies_dump_corrected.sql");
    assert!(sql.contains(
        "DROP TABLE IF EXISTS companies;\n\nCREATE TABLE companies (\n    id INT,\n    name VARCHAR(255),\n    revenue DECIMAL(10,2)\n);\n"
    ));
    assert_eq!(
        insert_lines(&sql),
        vec![
            "INSERT INTO companies (id, name, revenue) VALUES (1, 'acme.com', 'Acme', 10.5, 'first');",
            "INSERT INTO companies (id, name, revenue) VALUES (2, 'Globex', 20);",
            "INSERT INTO companies (id, name, revenue) VALUES (3, 'Initech', NULL);",
            "INSERT INTO companies (id, name, revenue) VALUES (4, 'Umbrella', NULL);",
            "INSERT INTO companies (id, name, revenue) VALUES (5, 'Hooli', 99.99);",
        ]
    );
}

#[test]
fn test_repair_values_only_dump() {
    let ctx = TestContext::with_fixture("values_only_dump.sql");
    let mut prompter = ScriptedPrompter::new([
        "4",   // delete sector
        "", "INT", // id typed as INT
        "", "", // domain
        "", "", // company_name
        "companies",
        "",
        "3",
    ]);

    let outcome = repair_sql(&options(&ctx, "values_only_dump.sql"), &mut prompter).unwrap();
    assert_eq!(prompter.remaining(), 0);
    assert_eq!(outcome.edit.table_name, "companies");

    let sql = ctx.read("values_only_dump_corrected.sql");
    assert_eq!(
        insert_lines(&sql),
        vec![
            "INSERT INTO companies (id, domain, company_name) VALUES (1001, 'teledyne.com', 'Teledyne');",
            "INSERT INTO companies (id, domain, company_name) VALUES (1002, 'acme.org', 'ACME');",
            "INSERT INTO companies (id, domain, company_name) VALUES (1003, 'initech.com', 'Initech, Inc');",
        ]
    );
}

#[test]
fn test_repair_rejects_bad_table_name_then_accepts() {
    let ctx = TestContext::with_fixture("values_only_dump.sql");
    let mut prompter = ScriptedPrompter::new([
        "",
        "", "", "", "", "", "", "", "",
        "drop table;",
        "clean_companies",
        "",
        "3",
    ]);

    let outcome = repair_sql(&options(&ctx, "values_only_dump.sql"), &mut prompter).unwrap();
    assert_eq!(prompter.remaining(), 0);
    assert_eq!(outcome.edit.table_name, "clean_companies");
    assert!(prompter
        .transcript()
        .iter()
        .any(|l| l == "'drop table;' is not usable as a table name."));
}

#[test]
fn test_repair_with_explicit_tuple_limit() {
    let ctx = TestContext::new();
    let mut dump = String::from("CREATE TABLE n (v INT);\n");
    for i in 0..250 {
        dump.push_str(&format!("({}, 'x'),\n", i));
    }
    ctx.write_file("big.sql", &dump);

    // limit is asked because no --max-tuples was given: choose the 100 sample
    let mut prompter = ScriptedPrompter::new(["", "", "", "", "", "1", "3"]);
    let outcome = repair_sql(&options(&ctx, "big.sql"), &mut prompter).unwrap();
    assert_eq!(prompter.remaining(), 0);
    assert_eq!(outcome.tuples_found, 250);
    assert_eq!(outcome.tuples_processed, 100);
    assert_eq!(insert_lines(&ctx.read("big_corrected.sql")).len(), 100);
}
