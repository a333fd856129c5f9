//! Unit tests for the scripted prompter and the schema edit state machine

use rust_csv2sql::interact::{ask_csv_row_limit, Prompter, ScriptedPrompter};
use rust_csv2sql::repair::{parse_schema, EditState};
use rust_csv2sql::Csv2SqlError;

#[test]
fn test_transcript_records_prompts_and_messages() {
    let mut p = ScriptedPrompter::new(["yes"]);
    p.say("hello");
    assert!(p.confirm("Continue?", false).unwrap());
    assert_eq!(p.transcript(), &["hello".to_string(), "Continue? [y/N]: ".to_string()]);
}

#[test]
fn test_exhausted_script_reports_prompt_closed() {
    let mut p = ScriptedPrompter::new(Vec::<String>::new());
    let err = ask_csv_row_limit(&mut p, 10).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Csv2SqlError>(),
        Some(Csv2SqlError::PromptClosed { .. })
    ));
}

#[test]
fn test_edit_state_steps_one_at_a_time() {
    let schema = parse_schema("CREATE TABLE t (a INT, b TEXT)").unwrap();
    let mut p = ScriptedPrompter::new(["1", "", "", "renamed", "n", "", "", "", "", "", "", "y"]);

    let state = EditState::new(schema.clone());
    let state = state.advance(&mut p).unwrap();
    assert!(matches!(state, EditState::ColumnsSelected { .. }));
    let state = state.advance(&mut p).unwrap();
    assert!(matches!(state, EditState::ColumnsEdited { .. }));
    let state = state.advance(&mut p).unwrap();
    assert!(matches!(state, EditState::TableNamed { .. }));

    // declined: back to the parsed schema
    let state = state.advance(&mut p).unwrap();
    assert_eq!(state, EditState::Loaded(schema));

    let mut state = state;
    while !state.is_confirmed() {
        state = state.advance(&mut p).unwrap();
    }
    match state {
        EditState::Confirmed(edit) => {
            assert_eq!(edit.table_name, "t");
            assert_eq!(edit.column_names(), vec!["a", "b"]);
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert_eq!(p.remaining(), 0);
}
