//! Interactive prompts and menus

mod menu;
mod prompter;

pub use menu::{
    ask_csv_row_limit, ask_main_menu, ask_sqlite_limit, ask_tuple_limit, MainMenuChoice,
    SMALL_INPUT_THRESHOLD,
};
pub use prompter::{Prompter, ScriptedPrompter, TerminalPrompter};
