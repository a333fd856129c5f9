//! Question/answer abstraction used by the interactive flows
//!
//! Flows never touch stdin/stdout directly; they receive a `&mut dyn Prompter`.
//! Implementations only provide raw line IO, while answer parsing, defaults
//! and re-asking on invalid input live in the provided methods so that the
//! terminal and scripted implementations behave identically.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::ops::RangeInclusive;

use anyhow::Result;

use crate::error::Csv2SqlError;

/// How many times an invalid answer is re-asked before giving up.
const MAX_ATTEMPTS: usize = 5;

/// Interactive input/output channel.
pub trait Prompter {
    /// Print an informational line.
    fn say(&mut self, message: &str);

    /// Show `prompt` and read one line of input. `None` means input is closed.
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Ask a free-form question. An empty answer yields `default` when given.
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let prompt = match default {
            Some(d) => format!("{} [{}]: ", question, d),
            None => format!("{}: ", question),
        };
        for _ in 0..MAX_ATTEMPTS {
            let answer = next_line(self, &prompt, question)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            if let Some(d) = default {
                return Ok(d.to_string());
            }
            self.say("A value is required.");
        }
        Err(closed(question))
    }

    /// Ask for an integer within `range`.
    fn ask_number(
        &mut self,
        question: &str,
        default: Option<usize>,
        range: RangeInclusive<usize>,
    ) -> Result<usize> {
        let default_text = default.map(|d| d.to_string());
        for _ in 0..MAX_ATTEMPTS {
            let answer = self.ask(question, default_text.as_deref())?;
            match answer.replace(['_', ','], "").parse::<usize>() {
                Ok(n) if range.contains(&n) => return Ok(n),
                Ok(_) => self.say(&format!(
                    "Must be between {} and {}.",
                    range.start(),
                    range.end()
                )),
                Err(_) => self.say("Must be a valid number."),
            }
        }
        Err(closed(question))
    }

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        let prompt = format!("{} [{}]: ", question, hint);
        for _ in 0..MAX_ATTEMPTS {
            let answer = next_line(self, &prompt, question)?;
            match answer.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" | "si" | "sí" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n."),
            }
        }
        Err(closed(question))
    }

    /// Pick one of `choices` by its 1-based number. Returns the 0-based index.
    fn select(&mut self, question: &str, choices: &[String], default: usize) -> Result<usize> {
        self.say(question);
        for (i, choice) in choices.iter().enumerate() {
            self.say(&format!("  {}. {}", i + 1, choice));
        }
        let prompt = format!("Choose 1-{} [{}]: ", choices.len(), default + 1);
        for _ in 0..MAX_ATTEMPTS {
            let answer = next_line(self, &prompt, question)?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => self.say(&format!("Please select 1 to {}.", choices.len())),
            }
        }
        Err(closed(question))
    }

    /// Pick any number of `choices`, entered as comma/space separated
    /// 1-based numbers (empty = none). Returns sorted, de-duplicated 0-based
    /// indices.
    fn multi_select(&mut self, question: &str, choices: &[String]) -> Result<Vec<usize>> {
        self.say(question);
        for (i, choice) in choices.iter().enumerate() {
            self.say(&format!("  {}. {}", i + 1, choice));
        }
        let prompt = "Numbers separated by commas (enter for none): ".to_string();
        'attempt: for _ in 0..MAX_ATTEMPTS {
            let answer = next_line(self, &prompt, question)?;
            let mut picked = Vec::new();
            for part in answer.split([',', ' ']).filter(|p| !p.trim().is_empty()) {
                match part.trim().parse::<usize>() {
                    Ok(n) if (1..=choices.len()).contains(&n) => picked.push(n - 1),
                    _ => {
                        self.say(&format!("'{}' is not a valid choice.", part.trim()));
                        continue 'attempt;
                    }
                }
            }
            picked.sort_unstable();
            picked.dedup();
            return Ok(picked);
        }
        Err(closed(question))
    }
}

/// Read one answer, treating closed input as an error.
fn next_line<P: Prompter + ?Sized>(prompter: &mut P, prompt: &str, question: &str) -> Result<String> {
    prompter.read_answer(prompt)?.ok_or_else(|| closed(question))
}

fn closed(question: &str) -> anyhow::Error {
    Csv2SqlError::PromptClosed {
        question: question.to_string(),
    }
    .into()
}

/// Prompter bound to the process's stdin and stdout.
pub struct TerminalPrompter {
    stdin: std::io::Stdin,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            stdin: std::io::stdin(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn say(&mut self, message: &str) {
        println!("{}", message);
    }

    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = self.stdin.lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Prompter fed from a fixed list of answers, recording everything shown.
///
/// Used by tests and by callers that want to replay a recorded session.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// All lines shown so far, prompts included.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }

    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        self.transcript.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
