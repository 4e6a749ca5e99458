//! Yes/no questions for overwrite decisions.

use std::io::{self, BufRead, IsTerminal, Write};

/// Answers a yes/no question; `default` applies when no answer is available.
pub trait OverwritePrompt {
    fn confirm(&mut self, question: &str, default: bool) -> bool;
}

/// Asks on the controlling terminal; falls back to the default when stdin
/// is not a terminal or the answer is neither y nor n.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl OverwritePrompt for TerminalPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return default;
        }

        let hint = if default { "(Y/n)" } else { "(y/N)" };
        eprint!("{question} {hint} ");
        io::stderr().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() {
            return default;
        }
        parse_answer(&line).unwrap_or(default)
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('y') => Some(true),
        Some('n') => Some(false),
        _ => None,
    }
}
