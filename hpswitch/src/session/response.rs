//! Output of one CLI command.

use std::fmt;
use std::time::Duration;

use super::context::CliState;

/// What one `run()` captured.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The command that was sent.
    pub command: String,

    /// Output lines with the command echo and the prompt removed.
    pub lines: Vec<String>,

    /// Everything read for this command, prompt included.
    pub raw: String,

    /// The prompt line that ended the read.
    pub prompt: String,

    /// State announced by the prompt.
    pub state: CliState,

    /// Time from send to prompt.
    pub elapsed: Duration,
}

impl RunOutput {
    /// Output lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether any output line contains `pattern`.
    pub fn contains(&self, pattern: &str) -> bool {
        self.lines.iter().any(|l| l.contains(pattern))
    }
}

impl fmt::Display for RunOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
