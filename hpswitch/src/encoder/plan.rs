//! Command plans.

use std::fmt;

use crate::session::CliState;

/// One command and the state the device must show after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub command: String,
    pub expected: CliState,
}

impl Step {
    pub fn new(command: impl Into<String>, expected: CliState) -> Self {
        Self {
            command: command.into(),
            expected,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.command, self.expected)
    }
}

/// Where an encoded plan leaves the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Closing {
    /// Navigate back to the state the plan started in.
    #[default]
    Restore,
    /// Stay in global configuration so the next plan can continue there.
    KeepOpen,
}

/// Ordered steps produced for one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    start: CliState,
    steps: Vec<Step>,
}

impl Plan {
    pub(crate) fn new(start: CliState, steps: Vec<Step>) -> Self {
        Self { start, steps }
    }

    pub fn start_state(&self) -> &CliState {
        &self.start
    }

    /// State after the last step.
    pub fn end_state(&self) -> &CliState {
        self.steps.last().map(|s| &s.expected).unwrap_or(&self.start)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The command lines in order.
    pub fn commands(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.command.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
