//! Result of one Reconciler operation.

use std::fmt;

use super::device::TrunkMembership;
use super::interface::Interface;
use super::ip::{IpAssignment, StaticRoute};
use super::vlan::Vlan;
use crate::error::{Error, Result};

/// Structured data returned by a query or attached to a command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// One VLAN, `None` if it does not exist.
    Vlan(Option<Vlan>),

    /// All VLANs.
    Vlans(Vec<Vlan>),

    /// One interface, `None` if it does not exist.
    Interface(Option<Interface>),

    /// All interfaces.
    Interfaces(Vec<Interface>),

    /// IP addresses of one interface, primary first.
    IpAssignments(Vec<IpAssignment>),

    /// Trunk group membership.
    Trunks(TrunkMembership),

    /// Static routes.
    Routes(Vec<StaticRoute>),
}

/// Where and why an operation failed.
#[derive(Debug)]
pub struct Failure {
    /// Index of the failed step in the command list, if a step was running.
    pub step: Option<usize>,

    /// The command (or OID) being executed when the failure happened.
    pub command: Option<String>,

    /// The error.
    pub error: Error,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.step, &self.command) {
            (Some(step), Some(cmd)) => write!(f, "step {} ('{}'): {}", step, cmd, self.error),
            _ => write!(f, "{}", self.error),
        }
    }
}

/// Outcome of an `apply` call. Immutable once returned.
#[derive(Debug)]
pub struct CommandResult {
    commands: Vec<String>,
    output: String,
    payload: Option<Payload>,
    failure: Option<Failure>,
}

impl CommandResult {
    pub(crate) fn succeeded(commands: Vec<String>, output: String, payload: Option<Payload>) -> Self {
        Self {
            commands,
            output,
            payload,
            failure: None,
        }
    }

    pub(crate) fn failed(commands: Vec<String>, output: String, failure: Failure) -> Self {
        Self {
            commands,
            output,
            payload: None,
            failure: Some(failure),
        }
    }

    /// Whether every step succeeded and the read-back matched.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Commands (or OIDs) actually sent, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Raw captured output of all executed steps.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Structured read-back, on success.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Failure details, on failure.
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// The error, on failure.
    pub fn error(&self) -> Option<&Error> {
        self.failure.as_ref().map(|f| &f.error)
    }

    /// Convert into a `Result`, discarding the captured output.
    pub fn into_result(self) -> Result<Option<Payload>> {
        match self.failure {
            Some(failure) => Err(failure.error),
            None => Ok(self.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result() {
        let result = CommandResult::failed(
            vec!["configure terminal".into(), "vlan 10".into()],
            "Invalid input: vlan".into(),
            Failure {
                step: Some(1),
                command: Some("vlan 10".into()),
                error: Error::invalid("boom"),
            },
        );
        assert!(!result.is_success());
        assert_eq!(result.commands().len(), 2);
        assert_eq!(result.failure().unwrap().to_string(), "step 1 ('vlan 10'): Invalid argument: boom");
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_succeeded_result() {
        let result = CommandResult::succeeded(vec![], String::new(), Some(Payload::Vlans(vec![])));
        assert!(result.is_success());
        assert_eq!(result.into_result().unwrap(), Some(Payload::Vlans(vec![])));
    }
}
