//! Error types for hpswitch.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for hpswitch operations.
///
/// Every variant that stems from device interaction carries the raw text
/// (captured CLI output or the attempted OID/value) so a failure can be
/// diagnosed without re-running the operation.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport unreachable, authentication failure or lost connection.
    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),

    /// No prompt (or SNMP response) within the deadline.
    #[error("No prompt observed within {timeout:?}")]
    Timeout { timeout: Duration, partial: String },

    /// The CLI context no longer tracks the device; `resync()` is required.
    #[error("Session desynchronized: {reason}")]
    Desynced { reason: String },

    /// The device answered with a prompt that is not the expected destination.
    #[error("Unexpected prompt '{observed}' (expected {expected})")]
    UnexpectedPrompt {
        expected: String,
        observed: String,
        output: String,
    },

    /// The device explicitly rejected a command.
    #[error("Device rejected '{command}': {banner}")]
    Device {
        command: String,
        banner: String,
        output: String,
    },

    /// Output did not match the expected grammar.
    #[error("Failed to parse {kind} output: {reason}")]
    Parse {
        kind: String,
        reason: String,
        raw: String,
    },

    /// The operation targets a configuration known to be unsupported.
    #[error("Unsupported operation: {reason}")]
    Unsupported { reason: String },

    /// A caller-supplied value is out of range.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// SNMP request failed.
    #[error("SNMP error on {oid}: {message}")]
    Snmp {
        oid: String,
        value: Option<String>,
        message: String,
    },

    /// Read-back after a mutation disagrees with the requested state.
    #[error("Read-back of {entity} does not match: expected {expected}, observed {observed}")]
    Verification {
        entity: String,
        expected: String,
        observed: String,
    },

    /// Resync exhausted its attempts and the session was torn down.
    #[error("Session unusable after {attempts} resync attempts")]
    SessionUnusable { attempts: u32 },

    /// The caller abandoned the session; no further commands are enqueued.
    #[error("Session abandoned, command not sent")]
    Cancelled,
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Error::Unsupported {
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(
        kind: impl Into<String>,
        reason: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Error::Parse {
            kind: kind.into(),
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Raw device text attached to this error, if any.
    pub fn raw_context(&self) -> Option<&str> {
        match self {
            Error::Timeout { partial, .. } => Some(partial),
            Error::UnexpectedPrompt { output, .. } => Some(output),
            Error::Device { output, .. } => Some(output),
            Error::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Whether this error leaves the CLI session desynchronized.
    pub fn desyncs_session(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Desynced { .. } | Error::UnexpectedPrompt { .. }
        )
    }
}

/// Transport layer errors (SSH connection, authentication, channel).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key not present in known_hosts (strict mode)
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Session already has an open transport
    #[error("Session already connected")]
    AlreadyConnected,

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Connect timed out
    #[error("Connect timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias using hpswitch's Error.
pub type Result<T> = std::result::Result<T, Error>;
