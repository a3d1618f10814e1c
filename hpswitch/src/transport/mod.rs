//! Transports to the switch.
//!
//! The CLI session only sees the [`CliTransport`] contract: send a line,
//! read until a pattern, drop whatever is pending. [`SshTransport`] is the
//! production implementation over russh. SNMP access goes through the
//! [`SnmpTransport`] contract; no SNMP engine ships with this crate.

pub mod config;
pub mod snmp;
mod ssh;

use std::future::Future;
use std::time::Duration;

use regex::bytes::Regex;

use crate::error::Result;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use snmp::{NoSnmp, Oid, SnmpTransport, SnmpValue};
pub use ssh::SshTransport;

/// A byte stream to an interactive switch CLI.
pub trait CliTransport: Send {
    /// Send raw input without a line terminator.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Send one line of input, terminated with a newline.
    fn send_line(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send {
        async move { self.send(&format!("{}\n", line)).await }
    }

    /// Read until `pattern` matches the end of the received output.
    ///
    /// Returns everything received since the previous read, ANSI sequences
    /// stripped. On deadline expiry returns [`Error::Timeout`] carrying the
    /// partial output.
    ///
    /// [`Error::Timeout`]: crate::Error::Timeout
    fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Drop any output received or in flight, returning it.
    fn discard_pending(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Close the connection gracefully.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Tear the connection down immediately. Must not block.
    fn abort(&mut self);

    /// Whether the connection is still usable.
    fn is_open(&self) -> bool;
}
