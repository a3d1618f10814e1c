//! Session tunables.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Timeouts and limits for a switch session.
///
/// Deserializes from any serde format; durations are given in seconds and
/// every field is optional.
///
/// ```
/// # use hpswitch::SessionConfig;
/// let config: SessionConfig = serde_json::from_str(r#"{"command_timeout": 5}"#).unwrap();
/// assert_eq!(config.resync_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Deadline for a prompt after each command.
    #[serde(deserialize_with = "seconds")]
    pub command_timeout: Duration,

    /// Deadline for TCP connect and SSH handshake.
    #[serde(deserialize_with = "seconds")]
    pub connect_timeout: Duration,

    /// Upper bound on recovery commands sent by `resync()`.
    pub resync_attempts: u32,

    /// Retries of a read-only query after a timeout.
    pub read_retries: u32,

    /// Bytes from the end of the buffer searched for prompts.
    pub search_depth: usize,

    /// PTY width.
    pub terminal_width: u32,

    /// PTY height.
    pub terminal_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            resync_attempts: 5,
            read_retries: 2,
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
        }
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
