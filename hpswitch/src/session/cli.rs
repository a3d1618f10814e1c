//! Prompt-aware CLI session.

use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use secrecy::{ExposeSecret, SecretString};

use super::config::SessionConfig;
use super::context::{CliContext, CliState};
use super::response::RunOutput;
use crate::channel::split_lines;
use crate::error::{Error, Result, TransportError};
use crate::platform::{PlatformDefinition, PromptKind};
use crate::transport::CliTransport;

/// Interstitial prompts (pager pages, banners) answered within one read.
const MAX_INTERSTITIALS: usize = 512;

/// Pager marker left behind in the output after a page is answered.
const PAGER_MARKER: &str = "-- MORE --";

/// Connection status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No transport.
    Disconnected,
    /// Transport up, no prompt seen yet.
    Authenticating,
    /// The context mirrors the device.
    Connected,
    /// The context can no longer be trusted; `resync()` is required.
    Desynced,
}

/// One interactive CLI session on a switch.
///
/// Owns the transport and the [`CliContext`]. Every command goes through
/// [`run`](Self::run), which checks the prompt the device answers with
/// against the state the caller expects.
pub struct CliSession<T: CliTransport> {
    transport: Option<T>,
    platform: PlatformDefinition,
    config: SessionConfig,
    context: CliContext,
    status: SessionStatus,
    desync_reason: Option<String>,
    enable_password: Option<SecretString>,
}

impl<T: CliTransport> CliSession<T> {
    /// Wrap a connected transport. Call [`open`](Self::open) next.
    pub fn new(transport: T, platform: PlatformDefinition, config: SessionConfig) -> Self {
        Self {
            transport: Some(transport),
            platform,
            config,
            context: CliContext::new(),
            status: SessionStatus::Authenticating,
            desync_reason: None,
            enable_password: None,
        }
    }

    /// Password answered at the `enable` prompt.
    pub fn with_enable_password(mut self, password: Option<SecretString>) -> Self {
        self.enable_password = password;
        self
    }

    /// Wait for the first prompt, escalate to `Enabled` and run the
    /// platform's open commands.
    ///
    /// On failure the transport is closed before the error is returned.
    pub async fn open(&mut self) -> Result<()> {
        let result = self.establish().await;
        if let Err(e) = &result {
            warn!("session open failed: {}", e);
            self.teardown().await;
        }
        result
    }

    async fn establish(&mut self) -> Result<()> {
        self.status = SessionStatus::Authenticating;
        let raw = self.read_prompt().await?;
        let (_, prompt) = split_output("", &raw);
        let state = self
            .platform
            .classify_prompt(&prompt)
            .ok_or_else(|| Error::UnexpectedPrompt {
                expected: CliState::TopLevel.to_string(),
                observed: prompt.clone(),
                output: raw.clone(),
            })?;

        debug!("initial prompt '{}' ({})", prompt, state);
        self.context.adopt(&state);
        self.status = SessionStatus::Connected;

        match state {
            CliState::TopLevel => {
                self.run("enable", &CliState::Enabled).await?;
            }
            CliState::Enabled => {}
            _ => {
                self.run("end", &CliState::Enabled).await?;
            }
        }

        for command in self.platform.on_open_commands.clone() {
            self.run(&command, &CliState::Enabled).await?;
        }
        Ok(())
    }

    /// Send `command` and check that the device ends up in `expected`.
    ///
    /// `expected` must be reachable from the current state in one step;
    /// otherwise nothing is sent. A timeout or an unexpected prompt marks
    /// the session desynchronized. A recognised error banner is returned as
    /// [`Error::Device`] as long as the prompt is the current or the
    /// expected state.
    pub async fn run(&mut self, command: &str, expected: &CliState) -> Result<RunOutput> {
        self.check_usable()?;
        let current = self.context.state();
        if !current.can_reach(expected) {
            return Err(Error::invalid(format!(
                "{} is not reachable from {} in one command",
                expected, current
            )));
        }

        debug!("run '{}' in {} expecting {}", command, current, expected);
        let start = Instant::now();

        let sent = match self.transport.as_mut() {
            Some(transport) => transport.send_line(command).await,
            None => Err(TransportError::Disconnected.into()),
        };
        let raw = match sent {
            Ok(()) => self.read_prompt().await,
            Err(e) => Err(e),
        };
        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                self.note_failure(&e, command);
                return Err(e);
            }
        };

        let (lines, prompt) = split_output(command, &raw);
        let observed = self.platform.classify_prompt(&prompt);
        let banner = self.platform.detect_failure(&lines.join("\n"));

        match (observed, banner) {
            (Some(state), Some(banner)) if state == current || state == *expected => {
                debug!("'{}' rejected: {}", command, banner);
                self.context.adopt(&state);
                Err(Error::Device {
                    command: command.to_string(),
                    banner,
                    output: raw,
                })
            }
            (Some(state), None) if state == *expected => {
                trace!("'{}' -> {}", command, state);
                self.context.adopt(&state);
                Ok(RunOutput {
                    command: command.to_string(),
                    lines,
                    raw,
                    prompt,
                    state,
                    elapsed: start.elapsed(),
                })
            }
            (observed, _) => {
                let observed_text = match observed {
                    Some(state) => format!("{} ({})", prompt, state),
                    None => prompt.clone(),
                };
                self.mark_desynced(format!(
                    "'{}' expected {}, device answered '{}'",
                    command, expected, observed_text
                ));
                Err(Error::UnexpectedPrompt {
                    expected: expected.to_string(),
                    observed: prompt,
                    output: raw,
                })
            }
        }
    }

    /// Bring the session back to `Enabled` from wherever the device is.
    ///
    /// Sends `end` (or `exit`, or `enable` from the top level, or an empty
    /// line after a timeout) until the device shows the `Enabled` prompt,
    /// at most `resync_attempts` times. On exhaustion the transport is
    /// closed and [`Error::SessionUnusable`] is returned.
    pub async fn resync(&mut self) -> Result<()> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(TransportError::Disconnected.into());
        };
        warn!(
            "resyncing session ({})",
            self.desync_reason.as_deref().unwrap_or("requested")
        );

        match transport.discard_pending().await {
            Ok(discarded) if !discarded.is_empty() => {
                trace!("discarded {} bytes of pending output", discarded.len())
            }
            Ok(_) => {}
            Err(e) => {
                self.note_failure(&e, "");
                return Err(e);
            }
        }
        self.status = SessionStatus::Desynced;

        let attempts = self.config.resync_attempts;
        let mut observed: Option<CliState> = None;
        let mut timed_out = false;
        let mut exit_next = false;

        for attempt in 1..=attempts {
            let command = if timed_out {
                ""
            } else {
                match &observed {
                    Some(CliState::TopLevel) => "enable",
                    Some(state) if state.is_config() && exit_next => "exit",
                    _ => "end",
                }
            };
            debug!("resync attempt {}/{}: '{}'", attempt, attempts, command);

            let sent = match self.transport.as_mut() {
                Some(transport) => transport.send_line(command).await,
                None => Err(TransportError::Disconnected.into()),
            };
            let read = match sent {
                Ok(()) => self.read_prompt().await,
                Err(e) => Err(e),
            };

            match read {
                Ok(raw) => {
                    timed_out = false;
                    let (_, prompt) = split_output(command, &raw);
                    let state = self.platform.classify_prompt(&prompt);
                    if state == Some(CliState::Enabled) {
                        self.context.adopt(&CliState::Enabled);
                        self.status = SessionStatus::Connected;
                        self.desync_reason = None;
                        info!("session resynchronized after {} attempt(s)", attempt);
                        return Ok(());
                    }
                    exit_next = state.as_ref().is_some_and(CliState::is_config) && !exit_next;
                    observed = state;
                }
                Err(Error::Timeout { .. }) => {
                    timed_out = true;
                    observed = None;
                }
                Err(e) => {
                    self.note_failure(&e, command);
                    return Err(e);
                }
            }
        }

        warn!("resync failed after {} attempts, closing session", attempts);
        self.teardown().await;
        Err(Error::SessionUnusable { attempts })
    }

    /// Log out and close the transport.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };

        if self.status == SessionStatus::Connected {
            let timeout = self.config.command_timeout.min(Duration::from_secs(5));
            if self.context.state().is_config() {
                let _ = transport.send_line("end").await;
                let _ = transport.read_until(&self.platform.read_pattern, timeout).await;
            }
            if transport.send_line("logout").await.is_ok() {
                for _ in 0..3 {
                    let Ok(chunk) = transport.read_until(&self.platform.read_pattern, timeout).await
                    else {
                        break;
                    };
                    if self.platform.prompt_kind(chunk.as_bytes()) != Some(PromptKind::Confirm) {
                        break;
                    }
                    let _ = transport.send_line(confirm_answer(&chunk)).await;
                }
            }
        }

        if let Err(e) = transport.close().await {
            debug!("transport close after logout: {}", e);
        }
        self.status = SessionStatus::Disconnected;
        self.context.reset();
        Ok(())
    }

    /// Current derived CLI state.
    pub fn state(&self) -> CliState {
        self.context.state()
    }

    pub fn context(&self) -> &CliContext {
        &self.context
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_desynced(&self) -> bool {
        self.status == SessionStatus::Desynced
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The transport, while the session is open.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    fn check_usable(&self) -> Result<()> {
        match self.status {
            _ if self.transport.is_none() => Err(TransportError::Disconnected.into()),
            SessionStatus::Desynced => Err(Error::Desynced {
                reason: self
                    .desync_reason
                    .clone()
                    .unwrap_or_else(|| "resync required".to_string()),
            }),
            _ => Ok(()),
        }
    }

    /// Read until a CLI prompt, answering interstitial prompts on the way.
    async fn read_prompt(&mut self) -> Result<String> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(Error::Connection(TransportError::Disconnected))?;
        let platform = &self.platform;
        let timeout = self.config.command_timeout;

        let mut collected = String::new();
        let mut password_sent = false;

        for _ in 0..MAX_INTERSTITIALS {
            let chunk = match transport.read_until(&platform.read_pattern, timeout).await {
                Ok(chunk) => chunk,
                Err(Error::Timeout { timeout, partial }) => {
                    collected.push_str(&partial);
                    return Err(Error::Timeout {
                        timeout,
                        partial: collected,
                    });
                }
                Err(e) => return Err(e),
            };
            collected.push_str(&chunk);

            match platform.prompt_kind(chunk.as_bytes()) {
                Some(PromptKind::Password) => {
                    let answer = match (&self.enable_password, password_sent) {
                        (Some(password), false) => password.expose_secret().to_string(),
                        _ => String::new(),
                    };
                    password_sent = true;
                    trace!("answering password prompt");
                    transport.send_line(&answer).await?;
                }
                Some(PromptKind::Continue) => transport.send_line("").await?,
                Some(PromptKind::Pager) => transport.send(" ").await?,
                Some(PromptKind::Confirm) => transport.send_line(confirm_answer(&chunk)).await?,
                Some(PromptKind::Cli) | None => return Ok(collected),
            }
        }

        Ok(collected)
    }

    fn note_failure(&mut self, error: &Error, command: &str) {
        match error {
            Error::Connection(_) => {
                warn!("connection lost during '{}': {}", command, error);
                if let Some(mut transport) = self.transport.take() {
                    transport.abort();
                }
                self.status = SessionStatus::Disconnected;
                self.context.reset();
            }
            e if e.desyncs_session() => {
                self.mark_desynced(format!("'{}': {}", command, e));
            }
            _ => {}
        }
    }

    fn mark_desynced(&mut self, reason: String) {
        warn!("session desynchronized: {}", reason);
        self.status = SessionStatus::Desynced;
        self.desync_reason = Some(reason);
    }

    async fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!("close during teardown failed: {}", e);
                transport.abort();
            }
        }
        self.status = SessionStatus::Disconnected;
        self.context.reset();
    }
}

impl<T: CliTransport> Drop for CliSession<T> {
    fn drop(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            warn!("CLI session dropped without close(); aborting transport");
            transport.abort();
        }
    }
}

/// Answer for a `[y/n]` question: never save, otherwise confirm.
fn confirm_answer(question: &str) -> &'static str {
    if question.to_ascii_lowercase().contains("save") {
        "n"
    } else {
        "y"
    }
}

/// Split captured output into (lines, prompt line).
///
/// The echo of `command` and any pager markers are removed, as are
/// blank lines at either end.
fn split_output(command: &str, raw: &str) -> (Vec<String>, String) {
    let mut lines: Vec<String> = split_lines(raw)
        .into_iter()
        .map(|line| match line.find(PAGER_MARKER) {
            Some(pos) => line[..pos].trim_end().to_string(),
            None => line,
        })
        .collect();

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let prompt = lines.pop().map(|l| l.trim().to_string()).unwrap_or_default();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let command = command.trim();
    let mut start = 0;
    while start < lines.len() && lines[start].trim().is_empty() {
        start += 1;
    }
    if !command.is_empty() && start < lines.len() && lines[start].trim_end().ends_with(command) {
        start += 1;
    }
    lines.drain(..start);
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }

    (lines, prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_output_strips_echo_and_prompt() {
        let raw = "show vlans\r\n\r\n Status and Counters - VLAN Information\r\n\r\n  VLAN ID Name\r\n\r\nHP-2920# ";
        let (lines, prompt) = split_output("show vlans", raw);
        assert_eq!(prompt, "HP-2920#");
        assert_eq!(lines[0], " Status and Counters - VLAN Information");
        assert_eq!(lines.last().unwrap(), "  VLAN ID Name");
    }

    #[test]
    fn test_split_output_without_echo() {
        let (lines, prompt) = split_output("", "\r\nHP-2920> ");
        assert!(lines.is_empty());
        assert_eq!(prompt, "HP-2920>");
    }

    #[test]
    fn test_split_output_drops_pager_marker() {
        let raw = "show vlans\r\n  1    DEFAULT_VLAN\r\n-- MORE --, next page: Space\r  10   eng\r\nHP-2920# ";
        let (lines, _) = split_output("show vlans", raw);
        assert_eq!(lines, vec!["  1    DEFAULT_VLAN", "  10   eng"]);
    }

    #[test]
    fn test_confirm_answer() {
        assert_eq!(confirm_answer("Do you want to log out [y/n]? "), "y");
        assert_eq!(confirm_answer("Do you want to save current configuration [y/n/^C]? "), "n");
    }
}
