//! Platform definition for family-specific CLI behavior.

use std::fmt;

use regex::bytes::Regex as BytesRegex;

use crate::channel::{combine_patterns, compile_prompt_pattern};
use crate::model::{InterfaceId, SwitchFamily, VlanId};
use crate::session::CliState;

/// What the device is waiting for at the end of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A regular CLI prompt.
    Cli,
    /// `Password:`, answered with the enable password.
    Password,
    /// "Press any key to continue", answered with an empty line.
    Continue,
    /// The output pager, answered with a space.
    Pager,
    /// A `[y/n]` confirmation.
    Confirm,
}

/// Prompt patterns, banners and session setup for one switch family.
#[derive(Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "hp_procurve").
    pub name: String,

    /// Switch family this definition drives.
    pub family: SwitchFamily,

    /// End-anchored CLI prompt pattern.
    pub prompt: BytesRegex,

    /// Line-level prompt grammar with `host`, `context` and `sigil` groups.
    pub prompt_line: regex::Regex,

    pub password_prompt: BytesRegex,
    pub continue_prompt: BytesRegex,
    pub pager_prompt: BytesRegex,
    pub confirm_prompt: BytesRegex,

    /// Any of the above; what every read waits for.
    pub read_pattern: BytesRegex,

    /// Substrings that mark a rejected command.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when the session is opened.
    pub on_open_commands: Vec<String>,
}

impl PlatformDefinition {
    /// Build a definition from raw pattern strings.
    ///
    /// `prompt` must match one whole prompt line and carry the named groups
    /// `context` (text inside the parentheses, optional) and `sigil`
    /// (`>` or `#`).
    pub fn new(
        name: impl Into<String>,
        family: SwitchFamily,
        prompt: &str,
        password: &str,
        continue_banner: &str,
        pager: &str,
        confirm: &str,
    ) -> Result<Self, regex::Error> {
        let line_start = r"(?m)(?:^|\r)";
        let anchored = format!("{}{}", line_start, prompt);

        Ok(Self {
            name: name.into(),
            family,
            prompt: compile_prompt_pattern(&anchored)?,
            prompt_line: regex::Regex::new(&format!(r"^{}[ \t]*$", prompt))?,
            password_prompt: compile_prompt_pattern(password)?,
            continue_prompt: compile_prompt_pattern(continue_banner)?,
            pager_prompt: compile_prompt_pattern(pager)?,
            confirm_prompt: compile_prompt_pattern(confirm)?,
            read_pattern: combine_patterns([
                anchored.as_str(),
                password,
                continue_banner,
                pager,
                confirm,
            ])?,
            failed_when_contains: vec![],
            on_open_commands: vec![],
        })
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Which prompt ends `output`, if any.
    pub fn prompt_kind(&self, output: &[u8]) -> Option<PromptKind> {
        if self.prompt.is_match(output) {
            Some(PromptKind::Cli)
        } else if self.password_prompt.is_match(output) {
            Some(PromptKind::Password)
        } else if self.continue_prompt.is_match(output) {
            Some(PromptKind::Continue)
        } else if self.pager_prompt.is_match(output) {
            Some(PromptKind::Pager)
        } else if self.confirm_prompt.is_match(output) {
            Some(PromptKind::Confirm)
        } else {
            None
        }
    }

    /// Map a prompt line to the CLI state it announces.
    ///
    /// Returns `None` for anything that is not a recognised prompt.
    pub fn classify_prompt(&self, line: &str) -> Option<CliState> {
        let caps = self.prompt_line.captures(line.trim_start_matches('\r'))?;
        let sigil = caps.name("sigil")?.as_str();
        let context = caps.name("context").map(|m| m.as_str());

        match (sigil, context) {
            (">", None) => Some(CliState::TopLevel),
            ("#", None) => Some(CliState::Enabled),
            ("#", Some("config")) => Some(CliState::GlobalConfig),
            ("#", Some(ctx)) => classify_context(ctx),
            _ => None,
        }
    }

    /// The first output line carrying a failure banner, verbatim.
    pub fn detect_failure(&self, output: &str) -> Option<String> {
        output
            .lines()
            .find(|line| self.failed_when_contains.iter().any(|b| line.contains(b.as_str())))
            .map(|line| line.trim().to_string())
    }
}

/// Sub-context names: `eth-3`, `eth-A1`, `eth-Trk1`, `vlan-10`.
fn classify_context(ctx: &str) -> Option<CliState> {
    if let Some(id) = ctx.strip_prefix("vlan-") {
        return id.parse::<VlanId>().ok().map(CliState::VlanConfig);
    }
    let port = ctx.strip_prefix("eth-").or_else(|| ctx.strip_prefix("if-"))?;
    match port.parse::<InterfaceId>().ok()? {
        InterfaceId::Vlan(_) => None,
        id => Some(CliState::InterfaceConfig(id)),
    }
}

impl fmt::Debug for PlatformDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDefinition")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("prompt", &self.prompt.as_str())
            .field("failed_when_contains", &self.failed_when_contains)
            .field("on_open_commands", &self.on_open_commands)
            .finish()
    }
}
