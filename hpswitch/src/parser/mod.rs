//! Parsers for ProCurve CLI output.
//!
//! Each [`OutputKind`] has its own grammar. Parsers tolerate column width
//! changes and trailing whitespace but never return a partially filled
//! result: missing structure is an [`Error::Parse`] carrying the raw text.

mod config;
mod interface;
mod ip;
mod vlan;

pub use config::{ConfigBlock, expand_port_list};
pub use interface::{parse_interface_table, parse_trunk_table};
pub use ip::{IpTableRow, parse_ip_table, parse_static_routes};
pub use vlan::{parse_port_vlans, parse_vlan_detail, parse_vlan_table};

use std::fmt;

use crate::error::{Error, Result};
use crate::model::{Interface, StaticRoute, Tagging, TrunkMembership, Vlan, VlanId};

/// Substrings with which the device rejects a command.
pub const ERROR_BANNERS: &[&str] = &[
    "Invalid input",
    "Unrecognized command",
    "Ambiguous input",
    "Incomplete input",
    "Unable to",
    "already exists",
    "Command not allowed",
    "Invalid password",
    "Value out of range",
];

/// Which command produced a block of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// `show vlans`
    VlanTable,
    /// `show vlans <id>`
    VlanDetail,
    /// `show vlans ports <id> detail`
    PortVlans,
    /// `show interfaces brief`
    InterfaceTable,
    /// `show running-config interface <id>` / `show running-config vlan <id>`
    RunningConfig,
    /// `show ip`
    IpTable,
    /// `show trunks`
    TrunkTable,
    /// `show ip route static` / `show ipv6 route static`
    StaticRoutes,
    /// Any configuration command; output is only checked for banners.
    CommandEcho,
}

impl OutputKind {
    pub fn name(self) -> &'static str {
        match self {
            OutputKind::VlanTable => "VLAN table",
            OutputKind::VlanDetail => "VLAN detail",
            OutputKind::PortVlans => "port VLAN table",
            OutputKind::InterfaceTable => "interface table",
            OutputKind::RunningConfig => "running-config",
            OutputKind::IpTable => "IP table",
            OutputKind::TrunkTable => "trunk table",
            OutputKind::StaticRoutes => "static routes",
            OutputKind::CommandEcho => "command echo",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed result of parsing one block of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Vlans(Vec<Vlan>),
    VlanDetail(Option<Vlan>),
    PortVlans(Vec<(VlanId, Tagging)>),
    Interfaces(Vec<Interface>),
    RunningConfig(Option<ConfigBlock>),
    IpTable(Vec<IpTableRow>),
    Trunks(TrunkMembership),
    StaticRoutes(Vec<StaticRoute>),
    Lines(Vec<String>),
}

/// Parse `raw` with the grammar for `kind`.
pub fn parse(kind: OutputKind, raw: &str) -> Result<Parsed> {
    check_banners(kind, raw)?;
    Ok(match kind {
        OutputKind::VlanTable => Parsed::Vlans(parse_vlan_table(raw)?),
        OutputKind::VlanDetail => Parsed::VlanDetail(parse_vlan_detail(raw)?),
        OutputKind::PortVlans => Parsed::PortVlans(parse_port_vlans(raw)?),
        OutputKind::InterfaceTable => Parsed::Interfaces(parse_interface_table(raw)?),
        OutputKind::RunningConfig => Parsed::RunningConfig(ConfigBlock::parse(raw)?),
        OutputKind::IpTable => Parsed::IpTable(parse_ip_table(raw)?),
        OutputKind::TrunkTable => Parsed::Trunks(parse_trunk_table(raw)?),
        OutputKind::StaticRoutes => Parsed::StaticRoutes(parse_static_routes(raw)?),
        OutputKind::CommandEcho => Parsed::Lines(
            raw.lines()
                .map(|l| l.trim_end().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        ),
    })
}

/// The first line of `raw` carrying an error banner.
pub fn detect_banner(raw: &str) -> Option<&str> {
    raw.lines()
        .find(|line| ERROR_BANNERS.iter().any(|b| line.contains(b)))
        .map(str::trim)
}

fn check_banners(kind: OutputKind, raw: &str) -> Result<()> {
    match detect_banner(raw) {
        Some(banner) => Err(Error::parse(
            kind.name(),
            format!("device reported '{}'", banner),
            raw,
        )),
        None => Ok(()),
    }
}

/// Rows below the dashed separator that follows a header containing every
/// word in `header`.
///
/// Rows end at the first blank line after at least one row.
pub(crate) fn table_rows<'a>(
    kind: OutputKind,
    raw: &'a str,
    header: &[&str],
) -> Result<Vec<&'a str>> {
    let lines: Vec<&str> = raw.lines().map(|l| l.trim_end_matches('\r')).collect();

    let header_at = lines
        .iter()
        .position(|l| header.iter().all(|w| l.contains(w)))
        .ok_or_else(|| {
            Error::parse(kind.name(), format!("no header with {:?}", header), raw)
        })?;

    let separator_at = lines[header_at + 1..]
        .iter()
        .position(|l| is_separator(l))
        .map(|offset| header_at + 1 + offset)
        .ok_or_else(|| Error::parse(kind.name(), "no separator below header", raw))?;

    let mut rows = Vec::new();
    for line in &lines[separator_at + 1..] {
        if line.trim().is_empty() {
            if rows.is_empty() {
                continue;
            }
            break;
        }
        rows.push(*line);
    }
    Ok(rows)
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("---") && trimmed.chars().all(|c| matches!(c, '-' | '+' | ' ' | '|'))
}

/// Value of a `Key : value` line.
pub(crate) fn field<'a>(raw: &'a str, key: &str) -> Option<&'a str> {
    raw.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        (k.trim() == key).then(|| v.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_makes_parse_fail() {
        let raw = "show vlans 5000\r\nInvalid input: 5000\r\n";
        let err = parse(OutputKind::VlanDetail, raw).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(err.raw_context(), Some(raw));
    }

    #[test]
    fn test_command_echo_lines() {
        let parsed = parse(OutputKind::CommandEcho, "line one  \r\n\r\nline two").unwrap();
        assert_eq!(
            parsed,
            Parsed::Lines(vec!["line one".to_string(), "line two".to_string()])
        );
    }

    #[test]
    fn test_table_rows_require_separator() {
        let raw = "  Port  Type\n  1     100/1000T\n";
        assert!(table_rows(OutputKind::InterfaceTable, raw, &["Port", "Type"]).is_err());
    }

    #[test]
    fn test_field_lookup() {
        let raw = "  VLAN ID : 10\n  Name : eng lab\n  Status : Port-based\n";
        assert_eq!(field(raw, "Name"), Some("eng lab"));
        assert_eq!(field(raw, "VLAN ID"), Some("10"));
        assert_eq!(field(raw, "Voice"), None);
    }
}
