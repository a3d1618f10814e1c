//! `show running-config interface <id>` / `show running-config vlan <id>`.

use std::net::IpAddr;

use super::OutputKind;
use crate::error::{Error, Result};
use crate::model::{InterfaceId, IpAssignment, Tagging, prefix_from_mask};

const MAX_RANGE: u32 = 1024;

/// One context block of the running configuration.
///
/// ```text
/// Running configuration:
///
/// vlan 10
///    name "eng"
///    untagged 4
///    tagged 3,Trk1
///    ip address 10.1.0.1 255.255.255.0
///    exit
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    /// Context line, e.g. `vlan 10` or `interface 3`.
    pub header: String,
    /// Indented lines of the block, trimmed, without the closing `exit`.
    pub lines: Vec<String>,
}

impl ConfigBlock {
    /// Extract the first context block.
    ///
    /// `Ok(None)` when the output is a running configuration with no
    /// matching block (the context has no non-default settings).
    pub fn parse(raw: &str) -> Result<Option<ConfigBlock>> {
        let kind = OutputKind::RunningConfig;
        let mut lines = raw
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| !l.contains("Running configuration:"));

        if lines.next().is_none() {
            return Err(Error::parse(
                kind.name(),
                "no 'Running configuration:' marker",
                raw,
            ));
        }

        let mut block: Option<ConfigBlock> = None;
        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            match block.as_mut() {
                None => {
                    if trimmed.starts_with("interface ") || trimmed.starts_with("vlan ") {
                        block = Some(ConfigBlock {
                            header: trimmed.to_string(),
                            lines: Vec::new(),
                        });
                    }
                }
                Some(b) => {
                    if trimmed == "exit" {
                        return Ok(block);
                    }
                    b.lines.push(trimmed.to_string());
                }
            }
        }

        match block {
            Some(b) => Err(Error::parse(
                kind.name(),
                format!("block '{}' has no closing 'exit'", b.header),
                raw,
            )),
            None => Ok(None),
        }
    }

    fn values<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lines.iter().filter_map(move |line| {
            line.strip_prefix(keyword)
                .filter(|rest| rest.starts_with(' '))
                .map(str::trim)
        })
    }

    /// The `name` setting, unquoted.
    pub fn name(&self) -> Option<String> {
        self.values("name")
            .next()
            .map(|v| v.trim_matches('"').to_string())
    }

    pub fn is_disabled(&self) -> bool {
        self.lines.iter().any(|l| l == "disable")
    }

    /// Ports listed on `tagged` or `untagged` lines of a VLAN block.
    pub fn members(&self, tagging: Tagging) -> Result<Vec<InterfaceId>> {
        let mut ports = Vec::new();
        for list in self.values(tagging.keyword()) {
            ports.extend(expand_port_list(list)?);
        }
        Ok(ports)
    }

    /// Addresses configured in this block, attributed to `interface`.
    ///
    /// The first address of each family is primary, later ones secondary.
    /// `dhcp-bootp` and link-local settings are skipped.
    pub fn addresses(&self, interface: &InterfaceId) -> Result<Vec<IpAssignment>> {
        let kind = OutputKind::RunningConfig;
        let mut out: Vec<IpAssignment> = Vec::new();

        let v4 = self.values("ip address").map(|v| (v, false));
        let v6 = self.values("ipv6 address").map(|v| (v, true));
        for (value, v6) in v4.chain(v6) {
            let mut words = value.split_whitespace();
            let Some(first) = words.next() else { continue };
            if first.eq_ignore_ascii_case("dhcp-bootp") || first.eq_ignore_ascii_case("autoconfig") {
                continue;
            }
            if words.clone().any(|w| w.eq_ignore_ascii_case("link-local")) {
                continue;
            }

            let bad = || Error::parse(kind.name(), format!("bad address '{}'", value), value);
            let (address, prefix_len) = match first.split_once('/') {
                Some((addr, len)) => (
                    addr.parse::<IpAddr>().map_err(|_| bad())?,
                    len.parse::<u8>().map_err(|_| bad())?,
                ),
                None => {
                    let mask = words.next().ok_or_else(bad)?;
                    (
                        first.parse::<IpAddr>().map_err(|_| bad())?,
                        mask.parse().ok().and_then(prefix_from_mask).ok_or_else(bad)?,
                    )
                }
            };
            if address.is_ipv6() != v6 {
                return Err(bad());
            }

            let mut assignment = IpAssignment::new(interface.clone(), address, prefix_len);
            if out.iter().any(|a| a.address.is_ipv4() == address.is_ipv4()) {
                assignment = assignment.secondary();
            }
            out.push(assignment);
        }
        Ok(out)
    }
}

/// Expand a ProCurve port list such as `3,5-6,Trk1,A1-A4`.
pub fn expand_port_list(list: &str) -> Result<Vec<InterfaceId>> {
    let bad = |reason: String| Error::parse("port list", reason, list);
    let mut ports = Vec::new();

    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((start, end)) = item.split_once('-') else {
            ports.push(item.parse().map_err(|_| bad(format!("bad port '{}'", item)))?);
            continue;
        };

        let (prefix, first) = split_number(start).ok_or_else(|| bad(format!("bad range '{}'", item)))?;
        let (end_prefix, last) = split_number(end).ok_or_else(|| bad(format!("bad range '{}'", item)))?;
        let end_prefix = if end_prefix.is_empty() { prefix } else { end_prefix };
        if !prefix.eq_ignore_ascii_case(end_prefix) || first > last || last - first > MAX_RANGE {
            return Err(bad(format!("bad range '{}'", item)));
        }

        for n in first..=last {
            let name = format!("{}{}", prefix, n);
            ports.push(name.parse().map_err(|_| bad(format!("bad port '{}'", name)))?);
        }
    }
    Ok(ports)
}

/// Split `A12` into (`A`, 12).
fn split_number(s: &str) -> Option<(&str, u32)> {
    let digits = s.len() - s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let (prefix, number) = s.split_at(s.len() - digits);
    Some((prefix, number.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VLAN_BLOCK: &str = "show running-config vlan 10\r
\r
Running configuration:\r
\r
vlan 10\r
   name \"eng lab\"\r
   untagged 4\r
   tagged 3,7-8,Trk1\r
   ip address 10.1.0.1 255.255.255.0\r
   ip address 10.1.1.1/24\r
   ipv6 address 2001:db8:10::1/64\r
   ipv6 address fe80::1 link-local\r
   exit\r
";

    fn vlan10() -> InterfaceId {
        InterfaceId::Vlan("10".parse().unwrap())
    }

    #[test]
    fn test_parse_vlan_block() {
        let block = ConfigBlock::parse(VLAN_BLOCK).unwrap().unwrap();
        assert_eq!(block.header, "vlan 10");
        assert_eq!(block.name().as_deref(), Some("eng lab"));
        assert!(!block.is_disabled());
        assert_eq!(block.members(Tagging::Untagged).unwrap(), vec![InterfaceId::port("4")]);
        assert_eq!(
            block.members(Tagging::Tagged).unwrap(),
            vec![
                InterfaceId::port("3"),
                InterfaceId::port("7"),
                InterfaceId::port("8"),
                InterfaceId::Trunk("Trk1".into()),
            ]
        );
    }

    #[test]
    fn test_block_addresses() {
        let block = ConfigBlock::parse(VLAN_BLOCK).unwrap().unwrap();
        let addrs = block.addresses(&vlan10()).unwrap();
        let shown: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(
            shown,
            vec![
                "10.1.0.1/24 on vlan 10",
                "10.1.1.1/24 on vlan 10 (secondary)",
                "2001:db8:10::1/64 on vlan 10",
            ]
        );
    }

    #[test]
    fn test_parse_interface_block() {
        let raw = "Running configuration:\n\ninterface 3\n   name \"uplink\"\n   disable\n   untagged vlan 10\n   exit\n";
        let block = ConfigBlock::parse(raw).unwrap().unwrap();
        assert_eq!(block.header, "interface 3");
        assert_eq!(block.name().as_deref(), Some("uplink"));
        assert!(block.is_disabled());
    }

    #[test]
    fn test_default_context_has_no_block() {
        let raw = "Running configuration:\r\n\r\n";
        assert_eq!(ConfigBlock::parse(raw).unwrap(), None);
    }

    #[test]
    fn test_missing_marker_fails() {
        assert!(ConfigBlock::parse("vlan 10\n   exit\n").is_err());
    }

    #[test]
    fn test_truncated_block_fails() {
        let raw = "Running configuration:\n\nvlan 10\n   name \"eng\"\n";
        assert!(matches!(ConfigBlock::parse(raw), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_expand_port_list() {
        let ports = expand_port_list("A1-A3,B2, Trk2").unwrap();
        assert_eq!(
            ports,
            vec![
                InterfaceId::port("A1"),
                InterfaceId::port("A2"),
                InterfaceId::port("A3"),
                InterfaceId::port("B2"),
                InterfaceId::Trunk("Trk2".into()),
            ]
        );
        assert!(expand_port_list("5-3").is_err());
        assert!(expand_port_list("A1-B4").is_err());
        assert!(expand_port_list("x!").is_err());
    }
}
