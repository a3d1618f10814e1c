//! `show vlans` family.

use std::sync::LazyLock;

use regex::Regex;

use super::{OutputKind, field, table_rows};
use crate::error::{Error, Result};
use crate::model::{InterfaceId, Tagging, Vlan, VlanId};

static VLAN_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,4})\s+(.*?)\s*(?:\||\s{2,}Port-based|\s{2,}Protocol|$)")
        .expect("invalid VLAN table grammar")
});

static PORT_MODE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\S+)\s+(tagged|untagged|forbid|auto)\b")
        .expect("invalid VLAN detail grammar")
});

static PORT_VLAN_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,4})\s.*\s(tagged|untagged)\s*$")
        .expect("invalid port VLAN grammar")
});

/// Parse `show vlans`. Members are not listed by this command.
///
/// ```text
///   VLAN ID Name                             | Status     Voice Jumbo
///   ------- -------------------------------- + ---------- ----- -----
///   1       DEFAULT_VLAN                     | Port-based No    No
///   10      eng                              | Port-based No    No
/// ```
pub fn parse_vlan_table(raw: &str) -> Result<Vec<Vlan>> {
    let kind = OutputKind::VlanTable;
    table_rows(kind, raw, &["VLAN ID", "Name"])?
        .into_iter()
        .map(|line| {
            let caps = VLAN_ROW
                .captures(line)
                .ok_or_else(|| Error::parse(kind.name(), format!("bad row '{}'", line), raw))?;
            let id = caps[1].parse::<VlanId>().map_err(|_| {
                Error::parse(kind.name(), format!("bad VLAN id '{}'", &caps[1]), raw)
            })?;
            Ok(Vlan::new(id, caps[2].trim()))
        })
        .collect()
}

/// Parse `show vlans <id>`. `None` when the VLAN does not exist.
///
/// ```text
///   VLAN ID : 10
///   Name : eng
///   Status : Port-based
///
///   Port Information Mode     Unknown VLAN Status
///   ---------------- -------- ------------ ----------
///   3                Tagged   Learn        Up
///   4                Untagged Learn        Down
/// ```
pub fn parse_vlan_detail(raw: &str) -> Result<Option<Vlan>> {
    let kind = OutputKind::VlanDetail;
    let lower = raw.to_ascii_lowercase();
    if lower.contains("not configured") || lower.contains("does not exist") {
        return Ok(None);
    }

    let id = field(raw, "VLAN ID")
        .ok_or_else(|| Error::parse(kind.name(), "no 'VLAN ID' field", raw))?;
    let id = id
        .parse::<VlanId>()
        .map_err(|_| Error::parse(kind.name(), format!("bad VLAN id '{}'", id), raw))?;
    let name = field(raw, "Name").ok_or_else(|| Error::parse(kind.name(), "no 'Name' field", raw))?;

    let mut vlan = Vlan::new(id, name.trim_matches('"'));
    if !raw.contains("Port Information") {
        return Ok(Some(vlan));
    }

    for line in table_rows(kind, raw, &["Port Information", "Mode"])? {
        let caps = PORT_MODE_ROW
            .captures(line)
            .ok_or_else(|| Error::parse(kind.name(), format!("bad port row '{}'", line), raw))?;
        let port: InterfaceId = caps[1]
            .parse()
            .map_err(|_| Error::parse(kind.name(), format!("bad port '{}'", &caps[1]), raw))?;
        match caps[2].to_ascii_lowercase().as_str() {
            "tagged" => {
                vlan.tagged.insert(port);
            }
            "untagged" => {
                vlan.untagged.insert(port);
            }
            _ => {}
        }
    }
    Ok(Some(vlan))
}

/// Parse `show vlans ports <id> detail` into the port's memberships.
///
/// ```text
///   VLAN ID Name                 | Status     Voice Jumbo Mode
///   ------- -------------------- + ---------- ----- ----- --------
///   1       DEFAULT_VLAN         | Port-based No    No    Untagged
///   10      eng                  | Port-based No    No    Tagged
/// ```
pub fn parse_port_vlans(raw: &str) -> Result<Vec<(VlanId, Tagging)>> {
    let kind = OutputKind::PortVlans;
    table_rows(kind, raw, &["VLAN ID", "Mode"])?
        .into_iter()
        .map(|line| {
            let caps = PORT_VLAN_ROW
                .captures(line)
                .ok_or_else(|| Error::parse(kind.name(), format!("bad row '{}'", line), raw))?;
            let id = caps[1].parse::<VlanId>().map_err(|_| {
                Error::parse(kind.name(), format!("bad VLAN id '{}'", &caps[1]), raw)
            })?;
            let tagging = if caps[2].eq_ignore_ascii_case("tagged") {
                Tagging::Tagged
            } else {
                Tagging::Untagged
            };
            Ok((id, tagging))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VLAN_TABLE: &str = "\r
 Status and Counters - VLAN Information\r
\r
  Maximum VLANs to support : 256\r
  Primary VLAN : DEFAULT_VLAN\r
  Management VLAN :\r
\r
  VLAN ID Name                             | Status     Voice Jumbo\r
  ------- -------------------------------- + ---------- ----- -----\r
  1       DEFAULT_VLAN                     | Port-based No    No   \r
  10      eng                              | Port-based No    No   \r
  20      guest wifi                       | Port-based No    No   \r
\r
";

    const VLAN_DETAIL: &str = "
 Status and Counters - VLAN Information - VLAN 10

  VLAN ID : 10
  Name : eng
  Status : Port-based
  Voice : No
  Jumbo : No

  Port Information Mode     Unknown VLAN Status
  ---------------- -------- ------------ ----------
  3                Tagged   Learn        Up
  4                Untagged Learn        Down
  Trk1             Tagged   Learn        Up

";

    fn vlan(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    #[test]
    fn test_parse_vlan_table() {
        let vlans = parse_vlan_table(VLAN_TABLE).unwrap();
        assert_eq!(vlans.len(), 3);
        assert_eq!(vlans[0], Vlan::new(vlan(1), "DEFAULT_VLAN"));
        assert_eq!(vlans[1].name, "eng");
        assert_eq!(vlans[2].name, "guest wifi");
    }

    #[test]
    fn test_parse_vlan_table_without_header_fails() {
        let err = parse_vlan_table("  10  eng\r\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_parse_vlan_detail() {
        let parsed = parse_vlan_detail(VLAN_DETAIL).unwrap().unwrap();
        assert_eq!(parsed.id, vlan(10));
        assert_eq!(parsed.name, "eng");
        assert!(parsed.tagged.contains(&InterfaceId::port("3")));
        assert!(parsed.tagged.contains(&InterfaceId::Trunk("Trk1".into())));
        assert_eq!(
            parsed.untagged.iter().collect::<Vec<_>>(),
            vec![&InterfaceId::port("4")]
        );
    }

    #[test]
    fn test_parse_vlan_detail_without_members() {
        let raw = "\n  VLAN ID : 10\n  Name : eng\n  Status : Port-based\n";
        let parsed = parse_vlan_detail(raw).unwrap().unwrap();
        assert_eq!(parsed.to_string(), "{id:10, name:\"eng\", tagged:[], untagged:[]}");
    }

    #[test]
    fn test_parse_missing_vlan() {
        assert_eq!(parse_vlan_detail("\nVLAN 99 is not configured.\n").unwrap(), None);
    }

    #[test]
    fn test_parse_truncated_detail_fails() {
        let err = parse_vlan_detail(" Status and Counters - VLAN Information\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_parse_port_vlans() {
        let raw = "
 Status and Counters - VLAN Information - for ports 3

  VLAN ID Name                 | Status     Voice Jumbo Mode
  ------- -------------------- + ---------- ----- ----- --------
  1       DEFAULT_VLAN         | Port-based No    No    Untagged
  10      eng                  | Port-based No    No    Tagged
";
        assert_eq!(
            parse_port_vlans(raw).unwrap(),
            vec![(vlan(1), Tagging::Untagged), (vlan(10), Tagging::Tagged)]
        );
    }
}
