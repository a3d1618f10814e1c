//! `show interfaces brief` and `show trunks`.

use std::sync::LazyLock;

use regex::Regex;

use super::{OutputKind, table_rows};
use crate::error::{Error, Result};
use crate::model::{AdminState, Interface, InterfaceId, LinkState, TrunkMembership};

static INTERFACE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\S+?)(?:-(trk\d+))?\s+\S*\s*\|\s*\S+\s+(yes|no)\s+(up|down)\b")
        .expect("invalid interface table grammar")
});

static TRUNK_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\S+)\s*\|.*\|\s*(trk\d+)\b").expect("invalid trunk table grammar")
});

/// Parse `show interfaces brief`.
///
/// Trunk members carry their group in the port column (`5-Trk1`).
///
/// ```text
///                   | Intrusion                           MDI  Flow  Bcast
///   Port     Type   | Alert     Enabled Status Mode       Mode Ctrl  Limit
///   -------- ------ + --------- ------- ------ ---------- ---- ---- ------
///   1        100/1000T | No        Yes     Down   1000FDx    Auto off  0
///   5-Trk1   100/1000T | No        Yes     Up     1000FDx    MDIX off  0
/// ```
pub fn parse_interface_table(raw: &str) -> Result<Vec<Interface>> {
    let kind = OutputKind::InterfaceTable;
    table_rows(kind, raw, &["Port", "Enabled", "Status"])?
        .into_iter()
        .map(|line| {
            let caps = INTERFACE_ROW
                .captures(line)
                .ok_or_else(|| Error::parse(kind.name(), format!("bad row '{}'", line), raw))?;
            let id: InterfaceId = caps[1]
                .parse()
                .map_err(|_| Error::parse(kind.name(), format!("bad port '{}'", &caps[1]), raw))?;

            let mut iface = Interface::new(id);
            iface.admin = AdminState::from_enabled(caps[3].eq_ignore_ascii_case("yes"));
            iface.link = Some(if caps[4].eq_ignore_ascii_case("up") {
                LinkState::Up
            } else {
                LinkState::Down
            });
            iface.trunk = caps.get(2).map(|m| canonical_trunk(m.as_str()));
            Ok(iface)
        })
        .collect()
}

/// Parse `show trunks` into port → trunk group.
///
/// A header with no rows is a switch without trunks; a missing header is
/// a parse failure.
///
/// ```text
///   Port | Name                             Type      | Group Type
///   ---- + -------------------------------- --------- + ----- --------
///   5    |                                  100/1000T | Trk1  Trunk
///   6    | uplink                           100/1000T | Trk1  LACP
/// ```
pub fn parse_trunk_table(raw: &str) -> Result<TrunkMembership> {
    let kind = OutputKind::TrunkTable;
    let mut members = TrunkMembership::new();
    for line in table_rows(kind, raw, &["Port", "Group"])? {
        let caps = TRUNK_ROW
            .captures(line)
            .ok_or_else(|| Error::parse(kind.name(), format!("bad row '{}'", line), raw))?;
        let port: InterfaceId = caps[1]
            .parse()
            .map_err(|_| Error::parse(kind.name(), format!("bad port '{}'", &caps[1]), raw))?;
        members.insert(port, canonical_trunk(&caps[2]));
    }
    Ok(members)
}

fn canonical_trunk(name: &str) -> String {
    format!("Trk{}", &name[3..])
}
