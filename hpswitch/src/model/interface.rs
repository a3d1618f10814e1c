//! Switch interfaces: physical ports, trunks and routed VLAN interfaces.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ip::IpAssignment;
use super::vlan::VlanId;
use crate::error::{Error, Result};

/// Ports per unit/module letter on modular and stacked chassis.
pub(crate) const PORTS_PER_UNIT: u32 = 24;

/// Longest friendly name the device stores for an interface.
const MAX_INTERFACE_NAME_LEN: usize = 64;

/// Identifier of an interface on the switch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterfaceId {
    /// A physical port, e.g. `3` or `A1`.
    Port(String),

    /// A trunk (link aggregate), e.g. `Trk1`.
    Trunk(String),

    /// The routed interface of a VLAN.
    Vlan(VlanId),
}

impl InterfaceId {
    /// Shorthand for a physical port. The name is not validated.
    pub fn port(name: impl Into<String>) -> Self {
        InterfaceId::Port(name.into())
    }

    /// Shorthand for a routed VLAN interface.
    pub fn vlan(id: VlanId) -> Self {
        InterfaceId::Vlan(id)
    }

    /// Whether this is a trunk aggregate.
    pub fn is_trunk(&self) -> bool {
        matches!(self, InterfaceId::Trunk(_))
    }

    /// Name used after the `interface` keyword, `None` for VLAN interfaces.
    pub fn cli_name(&self) -> Option<&str> {
        match self {
            InterfaceId::Port(name) | InterfaceId::Trunk(name) => Some(name),
            InterfaceId::Vlan(_) => None,
        }
    }

    /// The dot1dBasePort number of a physical port.
    ///
    /// Numeric ports map to themselves. Letter-prefixed modular ports map to
    /// `unit * 24 + port` with `A` as unit 0.
    pub fn base_port(&self) -> Option<u32> {
        let InterfaceId::Port(name) = self else {
            return None;
        };
        let mut chars = name.chars();
        let first = chars.next()?;
        if first.is_ascii_digit() {
            return name.parse().ok();
        }
        if !first.is_ascii_alphabetic() {
            return None;
        }
        let unit = u32::from(first.to_ascii_uppercase() as u8 - b'A');
        let port: u32 = chars.as_str().parse().ok()?;
        unit.checked_mul(PORTS_PER_UNIT)?.checked_add(port)
    }

    /// Port identifier for a dot1dBasePort number on a fixed-port switch.
    pub fn from_base_port(base_port: u32) -> Self {
        InterfaceId::Port(base_port.to_string())
    }

    fn sort_key(&self) -> (u8, u32) {
        match self {
            InterfaceId::Port(_) => (0, self.base_port().unwrap_or(u32::MAX)),
            InterfaceId::Trunk(name) => (
                1,
                name.trim_start_matches(|c: char| c.is_ascii_alphabetic())
                    .parse()
                    .unwrap_or(u32::MAX),
            ),
            InterfaceId::Vlan(id) => (2, u32::from(id.get())),
        }
    }
}

impl Ord for InterfaceId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}

impl PartialOrd for InterfaceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceId::Port(name) | InterfaceId::Trunk(name) => f.write_str(name),
            InterfaceId::Vlan(id) => write!(f, "vlan {}", id),
        }
    }
}

impl FromStr for InterfaceId {
    type Err = Error;

    /// Parse `3`, `A1`, `1/1/3`, `Trk1`, `vlan 10`, `vlan-10` or `VLAN10`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        if let Some(rest) = lower.strip_prefix("trk") {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return Ok(InterfaceId::Trunk(format!("Trk{}", rest)));
            }
        }

        if let Some(rest) = lower.strip_prefix("vlan") {
            let rest = rest.trim_start_matches([' ', '-']);
            return Ok(InterfaceId::Vlan(rest.parse()?));
        }

        let mut chars = s.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_digit() => s.chars().all(|c| c.is_ascii_digit() || c == '/'),
            Some(c) if c.is_ascii_alphabetic() => {
                let rest = chars.as_str();
                !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        };
        if !valid {
            return Err(Error::invalid(format!("'{}' is not an interface id", s)));
        }

        Ok(InterfaceId::Port(s.to_ascii_uppercase()))
    }
}

/// Check an interface friendly name against the device's naming rules.
pub fn validate_interface_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(Error::invalid(format!(
            "interface name '{}' must be 1-{} characters",
            name, MAX_INTERFACE_NAME_LEN
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ')))
    {
        return Err(Error::invalid(format!(
            "interface name '{}' contains illegal character '{}'",
            name, c
        )));
    }
    Ok(())
}

/// Administrative state of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminState {
    Up,
    Down,
}

impl AdminState {
    /// State for an `enabled` flag.
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { AdminState::Up } else { AdminState::Down }
    }

    pub fn is_up(self) -> bool {
        self == AdminState::Up
    }
}

/// Link (operational) state of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Up,
    Down,
}

/// Snapshot of one interface.
///
/// This may be stale the instant it is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Interface identifier.
    pub id: InterfaceId,

    /// Friendly name, if configured.
    pub name: Option<String>,

    /// Administrative state.
    pub admin: AdminState,

    /// Link state, when the source reports it.
    pub link: Option<LinkState>,

    /// VLANs carried tagged.
    pub tagged: BTreeSet<VlanId>,

    /// The untagged VLAN (PVID), if any.
    pub untagged: Option<VlanId>,

    /// Configured IP addresses, primary first.
    pub addresses: Vec<IpAssignment>,

    /// Trunk group this port belongs to.
    pub trunk: Option<String>,
}

impl Interface {
    /// Create an administratively up interface with no configuration.
    pub fn new(id: InterfaceId) -> Self {
        Self {
            id,
            name: None,
            admin: AdminState::Up,
            link: None,
            tagged: BTreeSet::new(),
            untagged: None,
            addresses: Vec::new(),
            trunk: None,
        }
    }

    /// Whether mutations on this interface must be refused.
    pub fn is_trunk_member(&self) -> bool {
        self.trunk.is_some() || self.id.is_trunk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interface_ids() {
        assert_eq!("3".parse::<InterfaceId>().unwrap(), InterfaceId::port("3"));
        assert_eq!("a1".parse::<InterfaceId>().unwrap(), InterfaceId::port("A1"));
        assert_eq!("1/1/3".parse::<InterfaceId>().unwrap(), InterfaceId::port("1/1/3"));
        assert_eq!(
            "trk2".parse::<InterfaceId>().unwrap(),
            InterfaceId::Trunk("Trk2".into())
        );
        assert_eq!(
            "vlan-10".parse::<InterfaceId>().unwrap(),
            InterfaceId::Vlan(VlanId::new(10).unwrap())
        );
        assert_eq!(
            "VLAN10".parse::<InterfaceId>().unwrap(),
            InterfaceId::Vlan(VlanId::new(10).unwrap())
        );
        assert!("eth0".parse::<InterfaceId>().is_err());
        assert!("vlan 0".parse::<InterfaceId>().is_err());
    }

    #[test]
    fn test_base_port() {
        assert_eq!(InterfaceId::port("7").base_port(), Some(7));
        assert_eq!(InterfaceId::port("A1").base_port(), Some(1));
        assert_eq!(InterfaceId::port("B3").base_port(), Some(27));
        assert_eq!(InterfaceId::Trunk("Trk1".into()).base_port(), None);
        assert_eq!(InterfaceId::port("B4294967295").base_port(), None);
        assert_eq!(InterfaceId::port("Z4294967295").base_port(), None);
    }

    #[test]
    fn test_numeric_ordering() {
        let mut ids = vec![
            InterfaceId::port("10"),
            InterfaceId::Trunk("Trk1".into()),
            InterfaceId::port("2"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                InterfaceId::port("2"),
                InterfaceId::port("10"),
                InterfaceId::Trunk("Trk1".into())
            ]
        );
    }

    #[test]
    fn test_interface_name_rules() {
        assert!(validate_interface_name("uplink-core").is_ok());
        assert!(validate_interface_name("bad\"name").is_err());
        assert!(validate_interface_name("").is_err());
    }

    #[test]
    fn test_trunk_member_flag() {
        let mut iface = Interface::new(InterfaceId::port("5"));
        assert!(!iface.is_trunk_member());
        iface.trunk = Some("Trk1".into());
        assert!(iface.is_trunk_member());
        assert!(Interface::new(InterfaceId::Trunk("Trk1".into())).is_trunk_member());
    }
}
