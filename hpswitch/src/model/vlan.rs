//! 802.1Q VLAN types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::interface::InterfaceId;
use crate::error::{Error, Result};

/// Characters a ProCurve VLAN name may not contain.
const ILLEGAL_VLAN_NAME_CHARS: &[char] = &['"', '\'', '@', '#', '$', '^', '&', '*'];

/// Longest VLAN name accepted by the device.
const MAX_VLAN_NAME_LEN: usize = 32;

/// A validated 802.1Q VLAN identifier (1–4094).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VlanId(u16);

impl VlanId {
    /// Lowest usable VLAN id.
    pub const MIN: u16 = 1;

    /// Highest usable VLAN id (4095 is reserved).
    pub const MAX: u16 = 4094;

    /// The default VLAN every port starts in.
    pub const DEFAULT: VlanId = VlanId(1);

    /// Validate and wrap a VLAN id.
    pub fn new(id: u16) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(Error::invalid(format!(
                "VLAN id {} outside {}-{}",
                id,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// The numeric id.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for VlanId {
    type Error = Error;

    fn try_from(id: u16) -> Result<Self> {
        Self::new(id)
    }
}

impl TryFrom<u32> for VlanId {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        let id = u16::try_from(id).map_err(|_| Error::invalid(format!("VLAN id {} out of range", id)))?;
        Self::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> u16 {
        id.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VlanId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: u16 = s
            .trim()
            .parse()
            .map_err(|_| Error::invalid(format!("'{}' is not a VLAN id", s)))?;
        Self::new(id)
    }
}

/// Check a VLAN name against the device's naming rules.
pub fn validate_vlan_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_VLAN_NAME_LEN {
        return Err(Error::invalid(format!(
            "VLAN name '{}' must be 1-{} characters",
            name, MAX_VLAN_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| ILLEGAL_VLAN_NAME_CHARS.contains(c)) {
        return Err(Error::invalid(format!(
            "VLAN name '{}' contains illegal character '{}'",
            name, c
        )));
    }
    Ok(())
}

/// How an interface carries a VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tagging {
    /// Frames carry an 802.1Q tag.
    Tagged,
    /// Frames leave untagged; the VLAN is the port's PVID.
    Untagged,
}

impl Tagging {
    /// CLI keyword for this tagging mode.
    pub fn keyword(self) -> &'static str {
        match self {
            Tagging::Tagged => "tagged",
            Tagging::Untagged => "untagged",
        }
    }
}

impl fmt::Display for Tagging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Snapshot of one VLAN and its member interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vlan {
    /// VLAN id.
    pub id: VlanId,

    /// Configured name.
    pub name: String,

    /// Interfaces carrying the VLAN tagged.
    pub tagged: BTreeSet<InterfaceId>,

    /// Interfaces carrying the VLAN untagged.
    pub untagged: BTreeSet<InterfaceId>,
}

impl Vlan {
    /// Create a VLAN snapshot without members.
    pub fn new(id: VlanId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tagged: BTreeSet::new(),
            untagged: BTreeSet::new(),
        }
    }

    /// How `interface` is a member of this VLAN, if at all.
    pub fn membership_of(&self, interface: &InterfaceId) -> Option<Tagging> {
        if self.tagged.contains(interface) {
            Some(Tagging::Tagged)
        } else if self.untagged.contains(interface) {
            Some(Tagging::Untagged)
        } else {
            None
        }
    }
}

impl fmt::Display for Vlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<InterfaceId>| {
            set.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
        };
        write!(
            f,
            "{{id:{}, name:{:?}, tagged:[{}], untagged:[{}]}}",
            self.id,
            self.name,
            join(&self.tagged),
            join(&self.untagged)
        )
    }
}
