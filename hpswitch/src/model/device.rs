//! Device identity, credentials and capability flags.

use indexmap::IndexMap;
use secrecy::SecretString;

use super::interface::InterfaceId;
use crate::transport::AuthMethod;

/// Login credentials for a switch.
#[derive(Debug)]
pub struct Credentials {
    /// SSH username.
    pub username: String,

    /// SSH authentication method.
    pub auth: AuthMethod,

    /// Password answered at the `enable` prompt, if the switch asks for one.
    pub enable_password: Option<SecretString>,
}

impl Credentials {
    /// Username/password credentials.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            auth: AuthMethod::Password(SecretString::from(password.into())),
            enable_password: None,
        }
    }

    /// Set the enable password.
    pub fn with_enable_password(mut self, password: impl Into<String>) -> Self {
        self.enable_password = Some(SecretString::from(password.into()));
        self
    }
}

/// Switch product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchFamily {
    /// HP ProCurve (the tested reference model).
    #[default]
    ProCurve,

    /// ArubaOS-Switch, the ProCurve successor. Should work, not guaranteed.
    ArubaOsSwitch,
}

/// Firmware-derived behavior differences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quirks {
    /// `ip address` accepts `a/p`; otherwise `a mask` is sent.
    pub cidr_addresses: bool,

    /// Physical ports can carry IP addresses (routed ports).
    pub routed_ports: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            cidr_addresses: true,
            routed_ports: false,
        }
    }
}

/// What the core knows about a device before talking to it.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Product family.
    pub family: SwitchFamily,

    /// Firmware quirks.
    pub quirks: Quirks,

    /// Trunk members declared by the caller, merged with discovered ones.
    pub trunk_members: TrunkMembership,
}

impl Capabilities {
    /// Capabilities for a product family with its default quirks.
    pub fn for_family(family: SwitchFamily) -> Self {
        Self {
            family,
            ..Default::default()
        }
    }
}

/// A switch reachable over SSH (and optionally SNMP).
#[derive(Debug)]
pub struct Device {
    /// Hostname or IP address.
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Login credentials.
    pub credentials: Credentials,

    /// Family and quirks.
    pub capabilities: Capabilities,
}

impl Device {
    /// Create a device on the default SSH port with default capabilities.
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port: 22,
            credentials,
            capabilities: Capabilities::default(),
        }
    }

    /// Set the SSH port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Which ports belong to which trunk group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrunkMembership {
    members: IndexMap<InterfaceId, String>,
}

impl TrunkMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `port` as a member of `trunk`.
    pub fn insert(&mut self, port: InterfaceId, trunk: impl Into<String>) {
        self.members.insert(port, trunk.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_member(mut self, port: InterfaceId, trunk: impl Into<String>) -> Self {
        self.insert(port, trunk);
        self
    }

    /// Trunk group of `port`, if it is a member.
    pub fn trunk_of(&self, port: &InterfaceId) -> Option<&str> {
        self.members.get(port).map(String::as_str)
    }

    /// Whether `port` belongs to a trunk.
    pub fn is_member(&self, port: &InterfaceId) -> bool {
        self.members.contains_key(port)
    }

    /// Add every entry of `other`, overriding existing ones.
    pub fn merge(&mut self, other: &TrunkMembership) {
        for (port, trunk) in &other.members {
            self.members.insert(port.clone(), trunk.clone());
        }
    }

    /// Members grouped by trunk, in discovery order.
    pub fn groups(&self) -> IndexMap<String, Vec<InterfaceId>> {
        let mut groups: IndexMap<String, Vec<InterfaceId>> = IndexMap::new();
        for (port, trunk) in &self.members {
            groups.entry(trunk.clone()).or_default().push(port.clone());
        }
        groups
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InterfaceId, &str)> {
        self.members.iter().map(|(p, t)| (p, t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_membership_merge() {
        let mut discovered = TrunkMembership::new()
            .with_member(InterfaceId::port("5"), "Trk1")
            .with_member(InterfaceId::port("6"), "Trk1");
        let declared = TrunkMembership::new().with_member(InterfaceId::port("9"), "Trk2");

        discovered.merge(&declared);

        assert_eq!(discovered.len(), 3);
        assert_eq!(discovered.trunk_of(&InterfaceId::port("9")), Some("Trk2"));
        assert!(!discovered.is_member(&InterfaceId::port("3")));

        let groups = discovered.groups();
        assert_eq!(groups["Trk1"].len(), 2);
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials::password("manager", "hunter2").with_enable_password("s3cret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cret"));
    }
}
