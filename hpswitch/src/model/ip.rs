//! IP addressing and static routes.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use super::interface::InterfaceId;
use crate::error::{Error, Result};

/// An IP address assigned to an interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpAssignment {
    /// Interface carrying the address.
    pub interface: InterfaceId,

    /// The address.
    pub address: IpAddr,

    /// Prefix length (≤32 for IPv4, ≤128 for IPv6).
    pub prefix_len: u8,

    /// Whether this is an additional (non-primary) address.
    pub secondary: bool,
}

impl IpAssignment {
    /// Create a primary address assignment.
    pub fn new(interface: InterfaceId, address: IpAddr, prefix_len: u8) -> Self {
        Self {
            interface,
            address,
            prefix_len,
            secondary: false,
        }
    }

    /// Mark the assignment as secondary.
    pub fn secondary(mut self) -> Self {
        self.secondary = true;
        self
    }

    /// Validate address and prefix before anything is sent to the device.
    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.address, self.prefix_len)?;
        if self.address.is_unspecified() || self.address.is_multicast() {
            return Err(Error::invalid(format!(
                "{} cannot be assigned to an interface",
                self.address
            )));
        }
        Ok(())
    }

    /// Address in `a/p` notation.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix_len)
    }

    /// Whether this and `other` are the same address on the same interface.
    pub fn same_address(&self, other: &IpAssignment) -> bool {
        self.interface == other.interface
            && self.address == other.address
            && self.prefix_len == other.prefix_len
    }
}

impl fmt::Display for IpAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.cidr(), self.interface)?;
        if self.secondary {
            f.write_str(" (secondary)")?;
        }
        Ok(())
    }
}

/// A static route: destination network via a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticRoute {
    /// Destination network address.
    pub destination: IpAddr,

    /// Destination prefix length.
    pub prefix_len: u8,

    /// Next-hop gateway.
    pub gateway: IpAddr,
}

impl StaticRoute {
    pub fn new(destination: IpAddr, prefix_len: u8, gateway: IpAddr) -> Self {
        Self {
            destination,
            prefix_len,
            gateway,
        }
    }

    /// Destination and gateway must be of the same family.
    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.destination, self.prefix_len)?;
        if self.destination.is_ipv4() != self.gateway.is_ipv4() {
            return Err(Error::invalid(format!(
                "route {} mixes address families",
                self
            )));
        }
        Ok(())
    }

    /// Destination in `a/p` notation.
    pub fn destination_cidr(&self) -> String {
        format!("{}/{}", self.destination, self.prefix_len)
    }
}

impl fmt::Display for StaticRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.destination_cidr(), self.gateway)
    }
}

fn validate_prefix(address: &IpAddr, prefix_len: u8) -> Result<()> {
    let max = if address.is_ipv4() { 32 } else { 128 };
    if prefix_len > max {
        return Err(Error::invalid(format!(
            "prefix length {} exceeds {} for {}",
            prefix_len, max, address
        )));
    }
    Ok(())
}

/// Prefix length of a contiguous IPv4 netmask.
pub fn prefix_from_mask(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) != 0 {
        return None;
    }
    u8::try_from(ones).ok()
}

/// IPv4 netmask for a prefix length (clamped to 32).
pub fn mask_from_prefix(prefix_len: u8) -> Ipv4Addr {
    let prefix_len = u32::from(prefix_len.min(32));
    let bits = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
    Ipv4Addr::from(bits)
}
