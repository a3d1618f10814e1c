//! Q-BRIDGE `PortList` bitmaps.
//!
//! Each octet covers eight base ports; the most significant bit of the
//! first octet is base port 1.

use std::fmt;

/// A `PortList` octet string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList(Vec<u8>);

impl PortList {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        PortList(bytes.to_vec())
    }

    fn position(base_port: u32) -> Option<(usize, u8)> {
        let index = base_port.checked_sub(1)?;
        let byte = usize::try_from(index / 8).ok()?;
        Some((byte, 7 - (index % 8) as u8))
    }

    pub fn contains(&self, base_port: u32) -> bool {
        match Self::position(base_port) {
            Some((byte, bit)) => self.0.get(byte).is_some_and(|b| b & (1 << bit) != 0),
            None => false,
        }
    }

    /// Set or clear `base_port`, growing the list as needed.
    pub fn set(&mut self, base_port: u32, member: bool) {
        let Some((byte, bit)) = Self::position(base_port) else {
            return;
        };
        if byte >= self.0.len() {
            if !member {
                return;
            }
            self.0.resize(byte + 1, 0);
        }
        if member {
            self.0[byte] |= 1 << bit;
        } else {
            self.0[byte] &= !(1 << bit);
        }
    }

    /// Base ports in the list, ascending.
    pub fn ports(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().enumerate().flat_map(|(i, byte)| {
            (0..8u32)
                .filter(move |bit| byte & (0x80 >> bit) != 0)
                .map(move |bit| i as u32 * 8 + bit + 1)
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ports: Vec<String> = self.ports().map(|p| p.to_string()).collect();
        write!(f, "[{}]", ports.join(","))
    }
}
