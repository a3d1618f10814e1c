//! Domain types exchanged with callers.
//!
//! Everything here is a snapshot of device state at query time (or an
//! intent to change it), never a live handle.

mod device;
mod interface;
mod ip;
mod result;
mod vlan;

pub use device::{Capabilities, Credentials, Device, Quirks, SwitchFamily, TrunkMembership};
pub use interface::{AdminState, Interface, InterfaceId, LinkState, validate_interface_name};
pub use ip::{IpAssignment, StaticRoute, mask_from_prefix, prefix_from_mask};
pub use result::{CommandResult, Failure, Payload};
pub use vlan::{Tagging, Vlan, VlanId, validate_vlan_name};
