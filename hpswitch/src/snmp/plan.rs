//! SET encodings of intents.

use std::net::IpAddr;

use super::PortList;
use super::oids;
use crate::encoder::{self, Intent};
use crate::error::{Error, Result};
use crate::model::{InterfaceId, IpAssignment, Tagging, TrunkMembership, VlanId};
use crate::transport::{Oid, SnmpValue};

/// Port lists of one VLAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanPorts {
    pub id: VlanId,
    /// `dot1qVlanStaticEgressPorts`.
    pub egress: PortList,
    /// `dot1qVlanStaticUntaggedPorts`.
    pub untagged: PortList,
}

/// Device state a SET plan is computed against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetContext {
    /// The intent's VLAN already has a static row.
    pub vlan_exists: bool,
    /// ifIndex of the intent's interface (the base port for physical ports).
    pub if_index: Option<u32>,
    /// Current `dot1qVlanStaticEgressPorts` of the intent's VLAN.
    pub egress: PortList,
    /// Current `dot1qVlanStaticUntaggedPorts` of the intent's VLAN.
    pub untagged: PortList,
    /// Other VLANs in which the intent's port is currently untagged.
    pub displaced: Vec<VlanPorts>,
    /// Addresses currently configured on the intent's interface.
    pub addresses: Vec<IpAssignment>,
}

/// Bindings for one SET request carrying out `intent`.
///
/// Validation and the trunk check run first, as for CLI plans.
pub fn plan(
    intent: &Intent,
    current: &SetContext,
    trunks: &TrunkMembership,
) -> Result<Vec<(Oid, SnmpValue)>> {
    intent.validate()?;
    encoder::check_trunks(intent, trunks)?;

    let if_index = || {
        current.if_index.ok_or_else(|| {
            Error::invalid(format!(
                "no ifIndex known for {}",
                intent.interface().map(|i| i.to_string()).unwrap_or_default()
            ))
        })
    };

    let bindings = match intent {
        Intent::CreateVlan { id, name } | Intent::RenameVlan { id, name } => {
            let mut bindings = Vec::new();
            if !current.vlan_exists {
                bindings.push((
                    oids::vlan_row_status(*id),
                    SnmpValue::Integer(oids::ROW_CREATE_AND_GO),
                ));
            }
            bindings.push((oids::vlan_name(*id), SnmpValue::string(name.as_str())));
            bindings
        }
        Intent::DeleteVlan { id } => vec![(
            oids::vlan_row_status(*id),
            SnmpValue::Integer(oids::ROW_DESTROY),
        )],
        Intent::TagVlan { interface, vlan }
        | Intent::UntagVlan { interface, vlan }
        | Intent::RemoveVlanMember {
            interface, vlan, ..
        } => {
            if !current.vlan_exists {
                return Err(Error::invalid(format!("VLAN {} does not exist", vlan)));
            }
            let base_port = if_index()?;
            let (member, as_untagged) = match intent {
                Intent::TagVlan { .. } => (true, false),
                Intent::UntagVlan { .. } => (true, true),
                Intent::RemoveVlanMember { tagging, .. } => {
                    check_membership(current, base_port, *tagging, interface, *vlan)?;
                    (false, false)
                }
                _ => (false, false),
            };

            let mut bindings = Vec::new();
            if as_untagged {
                for other in current.displaced.iter().filter(|o| o.id != *vlan) {
                    bindings.extend(port_lists(other, base_port, false, false));
                }
            }
            let target = VlanPorts {
                id: *vlan,
                egress: current.egress.clone(),
                untagged: current.untagged.clone(),
            };
            bindings.extend(port_lists(&target, base_port, member, as_untagged));
            if as_untagged {
                bindings.push((
                    oids::pvid(base_port),
                    SnmpValue::Gauge32(u32::from(vlan.get())),
                ));
            }
            bindings
        }
        Intent::SetIpAssignment(assignment) => {
            check_address_target(assignment, current)?;
            if current.addresses.iter().any(|a| a.same_address(assignment)) {
                return Err(Error::invalid(format!("{} already exists", assignment)));
            }
            if !assignment.secondary {
                if let Some(primary) = current.addresses.iter().find(|a| {
                    a.address.is_ipv4() == assignment.address.is_ipv4() && !a.secondary
                }) {
                    return Err(Error::invalid(format!(
                        "{} already has primary address {}",
                        assignment.interface,
                        primary.cidr()
                    )));
                }
            }
            add_address(if_index()?, &assignment.address, assignment.prefix_len)
        }
        Intent::ClearIpAssignment(assignment) => {
            check_address_target(assignment, current)?;
            if !current.addresses.iter().any(|a| a.same_address(assignment)) {
                return Err(Error::invalid(format!("{} is not configured", assignment)));
            }
            vec![(
                oids::hpicf_ip_address_row_status(if_index()?, &assignment.address),
                SnmpValue::Integer(oids::ROW_DESTROY),
            )]
        }
        Intent::SetInterfaceEnabled { enabled, .. } => {
            let status = if *enabled {
                oids::STATUS_UP
            } else {
                oids::STATUS_DOWN
            };
            vec![(oids::if_admin_status(if_index()?), SnmpValue::Integer(status))]
        }
        Intent::SetInterfaceName { name, .. } => {
            vec![(oids::if_alias(if_index()?), SnmpValue::string(name.as_str()))]
        }
        Intent::ClearInterfaceName { .. } => {
            vec![(oids::if_alias(if_index()?), SnmpValue::string(""))]
        }
        Intent::AddStaticRoute(_) | Intent::RemoveStaticRoute(_) => {
            return Err(Error::unsupported(format!(
                "'{}' has no SNMP encoding",
                intent
            )));
        }
    };
    Ok(bindings)
}

/// `RemoveVlanMember` must name the membership the port actually has.
fn check_membership(
    current: &SetContext,
    base_port: u32,
    tagging: Tagging,
    interface: &InterfaceId,
    vlan: VlanId,
) -> Result<()> {
    let actual = if !current.egress.contains(base_port) {
        None
    } else if current.untagged.contains(base_port) {
        Some(Tagging::Untagged)
    } else {
        Some(Tagging::Tagged)
    };
    if actual == Some(tagging) {
        return Ok(());
    }
    Err(Error::invalid(match actual {
        Some(actual) => format!(
            "{} is {} in VLAN {}, not {}",
            interface, actual, vlan, tagging
        ),
        None => format!("{} is not a member of VLAN {}", interface, vlan),
    }))
}

/// Addresses over SNMP live on existing VLAN interfaces.
fn check_address_target(assignment: &IpAssignment, current: &SetContext) -> Result<()> {
    match assignment.interface {
        InterfaceId::Vlan(_) if current.vlan_exists => Ok(()),
        InterfaceId::Vlan(id) => Err(Error::invalid(format!("VLAN {} does not exist", id))),
        _ => Err(Error::unsupported(format!(
            "addresses on {} are not set over SNMP",
            assignment.interface
        ))),
    }
}

/// Both port lists of `vlan` with `base_port` set as requested.
fn port_lists(vlan: &VlanPorts, base_port: u32, member: bool, untagged: bool) -> [(Oid, SnmpValue); 2] {
    let mut egress = vlan.egress.clone();
    let mut untagged_ports = vlan.untagged.clone();
    egress.set(base_port, member);
    untagged_ports.set(base_port, untagged);
    [
        (
            oids::vlan_egress_ports(vlan.id),
            SnmpValue::OctetString(egress.into_bytes()),
        ),
        (
            oids::vlan_untagged_ports(vlan.id),
            SnmpValue::OctetString(untagged_ports.into_bytes()),
        ),
    ]
}

/// Enable the address family on the interface and create the address row.
fn add_address(if_index: u32, address: &IpAddr, prefix_len: u8) -> Vec<(Oid, SnmpValue)> {
    let mut bindings = match address {
        IpAddr::V4(_) => vec![(
            oids::ipv4_interface_enable_status(if_index),
            SnmpValue::Integer(oids::STATUS_UP),
        )],
        IpAddr::V6(_) => vec![
            (
                oids::hpicf_ipv6_interface_enable_status(if_index),
                SnmpValue::Integer(oids::TRUTH_TRUE),
            ),
            (
                oids::hpicf_ipv6_interface_manual(if_index),
                SnmpValue::Integer(oids::TRUTH_TRUE),
            ),
            (
                oids::ipv6_interface_enable_status(if_index),
                SnmpValue::Integer(oids::STATUS_UP),
            ),
        ],
    };
    bindings.extend([
        (
            oids::hpicf_ip_address_prefix_length(if_index, address),
            SnmpValue::Gauge32(u32::from(prefix_len)),
        ),
        (
            oids::hpicf_ip_address_type(if_index, address),
            SnmpValue::Integer(oids::ADDRESS_UNICAST),
        ),
        (
            oids::hpicf_ip_address_row_status(if_index, address),
            SnmpValue::Integer(oids::ROW_CREATE_AND_GO),
        ),
    ]);
    bindings
}
