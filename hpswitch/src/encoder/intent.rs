//! Configuration intents.

use std::fmt;

use crate::error::{Error, Result};
use crate::model::{
    InterfaceId, IpAssignment, StaticRoute, Tagging, VlanId, validate_interface_name,
    validate_vlan_name,
};

/// A requested change to switch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateVlan { id: VlanId, name: String },
    DeleteVlan { id: VlanId },
    RenameVlan { id: VlanId, name: String },
    TagVlan { interface: InterfaceId, vlan: VlanId },
    UntagVlan { interface: InterfaceId, vlan: VlanId },
    RemoveVlanMember {
        interface: InterfaceId,
        vlan: VlanId,
        tagging: Tagging,
    },
    SetIpAssignment(IpAssignment),
    ClearIpAssignment(IpAssignment),
    SetInterfaceName { interface: InterfaceId, name: String },
    ClearInterfaceName { interface: InterfaceId },
    SetInterfaceEnabled { interface: InterfaceId, enabled: bool },
    AddStaticRoute(StaticRoute),
    RemoveStaticRoute(StaticRoute),
}

impl Intent {
    /// Check every caller-supplied value. Nothing is sent on failure.
    pub fn validate(&self) -> Result<()> {
        match self {
            Intent::CreateVlan { name, .. } | Intent::RenameVlan { name, .. } => {
                validate_vlan_name(name)
            }
            Intent::DeleteVlan { .. } => Ok(()),
            Intent::TagVlan { interface, .. }
            | Intent::UntagVlan { interface, .. }
            | Intent::RemoveVlanMember { interface, .. } => require_port(interface, "VLAN membership"),
            Intent::SetIpAssignment(assignment) | Intent::ClearIpAssignment(assignment) => {
                assignment.validate()
            }
            Intent::SetInterfaceName { interface, name } => {
                require_port(interface, "interface names")?;
                validate_interface_name(name)
            }
            Intent::ClearInterfaceName { interface } => require_port(interface, "interface names"),
            Intent::SetInterfaceEnabled { interface, .. } => {
                require_port(interface, "admin status")
            }
            Intent::AddStaticRoute(route) | Intent::RemoveStaticRoute(route) => route.validate(),
        }
    }

    /// The interface this intent mutates, if any.
    pub fn interface(&self) -> Option<&InterfaceId> {
        match self {
            Intent::TagVlan { interface, .. }
            | Intent::UntagVlan { interface, .. }
            | Intent::RemoveVlanMember { interface, .. }
            | Intent::SetInterfaceName { interface, .. }
            | Intent::ClearInterfaceName { interface }
            | Intent::SetInterfaceEnabled { interface, .. } => Some(interface),
            Intent::SetIpAssignment(a) | Intent::ClearIpAssignment(a) => Some(&a.interface),
            _ => None,
        }
    }

    /// The VLAN this intent touches, if any.
    pub fn vlan(&self) -> Option<VlanId> {
        match self {
            Intent::CreateVlan { id, .. }
            | Intent::DeleteVlan { id }
            | Intent::RenameVlan { id, .. } => Some(*id),
            Intent::TagVlan { vlan, .. }
            | Intent::UntagVlan { vlan, .. }
            | Intent::RemoveVlanMember { vlan, .. } => Some(*vlan),
            Intent::SetIpAssignment(a) | Intent::ClearIpAssignment(a) => match a.interface {
                InterfaceId::Vlan(id) => Some(id),
                _ => None,
            },
            _ => None,
        }
    }
}

fn require_port(interface: &InterfaceId, what: &str) -> Result<()> {
    match interface {
        InterfaceId::Vlan(id) => Err(Error::invalid(format!(
            "{} cannot be set on the routed interface of VLAN {}",
            what, id
        ))),
        _ => Ok(()),
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::CreateVlan { id, name } => write!(f, "create VLAN {} '{}'", id, name),
            Intent::DeleteVlan { id } => write!(f, "delete VLAN {}", id),
            Intent::RenameVlan { id, name } => write!(f, "rename VLAN {} to '{}'", id, name),
            Intent::TagVlan { interface, vlan } => write!(f, "tag VLAN {} on {}", vlan, interface),
            Intent::UntagVlan { interface, vlan } => {
                write!(f, "untag VLAN {} on {}", vlan, interface)
            }
            Intent::RemoveVlanMember {
                interface,
                vlan,
                tagging,
            } => write!(f, "remove {} from VLAN {} ({})", interface, vlan, tagging.keyword()),
            Intent::SetIpAssignment(a) => write!(f, "assign {}", a),
            Intent::ClearIpAssignment(a) => write!(f, "remove {}", a),
            Intent::SetInterfaceName { interface, name } => {
                write!(f, "name {} '{}'", interface, name)
            }
            Intent::ClearInterfaceName { interface } => write!(f, "clear name of {}", interface),
            Intent::SetInterfaceEnabled { interface, enabled } => write!(
                f,
                "{} {}",
                if *enabled { "enable" } else { "disable" },
                interface
            ),
            Intent::AddStaticRoute(route) => write!(f, "add route {}", route),
            Intent::RemoveStaticRoute(route) => write!(f, "remove route {}", route),
        }
    }
}
