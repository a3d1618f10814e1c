//! Read-back checks after a mutation.

use crate::encoder::Intent;
use crate::error::{Error, Result};
use crate::model::{AdminState, InterfaceId, Payload, Tagging, Vlan};

use super::query::Query;

/// The query whose answer shows whether `intent` took effect.
pub(crate) fn readback_query(intent: &Intent) -> Query {
    match intent {
        Intent::CreateVlan { id, .. }
        | Intent::DeleteVlan { id }
        | Intent::RenameVlan { id, .. } => Query::Vlan(*id),
        Intent::TagVlan { vlan, .. }
        | Intent::UntagVlan { vlan, .. }
        | Intent::RemoveVlanMember { vlan, .. } => Query::Vlan(*vlan),
        Intent::SetIpAssignment(a) | Intent::ClearIpAssignment(a) => {
            Query::IpConfig(a.interface.clone())
        }
        Intent::SetInterfaceName { interface, .. }
        | Intent::ClearInterfaceName { interface }
        | Intent::SetInterfaceEnabled { interface, .. } => Query::Interface(interface.clone()),
        Intent::AddStaticRoute(_) | Intent::RemoveStaticRoute(_) => Query::StaticRoutes,
    }
}

/// Compare the read-back `observed` with what `intent` asked for.
pub(crate) fn verify(intent: &Intent, observed: &Payload) -> Result<()> {
    let (entity, expected, ok) = match (intent, observed) {
        (Intent::CreateVlan { id, name } | Intent::RenameVlan { id, name }, Payload::Vlan(vlan)) => (
            format!("VLAN {}", id),
            format!("name {:?}", name),
            vlan.as_ref().is_some_and(|v| &v.name == name),
        ),
        (Intent::DeleteVlan { id }, Payload::Vlan(vlan)) => {
            (format!("VLAN {}", id), "absent".to_string(), vlan.is_none())
        }
        (Intent::TagVlan { interface, vlan: id }, Payload::Vlan(vlan)) => (
            format!("VLAN {}", id),
            format!("{} tagged", interface),
            member(vlan.as_ref(), interface) == Some(Tagging::Tagged),
        ),
        (Intent::UntagVlan { interface, vlan: id }, Payload::Vlan(vlan)) => (
            format!("VLAN {}", id),
            format!("{} untagged", interface),
            member(vlan.as_ref(), interface) == Some(Tagging::Untagged),
        ),
        (
            Intent::RemoveVlanMember {
                interface,
                vlan: id,
                ..
            },
            Payload::Vlan(vlan),
        ) => (
            format!("VLAN {}", id),
            format!("{} not a member", interface),
            member(vlan.as_ref(), interface).is_none(),
        ),
        (Intent::SetIpAssignment(a), Payload::IpAssignments(found)) => (
            a.interface.to_string(),
            format!("{} present", a.cidr()),
            found.iter().any(|f| f.same_address(a)),
        ),
        (Intent::ClearIpAssignment(a), Payload::IpAssignments(found)) => (
            a.interface.to_string(),
            format!("{} absent", a.cidr()),
            !found.iter().any(|f| f.same_address(a)),
        ),
        (Intent::SetInterfaceName { interface, name }, Payload::Interface(iface)) => (
            interface.to_string(),
            format!("name {:?}", name),
            iface
                .as_ref()
                .is_some_and(|i| i.name.as_deref() == Some(name.as_str())),
        ),
        (Intent::ClearInterfaceName { interface }, Payload::Interface(iface)) => (
            interface.to_string(),
            "no name".to_string(),
            iface.as_ref().is_some_and(|i| i.name.is_none()),
        ),
        (Intent::SetInterfaceEnabled { interface, enabled }, Payload::Interface(iface)) => (
            interface.to_string(),
            format!("admin {:?}", AdminState::from_enabled(*enabled)),
            iface
                .as_ref()
                .is_some_and(|i| i.admin == AdminState::from_enabled(*enabled)),
        ),
        (Intent::AddStaticRoute(route), Payload::Routes(routes)) => (
            "static routes".to_string(),
            format!("{} present", route),
            routes.contains(route),
        ),
        (Intent::RemoveStaticRoute(route), Payload::Routes(routes)) => (
            "static routes".to_string(),
            format!("{} absent", route),
            !routes.contains(route),
        ),
        (intent, observed) => {
            return Err(Error::Verification {
                entity: intent.to_string(),
                expected: format!("{}", readback_query(intent)),
                observed: format!("{:?}", observed),
            });
        }
    };

    if ok {
        Ok(())
    } else {
        Err(Error::Verification {
            entity,
            expected,
            observed: describe(observed),
        })
    }
}

fn member(vlan: Option<&Vlan>, interface: &InterfaceId) -> Option<Tagging> {
    vlan.and_then(|v| v.membership_of(interface))
}

fn describe(observed: &Payload) -> String {
    match observed {
        Payload::Vlan(Some(vlan)) => vlan.to_string(),
        Payload::Vlan(None) => "absent".to_string(),
        Payload::Interface(Some(iface)) => format!(
            "name {:?}, admin {:?}",
            iface.name.as_deref().unwrap_or(""),
            iface.admin
        ),
        Payload::Interface(None) => "absent".to_string(),
        Payload::IpAssignments(found) => {
            let cidrs: Vec<String> = found.iter().map(|a| a.cidr()).collect();
            format!("[{}]", cidrs.join(", "))
        }
        Payload::Routes(routes) => {
            let routes: Vec<String> = routes.iter().map(|r| r.to_string()).collect();
            format!("[{}]", routes.join(", "))
        }
        other => format!("{:?}", other),
    }
}
