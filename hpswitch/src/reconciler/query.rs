//! Read-only queries and their CLI implementations.

use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::model::{
    AdminState, Interface, InterfaceId, IpAssignment, Payload, StaticRoute, Tagging,
    TrunkMembership, Vlan, VlanId,
};
use crate::parser::{self, OutputKind, Parsed};
use crate::session::CliSession;
use crate::transport::CliTransport;

/// What to read from the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Physical ports with state and memberships.
    Interfaces,
    /// One port, with its name and memberships.
    Interface(InterfaceId),
    /// Every VLAN with its members.
    Vlans,
    Vlan(VlanId),
    /// Addresses configured on one interface.
    IpConfig(InterfaceId),
    /// IPv4 addresses of every VLAN interface.
    Addresses,
    Trunks,
    StaticRoutes,
}

impl Query {
    /// Whether the SNMP backend can answer this query.
    pub fn snmp_capable(&self) -> bool {
        matches!(
            self,
            Query::Interfaces
                | Query::Interface(_)
                | Query::Vlans
                | Query::Vlan(_)
                | Query::IpConfig(_)
                | Query::Addresses
                | Query::Trunks
        )
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Interfaces => f.write_str("interfaces"),
            Query::Interface(id) => write!(f, "interface {}", id),
            Query::Vlans => f.write_str("VLANs"),
            Query::Vlan(id) => write!(f, "VLAN {}", id),
            Query::IpConfig(id) => write!(f, "IP configuration of {}", id),
            Query::Addresses => f.write_str("IPv4 addresses"),
            Query::Trunks => f.write_str("trunks"),
            Query::StaticRoutes => f.write_str("static routes"),
        }
    }
}

/// Answer `query` over the CLI.
pub(crate) async fn cli_query<T: CliTransport>(
    session: &mut CliSession<T>,
    query: &Query,
    trunks: &TrunkMembership,
) -> Result<Payload> {
    Ok(match query {
        Query::Interfaces => Payload::Interfaces(interfaces(session, trunks).await?),
        Query::Interface(id) => Payload::Interface(interface(session, id, trunks).await?),
        Query::Vlans => Payload::Vlans(vlans(session).await?),
        Query::Vlan(id) => Payload::Vlan(vlan(session, *id).await?),
        Query::IpConfig(id) => Payload::IpAssignments(ip_config(session, id).await?),
        Query::Addresses => Payload::IpAssignments(addresses(session).await?),
        Query::Trunks => Payload::Trunks(trunk_table(session).await?),
        Query::StaticRoutes => Payload::Routes(static_routes(session).await?),
    })
}

/// Run a show command in the current context and parse its output.
async fn show<T: CliTransport>(
    session: &mut CliSession<T>,
    command: &str,
    kind: OutputKind,
) -> Result<Parsed> {
    let state = session.state();
    let output = session.run(command, &state).await?;
    parser::parse(kind, &output.text())
}

fn mismatch(kind: OutputKind, parsed: &Parsed) -> Error {
    Error::parse(kind.name(), "parser returned another kind", format!("{:?}", parsed))
}

async fn vlans<T: CliTransport>(session: &mut CliSession<T>) -> Result<Vec<Vlan>> {
    let kind = OutputKind::VlanTable;
    let listed = match show(session, "show vlans", kind).await? {
        Parsed::Vlans(vlans) => vlans,
        other => return Err(mismatch(kind, &other)),
    };

    let mut out = Vec::with_capacity(listed.len());
    for summary in listed {
        // Removed between the two commands.
        if let Some(detail) = vlan(session, summary.id).await? {
            out.push(detail);
        }
    }
    Ok(out)
}

async fn vlan<T: CliTransport>(session: &mut CliSession<T>, id: VlanId) -> Result<Option<Vlan>> {
    let kind = OutputKind::VlanDetail;
    match show(session, &format!("show vlans {}", id), kind).await? {
        Parsed::VlanDetail(vlan) => Ok(vlan),
        other => Err(mismatch(kind, &other)),
    }
}

async fn interface_table<T: CliTransport>(
    session: &mut CliSession<T>,
    trunks: &TrunkMembership,
) -> Result<Vec<Interface>> {
    let kind = OutputKind::InterfaceTable;
    let mut ifaces = match show(session, "show interfaces brief", kind).await? {
        Parsed::Interfaces(ifaces) => ifaces,
        other => return Err(mismatch(kind, &other)),
    };
    for iface in &mut ifaces {
        if iface.trunk.is_none() {
            iface.trunk = trunks.trunk_of(&iface.id).map(str::to_string);
        }
    }
    Ok(ifaces)
}

async fn interfaces<T: CliTransport>(
    session: &mut CliSession<T>,
    trunks: &TrunkMembership,
) -> Result<Vec<Interface>> {
    let mut ifaces = interface_table(session, trunks).await?;
    let vlans = vlans(session).await?;
    for iface in &mut ifaces {
        for vlan in &vlans {
            match vlan.membership_of(&iface.id) {
                Some(Tagging::Tagged) => {
                    iface.tagged.insert(vlan.id);
                }
                Some(Tagging::Untagged) => iface.untagged = Some(vlan.id),
                None => {}
            }
        }
    }
    Ok(ifaces)
}

async fn interface<T: CliTransport>(
    session: &mut CliSession<T>,
    id: &InterfaceId,
    trunks: &TrunkMembership,
) -> Result<Option<Interface>> {
    let Some(mut iface) = interface_table(session, trunks)
        .await?
        .into_iter()
        .find(|i| &i.id == id)
    else {
        return Ok(None);
    };

    let kind = OutputKind::RunningConfig;
    let command = format!("show running-config interface {}", id);
    match show(session, &command, kind).await? {
        Parsed::RunningConfig(Some(block)) => {
            iface.name = block.name();
            if block.is_disabled() {
                iface.admin = AdminState::Down;
            }
        }
        Parsed::RunningConfig(None) => {}
        other => return Err(mismatch(kind, &other)),
    }

    if !iface.is_trunk_member() {
        let kind = OutputKind::PortVlans;
        let command = format!("show vlans ports {} detail", id);
        match show(session, &command, kind).await? {
            Parsed::PortVlans(memberships) => {
                for (vlan, tagging) in memberships {
                    match tagging {
                        Tagging::Tagged => {
                            iface.tagged.insert(vlan);
                        }
                        Tagging::Untagged => iface.untagged = Some(vlan),
                    }
                }
            }
            other => return Err(mismatch(kind, &other)),
        }
    }
    Ok(Some(iface))
}

async fn ip_config<T: CliTransport>(
    session: &mut CliSession<T>,
    id: &InterfaceId,
) -> Result<Vec<IpAssignment>> {
    let command = match id {
        InterfaceId::Vlan(vlan) => format!("show running-config vlan {}", vlan),
        other => format!("show running-config interface {}", other),
    };
    let kind = OutputKind::RunningConfig;
    match show(session, &command, kind).await? {
        Parsed::RunningConfig(Some(block)) => block.addresses(id),
        Parsed::RunningConfig(None) => Ok(Vec::new()),
        other => Err(mismatch(kind, &other)),
    }
}

/// `show ip` rows keyed back to VLAN ids through `show vlans`.
async fn addresses<T: CliTransport>(session: &mut CliSession<T>) -> Result<Vec<IpAssignment>> {
    let kind = OutputKind::IpTable;
    let rows = match show(session, "show ip", kind).await? {
        Parsed::IpTable(rows) => rows,
        other => return Err(mismatch(kind, &other)),
    };
    let kind = OutputKind::VlanTable;
    let vlans = match show(session, "show vlans", kind).await? {
        Parsed::Vlans(vlans) => vlans,
        other => return Err(mismatch(kind, &other)),
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(vlan) = vlans.iter().find(|v| v.name == row.vlan_name) else {
            return Err(Error::parse(
                OutputKind::IpTable.name(),
                format!("address on unknown VLAN '{}'", row.vlan_name),
                format!("{:?}", row),
            ));
        };
        let mut assignment =
            IpAssignment::new(InterfaceId::Vlan(vlan.id), row.address, row.prefix_len);
        if row.secondary {
            assignment = assignment.secondary();
        }
        out.push(assignment);
    }
    Ok(out)
}

async fn trunk_table<T: CliTransport>(session: &mut CliSession<T>) -> Result<TrunkMembership> {
    let kind = OutputKind::TrunkTable;
    match show(session, "show trunks", kind).await? {
        Parsed::Trunks(trunks) => Ok(trunks),
        other => Err(mismatch(kind, &other)),
    }
}

/// IPv4 and IPv6 static routes. A switch without IPv6 support rejects the
/// second command; that yields IPv4 routes only.
async fn static_routes<T: CliTransport>(session: &mut CliSession<T>) -> Result<Vec<StaticRoute>> {
    let kind = OutputKind::StaticRoutes;
    let mut routes = match show(session, "show ip route static", kind).await? {
        Parsed::StaticRoutes(routes) => routes,
        other => return Err(mismatch(kind, &other)),
    };
    match show(session, "show ipv6 route static", kind).await {
        Ok(Parsed::StaticRoutes(v6)) => routes.extend(v6),
        Ok(other) => return Err(mismatch(kind, &other)),
        Err(Error::Device { banner, .. }) => debug!("no IPv6 routes: {}", banner),
        Err(e) => return Err(e),
    }
    Ok(routes)
}
