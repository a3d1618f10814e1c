//! SNMP backend.
//!
//! Reads VLANs, interfaces and trunks from the standard Q-BRIDGE and IF-MIB
//! tables, IPv4 addresses from RFC1213 `ipAddrTable` and per-interface
//! IPv4/IPv6 addresses from HP-ICF-IPCONFIG `hpicfIpAddressTable`. Executes
//! the intents that have a SET encoding: VLAN rows, port membership
//! bitmaps, admin status, interface aliases and VLAN interface addresses.
//! Static routes stay on the CLI.
//!
//! ProCurve numbers physical ports so that ifIndex equals the bridge base
//! port; `ifDescr` carries the CLI name (`3`, `A1`, `Trk1`, `VLAN10`).

pub mod oids;
mod plan;
mod portlist;

pub use plan::{SetContext, VlanPorts, plan};
pub use portlist::PortList;

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use indexmap::IndexMap;
use log::{debug, trace};

use crate::encoder::{self, Intent};
use crate::error::{Error, Result};
use crate::model::{
    AdminState, Interface, InterfaceId, IpAssignment, LinkState, Tagging, TrunkMembership, Vlan,
    VlanId, prefix_from_mask,
};
use crate::transport::{Oid, SnmpTransport, SnmpValue};

/// ifIndex offset of VLAN interfaces on agents whose `ifDescr` does not
/// name the VLAN.
pub const VLAN_IFINDEX_BASE: u32 = 577;

/// Query and mutate a switch through its SNMP agent.
#[derive(Debug)]
pub struct SnmpBackend<S> {
    transport: S,
}

impl<S: SnmpTransport> SnmpBackend<S> {
    pub fn new(transport: S) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &S {
        &self.transport
    }

    async fn get(&self, oid: &Oid) -> Result<Option<SnmpValue>> {
        let value = self.transport.get(oid).await?;
        trace!("SNMP GET {} -> {:?}", oid, value);
        Ok(value)
    }

    async fn set(&self, bindings: &[(Oid, SnmpValue)]) -> Result<()> {
        for (oid, value) in bindings {
            debug!("SNMP SET {} = {}", oid, value);
        }
        self.transport.set(bindings).await
    }

    async fn required(&self, oid: &Oid, what: &str) -> Result<SnmpValue> {
        self.get(oid)
            .await?
            .ok_or_else(|| snmp_error(oid, None, format!("no {}", what)))
    }

    async fn port_list(&self, oid: &Oid, what: &str) -> Result<PortList> {
        let value = self.required(oid, what).await?;
        value
            .as_bytes()
            .map(PortList::from_bytes)
            .ok_or_else(|| snmp_error(oid, Some(&value), format!("{} is not a PortList", what)))
    }

    /// Map ifIndex to interface id from `ifDescr`.
    pub async fn interface_index(&self) -> Result<IndexMap<u32, InterfaceId>> {
        let root = oids::if_descr_column();
        let mut index = IndexMap::new();
        for (oid, value) in self.transport.walk(&root).await? {
            let Some(&[if_index]) = oid.suffix(&root) else {
                return Err(snmp_error(&oid, Some(&value), "unexpected ifDescr index"));
            };
            let descr = value.as_string().unwrap_or_default();
            match interface_from_descr(&descr) {
                Some(id) => {
                    index.insert(if_index, id);
                }
                None => trace!("ignoring ifIndex {} ({:?})", if_index, descr),
            }
        }
        Ok(index)
    }

    /// All VLANs with their members.
    pub async fn vlans(&self) -> Result<Vec<Vlan>> {
        let index = self.interface_index().await?;
        let root = oids::vlan_row_status_column();

        let mut vlans = Vec::new();
        for (oid, value) in self.transport.walk(&root).await? {
            let Some(&[vid]) = oid.suffix(&root) else {
                return Err(snmp_error(&oid, Some(&value), "unexpected VLAN index"));
            };
            let id = VlanId::try_from(vid)
                .map_err(|e| snmp_error(&oid, Some(&value), e.to_string()))?;
            // Rows destroyed between the walk and the GETs are skipped.
            if let Some(vlan) = self.read_vlan(id, &index).await? {
                vlans.push(vlan);
            }
        }
        Ok(vlans)
    }

    /// One VLAN, `None` if it does not exist.
    pub async fn vlan(&self, id: VlanId) -> Result<Option<Vlan>> {
        let index = self.interface_index().await?;
        self.read_vlan(id, &index).await
    }

    async fn read_vlan(&self, id: VlanId, index: &IndexMap<u32, InterfaceId>) -> Result<Option<Vlan>> {
        if self.get(&oids::vlan_row_status(id)).await?.is_none() {
            return Ok(None);
        }
        let name = self
            .get(&oids::vlan_name(id))
            .await?
            .and_then(|v| v.as_string())
            .unwrap_or_default();
        let egress = self.port_list(&oids::vlan_egress_ports(id), "egress ports").await?;
        let untagged = self
            .port_list(&oids::vlan_untagged_ports(id), "untagged ports")
            .await?;

        let mut vlan = Vlan::new(id, name);
        for base_port in egress.ports() {
            let port = port_for_base(base_port, index);
            if untagged.contains(base_port) {
                vlan.untagged.insert(port);
            } else {
                vlan.tagged.insert(port);
            }
        }
        Ok(Some(vlan))
    }

    /// Physical ports with admin/link state, alias and memberships.
    pub async fn interfaces(&self, trunks: &TrunkMembership) -> Result<Vec<Interface>> {
        let index = self.interface_index().await?;
        let vlans = self.vlans().await?;

        let mut out = Vec::new();
        for (if_index, id) in &index {
            if matches!(id, InterfaceId::Port(_)) {
                out.push(self.read_interface(*if_index, id, &vlans, trunks).await?);
            }
        }
        Ok(out)
    }

    /// One physical port, `None` if the agent does not know it.
    pub async fn interface(
        &self,
        id: &InterfaceId,
        trunks: &TrunkMembership,
    ) -> Result<Option<Interface>> {
        let index = self.interface_index().await?;
        let Some(if_index) = index.iter().find_map(|(i, known)| (known == id).then_some(*i)) else {
            return Ok(None);
        };
        let vlans = self.vlans().await?;
        Ok(Some(self.read_interface(if_index, id, &vlans, trunks).await?))
    }

    async fn read_interface(
        &self,
        if_index: u32,
        id: &InterfaceId,
        vlans: &[Vlan],
        trunks: &TrunkMembership,
    ) -> Result<Interface> {
        let mut iface = Interface::new(id.clone());

        let admin = self.get(&oids::if_admin_status(if_index)).await?;
        iface.admin = AdminState::from_enabled(admin.and_then(|v| v.as_int()) != Some(oids::STATUS_DOWN));
        iface.link = self
            .get(&oids::if_oper_status(if_index))
            .await?
            .and_then(|v| v.as_int())
            .map(|status| {
                if status == oids::STATUS_UP {
                    LinkState::Up
                } else {
                    LinkState::Down
                }
            });
        iface.name = self
            .get(&oids::if_alias(if_index))
            .await?
            .and_then(|v| v.as_string())
            .filter(|alias| !alias.is_empty());

        for vlan in vlans {
            match vlan.membership_of(id) {
                Some(Tagging::Tagged) => {
                    iface.tagged.insert(vlan.id);
                }
                Some(Tagging::Untagged) => iface.untagged = Some(vlan.id),
                None => {}
            }
        }
        iface.trunk = trunks.trunk_of(id).map(str::to_string);
        Ok(iface)
    }

    /// Trunk membership from `ifStackStatus` and `ifType`.
    pub async fn trunks(&self) -> Result<TrunkMembership> {
        let index = self.interface_index().await?;
        let root = oids::if_stack_status_column();

        let mut aggregate: HashMap<u32, bool> = HashMap::new();
        let mut members = TrunkMembership::new();
        for (oid, value) in self.transport.walk(&root).await? {
            let Some(&[higher, lower]) = oid.suffix(&root) else {
                return Err(snmp_error(&oid, Some(&value), "unexpected ifStack index"));
            };
            if higher == 0 || lower == 0 {
                continue;
            }

            let is_aggregate = match aggregate.get(&higher) {
                Some(known) => *known,
                None => {
                    let if_type = self
                        .get(&oids::if_type(higher))
                        .await?
                        .and_then(|v| v.as_int());
                    let known = matches!(
                        if_type,
                        Some(oids::IF_TYPE_LAG) | Some(oids::IF_TYPE_PROP_MULTIPLEXOR)
                    );
                    aggregate.insert(higher, known);
                    known
                }
            };
            if !is_aggregate {
                continue;
            }

            let trunk = index
                .get(&higher)
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("ifIndex {}", higher));
            members.insert(port_for_base(lower, &index), trunk);
        }
        Ok(members)
    }

    /// IPv4 addresses of every interface, from `ipAddrTable`.
    ///
    /// The first address seen on an interface is primary.
    pub async fn addresses(&self) -> Result<Vec<IpAssignment>> {
        let index = self.interface_index().await?;
        let root = oids::ip_ad_ent_if_index_column();

        let mut out: Vec<IpAssignment> = Vec::new();
        for (oid, value) in self.transport.walk(&root).await? {
            let Some(&[a, b, c, d]) = oid.suffix(&root) else {
                return Err(snmp_error(&oid, Some(&value), "unexpected ipAddrTable index"));
            };
            let mut octets = [0u8; 4];
            for (octet, arc) in octets.iter_mut().zip([a, b, c, d]) {
                *octet = u8::try_from(arc)
                    .map_err(|_| snmp_error(&oid, Some(&value), "ipAddrTable index is not an address"))?;
            }
            let if_index = value
                .as_int()
                .and_then(|i| u32::try_from(i).ok())
                .ok_or_else(|| snmp_error(&oid, Some(&value), "ipAdEntIfIndex is not an integer"))?;

            let Some(interface) = interface_for_index(if_index, &index) else {
                trace!("address {:?} on unknown ifIndex {}", octets, if_index);
                continue;
            };

            let mask_oid = oids::ip_ad_ent_net_mask(octets);
            let mask = self.required(&mask_oid, "netmask").await?;
            let prefix_len = mask
                .as_ip()
                .and_then(prefix_from_mask)
                .ok_or_else(|| snmp_error(&mask_oid, Some(&mask), "not a contiguous netmask"))?;

            let mut assignment =
                IpAssignment::new(interface, IpAddr::V4(Ipv4Addr::from(octets)), prefix_len);
            if out.iter().any(|a| a.interface == assignment.interface) {
                assignment = assignment.secondary();
            }
            out.push(assignment);
        }
        Ok(out)
    }

    /// IPv4 and IPv6 addresses of one interface, from `hpicfIpAddressTable`.
    ///
    /// The first address of each family is primary.
    pub async fn ip_config(&self, interface: &InterfaceId) -> Result<Vec<IpAssignment>> {
        let Some(if_index) = self.if_index_of(interface).await? else {
            return Ok(Vec::new());
        };
        let root = oids::hpicf_ip_address_prefix_length_column();

        let mut out: Vec<IpAssignment> = Vec::new();
        for (oid, value) in self.transport.walk(&root.child(if_index)).await? {
            let Some(index) = oid.suffix(&root) else {
                continue;
            };
            let address = hpicf_address(index)
                .ok_or_else(|| snmp_error(&oid, Some(&value), "unexpected hpicfIpAddressTable index"))?;
            let prefix_len = value
                .as_int()
                .and_then(|p| u8::try_from(p).ok())
                .ok_or_else(|| snmp_error(&oid, Some(&value), "prefix length is not an integer"))?;

            let mut assignment = IpAssignment::new(interface.clone(), address, prefix_len);
            if out.iter().any(|a| a.address.is_ipv4() == address.is_ipv4()) {
                assignment = assignment.secondary();
            }
            out.push(assignment);
        }
        Ok(out)
    }

    /// Execute `intent` with one SET request.
    ///
    /// Reads the state the plan depends on (VLAN row, ifIndex, current
    /// port lists, the VLANs a port is untagged in, interface addresses),
    /// then writes. Returns the bindings written.
    pub async fn apply(
        &self,
        intent: &Intent,
        trunks: &TrunkMembership,
    ) -> Result<Vec<(Oid, SnmpValue)>> {
        intent.validate()?;
        encoder::check_trunks(intent, trunks)?;

        let mut current = SetContext::default();
        if let Some(id) = intent.vlan() {
            current.vlan_exists = self.get(&oids::vlan_row_status(id)).await?.is_some();
            let membership = matches!(
                intent,
                Intent::TagVlan { .. } | Intent::UntagVlan { .. } | Intent::RemoveVlanMember { .. }
            );
            if membership && current.vlan_exists {
                current.egress = self.port_list(&oids::vlan_egress_ports(id), "egress ports").await?;
                current.untagged = self
                    .port_list(&oids::vlan_untagged_ports(id), "untagged ports")
                    .await?;
            }
        }
        if let Some(interface) = intent.interface() {
            current.if_index = self.if_index_of(interface).await?;
        }
        if let (Intent::UntagVlan { vlan, .. }, Some(base_port)) = (intent, current.if_index) {
            current.displaced = self.untagged_elsewhere(base_port, *vlan).await?;
        }
        if let Intent::SetIpAssignment(a) | Intent::ClearIpAssignment(a) = intent {
            current.addresses = self.ip_config(&a.interface).await?;
        }

        let bindings = plan(intent, &current, trunks)?;
        self.set(&bindings).await?;
        Ok(bindings)
    }

    /// VLANs other than `vlan` whose untagged list holds `base_port`.
    async fn untagged_elsewhere(&self, base_port: u32, vlan: VlanId) -> Result<Vec<VlanPorts>> {
        let root = oids::vlan_untagged_ports_column();
        let mut out = Vec::new();
        for (oid, value) in self.transport.walk(&root).await? {
            let Some(&[vid]) = oid.suffix(&root) else {
                return Err(snmp_error(&oid, Some(&value), "unexpected VLAN index"));
            };
            let id = VlanId::try_from(vid)
                .map_err(|e| snmp_error(&oid, Some(&value), e.to_string()))?;
            let untagged = value
                .as_bytes()
                .map(PortList::from_bytes)
                .ok_or_else(|| snmp_error(&oid, Some(&value), "untagged ports is not a PortList"))?;
            if id == vlan || !untagged.contains(base_port) {
                continue;
            }
            let egress = self.port_list(&oids::vlan_egress_ports(id), "egress ports").await?;
            out.push(VlanPorts {
                id,
                egress,
                untagged,
            });
        }
        Ok(out)
    }

    async fn if_index_of(&self, interface: &InterfaceId) -> Result<Option<u32>> {
        let index = self.interface_index().await?;
        let known = index.iter().find_map(|(i, id)| (id == interface).then_some(*i));
        Ok(known.or_else(|| match interface {
            InterfaceId::Vlan(id) => VLAN_IFINDEX_BASE.checked_add(u32::from(id.get())),
            _ => interface.base_port(),
        }))
    }
}

fn snmp_error(oid: &Oid, value: Option<&SnmpValue>, message: impl Into<String>) -> Error {
    Error::Snmp {
        oid: oid.to_string(),
        value: value.map(|v| v.to_string()),
        message: message.into(),
    }
}

fn interface_from_descr(descr: &str) -> Option<InterfaceId> {
    if descr.eq_ignore_ascii_case("DEFAULT_VLAN") {
        return Some(InterfaceId::Vlan(VlanId::DEFAULT));
    }
    descr.parse().ok()
}

/// Address from an `hpicfIpAddressTable` index after the ifIndex:
/// address type, length and octets.
fn hpicf_address(index: &[u32]) -> Option<IpAddr> {
    let (&[_, family, len], octets) = index.split_first_chunk::<3>()?;
    if usize::try_from(len).ok()? != octets.len() {
        return None;
    }
    let octets: Vec<u8> = octets
        .iter()
        .map(|arc| u8::try_from(*arc).ok())
        .collect::<Option<_>>()?;
    match family {
        oids::INET_IPV4 => <[u8; 4]>::try_from(octets).ok().map(|o| IpAddr::V4(Ipv4Addr::from(o))),
        oids::INET_IPV6 => <[u8; 16]>::try_from(octets).ok().map(|o| IpAddr::V6(Ipv6Addr::from(o))),
        _ => None,
    }
}

fn port_for_base(base_port: u32, index: &IndexMap<u32, InterfaceId>) -> InterfaceId {
    index
        .get(&base_port)
        .cloned()
        .unwrap_or_else(|| InterfaceId::from_base_port(base_port))
}

fn interface_for_index(if_index: u32, index: &IndexMap<u32, InterfaceId>) -> Option<InterfaceId> {
    if let Some(id) = index.get(&if_index) {
        return Some(id.clone());
    }
    let vid = if_index.checked_sub(VLAN_IFINDEX_BASE)?;
    VlanId::try_from(vid).ok().map(InterfaceId::Vlan)
}
