//! Standard MIB objects used against ProCurve agents.

use std::net::IpAddr;

use crate::model::VlanId;
use crate::transport::Oid;

// Q-BRIDGE-MIB dot1qVlanStaticEntry
const DOT1Q_VLAN_STATIC_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1];
const DOT1Q_VLAN_STATIC_NAME: u32 = 1;
const DOT1Q_VLAN_STATIC_EGRESS_PORTS: u32 = 2;
const DOT1Q_VLAN_STATIC_UNTAGGED_PORTS: u32 = 4;
const DOT1Q_VLAN_STATIC_ROW_STATUS: u32 = 5;

// Q-BRIDGE-MIB dot1qPortVlanEntry
const DOT1Q_PVID: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 5, 1, 1];

// IF-MIB ifEntry / ifXEntry / ifStackEntry
const IF_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1];
const IF_DESCR: u32 = 2;
const IF_TYPE: u32 = 3;
const IF_ADMIN_STATUS: u32 = 7;
const IF_OPER_STATUS: u32 = 8;
const IF_ALIAS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];
const IF_STACK_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 2, 1, 3];

// RFC1213-MIB ipAddrEntry
const IP_AD_ENT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 2];
const IP_AD_ENT_NET_MASK: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 3];

// IP-MIB ipv4InterfaceEntry / ipv6InterfaceEntry
const IPV4_INTERFACE_ENABLE_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 28, 1, 3];
const IPV6_INTERFACE_ENABLE_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 30, 1, 5];

// HP-ICF-IPCONFIG hpicfIpAddressEntry, indexed by ifIndex, address type,
// address length and address octets.
const HPICF_IP_ADDRESS_ENTRY: &[u32] = &[1, 3, 6, 1, 4, 1, 11, 2, 14, 11, 1, 10, 3, 1, 1, 1];
const HPICF_IP_ADDRESS_PREFIX_LENGTH: u32 = 3;
const HPICF_IP_ADDRESS_TYPE: u32 = 4;
const HPICF_IP_ADDRESS_ROW_STATUS: u32 = 5;

// HP-ICF-IPCONFIG hpicfIpv6InterfaceEntry
const HPICF_IPV6_INTERFACE_ENTRY: &[u32] = &[1, 3, 6, 1, 4, 1, 11, 2, 14, 11, 1, 10, 3, 2, 1, 1];
const HPICF_IPV6_INTERFACE_MANUAL: u32 = 2;
const HPICF_IPV6_INTERFACE_CFG_ENABLE_STATUS: u32 = 6;

/// RowStatus values.
pub const ROW_ACTIVE: i64 = 1;
pub const ROW_CREATE_AND_GO: i64 = 4;
pub const ROW_DESTROY: i64 = 6;

/// ifAdminStatus / ifOperStatus `up`; `down` is 2.
pub const STATUS_UP: i64 = 1;
pub const STATUS_DOWN: i64 = 2;

/// TruthValue `true`.
pub const TRUTH_TRUE: i64 = 1;

/// InetAddressType values.
pub const INET_IPV4: u32 = 1;
pub const INET_IPV6: u32 = 2;

/// hpicfIpAddressType `unicast`.
pub const ADDRESS_UNICAST: i64 = 1;

/// ifType values of link aggregates.
pub const IF_TYPE_LAG: i64 = 161;
pub const IF_TYPE_PROP_MULTIPLEXOR: i64 = 54;

fn vlan_column(column: u32) -> Oid {
    Oid::from_slice(DOT1Q_VLAN_STATIC_ENTRY).child(column)
}

fn if_column(column: u32) -> Oid {
    Oid::from_slice(IF_ENTRY).child(column)
}

pub fn vlan_row_status_column() -> Oid {
    vlan_column(DOT1Q_VLAN_STATIC_ROW_STATUS)
}

pub fn vlan_row_status(id: VlanId) -> Oid {
    vlan_row_status_column().child(u32::from(id.get()))
}

pub fn vlan_name(id: VlanId) -> Oid {
    vlan_column(DOT1Q_VLAN_STATIC_NAME).child(u32::from(id.get()))
}

pub fn vlan_egress_ports(id: VlanId) -> Oid {
    vlan_column(DOT1Q_VLAN_STATIC_EGRESS_PORTS).child(u32::from(id.get()))
}

pub fn vlan_untagged_ports(id: VlanId) -> Oid {
    vlan_column(DOT1Q_VLAN_STATIC_UNTAGGED_PORTS).child(u32::from(id.get()))
}

pub fn pvid(base_port: u32) -> Oid {
    Oid::from_slice(DOT1Q_PVID).child(base_port)
}

pub fn if_descr_column() -> Oid {
    if_column(IF_DESCR)
}

pub fn if_type(if_index: u32) -> Oid {
    if_column(IF_TYPE).child(if_index)
}

pub fn if_admin_status(if_index: u32) -> Oid {
    if_column(IF_ADMIN_STATUS).child(if_index)
}

pub fn if_oper_status(if_index: u32) -> Oid {
    if_column(IF_OPER_STATUS).child(if_index)
}

pub fn if_alias(if_index: u32) -> Oid {
    Oid::from_slice(IF_ALIAS).child(if_index)
}

pub fn if_stack_status_column() -> Oid {
    Oid::from_slice(IF_STACK_STATUS)
}

pub fn ip_ad_ent_if_index_column() -> Oid {
    Oid::from_slice(IP_AD_ENT_IF_INDEX)
}

pub fn ip_ad_ent_net_mask(address: [u8; 4]) -> Oid {
    Oid::from_slice(IP_AD_ENT_NET_MASK).extend(&address.map(u32::from))
}

pub fn ipv4_interface_enable_status(if_index: u32) -> Oid {
    Oid::from_slice(IPV4_INTERFACE_ENABLE_STATUS).child(if_index)
}

pub fn ipv6_interface_enable_status(if_index: u32) -> Oid {
    Oid::from_slice(IPV6_INTERFACE_ENABLE_STATUS).child(if_index)
}

pub fn hpicf_ipv6_interface_manual(if_index: u32) -> Oid {
    Oid::from_slice(HPICF_IPV6_INTERFACE_ENTRY)
        .child(HPICF_IPV6_INTERFACE_MANUAL)
        .child(if_index)
}

pub fn hpicf_ipv6_interface_enable_status(if_index: u32) -> Oid {
    Oid::from_slice(HPICF_IPV6_INTERFACE_ENTRY)
        .child(HPICF_IPV6_INTERFACE_CFG_ENABLE_STATUS)
        .child(if_index)
}

pub fn hpicf_ip_address_prefix_length_column() -> Oid {
    Oid::from_slice(HPICF_IP_ADDRESS_ENTRY).child(HPICF_IP_ADDRESS_PREFIX_LENGTH)
}

pub fn hpicf_ip_address_type_column() -> Oid {
    Oid::from_slice(HPICF_IP_ADDRESS_ENTRY).child(HPICF_IP_ADDRESS_TYPE)
}

pub fn hpicf_ip_address_row_status_column() -> Oid {
    Oid::from_slice(HPICF_IP_ADDRESS_ENTRY).child(HPICF_IP_ADDRESS_ROW_STATUS)
}

/// Row index of an address in `hpicfIpAddressTable`.
pub fn hpicf_ip_address_index(if_index: u32, address: &IpAddr) -> Vec<u32> {
    let (family, octets) = match address {
        IpAddr::V4(v4) => (INET_IPV4, v4.octets().to_vec()),
        IpAddr::V6(v6) => (INET_IPV6, v6.octets().to_vec()),
    };
    let mut index = vec![if_index, family, octets.len() as u32];
    index.extend(octets.into_iter().map(u32::from));
    index
}

pub fn hpicf_ip_address_prefix_length(if_index: u32, address: &IpAddr) -> Oid {
    hpicf_ip_address_prefix_length_column().extend(&hpicf_ip_address_index(if_index, address))
}

pub fn hpicf_ip_address_type(if_index: u32, address: &IpAddr) -> Oid {
    hpicf_ip_address_type_column().extend(&hpicf_ip_address_index(if_index, address))
}

pub fn hpicf_ip_address_row_status(if_index: u32, address: &IpAddr) -> Oid {
    hpicf_ip_address_row_status_column().extend(&hpicf_ip_address_index(if_index, address))
}

pub fn vlan_untagged_ports_column() -> Oid {
    vlan_column(DOT1Q_VLAN_STATIC_UNTAGGED_PORTS)
}
