//! `show ip` and static route tables.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;

use regex::Regex;

use super::{OutputKind, table_rows};
use crate::error::{Error, Result};
use crate::model::{StaticRoute, prefix_from_mask};

static IP_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.*?)\s*\|\s*(\S+)(?:\s+(\d+\.\d+\.\d+\.\d+)\s+(\d+\.\d+\.\d+\.\d+))?")
        .expect("invalid IP table grammar")
});

static ROUTE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)/(\d{1,3})\s+(\S+)").expect("invalid route table grammar")
});

static ROUTE_DEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Dest(?:ination)?\s*:\s*(\S+)/(\d{1,3})").expect("invalid route grammar")
});

static ROUTE_GATEWAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Gateway\s*:\s*(\S+)").expect("invalid route grammar")
});

/// One address row of `show ip`, keyed by VLAN name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpTableRow {
    pub vlan_name: String,
    pub address: IpAddr,
    pub prefix_len: u8,
    /// Continuation row below the VLAN's first address.
    pub secondary: bool,
}

/// Parse the address table of `show ip`.
///
/// VLANs without an address (`Disabled`) produce no row.
///
/// ```text
///   VLAN                | IP Config  IP Address      Subnet Mask     Std Local
///   ------------------- + ---------- --------------- --------------- --- -----
///   DEFAULT_VLAN        | DHCP/Bootp 10.0.0.20       255.255.255.0   No  No
///   eng                 | Manual     10.1.0.1        255.255.255.0   No  No
///                       | Manual     10.1.1.1        255.255.255.0   No  No
///   guest               | Disabled
/// ```
pub fn parse_ip_table(raw: &str) -> Result<Vec<IpTableRow>> {
    let kind = OutputKind::IpTable;
    let mut rows = Vec::new();
    let mut current: Option<String> = None;
    for line in table_rows(kind, raw, &["VLAN", "IP Address"])? {
        let caps = IP_ROW
            .captures(line)
            .ok_or_else(|| Error::parse(kind.name(), format!("bad row '{}'", line), raw))?;

        let continuation = caps[1].is_empty();
        if !continuation {
            current = Some(caps[1].to_string());
        }
        let vlan_name = current
            .clone()
            .ok_or_else(|| Error::parse(kind.name(), "continuation row without VLAN", raw))?;

        let (Some(address), Some(mask)) = (caps.get(3), caps.get(4)) else {
            if caps[2].eq_ignore_ascii_case("disabled") {
                continue;
            }
            return Err(Error::parse(kind.name(), format!("no address in '{}'", line), raw));
        };
        let address: Ipv4Addr = address
            .as_str()
            .parse()
            .map_err(|_| Error::parse(kind.name(), format!("bad address in '{}'", line), raw))?;
        let prefix_len = mask
            .as_str()
            .parse()
            .ok()
            .and_then(prefix_from_mask)
            .ok_or_else(|| Error::parse(kind.name(), format!("bad mask in '{}'", line), raw))?;

        rows.push(IpTableRow {
            vlan_name,
            address: IpAddr::V4(address),
            prefix_len,
            secondary: continuation,
        });
    }
    Ok(rows)
}

/// Parse `show ip route static` or `show ipv6 route static`.
///
/// IPv4 output is a table; IPv6 output is a list of `Dest :` /
/// `Gateway :` pairs. `reject` and `blackhole` routes have no gateway
/// and are skipped.
///
/// ```text
///   Destination        Gateway         VLAN Type      Sub-Type   Metric     Dist.
///   ------------------ --------------- ---- --------- ---------- ---------- -----
///   0.0.0.0/0          10.0.0.254      1    static               1          1
/// ```
pub fn parse_static_routes(raw: &str) -> Result<Vec<StaticRoute>> {
    if raw.contains("IPv6 Route Entries") {
        return parse_route_pairs(raw);
    }

    let kind = OutputKind::StaticRoutes;
    let mut routes = Vec::new();
    for line in table_rows(kind, raw, &["Destination", "Gateway"])? {
        let caps = ROUTE_ROW
            .captures(line)
            .ok_or_else(|| Error::parse(kind.name(), format!("bad row '{}'", line), raw))?;
        if let Some(route) = route(kind, raw, &caps[1], &caps[2], &caps[3])? {
            routes.push(route);
        }
    }
    Ok(routes)
}

fn parse_route_pairs(raw: &str) -> Result<Vec<StaticRoute>> {
    let kind = OutputKind::StaticRoutes;
    let mut routes = Vec::new();
    let mut pending: Option<(String, String)> = None;
    for line in raw.lines() {
        if let Some(caps) = ROUTE_DEST.captures(line) {
            if pending.is_some() {
                return Err(Error::parse(kind.name(), "destination without gateway", raw));
            }
            pending = Some((caps[1].to_string(), caps[2].to_string()));
        } else if let Some(caps) = ROUTE_GATEWAY.captures(line) {
            let (destination, prefix) = pending
                .take()
                .ok_or_else(|| Error::parse(kind.name(), "gateway without destination", raw))?;
            if let Some(route) = route(kind, raw, &destination, &prefix, &caps[1])? {
                routes.push(route);
            }
        }
    }
    if pending.is_some() {
        return Err(Error::parse(kind.name(), "destination without gateway", raw));
    }
    Ok(routes)
}

fn route(
    kind: OutputKind,
    raw: &str,
    destination: &str,
    prefix: &str,
    gateway: &str,
) -> Result<Option<StaticRoute>> {
    if matches!(gateway.to_ascii_lowercase().as_str(), "reject" | "blackhole") {
        return Ok(None);
    }
    let bad = || {
        Error::parse(
            kind.name(),
            format!("bad route {}/{} via {}", destination, prefix, gateway),
            raw,
        )
    };
    let destination: IpAddr = destination.parse().map_err(|_| bad())?;
    let prefix_len: u8 = prefix.parse().map_err(|_| bad())?;
    let gateway: IpAddr = gateway.parse().map_err(|_| bad())?;
    Ok(Some(StaticRoute::new(destination, prefix_len, gateway)))
}
