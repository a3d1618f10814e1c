//! In-memory ProCurve switch: a CLI simulator and an SNMP agent.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use hpswitch::model::mask_from_prefix;
use hpswitch::snmp::{PortList, oids};
use hpswitch::{
    CliSession, CliTransport, Device, Credentials, Error, Oid, Result, SessionConfig,
    SnmpTransport, SnmpValue, SwitchBuilder, TransportError, VlanId, platform,
};
use regex::bytes::Regex;

pub const HOST: &str = "HP-2920";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn vlan(id: u16) -> VlanId {
    VlanId::new(id).unwrap()
}

/// CLI context of the simulated switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ctx {
    Operator,
    Manager,
    Config,
    Vlan(u16),
    Port(String),
}

impl Ctx {
    fn is_config(&self) -> bool {
        matches!(self, Ctx::Config | Ctx::Vlan(_) | Ctx::Port(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimVlan {
    pub name: String,
    pub tagged: BTreeSet<String>,
    pub untagged: BTreeSet<String>,
    pub addresses: Vec<(IpAddr, u8)>,
}

/// State of the simulated switch.
#[derive(Debug)]
pub struct Switch {
    pub ctx: Ctx,
    pub vlans: BTreeMap<u16, SimVlan>,
    pub ports: Vec<String>,
    pub trunks: BTreeMap<String, String>,
    pub names: BTreeMap<String, String>,
    pub disabled: BTreeSet<String>,
    pub routes: Vec<(String, IpAddr)>,
    /// Every line received, in order.
    pub received: Vec<String>,
    /// Commands executed once without answering a prompt.
    pub hang: Vec<String>,
    /// Never answer with a prompt again.
    pub silent: bool,
    pub open: bool,
    banner: bool,
    pending: String,
}

impl Switch {
    /// Eight ports, 7 and 8 aggregated into Trk1, everything in VLAN 1.
    pub fn new() -> Self {
        let ports: Vec<String> = (1..=8).map(|p| p.to_string()).collect();
        let trunks: BTreeMap<String, String> = [("7", "Trk1"), ("8", "Trk1")]
            .into_iter()
            .map(|(p, t)| (p.to_string(), t.to_string()))
            .collect();

        let mut default_vlan = SimVlan {
            name: "DEFAULT_VLAN".into(),
            ..Default::default()
        };
        for port in &ports[..6] {
            default_vlan.untagged.insert(port.clone());
        }
        default_vlan.untagged.insert("Trk1".into());
        default_vlan
            .addresses
            .push(("10.0.0.20".parse().unwrap(), 24));

        Self {
            ctx: Ctx::Operator,
            vlans: BTreeMap::from([(1, default_vlan)]),
            ports,
            trunks,
            names: BTreeMap::new(),
            disabled: BTreeSet::new(),
            routes: Vec::new(),
            received: Vec::new(),
            hang: Vec::new(),
            silent: false,
            open: true,
            banner: true,
            pending: "\r\nProCurve J9727A Switch 2920-24G\r\n\r\nPress any key to continue".into(),
        }
    }

    fn prompt(&self) -> String {
        match &self.ctx {
            Ctx::Operator => format!("{}> ", HOST),
            Ctx::Manager => format!("{}# ", HOST),
            Ctx::Config => format!("{}(config)# ", HOST),
            Ctx::Vlan(id) => format!("{}(vlan-{})# ", HOST, id),
            Ctx::Port(port) => format!("{}(eth-{})# ", HOST, port),
        }
    }

    fn input(&mut self, line: &str) {
        self.received.push(line.to_string());
        if self.banner {
            self.banner = false;
            let prompt = self.prompt();
            self.pending.push_str(&format!("\r\n{}", prompt));
            return;
        }
        if !self.open {
            return;
        }

        let hung = match self.hang.iter().position(|c| c == line) {
            Some(pos) => {
                self.hang.remove(pos);
                true
            }
            None => self.silent,
        };
        let output = self.execute(line);

        self.pending.push_str(line);
        self.pending.push_str("\r\n");
        if hung {
            return;
        }
        if !output.is_empty() {
            self.pending.push_str(&output.replace('\n', "\r\n"));
            self.pending.push_str("\r\n");
        }
        if self.open {
            let prompt = self.prompt();
            self.pending.push_str(&prompt);
        }
    }

    fn execute(&mut self, line: &str) -> String {
        let line = line.trim();
        if let Some(args) = line.strip_prefix("show ") {
            return self.show(args.trim());
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let ctx = self.ctx.clone();
        match (&ctx, words.as_slice()) {
            (_, []) => String::new(),
            (Ctx::Operator, ["enable"]) => self.go(Ctx::Manager),
            (Ctx::Operator | Ctx::Manager, ["logout"]) => {
                self.open = false;
                String::new()
            }
            (Ctx::Manager, ["no", "page"]) | (Ctx::Manager, ["end"]) => String::new(),
            (Ctx::Manager, ["configure", ..]) => self.go(Ctx::Config),
            (Ctx::Manager, ["disable"] | ["exit"]) => self.go(Ctx::Operator),
            (c, ["end"]) if c.is_config() => self.go(Ctx::Manager),
            (Ctx::Config, ["exit"]) => self.go(Ctx::Manager),
            (Ctx::Vlan(_) | Ctx::Port(_), ["exit"]) => self.go(Ctx::Config),
            (c, ["vlan", id]) if c.is_config() => match parse_vid(id) {
                Some(id) => {
                    self.vlans.entry(id).or_insert_with(|| SimVlan {
                        name: format!("VLAN{}", id),
                        ..Default::default()
                    });
                    self.go(Ctx::Vlan(id))
                }
                None => format!("Invalid input: {}", id),
            },
            (c, ["interface", port]) if c.is_config() => {
                let known = self.ports.iter().any(|p| p.as_str() == *port)
                    || self.trunks.values().any(|t| t.as_str() == *port);
                if known {
                    self.go(Ctx::Port(port.to_string()))
                } else {
                    format!("Invalid input: {}", port)
                }
            }
            (Ctx::Config, ["no", "vlan", id]) => match parse_vid(id) {
                Some(1) => "Command not allowed: the default VLAN cannot be deleted.".into(),
                Some(id) => {
                    self.vlans.remove(&id);
                    String::new()
                }
                None => format!("Invalid input: {}", id),
            },
            (Ctx::Config, ["ip", "route", dst, gw]) => match gw.parse() {
                Ok(gw) => {
                    self.routes.push((dst.to_string(), gw));
                    String::new()
                }
                Err(_) => format!("Invalid input: {}", gw),
            },
            (Ctx::Config, ["no", "ip", "route", dst, _]) => {
                self.routes.retain(|(d, _)| d != dst);
                String::new()
            }
            (Ctx::Vlan(id), ["name", ..]) => {
                let name = line["name".len()..].trim().trim_matches('"').to_string();
                if let Some(v) = self.vlans.get_mut(id) {
                    v.name = name;
                }
                String::new()
            }
            (Ctx::Vlan(id), ["ip" | "ipv6", "address", cidr]) => {
                let Some((addr, prefix)) = parse_cidr(cidr) else {
                    return format!("Invalid input: {}", cidr);
                };
                let Some(v) = self.vlans.get_mut(id) else {
                    return String::new();
                };
                if v.addresses.iter().any(|(a, _)| *a == addr) {
                    return format!("The IP address (or subnet) {} already exists.", cidr);
                }
                v.addresses.push((addr, prefix));
                String::new()
            }
            (Ctx::Vlan(id), ["no", "ip" | "ipv6", "address", cidr]) => {
                if let (Some((addr, _)), Some(v)) = (parse_cidr(cidr), self.vlans.get_mut(id)) {
                    v.addresses.retain(|(a, _)| *a != addr);
                }
                String::new()
            }
            (Ctx::Port(port), [mode @ ("tagged" | "untagged"), "vlan", id]) => {
                self.set_member(port, id, Some(*mode == "untagged"))
            }
            (Ctx::Port(port), ["no", "tagged" | "untagged", "vlan", id]) => {
                self.set_member(port, id, None)
            }
            (Ctx::Port(port), ["name", ..]) => {
                let name = line["name".len()..].trim().trim_matches('"').to_string();
                self.names.insert(port.clone(), name);
                String::new()
            }
            (Ctx::Port(port), ["no", "name"]) => {
                self.names.remove(port);
                String::new()
            }
            (Ctx::Port(port), ["enable"]) => {
                self.disabled.remove(port);
                String::new()
            }
            (Ctx::Port(port), ["disable"]) => {
                self.disabled.insert(port.clone());
                String::new()
            }
            (_, [first, ..]) => format!("Invalid input: {}", first),
        }
    }

    fn go(&mut self, ctx: Ctx) -> String {
        self.ctx = ctx;
        String::new()
    }

    fn set_member(&mut self, port: &str, id: &str, untagged: Option<bool>) -> String {
        let Some(id) = parse_vid(id) else {
            return format!("Invalid input: {}", id);
        };
        if !self.vlans.contains_key(&id) {
            return format!("Invalid input: VLAN {} does not exist", id);
        }
        if untagged == Some(true) {
            for v in self.vlans.values_mut() {
                v.untagged.remove(port);
            }
        }
        if let Some(v) = self.vlans.get_mut(&id) {
            v.tagged.remove(port);
            v.untagged.remove(port);
            match untagged {
                Some(true) => {
                    v.untagged.insert(port.to_string());
                }
                Some(false) => {
                    v.tagged.insert(port.to_string());
                }
                None => {}
            }
        }
        String::new()
    }

    fn show(&self, args: &str) -> String {
        let words: Vec<&str> = args.split_whitespace().collect();
        match words.as_slice() {
            ["vlans"] => self.show_vlans(),
            ["vlans", "ports", port, "detail"] => self.show_port_vlans(port),
            ["vlans", id] => match parse_vid(id) {
                Some(id) => self.show_vlan(id),
                None => format!("Invalid input: {}", id),
            },
            ["interfaces", "brief"] => self.show_interfaces(),
            ["trunks"] => self.show_trunks(),
            ["running-config", "interface", port] => self.show_port_config(port),
            ["running-config", "vlan", id] => match parse_vid(id) {
                Some(id) => self.show_vlan_config(id),
                None => format!("Invalid input: {}", id),
            },
            ["ip"] => self.show_ip(),
            ["ip", "route", "static"] => self.show_routes(),
            _ => format!("Invalid input: {}", words.first().unwrap_or(&"")),
        }
    }

    fn show_vlans(&self) -> String {
        let mut out = String::from(
            "\n Status and Counters - VLAN Information\n\n  Maximum VLANs to support : 256\n  Primary VLAN : DEFAULT_VLAN\n\n  VLAN ID Name                             | Status     Voice Jumbo\n  ------- -------------------------------- + ---------- ----- -----\n",
        );
        for (id, v) in &self.vlans {
            out.push_str(&format!("  {:<7} {:<32} | Port-based No    No   \n", id, v.name));
        }
        out
    }

    fn show_vlan(&self, id: u16) -> String {
        let Some(v) = self.vlans.get(&id) else {
            return format!("\nVLAN {} is not configured.", id);
        };
        let mut out = format!(
            "\n Status and Counters - VLAN Information - VLAN {}\n\n  VLAN ID : {}\n  Name : {}\n  Status : Port-based\n  Voice : No\n  Jumbo : No\n",
            id, id, v.name
        );
        if !v.tagged.is_empty() || !v.untagged.is_empty() {
            out.push_str(
                "\n  Port Information Mode     Unknown VLAN Status\n  ---------------- -------- ------------ ----------\n",
            );
            for port in &v.tagged {
                out.push_str(&format!("  {:<16} Tagged   Learn        Up\n", port));
            }
            for port in &v.untagged {
                out.push_str(&format!("  {:<16} Untagged Learn        Up\n", port));
            }
        }
        out
    }

    fn show_port_vlans(&self, port: &str) -> String {
        let mut out = format!(
            "\n Status and Counters - VLAN Information - for ports {}\n\n  VLAN ID Name                 | Status     Voice Jumbo Mode\n  ------- -------------------- + ---------- ----- ----- --------\n",
            port
        );
        for (id, v) in &self.vlans {
            let mode = if v.tagged.contains(port) {
                "Tagged"
            } else if v.untagged.contains(port) {
                "Untagged"
            } else {
                continue;
            };
            out.push_str(&format!(
                "  {:<7} {:<20} | Port-based No    No    {}\n",
                id, v.name, mode
            ));
        }
        out
    }

    fn show_interfaces(&self) -> String {
        let mut out = String::from(
            "\n Status and Counters - Port Status\n\n                  | Intrusion                           MDI  Flow  Bcast\n  Port     Type   | Alert     Enabled Status Mode       Mode Ctrl  Limit\n  -------- ------ + --------- ------- ------ ---------- ---- ---- ------\n",
        );
        for port in &self.ports {
            let label = match self.trunks.get(port) {
                Some(trunk) => format!("{}-{}", port, trunk),
                None => port.clone(),
            };
            let enabled = if self.disabled.contains(port) { "No " } else { "Yes" };
            out.push_str(&format!(
                "  {:<8} 100/1000T | No        {}     Up     1000FDx    Auto off  0\n",
                label, enabled
            ));
        }
        out
    }

    fn show_trunks(&self) -> String {
        let mut out = String::from(
            "\n Load Balancing Method:  L3-based (default)\n\n  Port | Name                             Type      | Group Type\n  ---- + -------------------------------- --------- + ----- --------\n",
        );
        for (port, trunk) in &self.trunks {
            out.push_str(&format!(
                "  {:<4} | {:<32} 100/1000T | {:<5} Trunk\n",
                port, "", trunk
            ));
        }
        out
    }

    fn show_port_config(&self, port: &str) -> String {
        let mut out = format!("\nRunning configuration:\n\ninterface {}\n", port);
        if let Some(name) = self.names.get(port) {
            out.push_str(&format!("   name \"{}\"\n", name));
        }
        if self.disabled.contains(port) {
            out.push_str("   disable\n");
        }
        out.push_str("   exit");
        out
    }

    fn show_vlan_config(&self, id: u16) -> String {
        let Some(v) = self.vlans.get(&id) else {
            return "\nRunning configuration:\n".into();
        };
        let mut out = format!("\nRunning configuration:\n\nvlan {}\n   name \"{}\"\n", id, v.name);
        let list = |ports: &BTreeSet<String>| ports.iter().cloned().collect::<Vec<_>>().join(",");
        if !v.untagged.is_empty() {
            out.push_str(&format!("   untagged {}\n", list(&v.untagged)));
        }
        if !v.tagged.is_empty() {
            out.push_str(&format!("   tagged {}\n", list(&v.tagged)));
        }
        for (addr, prefix) in &v.addresses {
            let keyword = if addr.is_ipv4() { "ip" } else { "ipv6" };
            out.push_str(&format!("   {} address {}/{}\n", keyword, addr, prefix));
        }
        out.push_str("   exit");
        out
    }

    fn show_ip(&self) -> String {
        let mut out = String::from(
            "\n Internet (IP) Service\n\n  IP Routing : Enabled\n\n                      |                                            Proxy ARP\n  VLAN                | IP Config  IP Address      Subnet Mask     Std Local\n  ------------------- + ---------- --------------- --------------- --- -----\n",
        );
        for v in self.vlans.values() {
            let v4: Vec<_> = v.addresses.iter().filter(|(a, _)| a.is_ipv4()).collect();
            if v4.is_empty() {
                out.push_str(&format!("  {:<19} | Disabled\n", v.name));
                continue;
            }
            for (i, (addr, prefix)) in v4.iter().enumerate() {
                let label = if i == 0 { v.name.as_str() } else { "" };
                out.push_str(&format!(
                    "  {:<19} | Manual     {:<15} {:<15} No  No\n",
                    label,
                    addr.to_string(),
                    mask_from_prefix(*prefix).to_string()
                ));
            }
        }
        out
    }

    fn show_routes(&self) -> String {
        let mut out = String::from(
            "\n                                IP Route Entries\n\n  Destination        Gateway         VLAN Type      Sub-Type   Metric     Dist.\n  ------------------ --------------- ---- --------- ---------- ---------- -----\n",
        );
        for (dst, gw) in &self.routes {
            out.push_str(&format!(
                "  {:<18} {:<15} 1    static               1          1\n",
                dst,
                gw.to_string()
            ));
        }
        out
    }
}

fn parse_vid(text: &str) -> Option<u16> {
    text.parse().ok().filter(|id| (1..=4094).contains(id))
}

fn parse_cidr(text: &str) -> Option<(IpAddr, u8)> {
    let (addr, prefix) = text.split_once('/')?;
    Some((addr.parse().ok()?, prefix.parse().ok()?))
}

/// CLI transport talking to a shared [`Switch`].
pub struct SimTransport {
    switch: Arc<Mutex<Switch>>,
}

impl SimTransport {
    pub fn new() -> (Self, Arc<Mutex<Switch>>) {
        let switch = Arc::new(Mutex::new(Switch::new()));
        (
            Self {
                switch: switch.clone(),
            },
            switch,
        )
    }

    fn lock(&self) -> MutexGuard<'_, Switch> {
        self.switch.lock().unwrap()
    }
}

impl CliTransport for SimTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        let mut switch = self.lock();
        if !switch.open {
            return Err(TransportError::Disconnected.into());
        }
        let mut rest = text;
        while let Some(pos) = rest.find('\n') {
            switch.input(rest[..pos].trim_end_matches('\r'));
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            switch.input(rest);
        }
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<String> {
        let mut switch = self.lock();
        let pending = std::mem::take(&mut switch.pending);
        if pattern.is_match(pending.as_bytes()) {
            Ok(pending)
        } else {
            Err(Error::Timeout {
                timeout,
                partial: pending,
            })
        }
    }

    async fn discard_pending(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.lock().pending))
    }

    async fn close(&mut self) -> Result<()> {
        self.lock().open = false;
        Ok(())
    }

    fn abort(&mut self) {
        self.lock().open = false;
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }
}

pub fn fast_config() -> SessionConfig {
    SessionConfig {
        command_timeout: Duration::from_millis(50),
        ..Default::default()
    }
}

pub fn device() -> Device {
    Device::new("sim", Credentials::password("manager", "secret"))
}

/// An opened CLI session on a fresh simulator.
pub async fn open_session() -> (CliSession<SimTransport>, Arc<Mutex<Switch>>) {
    open_session_with(fast_config()).await
}

pub async fn open_session_with(
    config: SessionConfig,
) -> (CliSession<SimTransport>, Arc<Mutex<Switch>>) {
    init_logging();
    let (transport, switch) = SimTransport::new();
    let platform = platform::procurve_platform().unwrap();
    let mut session = CliSession::new(transport, platform, config);
    session.open().await.unwrap();
    (session, switch)
}

/// A connected reconciler on a fresh simulator, CLI only.
pub async fn reconciler() -> (hpswitch::Reconciler<SimTransport>, Arc<Mutex<Switch>>) {
    init_logging();
    let (transport, switch) = SimTransport::new();
    let reconciler = SwitchBuilder::new(device())
        .config(fast_config())
        .build_with(transport, None::<hpswitch::NoSnmp>)
        .await
        .unwrap();
    (reconciler, switch)
}

/// Commands received after `mark` lines.
pub fn received_since(switch: &Arc<Mutex<Switch>>, mark: usize) -> Vec<String> {
    switch.lock().unwrap().received[mark..].to_vec()
}

pub fn received_len(switch: &Arc<Mutex<Switch>>) -> usize {
    switch.lock().unwrap().received.len()
}

/// SNMP agent over a sorted object map.
#[derive(Default)]
pub struct MemoryAgent {
    pub objects: Mutex<BTreeMap<Oid, SnmpValue>>,
    pub sets: Mutex<Vec<Vec<(Oid, SnmpValue)>>>,
}

impl MemoryAgent {
    /// The same switch as [`Switch::new`], as seen over SNMP.
    pub fn procurve() -> Self {
        let agent = MemoryAgent::default();
        {
            let mut objects = agent.objects.lock().unwrap();
            let descr = oids::if_descr_column();
            for port in 1..=8u32 {
                objects.insert(descr.child(port), SnmpValue::string(port.to_string()));
                objects.insert(oids::if_type(port), SnmpValue::Integer(6));
                objects.insert(oids::if_admin_status(port), SnmpValue::Integer(oids::STATUS_UP));
                objects.insert(oids::if_oper_status(port), SnmpValue::Integer(oids::STATUS_UP));
                objects.insert(oids::if_alias(port), SnmpValue::string(""));
            }
            objects.insert(descr.child(289), SnmpValue::string("Trk1"));
            objects.insert(oids::if_type(289), SnmpValue::Integer(oids::IF_TYPE_LAG));
            objects.insert(descr.child(578), SnmpValue::string("DEFAULT_VLAN"));

            let stack = oids::if_stack_status_column();
            objects.insert(stack.extend(&[0, 1]), SnmpValue::Integer(1));
            objects.insert(stack.extend(&[289, 7]), SnmpValue::Integer(1));
            objects.insert(stack.extend(&[289, 8]), SnmpValue::Integer(1));

            let mut members = PortList::default();
            for base in [1, 2, 3, 4, 5, 6, 289] {
                members.set(base, true);
            }
            let id = vlan(1);
            objects.insert(oids::vlan_row_status(id), SnmpValue::Integer(oids::ROW_ACTIVE));
            objects.insert(oids::vlan_name(id), SnmpValue::string("DEFAULT_VLAN"));
            objects.insert(
                oids::vlan_egress_ports(id),
                SnmpValue::OctetString(members.as_bytes().to_vec()),
            );
            objects.insert(
                oids::vlan_untagged_ports(id),
                SnmpValue::OctetString(members.into_bytes()),
            );

            objects.insert(
                oids::ip_ad_ent_if_index_column().extend(&[10, 0, 0, 20]),
                SnmpValue::Integer(578),
            );
            objects.insert(
                oids::ip_ad_ent_net_mask([10, 0, 0, 20]),
                SnmpValue::IpAddress(Ipv4Addr::new(255, 255, 255, 0)),
            );

            let address = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 20));
            objects.insert(
                oids::hpicf_ip_address_prefix_length(578, &address),
                SnmpValue::Gauge32(24),
            );
            objects.insert(
                oids::hpicf_ip_address_type(578, &address),
                SnmpValue::Integer(oids::ADDRESS_UNICAST),
            );
            objects.insert(
                oids::hpicf_ip_address_row_status(578, &address),
                SnmpValue::Integer(oids::ROW_ACTIVE),
            );
        }
        agent
    }

    pub fn value(&self, oid: &Oid) -> Option<SnmpValue> {
        self.objects.lock().unwrap().get(oid).cloned()
    }
}

impl SnmpTransport for MemoryAgent {
    async fn get(&self, oid: &Oid) -> Result<Option<SnmpValue>> {
        Ok(self.value(oid))
    }

    async fn get_next(&self, oid: &Oid) -> Result<Option<(Oid, SnmpValue)>> {
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
            .next()
            .map(|(o, v)| (o.clone(), v.clone())))
    }

    async fn set(&self, bindings: &[(Oid, SnmpValue)]) -> Result<()> {
        self.sets.lock().unwrap().push(bindings.to_vec());
        let mut objects = self.objects.lock().unwrap();
        let status_column = oids::vlan_row_status_column();
        let address_status = oids::hpicf_ip_address_row_status_column();
        for (oid, value) in bindings {
            if let Some(index) = oid.suffix(&address_status) {
                match value.as_int() {
                    Some(oids::ROW_DESTROY) => {
                        objects.remove(oid);
                        objects.remove(&oids::hpicf_ip_address_prefix_length_column().extend(index));
                        objects.remove(&oids::hpicf_ip_address_type_column().extend(index));
                    }
                    _ => {
                        objects.insert(oid.clone(), SnmpValue::Integer(oids::ROW_ACTIVE));
                    }
                }
                continue;
            }

            let row = oid
                .suffix(&status_column)
                .and_then(|s| s.first().copied())
                .and_then(|vid| u16::try_from(vid).ok())
                .and_then(|vid| VlanId::new(vid).ok());
            match (row, value.as_int()) {
                (Some(id), Some(oids::ROW_CREATE_AND_GO)) => {
                    objects.insert(oid.clone(), SnmpValue::Integer(oids::ROW_ACTIVE));
                    objects.insert(oids::vlan_name(id), SnmpValue::string(format!("VLAN{}", id)));
                    objects.insert(oids::vlan_egress_ports(id), SnmpValue::OctetString(vec![]));
                    objects.insert(oids::vlan_untagged_ports(id), SnmpValue::OctetString(vec![]));
                }
                (Some(id), Some(oids::ROW_DESTROY)) => {
                    objects.remove(oid);
                    objects.remove(&oids::vlan_name(id));
                    objects.remove(&oids::vlan_egress_ports(id));
                    objects.remove(&oids::vlan_untagged_ports(id));
                }
                _ => {
                    objects.insert(oid.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}
