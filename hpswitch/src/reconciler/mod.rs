//! Operator-facing facade over one switch.
//!
//! A [`Reconciler`] owns the CLI session (behind a lock, so commands from
//! concurrent callers are serialised) and optionally an SNMP backend. It
//! encodes intents against a cached trunk snapshot, runs the steps, reads
//! the affected entity back and compares it with the intent.
//!
//! Mutating commands are never retried. Read-only queries are retried on
//! timeout, resynchronising the session in between.

mod builder;
mod query;
mod verify;

pub use builder::SwitchBuilder;
pub use query::Query;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock};

use crate::encoder::{Closing, Intent, Step, encode, navigate};
use crate::error::{Error, Result};
use crate::model::{
    CommandResult, Device, Failure, Interface, InterfaceId, IpAssignment, Payload, StaticRoute,
    TrunkMembership, Vlan, VlanId,
};
use crate::session::{CliSession, CliState, SessionStatus};
use crate::snmp::SnmpBackend;
use crate::transport::{CliTransport, NoSnmp, SnmpTransport};

use query::cli_query;
use verify::{readback_query, verify};

/// Commands sent and output captured by one operation.
#[derive(Default)]
struct Transcript {
    commands: Vec<String>,
    output: String,
}

impl Transcript {
    fn succeeded(self, payload: Option<Payload>) -> CommandResult {
        CommandResult::succeeded(self.commands, self.output, payload)
    }

    fn failed(self, failure: Failure) -> CommandResult {
        CommandResult::failed(self.commands, self.output, failure)
    }
}

fn rejected(error: Error) -> CommandResult {
    debug!("rejected before any command: {}", error);
    Transcript::default().failed(Failure {
        step: None,
        command: None,
        error,
    })
}

/// Configure and query one switch.
pub struct Reconciler<T: CliTransport, S: SnmpTransport = NoSnmp> {
    device: Arc<Device>,
    session: Mutex<CliSession<T>>,
    snmp: Option<SnmpBackend<S>>,
    trunk_snapshot: RwLock<TrunkMembership>,
    read_retries: u32,
    abandoned: AtomicBool,
}

impl<T: CliTransport, S: SnmpTransport> Reconciler<T, S> {
    /// Wrap an opened session.
    ///
    /// The trunk snapshot starts with the members declared in the device's
    /// capabilities; call [`refresh_trunks`](Self::refresh_trunks) to add
    /// what the switch reports.
    pub fn new(device: Arc<Device>, session: CliSession<T>, snmp: Option<S>) -> Self {
        let read_retries = session.config().read_retries;
        let declared = device.capabilities.trunk_members.clone();
        Self {
            device,
            session: Mutex::new(session),
            snmp: snmp.map(SnmpBackend::new),
            trunk_snapshot: RwLock::new(declared),
            read_retries,
            abandoned: AtomicBool::new(false),
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn has_snmp(&self) -> bool {
        self.snmp.is_some()
    }

    /// The SNMP transport, if one was configured.
    pub fn snmp_transport(&self) -> Option<&S> {
        self.snmp.as_ref().map(SnmpBackend::transport)
    }

    /// Current CLI state. Waits for any in-flight command.
    pub async fn state(&self) -> CliState {
        self.session.lock().await.state()
    }

    pub async fn status(&self) -> SessionStatus {
        self.session.lock().await.status()
    }

    /// The trunk membership mutations are checked against.
    pub async fn known_trunks(&self) -> TrunkMembership {
        self.trunk_snapshot.read().await.clone()
    }

    /// Stop enqueueing commands. An in-flight command still completes or
    /// times out; every later operation fails with [`Error::Cancelled`].
    pub fn abandon(&self) {
        if !self.abandoned.swap(true, Ordering::SeqCst) {
            warn!("{}: session abandoned", self.device.host);
        }
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    fn check_abandoned(&self) -> Result<()> {
        if self.is_abandoned() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Apply one intent over the CLI and verify it by reading back.
    pub async fn apply(&self, intent: &Intent) -> CommandResult {
        if let Err(error) = self.check_abandoned() {
            return rejected(error);
        }
        let trunks = self.known_trunks().await;
        let mut session = self.session.lock().await;
        let start = session.state();

        let plan = match encode(
            intent,
            &start,
            &trunks,
            &self.device.capabilities.quirks,
            Closing::Restore,
        ) {
            Ok(plan) => plan,
            Err(error) => return rejected(error),
        };
        if let Err(error) = self.check_primary(&mut session, &trunks, intent).await {
            self.recover(&mut session).await;
            return rejected(error);
        }

        info!("{}: {} ({} commands)", self.device.host, intent, plan.len());
        let mut transcript = Transcript::default();
        if let Err(failure) = self.execute(&mut session, plan.steps(), &mut transcript).await {
            return transcript.failed(failure);
        }

        match self.cli_read_back(&mut session, &trunks, intent).await {
            Ok(payload) => transcript.succeeded(Some(payload)),
            Err(error) => {
                self.recover(&mut session).await;
                transcript.failed(Failure {
                    step: None,
                    command: None,
                    error,
                })
            }
        }
    }

    /// Apply several intents in one configuration context.
    ///
    /// Every intent is encoded before anything is sent; the context is
    /// entered once and left once. Intents are verified against the final
    /// state, so a batch must not contain intents that undo each other.
    pub async fn apply_batch(&self, intents: &[Intent]) -> CommandResult {
        if let Err(error) = self.check_abandoned() {
            return rejected(error);
        }
        let trunks = self.known_trunks().await;
        let mut session = self.session.lock().await;
        let start = session.state();
        let quirks = &self.device.capabilities.quirks;

        let mut steps: Vec<Step> = Vec::new();
        let mut at = start.clone();
        for intent in intents {
            match encode(intent, &at, &trunks, quirks, Closing::KeepOpen) {
                Ok(plan) => {
                    at = plan.end_state().clone();
                    steps.extend(plan.into_steps());
                }
                Err(error) => return rejected(error),
            }
        }
        for intent in intents {
            if let Err(error) = self.check_primary(&mut session, &trunks, intent).await {
                self.recover(&mut session).await;
                return rejected(error);
            }
        }

        let home = match &start {
            CliState::VlanConfig(current)
                if intents
                    .iter()
                    .any(|i| matches!(i, Intent::DeleteVlan { id } if id == current)) =>
            {
                CliState::GlobalConfig
            }
            _ => start.clone(),
        };
        steps.extend(navigate(&at, &home));

        info!(
            "{}: batch of {} intents ({} commands)",
            self.device.host,
            intents.len(),
            steps.len()
        );
        let mut transcript = Transcript::default();
        if let Err(failure) = self.execute(&mut session, &steps, &mut transcript).await {
            return transcript.failed(failure);
        }

        for intent in intents {
            if let Err(error) = self.cli_read_back(&mut session, &trunks, intent).await {
                self.recover(&mut session).await;
                return transcript.failed(Failure {
                    step: None,
                    command: None,
                    error,
                });
            }
        }
        transcript.succeeded(None)
    }

    /// Apply one intent with SNMP SET requests and verify over SNMP.
    pub async fn apply_snmp(&self, intent: &Intent) -> CommandResult {
        if let Err(error) = self.check_abandoned() {
            return rejected(error);
        }
        let Some(snmp) = &self.snmp else {
            return rejected(Error::unsupported("no SNMP transport configured"));
        };
        let trunks = self.known_trunks().await;

        info!("{}: {} over SNMP", self.device.host, intent);
        let bindings = match snmp.apply(intent, &trunks).await {
            Ok(bindings) => bindings,
            Err(error) => return rejected(error),
        };
        let commands: Vec<String> = bindings
            .iter()
            .map(|(oid, value)| format!("set {} = {}", oid, value))
            .collect();
        let transcript = Transcript {
            output: commands.join("\n"),
            commands,
        };

        let read_back = snmp_query(snmp, &readback_query(intent), &trunks).await;
        match read_back.and_then(|payload| verify(intent, &payload).map(|()| payload)) {
            Ok(payload) => transcript.succeeded(Some(payload)),
            Err(error) => transcript.failed(Failure {
                step: None,
                command: None,
                error,
            }),
        }
    }

    /// Read from the switch, over SNMP when configured and able.
    pub async fn query(&self, query: Query) -> Result<Payload> {
        self.check_abandoned()?;
        let trunks = self.known_trunks().await;

        let payload = match self.snmp.as_ref().filter(|_| query.snmp_capable()) {
            Some(snmp) => self.query_snmp(snmp, &query, &trunks).await?,
            None => self.query_cli(&query, &trunks).await?,
        };

        Ok(match payload {
            Payload::Trunks(mut found) => {
                found.merge(&self.device.capabilities.trunk_members);
                Payload::Trunks(found)
            }
            other => other,
        })
    }

    async fn query_snmp(
        &self,
        snmp: &SnmpBackend<S>,
        query: &Query,
        trunks: &TrunkMembership,
    ) -> Result<Payload> {
        let mut attempt = 0;
        loop {
            match snmp_query(snmp, query, trunks).await {
                Err(Error::Timeout { timeout, .. }) if attempt < self.read_retries => {
                    attempt += 1;
                    warn!("SNMP {} timed out after {:?}, retry {}", query, timeout, attempt);
                }
                result => return result,
            }
        }
    }

    async fn query_cli(&self, query: &Query, trunks: &TrunkMembership) -> Result<Payload> {
        let mut session = self.session.lock().await;
        let mut attempt = 0;
        loop {
            match cli_query(&mut session, query, trunks).await {
                Ok(payload) => return Ok(payload),
                Err(Error::Timeout { timeout, .. }) if attempt < self.read_retries => {
                    attempt += 1;
                    warn!("{} timed out after {:?}, retry {}", query, timeout, attempt);
                    session.resync().await?;
                }
                Err(error) => {
                    self.recover(&mut session).await;
                    return Err(error);
                }
            }
        }
    }

    pub async fn vlans(&self) -> Result<Vec<Vlan>> {
        match self.query(Query::Vlans).await? {
            Payload::Vlans(vlans) => Ok(vlans),
            other => Err(unexpected(&Query::Vlans, other)),
        }
    }

    /// One VLAN with its members, `None` if it does not exist.
    pub async fn vlan(&self, id: VlanId) -> Result<Option<Vlan>> {
        match self.query(Query::Vlan(id)).await? {
            Payload::Vlan(vlan) => Ok(vlan),
            other => Err(unexpected(&Query::Vlan(id), other)),
        }
    }

    pub async fn interfaces(&self) -> Result<Vec<Interface>> {
        match self.query(Query::Interfaces).await? {
            Payload::Interfaces(ifaces) => Ok(ifaces),
            other => Err(unexpected(&Query::Interfaces, other)),
        }
    }

    /// Detail of one port.
    pub async fn interface(&self, id: &InterfaceId) -> Result<Option<Interface>> {
        let query = Query::Interface(id.clone());
        match self.query(query.clone()).await? {
            Payload::Interface(iface) => Ok(iface),
            other => Err(unexpected(&query, other)),
        }
    }

    /// Addresses configured on `id`, IPv4 and IPv6.
    pub async fn ip_config(&self, id: &InterfaceId) -> Result<Vec<IpAssignment>> {
        let query = Query::IpConfig(id.clone());
        match self.query(query.clone()).await? {
            Payload::IpAssignments(found) => Ok(found),
            other => Err(unexpected(&query, other)),
        }
    }

    /// IPv4 addresses of every VLAN interface.
    pub async fn addresses(&self) -> Result<Vec<IpAssignment>> {
        match self.query(Query::Addresses).await? {
            Payload::IpAssignments(found) => Ok(found),
            other => Err(unexpected(&Query::Addresses, other)),
        }
    }

    /// Trunk membership as reported by the switch, plus declared members.
    pub async fn trunks(&self) -> Result<TrunkMembership> {
        match self.query(Query::Trunks).await? {
            Payload::Trunks(trunks) => Ok(trunks),
            other => Err(unexpected(&Query::Trunks, other)),
        }
    }

    pub async fn static_routes(&self) -> Result<Vec<StaticRoute>> {
        match self.query(Query::StaticRoutes).await? {
            Payload::Routes(routes) => Ok(routes),
            other => Err(unexpected(&Query::StaticRoutes, other)),
        }
    }

    /// Re-read trunk membership and replace the snapshot.
    pub async fn refresh_trunks(&self) -> Result<TrunkMembership> {
        let trunks = self.trunks().await?;
        debug!(
            "{}: {} trunk member port(s) known",
            self.device.host,
            trunks.len()
        );
        *self.trunk_snapshot.write().await = trunks.clone();
        Ok(trunks)
    }

    /// Bring a desynchronised session back to `Enabled`.
    pub async fn resync(&self) -> Result<()> {
        self.session.lock().await.resync().await
    }

    /// Log out and close the CLI transport.
    pub async fn close(&self) -> Result<()> {
        info!("{}: closing", self.device.host);
        self.session.lock().await.close().await
    }

    async fn execute(
        &self,
        session: &mut CliSession<T>,
        steps: &[Step],
        transcript: &mut Transcript,
    ) -> std::result::Result<(), Failure> {
        for (index, step) in steps.iter().enumerate() {
            if self.is_abandoned() {
                warn!("abandoned before step {} '{}'", index, step.command);
                return Err(Failure {
                    step: Some(index),
                    command: Some(step.command.clone()),
                    error: Error::Cancelled,
                });
            }

            transcript.commands.push(step.command.clone());
            match session.run(&step.command, &step.expected).await {
                Ok(output) => transcript.output.push_str(&output.raw),
                Err(error) => {
                    if let Some(raw) = error.raw_context() {
                        transcript.output.push_str(raw);
                    }
                    warn!("step {} '{}' failed: {}", index, step.command, error);
                    self.recover(session).await;
                    return Err(Failure {
                        step: Some(index),
                        command: Some(step.command.clone()),
                        error,
                    });
                }
            }
        }
        Ok(())
    }

    async fn cli_read_back(
        &self,
        session: &mut CliSession<T>,
        trunks: &TrunkMembership,
        intent: &Intent,
    ) -> Result<Payload> {
        let payload = cli_query(session, &readback_query(intent), trunks).await?;
        verify(intent, &payload)?;
        Ok(payload)
    }

    /// Refuse a second primary address of the same family.
    async fn check_primary(
        &self,
        session: &mut CliSession<T>,
        trunks: &TrunkMembership,
        intent: &Intent,
    ) -> Result<()> {
        let Intent::SetIpAssignment(assignment) = intent else {
            return Ok(());
        };
        if assignment.secondary {
            return Ok(());
        }

        let query = Query::IpConfig(assignment.interface.clone());
        let existing = match cli_query(session, &query, trunks).await? {
            Payload::IpAssignments(found) => found,
            other => return Err(unexpected(&query, other)),
        };
        let conflict = existing.iter().find(|e| {
            !e.secondary
                && e.address.is_ipv4() == assignment.address.is_ipv4()
                && !e.same_address(assignment)
        });
        match conflict {
            Some(primary) => Err(Error::invalid(format!(
                "{} already has primary address {}",
                assignment.interface,
                primary.cidr()
            ))),
            None => Ok(()),
        }
    }

    /// Best effort return to `Enabled` after a failed step.
    async fn recover(&self, session: &mut CliSession<T>) {
        match session.status() {
            SessionStatus::Disconnected => {}
            SessionStatus::Desynced => {
                if let Err(e) = session.resync().await {
                    warn!("{}: resync failed: {}", self.device.host, e);
                }
            }
            _ if session.state().is_config() => {
                if let Err(e) = session.run("end", &CliState::Enabled).await {
                    warn!("{}: leaving configuration failed: {}", self.device.host, e);
                    if session.is_desynced() {
                        if let Err(e) = session.resync().await {
                            warn!("{}: resync failed: {}", self.device.host, e);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

async fn snmp_query<S: SnmpTransport>(
    snmp: &SnmpBackend<S>,
    query: &Query,
    trunks: &TrunkMembership,
) -> Result<Payload> {
    Ok(match query {
        Query::Interfaces => Payload::Interfaces(snmp.interfaces(trunks).await?),
        Query::Interface(id) => Payload::Interface(snmp.interface(id, trunks).await?),
        Query::Vlans => Payload::Vlans(snmp.vlans().await?),
        Query::Vlan(id) => Payload::Vlan(snmp.vlan(*id).await?),
        Query::IpConfig(id) => Payload::IpAssignments(snmp.ip_config(id).await?),
        Query::Addresses => Payload::IpAssignments(snmp.addresses().await?),
        Query::Trunks => Payload::Trunks(snmp.trunks().await?),
        Query::StaticRoutes => {
            return Err(Error::unsupported("static routes are not read over SNMP"));
        }
    })
}

fn unexpected(query: &Query, payload: Payload) -> Error {
    Error::parse(
        query.to_string(),
        "unexpected payload kind",
        format!("{:?}", payload),
    )
}
