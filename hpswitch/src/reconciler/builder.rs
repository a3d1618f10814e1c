//! Builder for connected reconcilers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use secrecy::{ExposeSecret, SecretString};

use super::Reconciler;
use crate::error::{Error, Result};
use crate::model::Device;
use crate::platform::{self, PlatformDefinition};
use crate::session::{CliSession, SessionConfig};
use crate::transport::{
    CliTransport, HostKeyVerification, NoSnmp, SnmpTransport, SshConfig, SshTransport,
};

/// Builds a [`Reconciler`] for one [`Device`].
///
/// # Example
///
/// ```rust,no_run
/// use hpswitch::{Credentials, Device, SwitchBuilder};
///
/// # async fn example() -> Result<(), hpswitch::Error> {
/// let device = Device::new("10.0.0.2", Credentials::password("manager", "secret"));
/// let switch = SwitchBuilder::new(device)
///     .command_timeout(std::time::Duration::from_secs(10))
///     .connect()
///     .await?;
///
/// for vlan in switch.vlans().await? {
///     println!("{}", vlan);
/// }
/// switch.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SwitchBuilder {
    device: Device,
    config: SessionConfig,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    custom_platform: Option<PlatformDefinition>,
}

impl SwitchBuilder {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            config: SessionConfig::default(),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            custom_platform: None,
        }
    }

    /// Replace every session tunable at once.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Upper bound on recovery commands per resync.
    pub fn resync_attempts(mut self, attempts: u32) -> Self {
        self.config.resync_attempts = attempts;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Use `platform` instead of the one for the device's family.
    pub fn custom_platform(mut self, platform: PlatformDefinition) -> Self {
        self.custom_platform = Some(platform);
        self
    }

    /// Connect over SSH without SNMP.
    pub async fn connect(self) -> Result<Reconciler<SshTransport>> {
        let transport = self.ssh().await?;
        self.build_with(transport, None::<NoSnmp>).await
    }

    /// Connect over SSH, reading and writing over `snmp` where it can.
    pub async fn connect_with_snmp<S: SnmpTransport>(
        self,
        snmp: S,
    ) -> Result<Reconciler<SshTransport, S>> {
        let transport = self.ssh().await?;
        self.build_with(transport, Some(snmp)).await
    }

    async fn ssh(&self) -> Result<SshTransport> {
        let mut ssh = SshConfig::for_device(&self.device, &self.config);
        ssh.host_key_verification = self.host_key_verification.clone();
        ssh.known_hosts_path = self.known_hosts_path.clone();
        info!("connecting to {}", ssh.socket_addr());
        SshTransport::connect(ssh).await
    }

    /// Open a session over an already connected `transport`.
    ///
    /// Escalates to `Enabled`, then reads the trunk membership the
    /// reconciler checks mutations against.
    pub async fn build_with<T: CliTransport, S: SnmpTransport>(
        self,
        transport: T,
        snmp: Option<S>,
    ) -> Result<Reconciler<T, S>> {
        let platform = match self.custom_platform {
            Some(custom) => custom,
            None => platform::for_family(self.device.capabilities.family).map_err(|e| {
                Error::invalid(format!("platform for {:?}: {}", self.device.capabilities.family, e))
            })?,
        };

        let enable_password = self
            .device
            .credentials
            .enable_password
            .as_ref()
            .map(|s| SecretString::from(s.expose_secret().to_owned()));
        let mut session =
            CliSession::new(transport, platform, self.config).with_enable_password(enable_password);
        session.open().await?;

        let reconciler = Reconciler::new(Arc::new(self.device), session, snmp);
        reconciler.refresh_trunks().await?;
        info!(
            "{}: session ready, SNMP {}",
            reconciler.device().host,
            if reconciler.has_snmp() { "enabled" } else { "disabled" }
        );
        Ok(reconciler)
    }
}
