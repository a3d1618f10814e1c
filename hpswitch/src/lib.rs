//! # hpswitch
//!
//! Async configuration and inventory of HP ProCurve switches over their
//! interactive CLI, with optional SNMP.
//!
//! The crate drives a ProCurve shell the way an operator would: every
//! command is followed by a prompt, and the prompt says which mode the
//! switch is in. A command only counts as done when the prompt announces
//! the state the caller expected.
//!
//! ## Layers
//!
//! - [`transport`]: SSH over russh, and the [`SnmpTransport`] contract
//! - [`channel`]: tail-searched output buffer with ANSI stripping
//! - [`session`]: the prompt-tracking CLI state machine
//! - [`encoder`]: pure translation of intents into command plans
//! - [`parser`]: ProCurve `show` output into typed records
//! - [`snmp`]: Q-BRIDGE and IF-MIB reads and SET plans
//! - [`reconciler`]: apply, read back and verify
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hpswitch::{Credentials, Device, Intent, SwitchBuilder, VlanId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hpswitch::Error> {
//!     let device = Device::new("10.0.0.2", Credentials::password("manager", "secret"));
//!     let switch = SwitchBuilder::new(device).connect().await?;
//!
//!     let result = switch
//!         .apply(&Intent::CreateVlan { id: VlanId::new(10)?, name: "eng".into() })
//!         .await;
//!     println!("{:?}", result.commands());
//!     result.into_result()?;
//!
//!     switch.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod encoder;
pub mod error;
pub mod model;
pub mod parser;
pub mod platform;
pub mod reconciler;
pub mod session;
pub mod snmp;
pub mod transport;

pub use encoder::{Closing, Intent, Plan, Step};
pub use error::{Error, Result, TransportError};
pub use model::{
    AdminState, Capabilities, CommandResult, Credentials, Device, Failure, Interface, InterfaceId,
    IpAssignment, LinkState, Payload, Quirks, StaticRoute, SwitchFamily, Tagging, TrunkMembership,
    Vlan, VlanId,
};
pub use platform::PlatformDefinition;
pub use reconciler::{Query, Reconciler, SwitchBuilder};
pub use session::{CliSession, CliState, RunOutput, SessionConfig, SessionStatus};
pub use transport::{
    AuthMethod, CliTransport, HostKeyVerification, NoSnmp, Oid, SnmpTransport, SnmpValue,
    SshConfig, SshTransport,
};
