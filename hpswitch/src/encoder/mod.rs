//! Translation of configuration intents into CLI command plans.
//!
//! Encoding is pure: it looks only at the intent, the CLI state the plan
//! starts from, the trunk snapshot and the family quirks. A plan enters the
//! context an intent needs, emits the action lines, returns to global
//! configuration and, with [`Closing::Restore`], navigates back to where it
//! started.
//!
//! ```
//! use hpswitch::encoder::{Closing, Intent, encode};
//! use hpswitch::{CliState, Quirks, TrunkMembership, VlanId};
//!
//! let plan = encode(
//!     &Intent::CreateVlan { id: VlanId::new(10)?, name: "eng".into() },
//!     &CliState::Enabled,
//!     &TrunkMembership::new(),
//!     &Quirks::default(),
//!     Closing::Restore,
//! )?;
//! assert_eq!(
//!     plan.commands(),
//!     ["configure terminal", "vlan 10", "name eng", "exit", "exit"]
//! );
//! # Ok::<(), hpswitch::Error>(())
//! ```

mod intent;
mod plan;

pub use intent::Intent;
pub use plan::{Closing, Plan, Step};

use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::model::{InterfaceId, IpAssignment, Quirks, StaticRoute, TrunkMembership, mask_from_prefix};
use crate::session::{CliState, Mode};

/// Encode `intent` into a plan starting at `start`.
///
/// Validation and the trunk check run first; on failure no step is
/// produced.
pub fn encode(
    intent: &Intent,
    start: &CliState,
    trunks: &TrunkMembership,
    quirks: &Quirks,
    closing: Closing,
) -> Result<Plan> {
    intent.validate()?;
    check_trunks(intent, trunks)?;
    check_routed(intent, quirks)?;

    let (context, lines) = action(intent, quirks);

    let mut steps = navigate(start, &context);
    steps.extend(lines.into_iter().map(|line| Step::new(line, context.clone())));
    steps.extend(navigate(&context, &CliState::GlobalConfig));

    if closing == Closing::Restore {
        // A deleted VLAN's context cannot be re-entered without recreating it.
        let home = match (intent, start) {
            (Intent::DeleteVlan { id }, CliState::VlanConfig(current)) if id == current => {
                CliState::GlobalConfig
            }
            _ => start.clone(),
        };
        steps.extend(navigate(&CliState::GlobalConfig, &home));
    }

    Ok(Plan::new(start.clone(), steps))
}

/// Steps leading from `from` to `to` along the context stack.
///
/// Modes above the common prefix are left with `exit` (`disable` for the
/// enable level), then the missing modes are entered one by one.
pub fn navigate(from: &CliState, to: &CliState) -> Vec<Step> {
    let from_modes = from.modes();
    let to_modes = to.modes();
    let common = from_modes
        .iter()
        .zip(&to_modes)
        .take_while(|(a, b)| a == b)
        .count();

    let mut stack: Vec<Mode> = from_modes;
    let mut steps = Vec::new();

    while stack.len() > common {
        let Some(mode) = stack.pop() else { break };
        steps.push(Step::new(mode.exit_command(), CliState::from_modes(&stack)));
    }
    for mode in &to_modes[common..] {
        stack.push(mode.clone());
        steps.push(Step::new(mode.enter_command(), CliState::from_modes(&stack)));
    }
    steps
}

pub(crate) fn check_trunks(intent: &Intent, trunks: &TrunkMembership) -> Result<()> {
    let Some(interface) = intent.interface() else {
        return Ok(());
    };
    if interface.is_trunk() {
        return Err(Error::unsupported(format!(
            "{} is a trunk; trunk configuration is not supported",
            interface
        )));
    }
    if let Some(trunk) = trunks.trunk_of(interface) {
        return Err(Error::unsupported(format!(
            "port {} is a member of trunk {}",
            interface, trunk
        )));
    }
    Ok(())
}

fn check_routed(intent: &Intent, quirks: &Quirks) -> Result<()> {
    match intent {
        Intent::SetIpAssignment(a) | Intent::ClearIpAssignment(a)
            if matches!(a.interface, InterfaceId::Port(_)) && !quirks.routed_ports =>
        {
            Err(Error::unsupported(format!(
                "port {} is not a routed port; assign addresses to a VLAN",
                a.interface
            )))
        }
        _ => Ok(()),
    }
}

/// The context an intent runs in and its action lines.
fn action(intent: &Intent, quirks: &Quirks) -> (CliState, Vec<String>) {
    match intent {
        Intent::CreateVlan { id, name } | Intent::RenameVlan { id, name } => (
            CliState::VlanConfig(*id),
            vec![format!("name {}", quote(name))],
        ),
        Intent::DeleteVlan { id } => (CliState::GlobalConfig, vec![format!("no vlan {}", id)]),
        Intent::TagVlan { interface, vlan } => (
            CliState::for_interface(interface),
            vec![format!("tagged vlan {}", vlan)],
        ),
        Intent::UntagVlan { interface, vlan } => (
            CliState::for_interface(interface),
            vec![format!("untagged vlan {}", vlan)],
        ),
        Intent::RemoveVlanMember {
            interface,
            vlan,
            tagging,
        } => (
            CliState::for_interface(interface),
            vec![format!("no {} vlan {}", tagging.keyword(), vlan)],
        ),
        Intent::SetIpAssignment(a) => (
            CliState::for_interface(&a.interface),
            vec![address_line(a, quirks)],
        ),
        Intent::ClearIpAssignment(a) => (
            CliState::for_interface(&a.interface),
            vec![format!("no {}", address_line(a, quirks))],
        ),
        Intent::SetInterfaceName { interface, name } => (
            CliState::for_interface(interface),
            vec![format!("name {}", quote(name))],
        ),
        Intent::ClearInterfaceName { interface } => {
            (CliState::for_interface(interface), vec!["no name".to_string()])
        }
        Intent::SetInterfaceEnabled { interface, enabled } => (
            CliState::for_interface(interface),
            vec![if *enabled { "enable" } else { "disable" }.to_string()],
        ),
        Intent::AddStaticRoute(route) => (CliState::GlobalConfig, vec![route_line(route, quirks)]),
        Intent::RemoveStaticRoute(route) => (
            CliState::GlobalConfig,
            vec![format!("no {}", route_line(route, quirks))],
        ),
    }
}

fn address_line(a: &IpAssignment, quirks: &Quirks) -> String {
    match a.address {
        IpAddr::V4(addr) if !quirks.cidr_addresses => {
            format!("ip address {} {}", addr, mask_from_prefix(a.prefix_len))
        }
        IpAddr::V4(_) => format!("ip address {}", a.cidr()),
        IpAddr::V6(_) => format!("ipv6 address {}", a.cidr()),
    }
}

fn route_line(route: &StaticRoute, quirks: &Quirks) -> String {
    match route.destination {
        IpAddr::V4(dst) if !quirks.cidr_addresses => format!(
            "ip route {} {} {}",
            dst,
            mask_from_prefix(route.prefix_len),
            route.gateway
        ),
        IpAddr::V4(_) => format!("ip route {} {}", route.destination_cidr(), route.gateway),
        IpAddr::V6(_) => format!("ipv6 route {} {}", route.destination_cidr(), route.gateway),
    }
}

/// Double-quote names containing spaces.
fn quote(name: &str) -> String {
    if name.contains(' ') {
        format!("\"{}\"", name)
    } else {
        name.to_string()
    }
}
