//! CLI mode tracking.
//!
//! ProCurve nests modes as a shallow stack:
//!
//! ```text
//! host>  ──enable──►  host#  ──configure terminal──►  host(config)#
//!        ◄─disable──         ◄─────────exit──────────   │    ▲
//!                                              interface│    │exit
//!                                                 / vlan▼    │
//!                                    host(eth-3)#  host(vlan-10)#
//! ```
//!
//! Interface and VLAN contexts replace each other rather than nest.

use std::fmt;

use crate::model::{InterfaceId, VlanId};

/// One entered CLI mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    Enable,
    Config,
    Interface(InterfaceId),
    Vlan(VlanId),
}

impl Mode {
    /// Command that enters this mode from its parent.
    pub fn enter_command(&self) -> String {
        match self {
            Mode::Enable => "enable".to_string(),
            Mode::Config => "configure terminal".to_string(),
            Mode::Interface(id) => match id {
                InterfaceId::Vlan(vlan) => format!("vlan {}", vlan),
                other => format!("interface {}", other),
            },
            Mode::Vlan(id) => format!("vlan {}", id),
        }
    }

    /// Command that leaves this mode for its parent.
    pub fn exit_command(&self) -> &'static str {
        match self {
            Mode::Enable => "disable",
            _ => "exit",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Enable => f.write_str("Enable"),
            Mode::Config => f.write_str("Config"),
            Mode::Interface(id) => write!(f, "Interface({})", id),
            Mode::Vlan(id) => write!(f, "Vlan({})", id),
        }
    }
}

/// Where the CLI currently is, as seen from its prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CliState {
    /// `host>`
    TopLevel,
    /// `host#`
    Enabled,
    /// `host(config)#`
    GlobalConfig,
    /// `host(eth-3)#`
    InterfaceConfig(InterfaceId),
    /// `host(vlan-10)#`
    VlanConfig(VlanId),
}

impl CliState {
    /// Context that configures `interface`. Routed VLAN interfaces are
    /// configured from the VLAN context.
    pub fn for_interface(interface: &InterfaceId) -> CliState {
        match interface {
            InterfaceId::Vlan(id) => CliState::VlanConfig(*id),
            other => CliState::InterfaceConfig(other.clone()),
        }
    }

    /// Whether this is one of the configuration modes.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            CliState::GlobalConfig | CliState::InterfaceConfig(_) | CliState::VlanConfig(_)
        )
    }

    /// The context stack that produces this state.
    pub fn modes(&self) -> Vec<Mode> {
        match self {
            CliState::TopLevel => vec![],
            CliState::Enabled => vec![Mode::Enable],
            CliState::GlobalConfig => vec![Mode::Enable, Mode::Config],
            CliState::InterfaceConfig(id) => {
                vec![Mode::Enable, Mode::Config, Mode::Interface(id.clone())]
            }
            CliState::VlanConfig(id) => vec![Mode::Enable, Mode::Config, Mode::Vlan(*id)],
        }
    }

    /// State derived from a context stack.
    pub fn from_modes(modes: &[Mode]) -> CliState {
        match modes {
            [] => CliState::TopLevel,
            [Mode::Enable] => CliState::Enabled,
            [.., Mode::Interface(id)] => CliState::InterfaceConfig(id.clone()),
            [.., Mode::Vlan(id)] => CliState::VlanConfig(*id),
            _ => CliState::GlobalConfig,
        }
    }

    /// Whether `target` can be reached from this state with a single command.
    pub fn can_reach(&self, target: &CliState) -> bool {
        if self == target {
            return true;
        }
        match self {
            CliState::TopLevel => *target == CliState::Enabled,
            CliState::Enabled => matches!(target, CliState::TopLevel | CliState::GlobalConfig),
            // `end` reaches Enabled, `exit` GlobalConfig, and sub-contexts switch directly
            CliState::GlobalConfig | CliState::InterfaceConfig(_) | CliState::VlanConfig(_) => {
                *target != CliState::TopLevel
            }
        }
    }
}

impl fmt::Display for CliState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliState::TopLevel => f.write_str("TopLevel"),
            CliState::Enabled => f.write_str("Enabled"),
            CliState::GlobalConfig => f.write_str("GlobalConfig"),
            CliState::InterfaceConfig(id) => write!(f, "InterfaceConfig({})", id),
            CliState::VlanConfig(id) => write!(f, "VlanConfig({})", id),
        }
    }
}

/// Ordered stack of entered modes.
///
/// The top of the stack always mirrors the last prompt seen from the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliContext {
    stack: Vec<Mode>,
}

impl CliContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose derived state is `state`.
    pub fn from_state(state: &CliState) -> Self {
        Self {
            stack: state.modes(),
        }
    }

    /// State derived from the top of the stack.
    pub fn state(&self) -> CliState {
        CliState::from_modes(&self.stack)
    }

    /// Replace the stack to match `state`.
    pub fn adopt(&mut self, state: &CliState) {
        self.stack = state.modes();
    }

    /// Forget every entered mode.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn modes(&self) -> &[Mode] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl fmt::Display for CliContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, mode) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", mode)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlan(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    #[test]
    fn test_state_derivation() {
        let mut ctx = CliContext::new();
        assert_eq!(ctx.state(), CliState::TopLevel);

        ctx.adopt(&CliState::InterfaceConfig(InterfaceId::port("3")));
        assert_eq!(ctx.depth(), 3);
        assert_eq!(ctx.to_string(), "[Enable, Config, Interface(3)]");
        assert_eq!(ctx.state(), CliState::InterfaceConfig(InterfaceId::port("3")));

        ctx.adopt(&CliState::GlobalConfig);
        assert_eq!(ctx.state(), CliState::GlobalConfig);

        ctx.reset();
        assert_eq!(ctx.state(), CliState::TopLevel);
    }

    #[test]
    fn test_from_state_round_trips() {
        for state in [
            CliState::TopLevel,
            CliState::Enabled,
            CliState::GlobalConfig,
            CliState::InterfaceConfig(InterfaceId::Trunk("Trk1".into())),
            CliState::VlanConfig(vlan(10)),
        ] {
            assert_eq!(CliContext::from_state(&state).state(), state);
        }
    }

    #[test]
    fn test_one_step_reachability() {
        let iface = CliState::InterfaceConfig(InterfaceId::port("3"));
        let vlan10 = CliState::VlanConfig(vlan(10));

        assert!(CliState::TopLevel.can_reach(&CliState::Enabled));
        assert!(!CliState::TopLevel.can_reach(&CliState::GlobalConfig));
        assert!(CliState::Enabled.can_reach(&CliState::GlobalConfig));
        assert!(!CliState::Enabled.can_reach(&iface));
        assert!(CliState::GlobalConfig.can_reach(&iface));
        assert!(iface.can_reach(&vlan10));
        assert!(iface.can_reach(&CliState::Enabled));
        assert!(!vlan10.can_reach(&CliState::TopLevel));
    }

    #[test]
    fn test_mode_commands() {
        assert_eq!(Mode::Interface(InterfaceId::port("A1")).enter_command(), "interface A1");
        assert_eq!(Mode::Vlan(vlan(20)).enter_command(), "vlan 20");
        assert_eq!(Mode::Enable.exit_command(), "disable");
        assert_eq!(Mode::Config.exit_command(), "exit");
    }
}
