//! HP ProCurve / ArubaOS-Switch platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! HP-2920-24G>                       # operator (top level)
//! HP-2920-24G#                       # manager (enabled)
//! HP-2920-24G(config)#               # global configuration
//! HP-2920-24G(eth-3)#                # interface context
//! HP-2920-24G(eth-Trk1)#             # trunk interface context
//! HP-2920-24G(vlan-10)#              # VLAN context
//! ```
//!
//! Logging in shows a banner ending in "Press any key to continue" before
//! the first prompt. Long output is paged with `-- MORE --` unless
//! `no page` was issued.

use super::PlatformDefinition;
use crate::model::SwitchFamily;
use crate::parser::ERROR_BANNERS;

const PROMPT: &str = r"(?P<host>[\w.\-]{1,64})(?:\((?P<context>[\w\-/]{1,40})\))?(?P<sigil>[>#])";
const PASSWORD: &str = r"(?mi)^[ \t]*password:";
const CONTINUE: &str = r"(?i)press any key to continue[^\n]*";
const PAGER: &str = r"(?i)-- ?more ?--[^\n]*";
const CONFIRM: &str = r"(?i)\[y/n(?:/\^c)?\]\??";

/// Create the ProCurve platform definition.
pub fn platform() -> Result<PlatformDefinition, regex::Error> {
    family_platform("hp_procurve", SwitchFamily::ProCurve)
}

/// Create the ArubaOS-Switch platform definition.
///
/// ArubaOS-Switch kept the ProCurve CLI; only the name differs.
pub fn aruba_platform() -> Result<PlatformDefinition, regex::Error> {
    family_platform("aruba_os_switch", SwitchFamily::ArubaOsSwitch)
}

fn family_platform(name: &str, family: SwitchFamily) -> Result<PlatformDefinition, regex::Error> {
    let platform = PlatformDefinition::new(name, family, PROMPT, PASSWORD, CONTINUE, PAGER, CONFIRM)?
        .with_on_open_command("no page");

    Ok(ERROR_BANNERS
        .iter()
        .fold(platform, |p, banner| p.with_failure_pattern(*banner)))
}
