//! Platform definitions for the supported switch families.
//!
//! A definition carries everything family-specific the CLI session needs:
//! prompt grammar, the interstitial prompts that must be answered during a
//! read, failure banners and the commands issued when a session opens.

mod definition;
mod procurve;

pub use definition::{PlatformDefinition, PromptKind};
pub use procurve::{aruba_platform, platform as procurve_platform};

use crate::model::SwitchFamily;

/// Platform definition for a switch family.
pub fn for_family(family: SwitchFamily) -> Result<PlatformDefinition, regex::Error> {
    match family {
        SwitchFamily::ProCurve => procurve_platform(),
        SwitchFamily::ArubaOsSwitch => aruba_platform(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CliState;

    #[test]
    fn test_every_family_compiles() {
        for family in [SwitchFamily::ProCurve, SwitchFamily::ArubaOsSwitch] {
            let platform = for_family(family).unwrap();
            assert_eq!(platform.classify_prompt("HP-2920# "), Some(CliState::Enabled));
            assert_eq!(
                platform.prompt_kind(b"enable\r\nPassword: "),
                Some(PromptKind::Password)
            );
            assert_eq!(
                platform.prompt_kind(b"Press any key to continue"),
                Some(PromptKind::Continue)
            );
        }
    }
}
