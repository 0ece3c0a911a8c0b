//! Device family capabilities.
//!
//! All keyword and range differences between switch families live here and
//! are selected once per operation from the resource model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource model string identifying NX-OS switches.
pub const NXOS_MODEL: &str = "Cisco NXOS Switch";

/// Switch operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceFamily {
    /// Cisco NX-OS (Nexus).
    Nxos,
    /// Cisco IOS and anything not recognized as NX-OS.
    Ios,
}

/// Per-family constants used when building device commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyCapabilities {
    /// Exclusive upper bound for port-channel ids.
    pub max_port_channel: u32,
    /// Keyword under which port-channels appear in the running config.
    pub channel_group_keyword: &'static str,
    /// `channel-group ... mode <keyword>` for new members.
    pub channel_mode_keyword: &'static str,
    /// Whether per-interface MTU can be configured.
    pub supports_mtu_config: bool,
}

impl DeviceFamily {
    /// Selects the family from a resource model string.
    pub fn from_model(model: &str) -> Self {
        if model == NXOS_MODEL {
            DeviceFamily::Nxos
        } else {
            DeviceFamily::Ios
        }
    }

    /// Returns the capability set for this family.
    pub fn capabilities(&self) -> FamilyCapabilities {
        match self {
            DeviceFamily::Nxos => FamilyCapabilities {
                max_port_channel: 4095,
                channel_group_keyword: "port-channel",
                channel_mode_keyword: "active",
                supports_mtu_config: false,
            },
            DeviceFamily::Ios => FamilyCapabilities {
                max_port_channel: 65,
                channel_group_keyword: "Port-channel",
                channel_mode_keyword: "auto",
                supports_mtu_config: true,
            },
        }
    }

    /// Returns the family name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceFamily::Nxos => "nxos",
            DeviceFamily::Ios => "ios",
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_model() {
        assert_eq!(DeviceFamily::from_model(NXOS_MODEL), DeviceFamily::Nxos);
        assert_eq!(
            DeviceFamily::from_model("Cisco IOS Switch"),
            DeviceFamily::Ios
        );
        assert_eq!(DeviceFamily::from_model(""), DeviceFamily::Ios);
    }

    #[test]
    fn test_capabilities() {
        let nxos = DeviceFamily::Nxos.capabilities();
        assert_eq!(nxos.max_port_channel, 4095);
        assert_eq!(nxos.channel_group_keyword, "port-channel");
        assert_eq!(nxos.channel_mode_keyword, "active");
        assert!(!nxos.supports_mtu_config);

        let ios = DeviceFamily::Ios.capabilities();
        assert_eq!(ios.max_port_channel, 65);
        assert_eq!(ios.channel_group_keyword, "Port-channel");
        assert_eq!(ios.channel_mode_keyword, "auto");
        assert!(ios.supports_mtu_config);
    }
}
