//! Saved port state.
//!
//! Before a reservation stages link settings on a port, the port's current
//! speed and MTU are written into its description as
//! `speed=<value>;mtu=<value>` (an empty value means "not set"). Restoring
//! reads the description back, reapplies or clears each setting, shuts the
//! port and clears the description.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::{debug, info};

use swcfg_common::{CfgMgrResult, CommandSession, ConfigBlock};

use crate::commands::{
    build_description_cmd, build_interface_cmd, build_mtu_cmd,
    build_show_running_config_interface_cmd, build_speed_cmd, NO_DESCRIPTION, NO_MTU,
    NO_SHUTDOWN, NO_SPEED, SHUTDOWN,
};

/// Encoded state, each value ending at the `;` delimiter or the end of
/// the token.
static ENCODED_STATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"speed=([^;\s"]*);mtu=([^;\s"]*)"#).expect("Invalid regex pattern")
});

/// Speed and MTU of an interface; `None` means no explicit value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortState {
    /// Explicit link speed.
    pub speed: Option<u32>,
    /// Explicit MTU.
    pub mtu: Option<u32>,
}

impl PortState {
    /// Creates a state from explicit values.
    pub fn new(speed: Option<u32>, mtu: Option<u32>) -> Self {
        Self { speed, mtu }
    }

    /// Reads `speed <n>` and `mtu <n>` lines from an interface's running
    /// config.
    pub fn from_running_config(output: &str) -> Self {
        let block = ConfigBlock::new(output);
        Self {
            speed: block.numeric_field("speed"),
            mtu: block.numeric_field("mtu"),
        }
    }

    /// Decodes a description written by [`PortState::encode`]. Returns
    /// `None` if the description does not carry a saved state.
    pub fn decode(description: &str) -> Option<Self> {
        let caps = ENCODED_STATE_RE.captures(description)?;
        let value = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        Some(Self {
            speed: value(1),
            mtu: value(2),
        })
    }

    /// Encodes the state for the description field.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        write!(f, "speed={};mtu={}", show(self.speed), show(self.mtu))
    }
}

/// Records the interface's current speed/MTU in its description and brings
/// it up.
pub async fn save_port<S>(session: &mut S, interface: &str) -> CfgMgrResult<PortState>
where
    S: CommandSession + ?Sized,
{
    let output = session
        .send_command(&build_show_running_config_interface_cmd(interface))
        .await?;
    let state = PortState::from_running_config(&output);

    session
        .send_config_command(&build_interface_cmd(interface))
        .await?;
    session.send_config_command(NO_SHUTDOWN).await?;
    session
        .send_config_command(&build_description_cmd(&state.encode()))
        .await?;

    info!(interface = %interface, state = %state, "Saved port configuration");
    Ok(state)
}

/// Puts back the speed/MTU recorded by [`save_port`], shuts the interface
/// and clears the description. A missing record clears both settings.
pub async fn restore_port<S>(session: &mut S, interface: &str) -> CfgMgrResult<PortState>
where
    S: CommandSession + ?Sized,
{
    let output = session
        .send_command(&build_show_running_config_interface_cmd(interface))
        .await?;
    let saved = ConfigBlock::new(&output)
        .field("description")
        .and_then(PortState::decode);
    if saved.is_none() {
        debug!(interface = %interface, "No saved port state in description");
    }
    let saved = saved.unwrap_or_default();

    session
        .send_config_command(&build_interface_cmd(interface))
        .await?;
    match saved.speed {
        Some(speed) => {
            session
                .send_config_command(&build_speed_cmd(&speed.to_string()))
                .await?
        }
        None => session.send_config_command(NO_SPEED).await?,
    };
    match saved.mtu {
        Some(mtu) => {
            session
                .send_config_command(&build_mtu_cmd(&mtu.to_string()))
                .await?
        }
        None => session.send_config_command(NO_MTU).await?,
    };
    session.send_config_command(SHUTDOWN).await?;
    session.send_config_command(NO_DESCRIPTION).await?;

    info!(interface = %interface, state = %saved, "Restored port configuration");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swcfg_test::{assert_sent_in_order, FakeDevice};

    #[test]
    fn test_encode() {
        assert_eq!(
            PortState::new(Some(1000), Some(9216)).encode(),
            "speed=1000;mtu=9216"
        );
        assert_eq!(PortState::new(None, Some(1500)).encode(), "speed=;mtu=1500");
        assert_eq!(PortState::default().encode(), "speed=;mtu=");
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            PortState::decode("speed=1000;mtu=9216"),
            Some(PortState::new(Some(1000), Some(9216)))
        );
        assert_eq!(
            PortState::decode("speed=;mtu="),
            Some(PortState::default())
        );
        assert_eq!(
            PortState::decode("\"speed=100;mtu=\""),
            Some(PortState::new(Some(100), None))
        );
        assert_eq!(PortState::decode("uplink to spine1"), None);
    }

    #[test]
    fn test_decode_mtu_stops_at_delimiter() {
        assert_eq!(
            PortState::decode("speed=1000;mtu=1500;owner=lab"),
            Some(PortState::new(Some(1000), Some(1500)))
        );
        assert_eq!(
            PortState::decode("speed=1000;mtu=1500 trailing words"),
            Some(PortState::new(Some(1000), Some(1500)))
        );
    }

    #[test]
    fn test_from_running_config() {
        let output = "interface Ethernet1/1\n  speed 10000\n  mtu 9216\n  no shutdown\n";
        assert_eq!(
            PortState::from_running_config(output),
            PortState::new(Some(10000), Some(9216))
        );
        assert_eq!(
            PortState::from_running_config("interface Ethernet1/1\n"),
            PortState::default()
        );
    }

    #[tokio::test]
    async fn test_save_port_commands() {
        let mut dev = FakeDevice::nxos().with_interface("Ethernet1/1", &["speed 1000", "shutdown"]);
        let state = save_port(&mut dev, "Ethernet1/1").await.unwrap();
        assert_eq!(state, PortState::new(Some(1000), None));

        assert_sent_in_order(
            dev.commands(),
            &[
                "show running-config interface Ethernet1/1",
                "interface Ethernet1/1",
                "no shutdown",
                "description speed=1000;mtu=",
            ],
        )
        .unwrap();
        assert!(!dev.is_shutdown("Ethernet1/1"));
    }

    #[tokio::test]
    async fn test_restore_port_without_saved_state_clears() {
        let mut dev = FakeDevice::nxos().with_interface("Ethernet1/1", &["speed 1000", "mtu 9216"]);
        let state = restore_port(&mut dev, "Ethernet1/1").await.unwrap();
        assert_eq!(state, PortState::default());
        assert_eq!(
            dev.config_commands(),
            &[
                "interface Ethernet1/1",
                "no speed",
                "no mtu",
                "shutdown",
                "no description",
            ]
        );
        assert_eq!(dev.speed("Ethernet1/1"), None);
        assert_eq!(dev.mtu("Ethernet1/1"), None);
        assert!(dev.is_shutdown("Ethernet1/1"));
    }

    #[tokio::test]
    async fn test_restore_port_reapplies_saved_values() {
        let mut dev = FakeDevice::ios().with_interface(
            "Ethernet1/2",
            &["description speed=1000;mtu=1500", "speed 10000", "mtu 9216"],
        );
        restore_port(&mut dev, "Ethernet1/2").await.unwrap();
        assert_eq!(dev.speed("Ethernet1/2"), Some(1000));
        assert_eq!(dev.mtu("Ethernet1/2"), Some(1500));
        assert_eq!(dev.description("Ethernet1/2"), None);
    }
}
