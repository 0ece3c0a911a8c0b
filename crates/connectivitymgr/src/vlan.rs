//! Base VLAN configuration.
//!
//! [`VlanConfigurator`] assigns and removes VLANs on already resolved switch
//! interfaces. The connectivity manager wraps it with port state handling.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use swcfg_common::{CfgMgrError, CfgMgrResult, CommandSession};

use crate::commands::{
    build_access_vlan_cmd, build_interface_cmd, build_switchport_mode_cmd,
    build_trunk_add_vlan_cmd, build_trunk_remove_vlan_cmd, NO_ACCESS_VLAN, NO_SWITCHPORT_MODE,
    SWITCHPORT,
};

/// Lowest usable VLAN id.
pub const MIN_VLAN_ID: u16 = 1;

/// Highest usable VLAN id.
pub const MAX_VLAN_ID: u16 = 4094;

/// Switchport mode of a VLAN assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PortMode {
    /// Untagged single VLAN.
    #[default]
    Access,
    /// Tagged VLAN list.
    Trunk,
}

impl PortMode {
    /// Device keyword for the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortMode::Access => "access",
            PortMode::Trunk => "trunk",
        }
    }
}

impl fmt::Display for PortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PortMode {
    type Err = CfgMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "access" => Ok(PortMode::Access),
            "trunk" => Ok(PortMode::Trunk),
            other => Err(CfgMgrError::invalid_config(
                "port_mode",
                format!("unknown port mode '{}'", other),
            )),
        }
    }
}

/// A validated VLAN range such as `10`, `10-20` or `10,20-30`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanRange {
    text: String,
    segments: Vec<(u16, u16)>,
}

impl VlanRange {
    /// Parses and validates a range.
    pub fn parse(range: &str) -> CfgMgrResult<Self> {
        let text: String = range.split_whitespace().collect();
        if text.is_empty() {
            return Err(CfgMgrError::invalid_vlan_range(range, "VLAN range is empty"));
        }

        let mut segments = Vec::new();
        for part in text.split(',') {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (parse_vlan_id(range, a)?, parse_vlan_id(range, b)?),
                None => {
                    let id = parse_vlan_id(range, part)?;
                    (id, id)
                }
            };
            if start > end {
                return Err(CfgMgrError::invalid_vlan_range(
                    range,
                    format!("range {}-{} is reversed", start, end),
                ));
            }
            segments.push((start, end));
        }

        Ok(Self { text, segments })
    }

    /// Range as sent to the device.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if `vlan` is part of the range.
    pub fn contains(&self, vlan: u16) -> bool {
        self.segments.iter().any(|(a, b)| (*a..=*b).contains(&vlan))
    }

    /// Number of VLAN ids covered by the segments.
    pub fn len(&self) -> usize {
        self.segments
            .iter()
            .map(|(a, b)| usize::from(b - a) + 1)
            .sum()
    }

    /// Always false for a parsed range.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for VlanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for VlanRange {
    type Err = CfgMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_vlan_id(range: &str, token: &str) -> CfgMgrResult<u16> {
    let id: u16 = token.parse().map_err(|_| {
        CfgMgrError::invalid_vlan_range(range, format!("'{}' is not a VLAN id", token))
    })?;
    if !(MIN_VLAN_ID..=MAX_VLAN_ID).contains(&id) {
        return Err(CfgMgrError::invalid_vlan_range(
            range,
            format!("VLAN {} is outside {}-{}", id, MIN_VLAN_ID, MAX_VLAN_ID),
        ));
    }
    Ok(id)
}

/// Assigns and removes VLANs on a switch interface.
#[async_trait]
pub trait VlanConfigurator: Send + Sync {
    /// Assigns `vlans` to `interface`. With `qnq` the port becomes a
    /// dot1q tunnel for the range; `ctag` is the customer tag carried
    /// through it.
    async fn add_vlan(
        &self,
        session: &mut dyn CommandSession,
        interface: &str,
        vlans: &VlanRange,
        mode: PortMode,
        qnq: bool,
        ctag: Option<&str>,
    ) -> CfgMgrResult<()>;

    /// Removes `vlans` from `interface`.
    async fn remove_vlan(
        &self,
        session: &mut dyn CommandSession,
        interface: &str,
        vlans: &VlanRange,
        mode: PortMode,
    ) -> CfgMgrResult<()>;
}

/// VLAN configuration for NX-OS and IOS switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CiscoVlanConfigurator;

#[async_trait]
impl VlanConfigurator for CiscoVlanConfigurator {
    async fn add_vlan(
        &self,
        session: &mut dyn CommandSession,
        interface: &str,
        vlans: &VlanRange,
        mode: PortMode,
        qnq: bool,
        ctag: Option<&str>,
    ) -> CfgMgrResult<()> {
        session
            .send_config_command(&build_interface_cmd(interface))
            .await?;
        session.send_config_command(SWITCHPORT).await?;

        if qnq {
            if let Some(ctag) = ctag {
                debug!(interface = %interface, ctag = %ctag, "Customer tag passes through tunnel");
            }
            session
                .send_config_command(&build_switchport_mode_cmd("dot1q-tunnel"))
                .await?;
            session
                .send_config_command(&build_access_vlan_cmd(vlans.as_str()))
                .await?;
        } else {
            session
                .send_config_command(&build_switchport_mode_cmd(mode.as_str()))
                .await?;
            let cmd = match mode {
                PortMode::Access => build_access_vlan_cmd(vlans.as_str()),
                PortMode::Trunk => build_trunk_add_vlan_cmd(vlans.as_str()),
            };
            session.send_config_command(&cmd).await?;
        }

        info!(interface = %interface, vlans = %vlans, mode = %mode, qnq, "Assigned VLANs");
        Ok(())
    }

    async fn remove_vlan(
        &self,
        session: &mut dyn CommandSession,
        interface: &str,
        vlans: &VlanRange,
        mode: PortMode,
    ) -> CfgMgrResult<()> {
        session
            .send_config_command(&build_interface_cmd(interface))
            .await?;
        match mode {
            PortMode::Access => session.send_config_command(NO_ACCESS_VLAN).await?,
            PortMode::Trunk => {
                session
                    .send_config_command(&build_trunk_remove_vlan_cmd(vlans.as_str()))
                    .await?
            }
        };
        session.send_config_command(NO_SWITCHPORT_MODE).await?;

        info!(interface = %interface, vlans = %vlans, mode = %mode, "Removed VLANs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swcfg_test::FakeDevice;

    #[test]
    fn test_vlan_range_parse() {
        let range = VlanRange::parse("10, 20-22").unwrap();
        assert_eq!(range.as_str(), "10,20-22");
        assert_eq!(range.len(), 4);
        assert!(range.contains(21));
        assert!(!range.contains(11));

        assert_eq!(VlanRange::parse("4094").unwrap().to_string(), "4094");
    }

    #[test]
    fn test_vlan_range_rejects_invalid() {
        for bad in ["", "0", "4095", "abc", "10-", "20-10", "10,,20"] {
            assert!(
                matches!(
                    VlanRange::parse(bad),
                    Err(CfgMgrError::InvalidVlanRange { .. })
                ),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_port_mode_from_str() {
        assert_eq!("Trunk".parse::<PortMode>().unwrap(), PortMode::Trunk);
        assert_eq!("access".parse::<PortMode>().unwrap(), PortMode::Access);
        assert!("hybrid".parse::<PortMode>().is_err());
    }

    #[tokio::test]
    async fn test_trunk_add_and_remove() {
        let mut dev = FakeDevice::nxos().with_interface("Ethernet1/1", &[]);
        let vlans = VlanRange::parse("10-12").unwrap();
        let cfg = CiscoVlanConfigurator;

        cfg.add_vlan(&mut dev, "Ethernet1/1", &vlans, PortMode::Trunk, false, None)
            .await
            .unwrap();
        assert_eq!(
            dev.config_commands(),
            &[
                "interface Ethernet1/1",
                "switchport",
                "switchport mode trunk",
                "switchport trunk allowed vlan add 10-12",
            ]
        );

        dev.clear_log();
        cfg.remove_vlan(&mut dev, "Ethernet1/1", &vlans, PortMode::Trunk)
            .await
            .unwrap();
        assert_eq!(
            dev.config_commands(),
            &[
                "interface Ethernet1/1",
                "switchport trunk allowed vlan remove 10-12",
                "no switchport mode",
            ]
        );
        assert_eq!(
            dev.interface_config("Ethernet1/1").unwrap(),
            &["switchport".to_string()]
        );
    }

    #[tokio::test]
    async fn test_qnq_uses_dot1q_tunnel() {
        let mut dev = FakeDevice::ios();
        let vlans = VlanRange::parse("100").unwrap();
        CiscoVlanConfigurator
            .add_vlan(&mut dev, "Ethernet1/3", &vlans, PortMode::Trunk, true, Some("200"))
            .await
            .unwrap();
        assert_eq!(
            dev.config_commands(),
            &[
                "interface Ethernet1/3",
                "switchport",
                "switchport mode dot1q-tunnel",
                "switchport access vlan 100",
            ]
        );

        dev.clear_log();
        CiscoVlanConfigurator
            .remove_vlan(&mut dev, "Ethernet1/3", &vlans, PortMode::Access)
            .await
            .unwrap();
        assert_eq!(
            dev.interface_config("Ethernet1/3").unwrap(),
            &["switchport".to_string()]
        );
    }
}
