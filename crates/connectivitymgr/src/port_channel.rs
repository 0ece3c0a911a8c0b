//! Port-channel id allocation and related types.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

use swcfg_common::{CfgMgrError, CfgMgrResult, CommandSession, ConfigBlock, FamilyCapabilities};

use crate::commands::build_show_running_include_cmd;

/// A VLAN assignment line in an interface's running config.
pub static VLAN_ASSIGNMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"switchport.*vlan.*\d+").expect("Invalid regex pattern"));

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid regex pattern"));

/// Collects the ids of the port-channels declared in `output`
/// (`interface <keyword><id>` lines).
pub fn used_port_channel_ids(output: &str, keyword: &str) -> BTreeSet<u32> {
    ConfigBlock::new(output)
        .lines()
        .filter_map(|line| line.strip_prefix("interface "))
        .filter_map(|rest| rest.trim_start().strip_prefix(keyword))
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

/// Returns the lowest id in `1..max` not in `used`.
pub fn lowest_free_id(used: &BTreeSet<u32>, max: u32) -> CfgMgrResult<u32> {
    (1..max)
        .find(|id| !used.contains(id))
        .ok_or(CfgMgrError::PortChannelExhausted { max })
}

/// Reads the declared port-channels from the device and picks the lowest
/// free id.
pub async fn allocate_port_channel_id<S>(
    session: &mut S,
    caps: &FamilyCapabilities,
) -> CfgMgrResult<u32>
where
    S: CommandSession + ?Sized,
{
    let output = session
        .send_command(&build_show_running_include_cmd(caps.channel_group_keyword))
        .await?;
    let used = used_port_channel_ids(&output, caps.channel_group_keyword);
    debug!(used = ?used, "Existing port-channels");

    lowest_free_id(&used, caps.max_port_channel).map_err(|e| {
        error!(max = caps.max_port_channel, "Could not find available port channel");
        e
    })
}

/// Extracts the port-channel id from a reference such as
/// `leaf1/Port-channel12` or `port-channel 12`.
pub fn port_channel_id(reference: &str) -> CfgMgrResult<u32> {
    let last = reference.rsplit('/').next().unwrap_or_default();
    DIGITS_RE
        .find(last)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| CfgMgrError::InvalidPortChannel {
            reference: reference.to_string(),
        })
}

/// Spanning-tree mode for a new port-channel and its members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StpMode {
    /// Leave spanning-tree at the device default.
    #[default]
    Default,
    /// Edge ports (`spanning-tree port type edge [trunk]`).
    Edge,
}

impl FromStr for StpMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("edge") {
            StpMode::Edge
        } else {
            StpMode::Default
        })
    }
}

/// Why a port was left out of a port-channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The port's connection could not be resolved.
    Unresolved(String),
    /// The switch interface already carries a VLAN assignment.
    VlanConfigured {
        /// The switch interface.
        interface: String,
    },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Unresolved(msg) => write!(f, "connection not resolved: {}", msg),
            ExclusionReason::VlanConfigured { interface } => {
                write!(f, "interface {} has a vlan", interface)
            }
        }
    }
}

/// A port left out of a port-channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    /// The port as requested.
    pub port: String,
    /// Why it was excluded.
    pub reason: ExclusionReason,
}

/// Result of creating a port-channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortChannelOutcome {
    /// Allocated port-channel id.
    pub id: u32,
    /// Switch interfaces joined to the port-channel, in request order.
    pub members: Vec<String>,
    /// Ports left out, in request order.
    pub excluded: Vec<Exclusion>,
}

impl fmt::Display for PortChannelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port-Channel {} Configuration Completed", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swcfg_common::DeviceFamily;
    use swcfg_test::FakeDevice;

    #[test]
    fn test_used_port_channel_ids() {
        let output = "\
interface port-channel1
interface port-channel2
  channel-group 2 mode active
interface port-channel4
interface Ethernet1/1
";
        let used = used_port_channel_ids(output, "port-channel");
        assert_eq!(used, BTreeSet::from([1, 2, 4]));
    }

    #[test]
    fn test_lowest_free_id_minimal() {
        let used = BTreeSet::from([1, 2, 4]);
        assert_eq!(lowest_free_id(&used, 65).unwrap(), 3);
        assert_eq!(lowest_free_id(&BTreeSet::new(), 65).unwrap(), 1);
    }

    #[test]
    fn test_lowest_free_id_exhausted() {
        let used: BTreeSet<u32> = (1..65).collect();
        assert!(matches!(
            lowest_free_id(&used, 65),
            Err(CfgMgrError::PortChannelExhausted { max: 65 })
        ));

        // ids at or above the ceiling do not count
        let used: BTreeSet<u32> = (2..200).collect();
        assert_eq!(lowest_free_id(&used, 65).unwrap(), 1);
    }

    #[test]
    fn test_port_channel_id() {
        assert_eq!(port_channel_id("leaf1/Port-channel12").unwrap(), 12);
        assert_eq!(port_channel_id("port-channel 7").unwrap(), 7);
        assert_eq!(port_channel_id("12").unwrap(), 12);
        assert!(matches!(
            port_channel_id("leaf1/12/Port-channel"),
            Err(CfgMgrError::InvalidPortChannel { .. })
        ));
    }

    #[test]
    fn test_stp_mode() {
        assert_eq!("edge".parse::<StpMode>().unwrap(), StpMode::Edge);
        assert_eq!("Edge".parse::<StpMode>().unwrap(), StpMode::Edge);
        assert_eq!("".parse::<StpMode>().unwrap(), StpMode::Default);
        assert_eq!("network".parse::<StpMode>().unwrap(), StpMode::Default);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = PortChannelOutcome {
            id: 12,
            members: vec!["Ethernet1/1".to_string()],
            excluded: Vec::new(),
        };
        assert_eq!(outcome.to_string(), "Port-Channel 12 Configuration Completed");
    }

    #[tokio::test]
    async fn test_allocate_from_device() {
        let mut dev = FakeDevice::ios()
            .with_interface("Port-channel1", &["switchport"])
            .with_interface("Port-channel3", &["switchport"]);
        let caps = DeviceFamily::Ios.capabilities();
        let id = allocate_port_channel_id(&mut dev, &caps).await.unwrap();
        assert_eq!(id, 2);
        assert_eq!(
            dev.commands(),
            &["show running-config | include Port-channel"]
        );
    }
}
