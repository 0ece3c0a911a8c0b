//! Configuration file support for connectivitymgr
//!
//! Loads and validates connectivitymgr configuration from TOML files.
//! Default location: /etc/swcfg/connectivitymgr.conf

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use swcfg_common::shell::VSH_CMD;
use swcfg_common::{CfgMgrError, CfgMgrResult, ReservationContext, NXOS_MODEL};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/swcfg/connectivitymgr.conf";

/// Switch being configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Switch resource name in the topology
    #[serde(default)]
    pub resource_name: String,

    /// Switch resource model; selects the device family
    #[serde(default = "default_resource_model")]
    pub resource_model: String,

    /// CLI wrapper program used to run device commands
    #[serde(default = "default_cli_program")]
    pub cli_program: String,
}

/// Topology source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Topology snapshot file (YAML or JSON)
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

/// Complete connectivitymgr configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Device configuration
    #[serde(default)]
    pub device: DeviceConfig,

    /// Topology configuration
    #[serde(default)]
    pub topology: TopologyConfig,
}

fn default_resource_model() -> String {
    NXOS_MODEL.to_string()
}

fn default_cli_program() -> String {
    VSH_CMD.to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("/etc/swcfg/topology.yaml")
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            resource_name: String::new(),
            resource_model: default_resource_model(),
            cli_program: default_cli_program(),
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl ConnectivityConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> CfgMgrResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CfgMgrError::invalid_config(
                    path.display().to_string(),
                    format!("Failed to parse config file: {}", e),
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(CfgMgrError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> CfgMgrResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Validate configuration
    pub fn validate(&self) -> CfgMgrResult<()> {
        if self.device.resource_name.trim().is_empty() {
            return Err(CfgMgrError::invalid_config(
                "device.resource_name",
                "must not be empty",
            ));
        }

        if self.device.cli_program.trim().is_empty() {
            return Err(CfgMgrError::invalid_config(
                "device.cli_program",
                "must not be empty",
            ));
        }

        if self.topology.snapshot_path.as_os_str().is_empty() {
            return Err(CfgMgrError::invalid_config(
                "topology.snapshot_path",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Builds the reservation context for `reservation_id`.
    pub fn reservation_context(&self, reservation_id: &str) -> ReservationContext {
        ReservationContext::new(
            self.device.resource_name.clone(),
            self.device.resource_model.clone(),
            reservation_id,
        )
    }
}
