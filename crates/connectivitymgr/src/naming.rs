//! Interface name resolution.
//!
//! Resource paths use `-` as a generic separator inside the last segment
//! (`leaf1/Chassis 1/Ethernet1-1`), while the device wants `/` between slot
//! and port (`Ethernet1/1`). Aggregate interfaces are the exception: their
//! device name keeps `-` (`port-channel12`).

use tracing::error;

use swcfg_common::{CfgMgrError, CfgMgrResult, ResourceMap, TopologyService};

/// A reservation port resolved to its resource path and device name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterface {
    /// Full resource path of the switch port.
    pub full_path: String,
    /// Device-native interface name.
    pub name: String,
}

/// Derives the device-native interface name from a full resource path.
pub fn native_name(full_path: &str) -> CfgMgrResult<String> {
    if !full_path.contains('/') {
        error!(path = %full_path, "Interface was not found");
        return Err(CfgMgrError::interface_not_found(full_path));
    }

    let last = full_path.rsplit('/').next().unwrap_or_default();
    let name = last.replace('-', "/");
    if name.to_lowercase().contains("channel") {
        return Ok(name.replace('/', "-"));
    }
    Ok(name)
}

/// Resolves a reservation port through the switch resource tree.
pub async fn resolve_interface<T>(
    topology: &T,
    resource_map: &ResourceMap,
    port: &str,
) -> CfgMgrResult<ResolvedInterface>
where
    T: TopologyService + ?Sized,
{
    let full_path = match topology
        .resolve_resource_full_path(port, resource_map)
        .await?
    {
        Some(path) => path,
        None => {
            error!(port = %port, "Interface was not found");
            return Err(CfgMgrError::interface_not_found(port));
        }
    };
    let name = native_name(&full_path)?;
    Ok(ResolvedInterface { full_path, name })
}

/// Splits a comma-separated port list, dropping empty entries.
pub fn split_ports(ports: &str) -> Vec<String> {
    ports
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
