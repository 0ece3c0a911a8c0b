//! connectivitymgr - Reservation connectivity manager
//!
//! Reconfigures switch interfaces for a network reservation:
//! - Saves and restores per-port speed/MTU through the interface description
//! - Stages link speed and MTU from the reservation's connectors
//! - Assigns and removes VLANs
//! - Creates and deletes port-channels, allocating the lowest free id
//!
//! # Example
//!
//! ```ignore
//! use swcfg_common::{ReservationContext, ShellSession, TopologySnapshot};
//! use swcfg_connectivitymgr::{ConnectivityMgr, StpMode};
//!
//! let topology = TopologySnapshot::load("/etc/swcfg/topology.yaml")?;
//! let context = ReservationContext::new("leaf1", "Cisco NXOS Switch", "res-42");
//! let mut mgr = ConnectivityMgr::new(ShellSession::vsh(), topology, context);
//! let outcome = mgr.create_port_channel(&ports, StpMode::Edge).await?;
//! ```

pub mod commands;
pub mod config;
mod connectivity_mgr;
pub mod link_attrs;
pub mod naming;
pub mod port_channel;
pub mod port_state;
pub mod vlan;

pub use config::ConnectivityConfig;
pub use connectivity_mgr::{
    ConnectivityMgr, MTU_COMPLETED, MTU_UNSUPPORTED, RESTORE_COMPLETED, SAVE_COMPLETED,
    SPEED_COMPLETED, VLAN_ADD_COMPLETED, VLAN_REMOVE_COMPLETED,
};
pub use link_attrs::LinkSetting;
pub use naming::{native_name, split_ports, ResolvedInterface};
pub use port_channel::{Exclusion, ExclusionReason, PortChannelOutcome, StpMode};
pub use port_state::PortState;
pub use vlan::{CiscoVlanConfigurator, PortMode, VlanConfigurator, VlanRange};
