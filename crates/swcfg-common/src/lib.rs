//! Common infrastructure for reservation switch configuration managers.
//!
//! - [`session`]: the device command/response contract and a shell-backed session
//! - [`shell`]: safe shell command execution with proper quoting
//! - [`topology`]: the reservation/topology service contract and a file-backed snapshot
//! - [`parser`]: running-config field extraction
//! - [`family`]: device family capabilities (NX-OS vs IOS)
//! - [`context`]: the reservation context handed to every manager
//! - [`error`]: error types for cfgmgr operations
//!
//! # Example
//!
//! ```ignore
//! use swcfg_common::{CommandSession, ConfigBlock, ShellSession};
//!
//! let mut session = ShellSession::vsh();
//! let output = session.send_command("show running-config interface Ethernet1/1").await?;
//! let speed = ConfigBlock::new(&output).numeric_field("speed");
//! ```

pub mod context;
pub mod error;
pub mod family;
pub mod parser;
pub mod session;
pub mod shell;
pub mod topology;

// Re-export commonly used items at crate root
pub use context::ReservationContext;
pub use error::{CfgMgrError, CfgMgrResult};
pub use family::{DeviceFamily, FamilyCapabilities, NXOS_MODEL};
pub use parser::ConfigBlock;
pub use session::{CommandSession, ShellSession};
pub use topology::{
    ConnectionPaths, Connector, LinkAttribute, ResourceMap, TopologyService, TopologySnapshot,
};
