//! Test infrastructure for reservation switch configuration managers
//!
//! Provides:
//! - A stateful fake switch that answers `show` commands from its own
//!   running configuration and applies config-mode commands to it
//! - Topology fixtures for switches, DUT ports and connectors
//! - Command-sequence verification helpers

pub mod device;
pub mod fixtures;
mod verification;

pub use device::FakeDevice;
pub use fixtures::*;
pub use verification::*;
