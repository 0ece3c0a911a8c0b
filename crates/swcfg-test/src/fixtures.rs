//! Topology fixtures.
//!
//! Builds a [`TopologySnapshot`] describing one switch (`leaf1`,
//! address `10.0.0.1`) whose port `n` is `leaf1/Chassis 1/Ethernet1-<n>`
//! at address `10.0.0.1/1/<n>`, cabled to DUT port `server<n>/nic0`.

use swcfg_common::{ConnectionPaths, Connector, ResourceMap, TopologySnapshot};

/// Switch resource name used by the fixtures.
pub const SWITCH_NAME: &str = "leaf1";

/// Switch address used by the fixtures.
pub const SWITCH_ADDRESS: &str = "10.0.0.1";

/// Reservation id used by the fixtures.
pub const RESERVATION_ID: &str = "res-42";

/// Full resource path of switch port `n`.
pub fn switch_port_path(n: u32) -> String {
    format!("{}/Chassis 1/Ethernet1-{}", SWITCH_NAME, n)
}

/// Address of switch port `n`, as referenced by reservation actions.
pub fn switch_port_address(n: u32) -> String {
    format!("{}/1/{}", SWITCH_ADDRESS, n)
}

/// Device-native name of switch port `n`.
pub fn switch_port_name(n: u32) -> String {
    format!("Ethernet1/{}", n)
}

/// Full resource path of the DUT port cabled to switch port `n`.
pub fn dut_port_path(n: u32) -> String {
    format!("server{}/nic0", n)
}

/// Builder for a single-switch topology.
#[derive(Debug, Clone)]
pub struct TopologyFixture {
    ports: Vec<u32>,
    connectors: Vec<Connector>,
    list_connections: bool,
}

impl TopologyFixture {
    /// Creates a switch with ports `1..=count`.
    pub fn with_ports(count: u32) -> Self {
        Self {
            ports: (1..=count).collect(),
            connectors: Vec::new(),
            list_connections: false,
        }
    }

    /// Reports connections as one-element lists instead of single paths.
    pub fn with_list_connections(mut self) -> Self {
        self.list_connections = true;
        self
    }

    /// Adds a connector from DUT port `n` to switch port `n`.
    pub fn with_link(mut self, n: u32, speed: Option<&str>, mtu: Option<&str>) -> Self {
        let mut connector = Connector::new(dut_port_path(n), switch_port_path(n));
        if let Some(speed) = speed {
            connector = connector.with_attribute("Link Speed", speed);
        }
        if let Some(mtu) = mtu {
            connector = connector.with_attribute("Link MTU", mtu);
        }
        self.connectors.push(connector);
        self
    }

    /// Adds an arbitrary connector.
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Drops the physical connections of DUT port `n`, so it cannot be
    /// resolved to a switch port.
    pub fn without_port(mut self, n: u32) -> Self {
        self.ports.retain(|p| *p != n);
        self
    }

    fn paths(&self, path: String) -> ConnectionPaths {
        if self.list_connections {
            ConnectionPaths::Many(vec![path])
        } else {
            ConnectionPaths::Single(path)
        }
    }

    /// Builds the snapshot.
    pub fn build(self) -> TopologySnapshot {
        let mut snapshot = TopologySnapshot::default();

        let children = self
            .ports
            .iter()
            .map(|n| ResourceMap {
                name: switch_port_path(*n),
                full_address: switch_port_address(*n),
                children: Vec::new(),
            })
            .collect();
        snapshot.resources.push(ResourceMap {
            name: SWITCH_NAME.to_string(),
            full_address: SWITCH_ADDRESS.to_string(),
            children,
        });

        for n in &self.ports {
            snapshot
                .connections
                .insert(switch_port_path(*n), self.paths(dut_port_path(*n)));
            snapshot
                .connections
                .insert(dut_port_path(*n), self.paths(switch_port_path(*n)));
        }

        snapshot
            .reservations
            .insert(RESERVATION_ID.to_string(), self.connectors);
        snapshot
    }
}
