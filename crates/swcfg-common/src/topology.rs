//! Topology and reservation service contract.
//!
//! The reservation system owns connectors, the resource tree of each switch
//! and the physical connections between ports. Managers only consume it
//! through [`TopologyService`]; [`TopologySnapshot`] is a file-backed
//! implementation for standalone use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{CfgMgrError, CfgMgrResult};

/// A named attribute negotiated on a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttribute {
    /// Attribute name, e.g. `Link Speed`.
    pub name: String,
    /// Attribute value as entered in the reservation.
    pub value: String,
}

impl LinkAttribute {
    /// Creates a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A reservation-scoped link between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    /// Source endpoint path.
    pub source: String,
    /// Target endpoint path.
    pub target: String,
    /// Attributes in reservation order.
    #[serde(default)]
    pub attributes: Vec<LinkAttribute>,
}

impl Connector {
    /// Creates a connector without attributes.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(LinkAttribute::new(name, value));
        self
    }

    /// Returns the value of the first attribute named `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Physical connections of a resource: the reservation system reports
/// either one path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectionPaths {
    /// A single connected path.
    Single(String),
    /// Several connected paths, in reservation order.
    Many(Vec<String>),
}

impl ConnectionPaths {
    /// Returns the path used for configuration: the single path, or the
    /// first of a list.
    pub fn primary(&self) -> Option<&str> {
        match self {
            ConnectionPaths::Single(path) => Some(path.as_str()),
            ConnectionPaths::Many(paths) => paths.first().map(String::as_str),
        }
    }
}

/// A node of a switch's resource tree (chassis, module, port).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMap {
    /// Full resource name, `/`-separated, e.g. `leaf1/Chassis 1/Ethernet1-1`.
    pub name: String,
    /// Full address, e.g. `10.0.0.1/1/1`.
    #[serde(default)]
    pub full_address: String,
    /// Child resources.
    #[serde(default)]
    pub children: Vec<ResourceMap>,
}

impl ResourceMap {
    /// Finds the full name of the descendant whose full address is
    /// `address`, descending only into children whose address is a prefix
    /// of it.
    pub fn find_full_name(&self, address: &str) -> Option<&str> {
        for child in &self.children {
            if child.full_address.is_empty() || !address.contains(child.full_address.as_str()) {
                continue;
            }
            if child.full_address == address {
                return Some(child.name.as_str());
            }
            if let Some(found) = child.find_full_name(address) {
                return Some(found);
            }
        }
        None
    }
}

/// Contract consumed from the reservation/topology system.
#[async_trait]
pub trait TopologyService: Send + Sync {
    /// Returns the connectors of a reservation.
    async fn reservation_connectors(&self, reservation_id: &str) -> CfgMgrResult<Vec<Connector>>;

    /// Returns the resource tree of a switch.
    async fn resource_map(&self, resource_name: &str) -> CfgMgrResult<ResourceMap>;

    /// Resolves a logical port (as referenced by the reservation) to its
    /// full resource path. `None` when the port is not part of the tree.
    async fn resolve_resource_full_path(
        &self,
        logical_name: &str,
        resource_map: &ResourceMap,
    ) -> CfgMgrResult<Option<String>> {
        Ok(resource_map
            .find_full_name(logical_name)
            .map(str::to_string))
    }

    /// Returns the physical connections of a resource.
    async fn resource_connections(&self, path: &str) -> CfgMgrResult<ConnectionPaths>;
}

/// A topology document loaded from YAML or JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// Connectors per reservation id.
    #[serde(default)]
    pub reservations: HashMap<String, Vec<Connector>>,
    /// Switch resource trees.
    #[serde(default)]
    pub resources: Vec<ResourceMap>,
    /// Physical connections per resource path.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionPaths>,
}

impl TopologySnapshot {
    /// Loads a snapshot; `.yaml`/`.yml` files are parsed as YAML, anything
    /// else as JSON.
    pub fn load(path: impl AsRef<Path>) -> CfgMgrResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CfgMgrError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| CfgMgrError::invalid_config(path.display().to_string(), e.to_string()))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| CfgMgrError::invalid_config(path.display().to_string(), e.to_string()))
        }
    }
}

#[async_trait]
impl TopologyService for TopologySnapshot {
    async fn reservation_connectors(&self, reservation_id: &str) -> CfgMgrResult<Vec<Connector>> {
        self.reservations
            .get(reservation_id)
            .cloned()
            .ok_or_else(|| CfgMgrError::resource_not_found(reservation_id))
    }

    async fn resource_map(&self, resource_name: &str) -> CfgMgrResult<ResourceMap> {
        self.resources
            .iter()
            .find(|r| r.name == resource_name)
            .cloned()
            .ok_or_else(|| CfgMgrError::resource_not_found(resource_name))
    }

    async fn resource_connections(&self, path: &str) -> CfgMgrResult<ConnectionPaths> {
        self.connections
            .get(path)
            .cloned()
            .ok_or_else(|| CfgMgrError::resource_not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn switch_map() -> ResourceMap {
        ResourceMap {
            name: "leaf1".to_string(),
            full_address: "10.0.0.1".to_string(),
            children: vec![ResourceMap {
                name: "leaf1/Chassis 1".to_string(),
                full_address: "10.0.0.1/1".to_string(),
                children: vec![
                    ResourceMap {
                        name: "leaf1/Chassis 1/Ethernet1-1".to_string(),
                        full_address: "10.0.0.1/1/1".to_string(),
                        children: Vec::new(),
                    },
                    ResourceMap {
                        name: "leaf1/Chassis 1/Ethernet1-12".to_string(),
                        full_address: "10.0.0.1/1/12".to_string(),
                        children: Vec::new(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_find_full_name() {
        let map = switch_map();
        assert_eq!(
            map.find_full_name("10.0.0.1/1/12"),
            Some("leaf1/Chassis 1/Ethernet1-12")
        );
        assert_eq!(
            map.find_full_name("10.0.0.1/1/1"),
            Some("leaf1/Chassis 1/Ethernet1-1")
        );
        assert_eq!(map.find_full_name("10.0.0.1/1/99"), None);
        assert_eq!(map.find_full_name("10.0.0.2/1/1"), None);
    }

    #[test]
    fn test_connector_attribute_first_wins() {
        let connector = Connector::new("leaf1/Chassis 1/Ethernet1-1", "server1/nic0")
            .with_attribute("Link Speed", "10000")
            .with_attribute("Link Speed", "1000");
        assert_eq!(connector.attribute("Link Speed"), Some("10000"));
        assert_eq!(connector.attribute("Link MTU"), None);
    }

    #[test]
    fn test_connection_paths_single_and_list_are_equivalent() {
        let single: ConnectionPaths = serde_json::from_str(r#""server1/nic0""#).unwrap();
        let list: ConnectionPaths = serde_json::from_str(r#"["server1/nic0"]"#).unwrap();
        assert_eq!(single.primary(), Some("server1/nic0"));
        assert_eq!(single.primary(), list.primary());

        let empty = ConnectionPaths::Many(Vec::new());
        assert_eq!(empty.primary(), None);
    }

    #[tokio::test]
    async fn test_snapshot_from_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
reservations:
  res-1:
    - source: leaf1/Chassis 1/Ethernet1-1
      target: server1/nic0
      attributes:
        - {{ name: Link Speed, value: "10000" }}
resources:
  - name: leaf1
    full_address: 10.0.0.1
    children:
      - name: leaf1/Chassis 1/Ethernet1-1
        full_address: 10.0.0.1/1
connections:
  leaf1/Chassis 1/Ethernet1-1: server1/nic0
  server1/nic0:
    - leaf1/Chassis 1/Ethernet1-1
"#
        )
        .unwrap();

        let snapshot = TopologySnapshot::load(file.path()).unwrap();
        let connectors = snapshot.reservation_connectors("res-1").await.unwrap();
        assert_eq!(connectors[0].attribute("Link Speed"), Some("10000"));

        let map = snapshot.resource_map("leaf1").await.unwrap();
        let full = snapshot
            .resolve_resource_full_path("10.0.0.1/1", &map)
            .await
            .unwrap();
        assert_eq!(full.as_deref(), Some("leaf1/Chassis 1/Ethernet1-1"));

        let conns = snapshot.resource_connections("server1/nic0").await.unwrap();
        assert_eq!(conns.primary(), Some("leaf1/Chassis 1/Ethernet1-1"));

        assert!(matches!(
            snapshot.resource_connections("nope").await,
            Err(CfgMgrError::ResourceNotFound { .. })
        ));
    }
}
