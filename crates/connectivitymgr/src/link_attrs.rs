//! Link attribute lookup.
//!
//! Desired link settings come from the reservation's connectors. A port
//! without a matching connector, or a connector without the attribute, has
//! no desired value and is left alone.

use swcfg_common::Connector;

/// Link settings staged on a port for the duration of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSetting {
    /// Link speed.
    Speed,
    /// Link MTU.
    Mtu,
}

impl LinkSetting {
    /// Connector attribute carrying the desired value.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            LinkSetting::Speed => "Link Speed",
            LinkSetting::Mtu => "Link MTU",
        }
    }

    /// Running-config label of the setting.
    pub fn config_label(&self) -> &'static str {
        match self {
            LinkSetting::Speed => "speed",
            LinkSetting::Mtu => "mtu",
        }
    }
}

/// Returns true if `endpoint` contains `connection_path`.
fn endpoint_matches(endpoint: &str, connection_path: &str) -> bool {
    !endpoint.is_empty() && !connection_path.is_empty() && endpoint.contains(connection_path)
}

/// Returns the first connector with an endpoint on `connection_path`.
pub fn find_connector<'a>(connectors: &'a [Connector], connection_path: &str) -> Option<&'a Connector> {
    connectors.iter().find(|c| {
        endpoint_matches(&c.source, connection_path) || endpoint_matches(&c.target, connection_path)
    })
}

/// Returns the desired value of `attribute` for the port cabled to
/// `connection_path`. Only the first matching connector is consulted; an
/// empty value counts as unset.
pub fn resolve_link_attribute<'a>(
    connectors: &'a [Connector],
    connection_path: &str,
    attribute: &str,
) -> Option<&'a str> {
    find_connector(connectors, connection_path)?
        .attribute(attribute)
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn connectors() -> Vec<Connector> {
        vec![
            Connector::new("server1/nic0", "leaf1/Chassis 1/Ethernet1-1")
                .with_attribute("Link Speed", "10000")
                .with_attribute("Link MTU", "9216"),
            Connector::new("server2/nic0", "leaf1/Chassis 1/Ethernet1-2")
                .with_attribute("Link Speed", "1000"),
            Connector::new("leaf1/Chassis 1/Ethernet1-2", "server2/nic0")
                .with_attribute("Link MTU", "1500"),
        ]
    }

    #[test]
    fn test_resolve_by_source_or_target() {
        let conns = connectors();
        assert_eq!(
            resolve_link_attribute(&conns, "server1/nic0", "Link Speed"),
            Some("10000")
        );
        assert_eq!(
            resolve_link_attribute(&conns, "leaf1/Chassis 1/Ethernet1-1", "Link MTU"),
            Some("9216")
        );
    }

    #[test]
    fn test_first_matching_connector_wins() {
        let conns = connectors();
        // The second connector matches first and has no MTU; the third is
        // never consulted.
        assert_eq!(resolve_link_attribute(&conns, "server2/nic0", "Link MTU"), None);
        assert_eq!(
            resolve_link_attribute(&conns, "server2/nic0", "Link Speed"),
            Some("1000")
        );
    }

    #[test]
    fn test_unmatched_path_is_unset() {
        let conns = connectors();
        assert_eq!(resolve_link_attribute(&conns, "server9/nic0", "Link Speed"), None);
        assert_eq!(resolve_link_attribute(&conns, "", "Link Speed"), None);
        assert_eq!(resolve_link_attribute(&[], "server1/nic0", "Link Speed"), None);
    }

    #[test]
    fn test_shared_prefix_does_not_match_earlier_connector() {
        let conns = vec![
            Connector::new("server1/nic1", "leaf1/Chassis 1/Ethernet1-1")
                .with_attribute("Link Speed", "1000"),
            Connector::new("server1/nic10", "leaf1/Chassis 1/Ethernet1-10")
                .with_attribute("Link Speed", "25000"),
        ];
        assert_eq!(
            resolve_link_attribute(&conns, "server1/nic10", "Link Speed"),
            Some("25000")
        );
        assert_eq!(
            resolve_link_attribute(&conns, "server1/nic1", "Link Speed"),
            Some("1000")
        );
        // an endpoint shorter than the path never matches
        assert_eq!(
            resolve_link_attribute(&conns, "server1/nic1/sub0", "Link Speed"),
            None
        );
    }

    #[test]
    fn test_empty_value_is_unset() {
        let conns = vec![Connector::new("server1/nic0", "leaf1/Ethernet1-1")
            .with_attribute("Link Speed", "")];
        assert_eq!(resolve_link_attribute(&conns, "server1/nic0", "Link Speed"), None);
    }

    #[test]
    fn test_setting_names() {
        assert_eq!(LinkSetting::Speed.attribute_name(), "Link Speed");
        assert_eq!(LinkSetting::Mtu.attribute_name(), "Link MTU");
        assert_eq!(LinkSetting::Mtu.config_label(), "mtu");
    }
}
