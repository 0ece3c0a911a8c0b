//! Device command builders.
//!
//! Every string sent to the switch is built here, so the device-facing
//! command surface stays in one place.

/// Bring an interface administratively up.
pub const NO_SHUTDOWN: &str = "no shutdown";

/// Bring an interface administratively down.
pub const SHUTDOWN: &str = "shutdown";

/// Clear an interface description.
pub const NO_DESCRIPTION: &str = "no description";

/// Clear an explicit link speed.
pub const NO_SPEED: &str = "no speed";

/// Clear an explicit MTU.
pub const NO_MTU: &str = "no mtu";

/// Make an interface a layer-2 switchport.
pub const SWITCHPORT: &str = "switchport";

/// Turn a switchport back into a routed interface.
pub const NO_SWITCHPORT: &str = "no switchport";

/// Spanning-tree edge mode for a trunking aggregate.
pub const STP_EDGE_TRUNK: &str = "spanning-tree port type edge trunk";

/// Spanning-tree edge mode for a member interface.
pub const STP_EDGE: &str = "spanning-tree port type edge";

/// Clear the access VLAN of a switchport.
pub const NO_ACCESS_VLAN: &str = "no switchport access vlan";

/// Clear the switchport mode.
pub const NO_SWITCHPORT_MODE: &str = "no switchport mode";

/// `show running interface <name>`
pub fn build_show_running_interface_cmd(name: &str) -> String {
    format!("show running interface {}", name)
}

/// `show running-config interface <name>`
pub fn build_show_running_config_interface_cmd(name: &str) -> String {
    format!("show running-config interface {}", name)
}

/// `show running-config | include <keyword>`
pub fn build_show_running_include_cmd(keyword: &str) -> String {
    format!("show running-config | include {}", keyword)
}

/// VLAN lines of a member interface.
pub fn build_show_interface_vlan_cmd(name: &str) -> String {
    format!("show running interface {} | include vlan", name)
}

/// VLAN lines of a port-channel.
pub fn build_show_port_channel_vlan_cmd(id: u32) -> String {
    format!(
        "show running-config interface port-channel {} | include vlan",
        id
    )
}

/// `interface <name>`
pub fn build_interface_cmd(name: &str) -> String {
    format!("interface {}", name)
}

/// `interface port-channel <id>`
pub fn build_port_channel_interface_cmd(id: u32) -> String {
    format!("interface port-channel {}", id)
}

/// `no interface port-channel <id>`
pub fn build_remove_port_channel_cmd(id: u32) -> String {
    format!("no interface port-channel {}", id)
}

/// `description <text>`
pub fn build_description_cmd(text: &str) -> String {
    format!("description {}", text)
}

/// Quoted reservation id as a port-channel description.
pub fn build_reservation_description_cmd(reservation_id: &str) -> String {
    format!("description \"{}\"", reservation_id)
}

/// `speed <n>`
pub fn build_speed_cmd(speed: &str) -> String {
    format!("speed {}", speed)
}

/// `mtu <n>`
pub fn build_mtu_cmd(mtu: &str) -> String {
    format!("mtu {}", mtu)
}

/// `channel-group <id> mode <mode>`
pub fn build_channel_group_cmd(id: u32, mode: &str) -> String {
    format!("channel-group {} mode {}", id, mode)
}

/// Negates a running-config line.
pub fn build_negate_cmd(line: &str) -> String {
    format!("no {}", line.trim())
}

/// `switchport mode <mode>`
pub fn build_switchport_mode_cmd(mode: &str) -> String {
    format!("switchport mode {}", mode)
}

/// `switchport access vlan <range>`
pub fn build_access_vlan_cmd(vlans: &str) -> String {
    format!("switchport access vlan {}", vlans)
}

/// `switchport trunk allowed vlan add <range>`
pub fn build_trunk_add_vlan_cmd(vlans: &str) -> String {
    format!("switchport trunk allowed vlan add {}", vlans)
}

/// `switchport trunk allowed vlan remove <range>`
pub fn build_trunk_remove_vlan_cmd(vlans: &str) -> String {
    format!("switchport trunk allowed vlan remove {}", vlans)
}
