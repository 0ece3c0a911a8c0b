//! Stateful fake switch.
//!
//! [`FakeDevice`] keeps a per-interface running configuration, answers the
//! `show` commands used by the managers from it, and applies config-mode
//! commands to it. Every command is recorded so tests can assert on the
//! exact device-facing sequence.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tracing::debug;

use swcfg_common::{CfgMgrError, CfgMgrResult, CommandSession, ConfigBlock, DeviceFamily};

/// Commands whose line replaces any previous line with the same prefix.
const KEYED_PREFIXES: &[&str] = &[
    "speed",
    "mtu",
    "description",
    "channel-group",
    "spanning-tree port type",
    "switchport mode",
    "switchport access vlan",
];

const TRUNK_ALLOWED: &str = "switchport trunk allowed vlan";

/// In-memory switch implementing [`CommandSession`].
#[derive(Debug, Clone)]
pub struct FakeDevice {
    family: DeviceFamily,
    interfaces: BTreeMap<String, Vec<String>>,
    context: Option<String>,
    commands: Vec<String>,
    config_commands: Vec<String>,
    rejected: HashSet<String>,
}

fn starts_with_word(line: &str, prefix: &str) -> bool {
    line == prefix
        || line
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(' '))
}

impl FakeDevice {
    /// Creates an empty device of the given family.
    pub fn new(family: DeviceFamily) -> Self {
        Self {
            family,
            interfaces: BTreeMap::new(),
            context: None,
            commands: Vec::new(),
            config_commands: Vec::new(),
            rejected: HashSet::new(),
        }
    }

    /// Creates an empty NX-OS device.
    pub fn nxos() -> Self {
        Self::new(DeviceFamily::Nxos)
    }

    /// Creates an empty IOS device.
    pub fn ios() -> Self {
        Self::new(DeviceFamily::Ios)
    }

    /// Adds an interface with the given config lines.
    pub fn with_interface(mut self, name: &str, lines: &[&str]) -> Self {
        let name = self.canonical_name(name);
        self.interfaces
            .insert(name, lines.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Makes the device reject `command` in config mode.
    pub fn rejecting(mut self, command: &str) -> Self {
        self.rejected.insert(command.to_string());
        self
    }

    /// Returns every command sent, exec and config, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Returns every config-mode command sent, in order.
    pub fn config_commands(&self) -> &[String] {
        &self.config_commands
    }

    /// Forgets recorded commands; the running configuration is kept.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.config_commands.clear();
    }

    /// Returns true if the interface exists in the running configuration.
    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(&self.canonical_name(name))
    }

    /// Returns the config lines of an interface.
    pub fn interface_config(&self, name: &str) -> Option<&[String]> {
        self.interfaces
            .get(&self.canonical_name(name))
            .map(Vec::as_slice)
    }

    /// Returns the configured speed of an interface.
    pub fn speed(&self, name: &str) -> Option<u32> {
        let text = self.render_interface(name)?;
        ConfigBlock::new(&text).numeric_field("speed")
    }

    /// Returns the configured MTU of an interface.
    pub fn mtu(&self, name: &str) -> Option<u32> {
        let text = self.render_interface(name)?;
        ConfigBlock::new(&text).numeric_field("mtu")
    }

    /// Returns the description of an interface.
    pub fn description(&self, name: &str) -> Option<String> {
        let text = self.render_interface(name)?;
        ConfigBlock::new(&text).field("description").map(str::to_string)
    }

    /// Returns true if the interface is administratively down.
    pub fn is_shutdown(&self, name: &str) -> bool {
        self.interface_config(name)
            .is_some_and(|lines| lines.iter().any(|l| l == "shutdown"))
    }

    /// Normalizes an interface name the way the device displays it:
    /// whitespace is dropped and port-channels use the family keyword.
    fn canonical_name(&self, raw: &str) -> String {
        let compact: String = raw.split_whitespace().collect();
        match compact.to_lowercase().strip_prefix("port-channel") {
            Some(id) => format!(
                "{}{}",
                self.family.capabilities().channel_group_keyword,
                id
            ),
            None => compact,
        }
    }

    fn render_interface(&self, name: &str) -> Option<String> {
        let name = self.canonical_name(name);
        let lines = self.interfaces.get(&name)?;
        let mut out = format!("interface {}\n", name);
        for line in lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        Some(out)
    }

    fn running_config(&self) -> String {
        let mut out = String::from("!Command: show running-config\n\n");
        for name in self.interfaces.keys() {
            if let Some(block) = self.render_interface(name) {
                out.push_str(&block);
                out.push('\n');
            }
        }
        out
    }

    fn apply_line(lines: &mut Vec<String>, cmd: &str) {
        if cmd == "shutdown" || cmd == "no shutdown" {
            lines.retain(|l| l != "shutdown" && l != "no shutdown");
            lines.push(cmd.to_string());
            return;
        }

        if let Some(rest) = cmd.strip_prefix(TRUNK_ALLOWED) {
            Self::apply_trunk_allowed(lines, rest.trim());
            return;
        }

        if let Some(target) = cmd.strip_prefix("no ") {
            let before = lines.len();
            lines.retain(|l| l != target);
            if lines.len() == before || target == "switchport" {
                lines.retain(|l| !starts_with_word(l, target));
            }
            return;
        }

        if let Some(prefix) = KEYED_PREFIXES.iter().find(|p| starts_with_word(cmd, p)) {
            lines.retain(|l| !starts_with_word(l, prefix));
        }
        if !lines.iter().any(|l| l == cmd) {
            lines.push(cmd.to_string());
        }
    }

    fn apply_trunk_allowed(lines: &mut Vec<String>, rest: &str) {
        let mut allowed: Vec<String> = lines
            .iter()
            .find_map(|l| l.strip_prefix(TRUNK_ALLOWED))
            .map(|v| v.trim().split(',').map(str::to_string).collect())
            .unwrap_or_default();

        match rest.split_once(' ') {
            Some(("add", vlans)) => {
                for vlan in vlans.split(',') {
                    if !allowed.iter().any(|a| a == vlan) {
                        allowed.push(vlan.to_string());
                    }
                }
            }
            Some(("remove", vlans)) => {
                let removed: Vec<&str> = vlans.split(',').collect();
                allowed.retain(|a| !removed.contains(&a.as_str()));
            }
            _ => allowed = rest.split(',').map(str::to_string).collect(),
        }

        lines.retain(|l| !l.starts_with(TRUNK_ALLOWED));
        allowed.retain(|a| !a.is_empty());
        if !allowed.is_empty() {
            lines.push(format!("{} {}", TRUNK_ALLOWED, allowed.join(",")));
        }
    }
}

#[async_trait]
impl CommandSession for FakeDevice {
    async fn send_command(&mut self, command: &str) -> CfgMgrResult<String> {
        self.commands.push(command.to_string());

        let (base, filter) = match command.split_once(" | include ") {
            Some((base, filter)) => (base.trim(), Some(filter.trim())),
            None => (command.trim(), None),
        };

        let output = if base == "show running-config" {
            self.running_config()
        } else if let Some(name) = base
            .strip_prefix("show running-config interface ")
            .or_else(|| base.strip_prefix("show running interface "))
        {
            self.render_interface(name).unwrap_or_default()
        } else {
            return Err(CfgMgrError::session(command, "% Invalid command"));
        };

        let output = match filter {
            Some(pattern) => output
                .lines()
                .filter(|l| l.contains(pattern))
                .collect::<Vec<_>>()
                .join("\n"),
            None => output,
        };
        debug!(command = %command, "fake device answered");
        Ok(output)
    }

    async fn send_config_command(&mut self, command: &str) -> CfgMgrResult<String> {
        self.commands.push(command.to_string());
        self.config_commands.push(command.to_string());

        if self.rejected.contains(command) {
            return Err(CfgMgrError::session(command, "% Invalid command"));
        }

        let cmd = command.trim();
        if let Some(name) = cmd.strip_prefix("no interface ") {
            let name = self.canonical_name(name);
            self.interfaces.remove(&name);
            self.context = None;
            return Ok(String::new());
        }
        if let Some(name) = cmd.strip_prefix("interface ") {
            let name = self.canonical_name(name);
            self.interfaces.entry(name.clone()).or_default();
            self.context = Some(name);
            return Ok(String::new());
        }

        let Some(ctx) = self.context.clone() else {
            return Err(CfgMgrError::session(command, "% Invalid command"));
        };
        let lines = self.interfaces.entry(ctx).or_default();
        Self::apply_line(lines, cmd);
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_config_commands_apply_to_context() {
        let mut dev = FakeDevice::nxos().with_interface("Ethernet1/1", &["speed 1000"]);
        dev.send_config_command("interface Ethernet1/1").await.unwrap();
        dev.send_config_command("speed 10000").await.unwrap();
        dev.send_config_command("mtu 9216").await.unwrap();
        dev.send_config_command("description speed=1000;mtu=")
            .await
            .unwrap();

        assert_eq!(dev.speed("Ethernet1/1"), Some(10000));
        assert_eq!(dev.mtu("Ethernet1/1"), Some(9216));
        assert_eq!(
            dev.description("Ethernet1/1").as_deref(),
            Some("speed=1000;mtu=")
        );

        dev.send_config_command("no speed").await.unwrap();
        dev.send_config_command("no description").await.unwrap();
        assert_eq!(dev.speed("Ethernet1/1"), None);
        assert_eq!(dev.description("Ethernet1/1"), None);
    }

    #[tokio::test]
    async fn test_port_channel_names_follow_family() {
        let mut dev = FakeDevice::ios();
        dev.send_config_command("interface port-channel 3").await.unwrap();
        assert!(dev.has_interface("Port-channel3"));

        let out = dev
            .send_command("show running-config | include Port-channel")
            .await
            .unwrap();
        assert_eq!(out, "interface Port-channel3");

        dev.send_config_command("no interface port-channel 3")
            .await
            .unwrap();
        assert!(!dev.has_interface("Port-channel3"));
    }

    #[tokio::test]
    async fn test_include_filter_and_trunk_lists() {
        let mut dev = FakeDevice::nxos().with_interface("Ethernet1/4", &["switchport"]);
        dev.send_config_command("interface Ethernet1/4").await.unwrap();
        dev.send_config_command("switchport trunk allowed vlan add 10")
            .await
            .unwrap();
        dev.send_config_command("switchport trunk allowed vlan add 20")
            .await
            .unwrap();

        let out = dev
            .send_command("show running interface Ethernet1/4 | include vlan")
            .await
            .unwrap();
        assert_eq!(out, "  switchport trunk allowed vlan 10,20");

        dev.send_config_command("switchport trunk allowed vlan remove 10,20")
            .await
            .unwrap();
        assert_eq!(
            dev.interface_config("Ethernet1/4").unwrap(),
            &["switchport".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_and_unknown_commands() {
        let mut dev = FakeDevice::nxos().rejecting("mtu 9216");
        dev.send_config_command("interface Ethernet1/1").await.unwrap();
        assert!(dev.send_config_command("mtu 9216").await.is_err());
        assert!(dev.send_command("show version").await.is_err());
        assert_eq!(dev.commands().len(), 3);
        assert_eq!(dev.config_commands().len(), 2);
    }
}
