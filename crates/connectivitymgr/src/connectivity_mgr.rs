//! ConnectivityMgr - reservation connectivity orchestration
//!
//! Operation flow:
//! 1. add_vlan: save port state → stage link speed → stage MTU → assign VLANs
//! 2. remove_vlan: remove VLANs → restore port state
//! 3. create_port_channel: allocate id → create aggregate → join eligible ports
//! 4. delete_port_channel: strip VLAN assignment → tear down aggregate
//!
//! Every operation talks to one device session strictly in sequence and
//! re-reads the running configuration it depends on.

use tracing::{debug, info, instrument, warn};

use swcfg_common::{
    CfgMgrError, CfgMgrResult, CommandSession, ConfigBlock, Connector, ReservationContext,
    ResourceMap, TopologyService,
};

use crate::commands::{
    build_channel_group_cmd, build_interface_cmd, build_mtu_cmd, build_negate_cmd,
    build_port_channel_interface_cmd, build_remove_port_channel_cmd,
    build_reservation_description_cmd, build_show_interface_vlan_cmd,
    build_show_port_channel_vlan_cmd, build_show_running_interface_cmd, build_speed_cmd,
    NO_SHUTDOWN, NO_SWITCHPORT, SHUTDOWN, STP_EDGE, STP_EDGE_TRUNK, SWITCHPORT,
};
use crate::link_attrs::{resolve_link_attribute, LinkSetting};
use crate::naming::{native_name, resolve_interface, ResolvedInterface};
use crate::port_channel::{
    allocate_port_channel_id, port_channel_id, Exclusion, ExclusionReason, PortChannelOutcome,
    StpMode, VLAN_ASSIGNMENT_RE,
};
use crate::port_state::{restore_port, save_port};
use crate::vlan::{CiscoVlanConfigurator, PortMode, VlanConfigurator, VlanRange};

/// Status of a completed speed configuration.
pub const SPEED_COMPLETED: &str = "Interface Speed Configuration Completed";

/// Status of a completed MTU configuration.
pub const MTU_COMPLETED: &str = "Interface MTU Configuration Completed";

/// Status when the device family has no per-interface MTU.
pub const MTU_UNSUPPORTED: &str = "No Interface MTU Configuration for Nexus OS";

/// Status of a completed save.
pub const SAVE_COMPLETED: &str = "Save port configuration complete";

/// Status of a completed restore.
pub const RESTORE_COMPLETED: &str = "Restore port configuration complete";

/// Status of a completed VLAN assignment.
pub const VLAN_ADD_COMPLETED: &str = "Vlan Configuration Completed";

/// Status of a completed VLAN removal.
pub const VLAN_REMOVE_COMPLETED: &str = "Vlan Removal Completed";

fn require_ports(ports: &[String]) -> CfgMgrResult<()> {
    if ports.is_empty() {
        return Err(CfgMgrError::EmptyPortList);
    }
    Ok(())
}

/// ConnectivityMgr reconfigures switch interfaces for one reservation.
pub struct ConnectivityMgr<S, T> {
    /// Device session
    session: S,

    /// Reservation/topology service
    topology: T,

    /// Switch and reservation identity
    context: ReservationContext,

    /// Base VLAN capability
    vlan: Box<dyn VlanConfigurator>,
}

impl<S, T> ConnectivityMgr<S, T>
where
    S: CommandSession,
    T: TopologyService,
{
    /// Creates a manager using the Cisco VLAN configurator.
    pub fn new(session: S, topology: T, context: ReservationContext) -> Self {
        Self {
            session,
            topology,
            context,
            vlan: Box::new(CiscoVlanConfigurator),
        }
    }

    /// Replaces the base VLAN capability.
    pub fn with_vlan_configurator(mut self, vlan: impl VlanConfigurator + 'static) -> Self {
        self.vlan = Box::new(vlan);
        self
    }

    /// Returns the reservation context.
    pub fn context(&self) -> &ReservationContext {
        &self.context
    }

    /// Returns the device session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Consumes the manager, returning the session and topology.
    pub fn into_parts(self) -> (S, T) {
        (self.session, self.topology)
    }

    async fn switch_map(&self) -> CfgMgrResult<ResourceMap> {
        self.topology.resource_map(&self.context.resource_name).await
    }

    /// Resolves every port, failing on the first one that does not resolve.
    async fn resolve_ports(&self, ports: &[String]) -> CfgMgrResult<Vec<ResolvedInterface>> {
        let map = self.switch_map().await?;
        let mut resolved = Vec::with_capacity(ports.len());
        for port in ports {
            resolved.push(resolve_interface(&self.topology, &map, port).await?);
        }
        Ok(resolved)
    }

    /// Path on the far side of a switch port, if the topology knows one.
    async fn connection_path(&self, full_path: &str) -> CfgMgrResult<Option<String>> {
        match self.topology.resource_connections(full_path).await {
            Ok(paths) => Ok(paths.primary().map(str::to_string)),
            Err(CfgMgrError::ResourceNotFound { name }) => {
                debug!(path = %name, "No connections for port");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Records speed/MTU of each port in its description and brings it up.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn save_port_config(&mut self, ports: &[String]) -> CfgMgrResult<String> {
        require_ports(ports)?;
        let map = self.switch_map().await?;

        for port in ports {
            let iface = resolve_interface(&self.topology, &map, port).await?;
            save_port(&mut self.session, &iface.name).await?;
        }

        info!("{}", SAVE_COMPLETED);
        Ok(SAVE_COMPLETED.to_string())
    }

    /// Restores speed/MTU recorded by [`Self::save_port_config`], shuts
    /// the ports and clears their descriptions.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn restore_port_config(&mut self, ports: &[String]) -> CfgMgrResult<String> {
        require_ports(ports)?;
        let map = self.switch_map().await?;

        for port in ports {
            let iface = resolve_interface(&self.topology, &map, port).await?;
            restore_port(&mut self.session, &iface.name).await?;
        }

        info!("{}", RESTORE_COMPLETED);
        Ok(RESTORE_COMPLETED.to_string())
    }

    /// Applies the reservation's link speed to each port that has none.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn configure_interface_speed(&mut self, ports: &[String]) -> CfgMgrResult<String> {
        require_ports(ports)?;
        self.configure_link_setting(ports, LinkSetting::Speed).await?;
        Ok(SPEED_COMPLETED.to_string())
    }

    /// Applies the reservation's link MTU to each port that has none.
    /// Families without per-interface MTU are left untouched.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn configure_interface_mtu(&mut self, ports: &[String]) -> CfgMgrResult<String> {
        require_ports(ports)?;
        if !self.context.family().capabilities().supports_mtu_config {
            info!("{}", MTU_UNSUPPORTED);
            return Ok(MTU_UNSUPPORTED.to_string());
        }
        self.configure_link_setting(ports, LinkSetting::Mtu).await?;
        Ok(MTU_COMPLETED.to_string())
    }

    async fn configure_link_setting(
        &mut self,
        ports: &[String],
        setting: LinkSetting,
    ) -> CfgMgrResult<()> {
        let connectors = self
            .topology
            .reservation_connectors(&self.context.reservation_id)
            .await?;
        let map = self.switch_map().await?;

        for port in ports {
            let iface = resolve_interface(&self.topology, &map, port).await?;
            let desired = self
                .desired_value(&connectors, &iface.full_path, setting)
                .await?;
            self.apply_link_setting(&iface.name, setting, desired.as_deref())
                .await?;
        }
        Ok(())
    }

    async fn desired_value(
        &self,
        connectors: &[Connector],
        full_path: &str,
        setting: LinkSetting,
    ) -> CfgMgrResult<Option<String>> {
        let Some(peer) = self.connection_path(full_path).await? else {
            return Ok(None);
        };
        Ok(resolve_link_attribute(connectors, &peer, setting.attribute_name()).map(str::to_string))
    }

    /// Pushes `desired` only when the interface has no explicit value yet.
    async fn apply_link_setting(
        &mut self,
        interface: &str,
        setting: LinkSetting,
        desired: Option<&str>,
    ) -> CfgMgrResult<()> {
        let label = setting.config_label();
        let output = self
            .session
            .send_command(&build_show_running_interface_cmd(interface))
            .await?;
        let block = ConfigBlock::new(&output);

        let Some(want) = desired else {
            debug!(interface = %interface, setting = label, "No link attribute, leaving as is");
            return Ok(());
        };

        if block.has_field(label) {
            let current = block.field(label).unwrap_or_default();
            if current != want {
                info!(
                    interface = %interface,
                    setting = label,
                    current = %current,
                    desired = %want,
                    "Interface already has a value, leaving it"
                );
            }
            return Ok(());
        }

        self.session
            .send_config_command(&build_interface_cmd(interface))
            .await?;
        let cmd = match setting {
            LinkSetting::Speed => build_speed_cmd(want),
            LinkSetting::Mtu => build_mtu_cmd(want),
        };
        self.session.send_config_command(&cmd).await?;

        info!("Interface {} was configured for {} {}", interface, label, want);
        Ok(())
    }

    /// Saves port state, stages link speed and MTU, then assigns the VLANs.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn add_vlan(
        &mut self,
        ports: &[String],
        vlan_range: &str,
        port_mode: PortMode,
        qnq: bool,
        ctag: Option<&str>,
    ) -> CfgMgrResult<String> {
        require_ports(ports)?;
        let vlans = VlanRange::parse(vlan_range)?;

        self.save_port_config(ports).await?;
        self.configure_interface_speed(ports).await?;
        self.configure_interface_mtu(ports).await?;

        for iface in self.resolve_ports(ports).await? {
            self.vlan
                .add_vlan(&mut self.session, &iface.name, &vlans, port_mode, qnq, ctag)
                .await?;
        }

        info!(vlans = %vlans, "{}", VLAN_ADD_COMPLETED);
        Ok(VLAN_ADD_COMPLETED.to_string())
    }

    /// Removes the VLANs, then restores the saved port state.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn remove_vlan(
        &mut self,
        ports: &[String],
        vlan_range: &str,
        port_mode: PortMode,
    ) -> CfgMgrResult<String> {
        require_ports(ports)?;
        let vlans = VlanRange::parse(vlan_range)?;

        for iface in self.resolve_ports(ports).await? {
            self.vlan
                .remove_vlan(&mut self.session, &iface.name, &vlans, port_mode)
                .await?;
        }
        self.restore_port_config(ports).await?;

        info!(vlans = %vlans, "{}", VLAN_REMOVE_COMPLETED);
        Ok(VLAN_REMOVE_COMPLETED.to_string())
    }

    /// Creates a port-channel on the lowest free id and joins the switch
    /// ports cabled to `ports`. Ports that cannot be resolved, or whose
    /// switch interface already carries a VLAN, are excluded and reported
    /// in the outcome.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn create_port_channel(
        &mut self,
        ports: &[String],
        stp_mode: StpMode,
    ) -> CfgMgrResult<PortChannelOutcome> {
        require_ports(ports)?;
        let caps = self.context.family().capabilities();
        let id = allocate_port_channel_id(&mut self.session, &caps).await?;

        self.session
            .send_config_command(&build_port_channel_interface_cmd(id))
            .await?;
        self.session.send_config_command(SWITCHPORT).await?;
        if stp_mode == StpMode::Edge {
            self.session.send_config_command(STP_EDGE_TRUNK).await?;
        }
        self.session
            .send_config_command(&build_reservation_description_cmd(
                &self.context.reservation_id,
            ))
            .await?;
        info!("Port-channel {} was created", id);

        let mut members = Vec::new();
        let mut excluded = Vec::new();
        for port in ports {
            let peer = match self.topology.resource_connections(port).await {
                Ok(paths) => paths.primary().map(str::to_string),
                Err(e) => {
                    warn!(port = %port, error = %e, "Excluding port from port-channel");
                    excluded.push(Exclusion {
                        port: port.clone(),
                        reason: ExclusionReason::Unresolved(e.to_string()),
                    });
                    continue;
                }
            };
            let Some(peer) = peer else {
                warn!(port = %port, "Excluding port from port-channel, no connections");
                excluded.push(Exclusion {
                    port: port.clone(),
                    reason: ExclusionReason::Unresolved("no connections".to_string()),
                });
                continue;
            };

            let name = native_name(&peer)?;

            let vlan_lines = self
                .session
                .send_command(&build_show_interface_vlan_cmd(&name))
                .await?;
            if ConfigBlock::new(&vlan_lines)
                .lines()
                .any(|line| line.contains(SWITCHPORT))
            {
                warn!(
                    port = %port,
                    "Interface {} has vlan, so cannot add to port-channel", name
                );
                excluded.push(Exclusion {
                    port: port.clone(),
                    reason: ExclusionReason::VlanConfigured { interface: name },
                });
                continue;
            }

            self.session
                .send_config_command(&build_interface_cmd(&name))
                .await?;
            self.session.send_config_command(NO_SHUTDOWN).await?;
            self.session.send_config_command(SWITCHPORT).await?;
            self.session
                .send_config_command(&build_channel_group_cmd(id, caps.channel_mode_keyword))
                .await?;
            if stp_mode == StpMode::Edge {
                self.session.send_config_command(STP_EDGE).await?;
            }
            info!("Interface {} was added to channel-group {}", name, id);
            members.push(name);
        }

        let outcome = PortChannelOutcome {
            id,
            members,
            excluded,
        };
        info!(
            members = outcome.members.len(),
            excluded = outcome.excluded.len(),
            "{}",
            outcome
        );
        Ok(outcome)
    }

    /// Strips the VLAN assignment of a port-channel and removes it.
    #[instrument(skip(self), fields(resource = %self.context.resource_name), err)]
    pub async fn delete_port_channel(&mut self, port_channel: &str) -> CfgMgrResult<String> {
        let id = port_channel_id(port_channel)?;

        let output = self
            .session
            .send_command(&build_show_port_channel_vlan_cmd(id))
            .await?;
        if let Some(line) = ConfigBlock::new(&output).first_match(&VLAN_ASSIGNMENT_RE) {
            debug!(port_channel = id, line = %line, "Removing VLAN assignment");
            self.session
                .send_config_command(&build_port_channel_interface_cmd(id))
                .await?;
            self.session
                .send_config_command(&build_negate_cmd(line))
                .await?;
        }

        self.session
            .send_config_command(&build_port_channel_interface_cmd(id))
            .await?;
        self.session.send_config_command(NO_SWITCHPORT).await?;
        self.session.send_config_command(SHUTDOWN).await?;
        self.session
            .send_config_command(&build_remove_port_channel_cmd(id))
            .await?;

        let status = format!("Port-Channel {} Configuration Removed", id);
        info!("{}", status);
        Ok(status)
    }
}
