//! connectivitymgr - Reservation connectivity manager
//!
//! Entry point for the connectivitymgr command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use swcfg_common::{ShellSession, TopologySnapshot};
use swcfg_connectivitymgr::{
    split_ports, ConnectivityConfig, ConnectivityMgr, PortMode, StpMode,
};

#[derive(Parser, Debug)]
#[command(name = "connectivitymgr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, global = true, default_value = swcfg_connectivitymgr::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Reservation the change belongs to
    #[arg(short = 'r', long, global = true, default_value = "")]
    reservation_id: String,

    /// Switch resource name (overrides the config file)
    #[arg(long, global = true)]
    resource_name: Option<String>,

    /// Switch resource model (overrides the config file)
    #[arg(long, global = true)]
    resource_model: Option<String>,

    /// Device CLI wrapper program (overrides the config file)
    #[arg(long, global = true)]
    cli_program: Option<String>,

    /// Topology snapshot file (overrides the config file)
    #[arg(long, global = true)]
    topology: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save speed/MTU of ports into their descriptions
    SavePorts {
        /// Comma-separated port list
        #[arg(short, long)]
        ports: String,
    },
    /// Restore speed/MTU saved by save-ports
    RestorePorts {
        /// Comma-separated port list
        #[arg(short, long)]
        ports: String,
    },
    /// Apply the reservation's link speed
    ConfigureSpeed {
        /// Comma-separated port list
        #[arg(short, long)]
        ports: String,
    },
    /// Apply the reservation's link MTU
    ConfigureMtu {
        /// Comma-separated port list
        #[arg(short, long)]
        ports: String,
    },
    /// Save port state, stage link settings and assign VLANs
    AddVlan {
        /// Comma-separated port list
        #[arg(short, long)]
        ports: String,
        /// VLAN range, e.g. 10,20-30
        #[arg(short, long)]
        vlan_range: String,
        /// access or trunk
        #[arg(short = 'm', long, default_value = "access")]
        port_mode: String,
        /// Configure a dot1q tunnel
        #[arg(long)]
        qnq: bool,
        /// Customer tag for a dot1q tunnel
        #[arg(long)]
        ctag: Option<String>,
    },
    /// Remove VLANs and restore port state
    RemoveVlan {
        /// Comma-separated port list
        #[arg(short, long)]
        ports: String,
        /// VLAN range, e.g. 10,20-30
        #[arg(short, long)]
        vlan_range: String,
        /// access or trunk
        #[arg(short = 'm', long, default_value = "access")]
        port_mode: String,
    },
    /// Create a port-channel from the switch ports cabled to DUT ports
    CreatePortChannel {
        /// Comma-separated DUT port list
        #[arg(short, long)]
        ports: String,
        /// Spanning-tree mode (edge or empty)
        #[arg(short, long, default_value = "")]
        stp_mode: String,
    },
    /// Delete a port-channel
    DeletePortChannel {
        /// Port-channel reference, e.g. leaf1/Port-channel12
        port_channel: String,
    },
}

/// Initializes tracing/logging subsystem
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Args) -> Result<ConnectivityConfig> {
    let mut config = ConnectivityConfig::load_or_default(&args.config)?;
    if let Some(name) = &args.resource_name {
        config.device.resource_name = name.clone();
    }
    if let Some(model) = &args.resource_model {
        config.device.resource_model = model.clone();
    }
    if let Some(program) = &args.cli_program {
        config.device.cli_program = program.clone();
    }
    if let Some(path) = &args.topology {
        config.topology.snapshot_path = path.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<String> {
    let config = load_config(&args)?;
    let topology = TopologySnapshot::load(&config.topology.snapshot_path).with_context(|| {
        format!(
            "Failed to load topology {}",
            config.topology.snapshot_path.display()
        )
    })?;
    let session = ShellSession::new(config.device.cli_program.clone());
    let context = config.reservation_context(&args.reservation_id);
    info!(
        resource = %context.resource_name,
        family = %context.family(),
        reservation = %context.reservation_id,
        "Connectivity manager ready"
    );

    let mut mgr = ConnectivityMgr::new(session, topology, context);
    let status = match args.command {
        Command::SavePorts { ports } => mgr.save_port_config(&split_ports(&ports)).await?,
        Command::RestorePorts { ports } => mgr.restore_port_config(&split_ports(&ports)).await?,
        Command::ConfigureSpeed { ports } => {
            mgr.configure_interface_speed(&split_ports(&ports)).await?
        }
        Command::ConfigureMtu { ports } => {
            mgr.configure_interface_mtu(&split_ports(&ports)).await?
        }
        Command::AddVlan {
            ports,
            vlan_range,
            port_mode,
            qnq,
            ctag,
        } => {
            let port_mode: PortMode = port_mode.parse()?;
            mgr.add_vlan(
                &split_ports(&ports),
                &vlan_range,
                port_mode,
                qnq,
                ctag.as_deref(),
            )
            .await?
        }
        Command::RemoveVlan {
            ports,
            vlan_range,
            port_mode,
        } => {
            let port_mode: PortMode = port_mode.parse()?;
            mgr.remove_vlan(&split_ports(&ports), &vlan_range, port_mode)
                .await?
        }
        Command::CreatePortChannel { ports, stp_mode } => {
            let stp_mode: StpMode = stp_mode.parse()?;
            let outcome = mgr
                .create_port_channel(&split_ports(&ports), stp_mode)
                .await?;
            for exclusion in &outcome.excluded {
                info!(port = %exclusion.port, reason = %exclusion.reason, "Excluded");
            }
            outcome.to_string()
        }
        Command::DeletePortChannel { port_channel } => {
            mgr.delete_port_channel(&port_channel).await?
        }
    };
    Ok(status)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("connectivitymgr: {:#}", e);
        return ExitCode::FAILURE;
    }

    info!("--- Starting connectivitymgr ---");

    match run(args).await {
        Ok(status) => {
            println!("{}", status);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("connectivitymgr failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
