//! roadmctl: offline planning and inspection for ROADM drivers.
//!
//! Runs the OpenROADM driver against a dry-run session so that the exact
//! configuration documents a cross-connect produces can be reviewed
//! before touching a device.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use roadm_driver_common::{
    DriverConfig, NetconfSession, RestSession, SessionRegistry,
};
use roadm_drivers::{DriverContext, DriverRegistry, DryRunSession, FileInventory};
use roadm_openroadm::codec::{center_width_to_window, to_och_signal_center_width};
use roadm_openroadm::port_number_from_name;
use roadm_types::{FlowRule, Frequency, PortNumber};

/// ROADM driver operator tool
#[derive(Parser, Debug)]
#[command(name = "roadmctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Driver configuration (YAML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configuration documents for one cross-connect
    Plan {
        /// Port inventory (YAML)
        #[arg(long)]
        inventory: PathBuf,

        /// Input port number
        #[arg(long = "in")]
        in_port: u64,

        /// Output port number
        #[arg(long = "out")]
        out_port: u64,

        /// Channel center frequency in THz (e.g. 193.1)
        #[arg(long)]
        center_thz: String,

        /// Channel width in GHz
        #[arg(long, default_value = "50")]
        width_ghz: String,

        /// Also print the teardown documents
        #[arg(long)]
        release: bool,
    },

    /// Show the window and grid encoding of a channel
    Codec {
        /// Channel center frequency in THz
        #[arg(long)]
        center_thz: String,

        /// Channel width in GHz
        #[arg(long, default_value = "50")]
        width_ghz: String,
    },

    /// Show the port number synthesised from a device port name
    PortNumber {
        /// Port name (ext-txN, ext-rxN, int-txN, int-rxN or N-M)
        name: String,
    },
}

/// Initialize tracing on stderr; stdout carries the documents.
fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DriverConfig> {
    let config = match path {
        Some(path) => DriverConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => DriverConfig::default(),
    };
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn channel(center_thz: &str, width_ghz: &str) -> Result<(Frequency, Frequency)> {
    let center = Frequency::parse_thz(center_thz).context("parsing --center-thz")?;
    let width = Frequency::parse_ghz(width_ghz).context("parsing --width-ghz")?;
    Ok((center, width))
}

fn plan(
    config: DriverConfig,
    inventory: &Path,
    in_port: u64,
    out_port: u64,
    (center, width): (Frequency, Frequency),
    release: bool,
) -> Result<()> {
    let inventory = FileInventory::load(inventory)?;
    let device = inventory.device().clone();

    let netconf = SessionRegistry::<dyn NetconfSession>::new();
    netconf.register(device.clone(), Arc::new(DryRunSession::new(std::io::stdout())));

    let registry = DriverRegistry::new(DriverContext {
        config: Arc::new(config),
        netconf: Arc::new(netconf),
        rest: Arc::new(SessionRegistry::<dyn RestSession>::new()),
        inventory: Arc::new(inventory),
        flow_store: Arc::new(NoIntent),
    });

    let bound = registry.bind(device.clone(), "openroadm")?;
    let Some(driver) = bound.as_openroadm() else {
        bail!("{} is not an OpenROADM device", device);
    };

    let signal = to_och_signal_center_width(center, width)?;
    let rule = FlowRule::new(device, PortNumber::new(in_port), PortNumber::new(out_port))
        .with_och_signal(signal);

    let conn = driver.apply(&rule)?;
    info!(connection = %conn.name, link_type = %conn.link_type, "planned");
    if release {
        driver.release(&rule)?;
    }
    Ok(())
}

/// The tool never holds controller intent.
struct NoIntent;

impl roadm_driver_common::FlowRuleStore for NoIntent {
    fn flow_rules(&self, _device: &roadm_types::DeviceId) -> Vec<FlowRule> {
        Vec::new()
    }
}

fn codec((center, width): (Frequency, Frequency)) -> Result<()> {
    let (min, max) = center_width_to_window(center, width);
    println!("center:     {} THz", center.as_thz_string());
    println!("width:      {} GHz", width.as_ghz_string());
    println!("window:     {} - {} THz", min.as_thz_string(), max.as_thz_string());
    let signal = to_och_signal_center_width(center, width)?;
    println!("grid:       {:?} {}", signal.grid_type, signal.channel_spacing);
    println!("multiplier: {}", signal.spacing_multiplier);
    println!("slots:      {}", signal.slot_granularity);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Plan {
            inventory,
            in_port,
            out_port,
            center_thz,
            width_ghz,
            release,
        } => {
            let config = load_config(args.config.as_deref())?;
            plan(
                config,
                &inventory,
                in_port,
                out_port,
                channel(&center_thz, &width_ghz)?,
                release,
            )
        }
        Command::Codec {
            center_thz,
            width_ghz,
        } => codec(channel(&center_thz, &width_ghz)?),
        Command::PortNumber { name } => {
            println!("{}", port_number_from_name(&name)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("roadmctl failed: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
