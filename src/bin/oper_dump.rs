//! Operational data dump
//!
//! Runs one get-items request through the same callbacks the datastore
//! would invoke, against an inventory snapshot and schema-mount file, and
//! prints the resulting tree.
//!
//! Usage:
//!   oper-dump --config demos/config.json devices
//!   oper-dump --inventory inv.json --schema-mount sm.json device-data --device onu-1
//!   oper-dump --config demos/config.json --format cbor --output vlans.cbor vlans

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use rust_schemamount::config::BridgeConfig;
use rust_schemamount::device::DeviceId;
use rust_schemamount::inventory::InventoryProvider;
use rust_schemamount::mount::StaticExtData;
use rust_schemamount::plugin::{Plugin, PluginBuilder, RequestKind};
use rust_schemamount::schema::SchemaContext;
use rust_schemamount::session::LocalSession;
use rust_schemamount::sr_types::ErrorCode;
use rust_schemamount::translation::{self, DATASTORE_MODULES};
use rust_schemamount::tree::DataTree;
use rust_schemamount::{BridgeError, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "oper-dump")]
#[command(about = "Dump operational data served by the schema-mount bridge")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extension data file of the device mount point, overrides the config
    #[arg(long)]
    schema_mount: Option<PathBuf>,

    /// Inventory snapshot, overrides the config
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Log level, overrides the config
    #[arg(long)]
    log_level: Option<String>,

    /// Output encoding
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Write the tree to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fleet enumeration
    Devices,
    /// Mounted device subtrees
    DeviceData {
        /// Only this device
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Service profiles
    Services,
    /// VLAN translation profiles
    Vlans,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Cbor,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(path) = &args.schema_mount {
        config.schema_mount_path.clone_from(path);
    }
    if let Some(path) = &args.inventory {
        config.inventory_path = Some(path.clone());
    }
    if let Some(level) = &args.log_level {
        config.log_level.clone_from(level);
    }
    config.validate()?;
    Ok(config)
}

fn build_plugin(config: &BridgeConfig) -> Result<Plugin> {
    let inventory_path = config
        .inventory_path
        .as_ref()
        .ok_or_else(|| BridgeError::Config("no inventory file configured".to_string()))?;
    let inventory = Arc::new(InventoryProvider::from_file(inventory_path)?);
    info!(
        devices = inventory.snapshot().devices.len(),
        path = %inventory_path.display(),
        "inventory-loaded"
    );

    let ext_data = StaticExtData::from_file(&config.schema_mount_path)?;
    info!(path = %config.schema_mount_path.display(), "schema-mount-loaded");

    PluginBuilder::new()
        .devices(inventory.clone())
        .services(inventory)
        .mount_label(&config.mount_label)
        .ext_data(ext_data)
        .build()
}

fn request(command: &Command) -> (RequestKind, Option<String>) {
    match command {
        Command::Devices => (RequestKind::Devices, None),
        Command::DeviceData { device } => (
            RequestKind::DeviceData,
            device
                .as_deref()
                .map(|d| translation::device_data_path(&DeviceId::from(d))),
        ),
        Command::Services => (RequestKind::Services, None),
        Command::Vlans => (RequestKind::Vlans, None),
    }
}

fn write_tree(tree: &DataTree, format: Format, output: Option<&PathBuf>) -> Result<()> {
    let bytes = match format {
        Format::Json => {
            let mut text = tree.to_json_pretty()?;
            text.push('\n');
            text.into_bytes()
        }
        Format::Cbor => tree.to_cbor()?,
    };
    match output {
        Some(path) => std::fs::write(path, bytes)?,
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn exit_code(code: ErrorCode) -> ExitCode {
    ExitCode::from(u8::try_from(code.as_i32()).unwrap_or(u8::MAX))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("oper-dump: {}", e);
            return exit_code(e.error_code());
        }
    };
    init_tracing(&config.log_level);

    let plugin = match build_plugin(&config) {
        Ok(plugin) => plugin,
        Err(e) => {
            error!(error = %e, "plugin-init-failed");
            return exit_code(e.error_code());
        }
    };

    let (kind, xpath) = request(&args.command);
    let Some(sub) = Plugin::subscriptions()
        .into_iter()
        .find(|s| s.xpath == kind.xpath())
    else {
        return exit_code(ErrorCode::Internal);
    };

    let session = LocalSession::new(
        1,
        Arc::new(SchemaContext::from_modules(DATASTORE_MODULES.iter().copied())),
    );
    let mut slot = None;
    let code = (sub.callback)(
        &session,
        1,
        sub.module_name,
        sub.xpath,
        xpath.as_deref(),
        1,
        &mut slot,
        &plugin,
    );
    if !code.is_success() {
        error!(code = code.as_i32(), "{}", code);
        return exit_code(code);
    }

    let tree = slot.unwrap_or_default();
    if let Err(e) = write_tree(&tree, args.format, args.output.as_ref()) {
        error!(error = %e, "cannot-write-output");
        return exit_code(e.error_code());
    }
    ExitCode::SUCCESS
}
