//! Modbus-TCP poller for the Schneider EVlink Pro AC.
//!
//! Connects to the wallbox, polls its register map on a fixed interval
//! and keeps a snapshot of decoded readings for consumers. With `--once`
//! it performs a single poll cycle and prints the snapshot as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use evlink_common::LoggingConfig;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use evlink_poller::config::PollerConfig;
use evlink_poller::device::evlink_points;
use evlink_poller::poller::DevicePoller;
use evlink_poller::transport::ModbusTransport;

/// Modbus-TCP poller for the Schneider EVlink Pro AC wallbox.
#[derive(Parser, Debug)]
#[command(name = "evlink-poller")]
#[command(about = "Polls an EVlink Pro AC wallbox and exposes decoded readings")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format)
    #[arg(short, long, default_value = "evlink.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Poll once, print the snapshot as JSON to stdout, and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = PollerConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Initialize logging
    let log_config = LoggingConfig {
        level: args
            .log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone()),
        format: config.logging.format,
    };
    evlink_common::init_tracing(&log_config)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    info!("Starting evlink-poller");
    info!("Loaded configuration from {:?}", args.config);

    let device = &config.device;

    // Connect eagerly so a bad address or unreachable device fails setup.
    let mut transport = ModbusTransport::new(device);
    transport
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}:{}", device.host, device.port))?;
    info!(
        host = %device.host,
        port = device.port,
        unit_id = device.unit_id,
        "Connected to wallbox"
    );

    let points = evlink_points().context("Invalid register map")?;
    let mut poller = DevicePoller::new(
        device.name.clone(),
        Duration::from_secs(device.poll_interval_secs),
        transport,
        points,
    );
    let snapshot = poller.snapshot();

    if args.once {
        poller.tick().await;
        let readings = snapshot
            .read()
            .map_err(|_| anyhow::anyhow!("Snapshot lock poisoned"))?
            .clone();
        println!("{}", serde_json::to_string_pretty(&readings)?);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(poller.run(shutdown_rx));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    // Let an in-flight tick finish, then close the connection.
    shutdown_tx
        .send(true)
        .map_err(|e| anyhow::anyhow!("Failed to signal shutdown: {}", e))?;
    let mut transport = handle.await.context("Poller task failed")?;
    transport.disconnect().await;

    info!("evlink-poller stopped");
    Ok(())
}
