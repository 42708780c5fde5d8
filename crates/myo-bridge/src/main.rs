//! Myo-Bridge: EMG sensor to robot actuation bridge
//!
//! Reads a MyoWare-class sensor over a serial link and turns muscle
//! flexes into gripper commands or inference triggers.

mod actuation;
mod actuator;
mod control_loop;

use actuation::{GripperController, TriggerGate};
use actuator::{ConsoleGripper, ConsoleRunner};
use clap::Parser;
use control_loop::{Backend, ControlLoop};
use myo_core::{BridgeConfig, BridgeMode, FilterMode};
use myo_serial::{SensorReader, SerialLink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

/// Control a robot gripper or inference trigger with an EMG sensor
#[derive(Parser, Debug)]
#[command(name = "myo-bridge")]
#[command(author, version, about = "EMG sensor to robot actuation bridge", long_about = None)]
struct Cli {
    /// Threshold for flex detection on the filtered value
    #[arg(long, default_value_t = 600.0)]
    threshold: f64,

    /// Average the sample window instead of using the latest value
    #[arg(long)]
    mean: bool,

    /// Size of the rolling sample window
    #[arg(long, default_value_t = 50)]
    mean_window: usize,

    /// Serial port of the sensor (e.g. /dev/rfcomm0 or COM5)
    #[arg(long, default_value = "/dev/rfcomm0")]
    port: String,

    /// Serial baud rate
    #[arg(long, default_value_t = 115_200)]
    baudrate: u32,

    /// Minimum seconds between gripper transitions
    #[arg(long, default_value_t = 1.0)]
    debounce: f64,

    /// Actuation variant: gripper or trigger
    #[arg(long, default_value = "gripper")]
    mode: String,

    /// Robot control endpoint
    #[arg(long, default_value = "http://localhost:80")]
    endpoint: String,

    /// Log sensor values and decisions without actuating
    #[arg(long)]
    test: bool,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    if !cli.debounce.is_finite() || cli.debounce < 0.0 {
        anyhow::bail!("debounce must be a non-negative number of seconds");
    }

    let bridge_mode = match cli.mode.to_lowercase().as_str() {
        "gripper" => BridgeMode::Gripper,
        "trigger" => BridgeMode::Trigger,
        other => anyhow::bail!("unknown mode '{}', expected gripper or trigger", other),
    };

    let config = BridgeConfig {
        port: cli.port,
        baud_rate: cli.baudrate,
        threshold: cli.threshold,
        filter_mode: if cli.mean {
            FilterMode::Mean
        } else {
            FilterMode::Raw
        },
        window_size: cli.mean_window,
        bridge_mode,
        debounce: Duration::from_secs_f64(cli.debounce),
        observe_only: cli.test,
        endpoint: cli.endpoint,
        ..Default::default()
    };
    config.validate()?;

    info!(port = %config.port, baud = config.baud_rate, "connecting to sensor");
    let link = SerialLink::open(&config.port, config.baud_rate)?;
    let reader = SensorReader::new(link, config.poll_interval).spawn();

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            cancel_flag.store(true, Ordering::Relaxed);
        }
    });

    let backend = match config.bridge_mode {
        BridgeMode::Gripper => Backend::Gripper {
            controller: GripperController::new(config.debounce),
            actuator: Box::new(ConsoleGripper),
        },
        BridgeMode::Trigger => Backend::Trigger {
            gate: TriggerGate::new(),
            runner: Box::new(ConsoleRunner),
        },
    };

    let control = ControlLoop::new(config, reader, backend, cancel)?;
    control.run().await?;

    info!("bridge stopped");
    Ok(())
}
