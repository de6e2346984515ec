//! Doorbell main entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RpiGpio (HalGpio)   MqttPublisher   LogEventSink  JsonConfig  │
//! │  (GpioPort)          (PublishPort)   (EventSink)   (ConfigPort)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   Debouncer · PublishThrottle · Dispatcher (pure)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  sampler · notifier · indicator threads   ShutdownCoordinator  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use doorbell::adapters::log_sink::LogEventSink;
use doorbell::adapters::mqtt::MqttPublisher;
use doorbell::adapters::rpi;
use doorbell::app::ports::GpioPort;
use doorbell::cli::Cli;
use doorbell::runtime;
use doorbell::shutdown::{self, ShutdownCoordinator, ShutdownToken};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("doorbell v{}", env!("CARGO_PKG_VERSION"));

    // ── Config ────────────────────────────────────────────────
    let config = cli.resolve().context("loading configuration")?;
    info!(
        "button=GPIO{} led={:?} topic='{}' broker={}",
        config.button_pin, config.led_pin, config.topic, config.mqtt.broker_uri
    );

    // ── Hardware ──────────────────────────────────────────────
    let gpio: Arc<dyn GpioPort> = Arc::new(rpi::open(&config).context("opening GPIO")?);
    let coordinator = ShutdownCoordinator::new(gpio.clone());
    let token = ShutdownToken::new();

    // ── Broker ────────────────────────────────────────────────
    let publisher = match MqttPublisher::connect(&config.mqtt) {
        Ok(publisher) => publisher,
        Err(e) => {
            coordinator.release();
            return Err(e).context("connecting to broker");
        }
    };

    // ── Signals ───────────────────────────────────────────────
    if let Err(e) = shutdown::listen_for_signals(token.clone()) {
        coordinator.release();
        return Err(e).context("installing signal handler");
    }

    // ── Loops ─────────────────────────────────────────────────
    if let Err(e) = runtime::start(&config, gpio, publisher, LogEventSink::new(), &token) {
        coordinator.release();
        return Err(e).context("starting loops");
    }

    let reason = coordinator.run(&token, &mut LogEventSink::new());
    info!("exiting ({:?})", reason);
    Ok(ExitCode::from(reason.exit_code()))
}
