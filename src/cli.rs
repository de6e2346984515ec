//! Command-line surface.
//!
//! Flags override the JSON file, which overrides the built-in defaults.
//! Only flags actually given on the command line touch the config.

use std::path::PathBuf;

use clap::Parser;

use crate::adapters::config_file::JsonConfigFile;
use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DoorbellConfig;
use crate::pins::{PinId, Polarity};

#[derive(Debug, Parser)]
#[command(name = "doorbell", version, about = "Publish a GPIO push-button's state to MQTT")]
pub struct Cli {
    /// JSON config file; missing keys take their defaults
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// BCM pin of the button
    #[arg(long, value_name = "PIN")]
    pub button_gpio_pin: Option<PinId>,

    /// BCM pin of the indicator LED
    #[arg(long, value_name = "PIN")]
    pub led_gpio_pin: Option<PinId>,

    /// mqtt://[user[:password]@]host[:port]
    #[arg(long, value_name = "URI")]
    pub broker_uri: Option<String>,

    #[arg(long)]
    pub client_id: Option<String>,

    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long, value_name = "MS")]
    pub sample_interval_ms: Option<u32>,

    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u32>,

    #[arg(long, value_name = "MS")]
    pub throttle_ms: Option<u32>,

    /// Button reads high when pressed (pull-down wiring)
    #[arg(long)]
    pub active_high: bool,
}

impl Cli {
    /// Overlay the given flags onto `config`.
    pub fn apply(&self, config: &mut DoorbellConfig) {
        if let Some(pin) = self.button_gpio_pin {
            config.button_pin = pin;
        }
        if let Some(pin) = self.led_gpio_pin {
            config.led_pin = Some(pin);
        }
        if let Some(uri) = &self.broker_uri {
            config.mqtt.broker_uri = uri.clone();
        }
        if let Some(id) = &self.client_id {
            config.mqtt.client_id = id.clone();
        }
        if let Some(topic) = &self.topic {
            config.topic = topic.clone();
        }
        if let Some(ms) = self.sample_interval_ms {
            config.sample_interval_ms = ms;
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        if let Some(ms) = self.throttle_ms {
            config.throttle_ms = ms;
        }
        if self.active_high {
            config.button_polarity = Polarity::ActiveHigh;
            config.button_pull = crate::pins::Pull::Down;
        }
    }

    /// Defaults, then the config file if one was given, then flags.
    pub fn resolve(&self) -> Result<DoorbellConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => JsonConfigFile::new(path).load()?,
            None => DoorbellConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
