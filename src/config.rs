//! Doorbell configuration parameters
//!
//! All tunable parameters for the doorbell.  Defaults match the stock
//! wiring (button on GPIO17 to ground, no LED, local broker).  Values can be
//! overridden from a JSON file and then from command-line flags.

use std::str::FromStr;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::app::ports::ConfigError;
use crate::pins::{self, PinId, Polarity, Pull};

/// Core doorbell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorbellConfig {
    // --- Button input ---
    /// BCM pin of the button
    pub button_pin: PinId,
    /// Electrical meaning of "pressed"
    pub button_polarity: Polarity,
    /// Bias applied to the button input
    pub button_pull: Pull,

    // --- Indicator output ---
    /// BCM pin of the indicator LED; `None` disables the mirror
    pub led_pin: Option<PinId>,
    /// Electrical meaning of "lit"
    pub led_polarity: Polarity,

    // --- Timing ---
    /// Button sampling interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Quiet period before a transition is believed (milliseconds)
    pub debounce_ms: u32,
    /// Minimum spacing between notifications (milliseconds)
    pub throttle_ms: u32,
    /// Indicator refresh interval (milliseconds)
    pub indicator_interval_ms: u32,

    // --- Notification ---
    /// Topic the button state is published to
    pub topic: String,
    /// Publish as a retained message
    pub retain: bool,
    /// Broker session
    pub mqtt: MqttConfig,
}

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// `mqtt://[user[:password]@]host[:port]`
    pub broker_uri: String,
    pub client_id: String,
    pub keep_alive_secs: u16,
    /// Resume the broker-side session across restarts
    pub persistent_session: bool,
}

impl Default for DoorbellConfig {
    fn default() -> Self {
        Self {
            // Button
            button_pin: pins::BUTTON_GPIO,
            button_polarity: Polarity::ActiveLow,
            button_pull: Pull::Up,

            // Indicator
            led_pin: None,
            led_polarity: Polarity::ActiveHigh,

            // Timing
            sample_interval_ms: 100,   // 10 Hz
            debounce_ms: 250,
            throttle_ms: 10_000,       // one notification per 10 s
            indicator_interval_ms: 50, // 20 Hz

            // Notification
            topic: "rpi-mqtt-doorbell".into(),
            retain: true,
            mqtt: MqttConfig::default(),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_uri: "mqtt://127.0.0.1:1883".into(),
            client_id: "rpi-mqtt-doorbell".into(),
            keep_alive_secs: 30,
            persistent_session: true,
        }
    }
}

impl DoorbellConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms as u64)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms as u64)
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms as u64)
    }

    pub fn indicator_interval(&self) -> Duration {
        Duration::from_millis(self.indicator_interval_ms as u64)
    }

    /// Reject values the loops cannot run with.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_interval_ms must be > 0"));
        }
        if self.indicator_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("indicator_interval_ms must be > 0"));
        }
        if self.led_pin == Some(self.button_pin) {
            return Err(ConfigError::ValidationFailed("led_pin must differ from button_pin"));
        }
        if self.topic.is_empty() {
            return Err(ConfigError::ValidationFailed("topic must not be empty"));
        }
        if self.topic.contains(['+', '#']) {
            return Err(ConfigError::ValidationFailed("topic must not contain wildcards"));
        }
        if self.mqtt.client_id.is_empty() && self.mqtt.persistent_session {
            return Err(ConfigError::ValidationFailed(
                "client_id is required for a persistent session",
            ));
        }
        self.mqtt.broker()?;
        Ok(())
    }
}

impl MqttConfig {
    pub fn broker(&self) -> Result<BrokerUri, ConfigError> {
        self.broker_uri.parse()
    }
}

// ---------------------------------------------------------------------------
// Broker URI
// ---------------------------------------------------------------------------

pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Parsed `mqtt://[user[:password]@]host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerUri {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl FromStr for BrokerUri {
    type Err = ConfigError;

    /// Any path, query or fragment is ignored.  Credentials are
    /// percent-decoded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = if s.contains("://") {
            Url::parse(s)
        } else {
            Url::parse(&format!("mqtt://{s}"))
        };
        let url = parsed.map_err(|e| match e {
            url::ParseError::InvalidPort => ConfigError::ValidationFailed("broker_uri port is not a number"),
            url::ParseError::EmptyHost => ConfigError::ValidationFailed("broker_uri host is empty"),
            _ => ConfigError::ValidationFailed("broker_uri is not a valid URI"),
        })?;

        if !matches!(url.scheme(), "mqtt" | "tcp") {
            return Err(ConfigError::ValidationFailed("broker_uri scheme must be mqtt:// or tcp://"));
        }

        let host = match url.host() {
            Some(Host::Ipv6(addr)) => addr.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Domain(name)) if !name.is_empty() => name.to_owned(),
            _ => return Err(ConfigError::ValidationFailed("broker_uri host is empty")),
        };

        let username = Some(decode_userinfo(url.username())?).filter(|u| !u.is_empty());
        let password = url.password().map(decode_userinfo).transpose()?;

        Ok(Self {
            host,
            port: url.port_or_known_default().unwrap_or(DEFAULT_MQTT_PORT),
            username,
            password,
        })
    }
}

fn decode_userinfo(raw: &str) -> Result<String, ConfigError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ConfigError::ValidationFailed("broker_uri credentials are not valid UTF-8"))
}
