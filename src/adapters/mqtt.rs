//! MQTT publish adapter.
//!
//! Implements [`PublishPort`] on top of the synchronous `rumqttc` client.
//! Connection setup waits for the broker's CONNACK so a bad URI or bad
//! credentials fail at startup.  After that a background thread drives
//! the network event loop, which reconnects on its own; publishes made
//! while disconnected are queued by the client up to its request capacity.

use std::time::Duration;

use log::{info, trace, warn};
use rumqttc::{Client, ConnectReturnCode, Connection, Event, MqttOptions, Packet, QoS};

use crate::app::ports::{PublishError, PublishPort};
use crate::config::MqttConfig;
use crate::drivers::task::{LOOP_STACK_KB, spawn_named};

/// Outstanding requests the client buffers before `publish` errors.
const REQUEST_CAPACITY: usize = 16;

/// Pause between reconnect attempts after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

pub struct MqttPublisher {
    client: Client,
    qos: QoS,
}

impl MqttPublisher {
    /// Connect and block until the broker accepts the session.
    pub fn connect(config: &MqttConfig) -> Result<Self, PublishError> {
        let broker = config
            .broker()
            .map_err(|e| PublishError::Connect(e.to_string()))?;

        let mut options = MqttOptions::new(config.client_id.clone(), broker.host.clone(), broker.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs as u64));
        options.set_clean_session(!config.persistent_session);
        if let Some(user) = &broker.username {
            options.set_credentials(user.clone(), broker.password.clone().unwrap_or_default());
        }

        info!("MQTT connecting to {}:{} as '{}'", broker.host, broker.port, config.client_id);
        let (client, mut connection) = Client::new(options, REQUEST_CAPACITY);
        wait_for_connack(&mut connection)?;
        info!("MQTT connected");

        spawn_named("mqtt-events", LOOP_STACK_KB, move || drive(connection))
            .map_err(|e| PublishError::Connect(e.to_string()))?;

        Ok(Self {
            client,
            qos: QoS::AtMostOnce,
        })
    }
}

impl PublishPort for MqttPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), PublishError> {
        self.client
            .publish(topic, self.qos, retain, payload.to_vec())
            .map_err(|e| PublishError::Send(e.to_string()))
    }
}

fn wait_for_connack(connection: &mut Connection) -> Result<(), PublishError> {
    for notification in connection.iter() {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(PublishError::Connect(format!("broker refused: {:?}", ack.code)))
                };
            }
            Ok(_) => {}
            Err(e) => return Err(PublishError::Connect(e.to_string())),
        }
    }
    Err(PublishError::Connect("connection closed before CONNACK".into()))
}

/// Network event loop.  Runs for the life of the process.
fn drive(mut connection: Connection) {
    for notification in connection.iter() {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(_))) => info!("MQTT reconnected"),
            Ok(event) => trace!("MQTT {:?}", event),
            Err(e) => {
                warn!("MQTT connection error: {}; retrying in {:?}", e, RECONNECT_DELAY);
                std::thread::sleep(RECONNECT_DELAY);
            }
        }
    }
}
