//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                         |
//! |----------------|--------------|-------------------------------------|
//! | `hal_gpio`     | GpioPort     | any `embedded-hal` input/output pin |
//! | `rpi`          | (opener)     | rppal pins → `HalGpio`              |
//! | `mqtt`         | PublishPort  | MQTT broker via rumqttc             |
//! | `log_sink`     | EventSink    | `log` facade                        |
//! | `config_file`  | ConfigPort   | JSON file on disk                   |
//!
//! `rpi` and `mqtt` are behind cargo features of the same name so the core
//! and its tests build on any host.

pub mod config_file;
pub mod hal_gpio;
pub mod log_sink;
#[cfg(feature = "mqtt")]
pub mod mqtt;
#[cfg(feature = "rpi")]
pub mod rpi;
