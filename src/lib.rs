//! GPIO doorbell library.
//!
//! Exposes the pure-logic core and the host-buildable adapters for
//! integration testing.  The Raspberry Pi and MQTT adapters are behind the
//! `rpi` and `mqtt` features.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod runtime;
pub mod shutdown;
